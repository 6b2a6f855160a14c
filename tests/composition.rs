// Composition tests: full tag runs over CSV files on disk, read back by
// the page reader and summarized.

use std::fs;
use std::path::{Path, PathBuf};

use themetag::output::pages::{page_path, read_pages};
use themetag::pipeline::tag::{run, TagOptions};
use themetag::pipeline::tagger::{ContextScope, TaggerSettings};
use themetag::summary::summarize;

const VOCAB: &str = "Tariff,AI\n\
                     tariffs,machine learning\n\
                     trade war,genai\n";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn options(dir: &Path, transcripts: Vec<PathBuf>, page_rows: usize) -> TagOptions {
    TagOptions {
        transcripts,
        vocab: write(dir, "vocab.csv", VOCAB),
        output_prefix: dir.join("out/RAW Thematic Mentions").display().to_string(),
        settings: TaggerSettings::default(),
        page_rows,
    }
}

#[test]
fn tariff_example_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Event Type,Date,Transcript\n\
         ABC,Abc Corp,Q1 Earnings Call,2024-04-20,\"Revenue grew 5%. Tariffs hurt margins. We raised prices. Demand was stable.\"\n",
    );
    let opts = options(dir.path(), vec![transcripts], 100);

    let report = run(&opts).unwrap();
    assert_eq!(report.records_loaded, 1);
    assert_eq!(report.chunks.len(), 1);
    assert_eq!(report.pages.len(), 1);

    let page = fs::read_to_string(&report.pages[0]).unwrap();
    let mut lines = page.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Ticker,Company Name,Date,Event Type,Combined Transcript,Tariff_keyword_count,AI_keyword_count,Thematic Term Count"
    );
    assert_eq!(
        lines.next().unwrap(),
        "ABC,Abc Corp,2024-04-20,Q1 Earnings Call,Revenue grew 5%. Tariffs hurt margins. We raised prices.,1,0,1"
    );
    assert!(lines.next().is_none());
}

#[test]
fn split_columns_dedup_and_pagination() {
    let dir = tempfile::tempdir().unwrap();
    let y2023 = write(
        dir.path(),
        "2023.csv",
        "Ticker,Company Name,Event Type,Date,Transcript - Mgmt,Transcript - Mgmt p2,Transcript - QA,Transcript - QA p2\n\
         XYZ,Xyz Ltd,Q3 2023 Earnings Call,2023-10-25,Tariffs bite. ,Quiet quarter.,Any GenAI plans?,None yet.\n\
         XYZ,Xyz Ltd,Q3 2023 Earnings Call and Business Update,2023-10-25,The trade war continues.,,Thanks.,\n",
    );
    let y2024 = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Event Type,Date,Transcript\n\
         ABC,Abc Corp,Q4 2023 Earnings Call,2024-02-01,Machine learning drove savings. Good.\n\
         ABC,Abc Corp,Q1 2024 Earnings Call,2024-04-20,No themes here. Tariffs did matter.\n",
    );
    let opts = options(dir.path(), vec![y2023, y2024], 2);

    let report = run(&opts).unwrap();
    assert_eq!(report.records_loaded, 4);
    assert_eq!(report.records_kept, 3);
    assert_eq!(report.chunks.len(), 3);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.pages[0], page_path(&opts.output_prefix, 0));

    // The longer event label won, so the first XYZ transcript is gone.
    assert!(report
        .chunks
        .iter()
        .all(|c| !c.text.contains("Tariffs bite")));

    let table = read_pages(&report.pages).unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.themes(), vec!["Tariff", "AI"]);
    let tickers: Vec<_> = table.rows.iter().map(|r| r.meta.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["ABC", "ABC", "XYZ"]);
    assert_eq!(table.rows[0].counts, vec![0, 1]);
    assert_eq!(table.rows[1].counts, vec![1, 0]);
    assert_eq!(table.rows[2].counts, vec![1, 0]);

    let summary = summarize(&table);
    let labels: Vec<_> = summary.iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["Q3 '23", "Q4 '23", "Q1 '24"]);
    assert_eq!(summary[0].counts, vec![1, 0]);
    assert_eq!(summary[1].counts, vec![0, 1]);
    assert_eq!(summary[2].companies, 1);
}

#[test]
fn no_mentions_writes_one_header_only_page() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Event Type,Date,Transcript\n\
         ABC,Abc Corp,Q1 Earnings Call,2024-04-20,Nothing relevant. At all.\n",
    );
    let report = run(&options(dir.path(), vec![transcripts], 100)).unwrap();
    assert!(report.chunks.is_empty());
    assert_eq!(report.pages.len(), 1);

    let table = read_pages(&report.pages).unwrap();
    assert!(table.rows.is_empty());
    assert_eq!(table.count_columns.len(), 2);
}

#[test]
fn missing_required_column_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Date,Transcript\n\
         ABC,Abc Corp,2024-04-20,Tariffs.\n",
    );
    let opts = options(dir.path(), vec![transcripts], 100);
    let err = run(&opts).unwrap_err();
    assert!(format!("{err:#}").contains("Event Type"), "{err:#}");
    assert!(!page_path(&opts.output_prefix, 0).exists());
}

#[test]
fn positional_scope_pulls_context_across_records() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Event Type,Date,Transcript\n\
         AAA,Aaa Inc,Investor Day,2024-05-01,Welcome. Closing words.\n\
         AAA,Aaa Inc,Q1 Earnings Call,2024-05-01,Tariffs dominate. Fine.\n",
    );

    let mut opts = options(dir.path(), vec![transcripts], 100);
    let within = run(&opts).unwrap();
    assert_eq!(within.chunks.len(), 1);
    assert_eq!(within.chunks[0].text, "Tariffs dominate. Fine.");

    opts.settings.context_scope = ContextScope::Positional;
    let positional = run(&opts).unwrap();
    let texts: Vec<_> = positional.chunks.iter().map(|c| c.text.as_str()).collect();
    // "Closing words." is retained but lands in its own zero-count chunk.
    assert_eq!(texts, vec!["Tariffs dominate. Fine."]);
    assert!(positional.chunks.iter().all(|c| c.meta.event_type == "Q1 Earnings Call"));
}

#[test]
fn header_only_transcripts_write_one_header_only_page() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Event Type,Date,Transcript\n",
    );
    let report = run(&options(dir.path(), vec![transcripts], 100)).unwrap();
    assert_eq!(report.records_loaded, 0);
    assert!(report.chunks.is_empty());
    assert_eq!(report.pages.len(), 1);

    let page = fs::read_to_string(&report.pages[0]).unwrap();
    assert_eq!(page.lines().count(), 1);
    assert!(page.starts_with("Ticker,Company Name,Date,Event Type,Combined Transcript,"));
}

#[test]
fn vocabulary_without_themes_writes_page_without_count_columns() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Event Type,Date,Transcript\n\
         ABC,Abc Corp,Q1 Earnings Call,2024-04-20,Tariffs hurt margins.\n",
    );
    let mut opts = options(dir.path(), vec![transcripts], 100);
    opts.vocab = write(dir.path(), "empty_vocab.csv", " \n");

    let report = run(&opts).unwrap();
    assert!(report.vocab.is_empty());
    assert!(report.chunks.is_empty());
    assert_eq!(report.pages.len(), 1);

    let page = fs::read_to_string(&report.pages[0]).unwrap();
    assert_eq!(
        page.lines().collect::<Vec<_>>(),
        vec!["Ticker,Company Name,Date,Event Type,Combined Transcript,Thematic Term Count"]
    );
    let table = read_pages(&report.pages).unwrap();
    assert!(table.count_columns.is_empty());
}

#[test]
fn missing_transcript_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let opts = options(dir.path(), vec![missing.clone()], 100);

    let err = run(&opts).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains(&missing.display().to_string()), "{msg}");
    assert!(!page_path(&opts.output_prefix, 0).exists());
}

#[test]
fn missing_vocabulary_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let transcripts = write(
        dir.path(),
        "2024.csv",
        "Ticker,Company Name,Event Type,Date,Transcript\n\
         ABC,Abc Corp,Q1 Earnings Call,2024-04-20,Tariffs hurt margins.\n",
    );
    let mut opts = options(dir.path(), vec![transcripts], 100);
    opts.vocab = dir.path().join("no_vocab.csv");

    let err = run(&opts).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains(&opts.vocab.display().to_string()), "{msg}");
    assert!(!page_path(&opts.output_prefix, 0).exists());
}
