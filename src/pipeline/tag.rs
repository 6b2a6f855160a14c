// Tagging run: transcript files + vocabulary -> paginated chunk pages.
//
// Every input is loaded and validated before the first page is written, so
// a configuration error never leaves partial output behind.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::output::pages::write_pages;
use crate::pipeline::paginate::paginate;
use crate::pipeline::tagger::{CombinedChunk, TaggerSettings, ThemeTagger};
use crate::themes::vocabulary::{load_vocabulary, ThemeVocabulary};
use crate::transcripts::dedup::dedup_records;
use crate::transcripts::record::{load_transcripts, TranscriptRecord};

/// Inputs and knobs for one tagging run.
#[derive(Debug, Clone)]
pub struct TagOptions {
    pub transcripts: Vec<PathBuf>,
    pub vocab: PathBuf,
    pub output_prefix: String,
    pub settings: TaggerSettings,
    pub page_rows: usize,
}

/// What a tagging run produced.
#[derive(Debug)]
pub struct TagReport {
    pub vocab: ThemeVocabulary,
    pub records_loaded: usize,
    pub records_kept: usize,
    pub chunks: Vec<CombinedChunk>,
    pub pages: Vec<PathBuf>,
}

/// Tag records already in memory. Returns the final, non-empty chunks.
pub fn tag_records(
    records: Vec<TranscriptRecord>,
    vocab: ThemeVocabulary,
    settings: TaggerSettings,
) -> Result<(ThemeVocabulary, usize, Vec<CombinedChunk>)> {
    let loaded = records.len();
    let records = dedup_records(records);
    info!(loaded, kept = records.len(), "Deduplicated transcript records");

    let tagger = ThemeTagger::new(vocab, settings)?;
    let chunks = tagger.tag(&records);
    Ok((tagger.vocabulary().clone(), records.len(), chunks))
}

/// Run the full tagging pass and write the output pages.
pub fn run(options: &TagOptions) -> Result<TagReport> {
    if options.transcripts.is_empty() {
        anyhow::bail!("No transcript files given");
    }
    if options.page_rows == 0 {
        anyhow::bail!("Page size must be at least 1 row");
    }
    let vocab = load_vocabulary(&options.vocab)?;
    let records = load_transcripts(&options.transcripts)?;
    let records_loaded = records.len();

    let (vocab, records_kept, chunks) = tag_records(records, vocab, options.settings)?;

    let pages = paginate(&chunks, options.page_rows)?;
    let written = write_pages(&options.output_prefix, &vocab, &pages)?;

    Ok(TagReport {
        vocab,
        records_loaded,
        records_kept,
        chunks,
        pages: written,
    })
}
