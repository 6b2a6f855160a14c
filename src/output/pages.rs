// Chunk pages — CSV files holding the combined chunk table.
//
// Pages are written as `<prefix>_part<N>.csv` and read back by the
// downstream `annotate` and `summarize` commands.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use tracing::info;

use crate::pipeline::tagger::CombinedChunk;
use crate::themes::vocabulary::{ThemeVocabulary, COUNT_SUFFIX};
use crate::transcripts::record::{RecordMeta, COMPANY_NAME, DATE, EVENT_TYPE, TICKER};

pub const COMBINED_TRANSCRIPT: &str = "Combined Transcript";
pub const THEMATIC_TERM_COUNT: &str = "Thematic Term Count";

/// Path of page `index` (zero-based) for an output prefix.
pub fn page_path(prefix: &str, index: usize) -> PathBuf {
    PathBuf::from(format!("{prefix}_part{}.csv", index + 1))
}

/// Header row for a chunk page under this vocabulary.
pub fn page_header(vocab: &ThemeVocabulary) -> Vec<String> {
    let mut header: Vec<String> = [TICKER, COMPANY_NAME, DATE, EVENT_TYPE, COMBINED_TRANSCRIPT]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(vocab.count_columns());
    header.push(THEMATIC_TERM_COUNT.to_string());
    header
}

/// Write one page of chunks, header first.
pub fn write_page<W: io::Write>(
    writer: W,
    vocab: &ThemeVocabulary,
    chunks: &[CombinedChunk],
) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(page_header(vocab))?;

    for chunk in chunks {
        let mut row = vec![
            chunk.meta.ticker.clone(),
            chunk.meta.company_name.clone(),
            chunk.meta.date.clone(),
            chunk.meta.event_type.clone(),
            chunk.text.clone(),
        ];
        row.extend((0..vocab.len()).map(|i| chunk.hits.get(i).to_string()));
        row.push(chunk.thematic_term_count().to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write every page to disk, creating the output directory if needed.
pub fn write_pages(
    prefix: &str,
    vocab: &ThemeVocabulary,
    pages: &[&[CombinedChunk]],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let path = page_path(prefix, i);
        ensure_parent_dir(&path)?;
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create output page {}", path.display()))?;
        write_page(file, vocab, page)
            .with_context(|| format!("Failed to write output page {}", path.display()))?;
        info!(path = %path.display(), rows = page.len(), "Wrote chunk page");
        written.push(path);
    }
    Ok(written)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// One chunk row read back from a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRow {
    pub meta: RecordMeta,
    pub text: String,
    /// Counts aligned with [`ChunkTable::count_columns`].
    pub counts: Vec<usize>,
}

/// Chunk rows from one or more pages sharing the same count columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkTable {
    /// Count column names, e.g. `Tariff_keyword_count`, in page order.
    pub count_columns: Vec<String>,
    pub rows: Vec<ChunkRow>,
}

impl ChunkTable {
    /// Theme names recovered from the count columns.
    pub fn themes(&self) -> Vec<&str> {
        self.count_columns
            .iter()
            .map(|c| c.strip_suffix(COUNT_SUFFIX).unwrap_or(c))
            .collect()
    }

    /// Index of a theme given either its name or its count column.
    pub fn theme_index(&self, theme: &str) -> Option<usize> {
        let column = crate::themes::vocabulary::count_column(theme);
        self.count_columns
            .iter()
            .position(|c| c == theme || *c == column)
    }
}

/// Read a single page. Only `Combined Transcript` is mandatory; missing
/// identity columns read as empty.
pub fn read_page<R: io::Read>(reader: R, source: &str) -> Result<ChunkTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{source}: failed to read page header"))?
        .clone();

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let text_idx = find(COMBINED_TRANSCRIPT)
        .with_context(|| format!("{source}: missing required column '{COMBINED_TRANSCRIPT}'"))?;
    let (ticker, company, date, event) =
        (find(TICKER), find(COMPANY_NAME), find(DATE), find(EVENT_TYPE));

    let count_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim().ends_with(COUNT_SUFFIX))
        .map(|(i, _)| i)
        .collect();
    let count_columns = count_idx
        .iter()
        .map(|&i| headers[i].trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{source}: malformed CSV at data row {}", line + 1))?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").to_string();
        let counts = count_idx
            .iter()
            .map(|&i| parse_count(&record, i))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("{source}: bad count at data row {}", line + 1))?;

        rows.push(ChunkRow {
            meta: RecordMeta {
                ticker: field(ticker),
                company_name: field(company),
                date: field(date),
                event_type: field(event),
            },
            text: field(Some(text_idx)),
            counts,
        });
    }

    Ok(ChunkTable {
        count_columns,
        rows,
    })
}

/// Counts may come back from a spreadsheet as `3.0`; blanks mean zero.
fn parse_count(record: &StringRecord, idx: usize) -> Result<usize> {
    let raw = record.get(idx).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = raw.parse::<usize>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as usize),
        _ => anyhow::bail!("'{raw}' is not a non-negative whole number"),
    }
}

/// Read and concatenate pages in order. All pages must share count columns.
pub fn read_pages(paths: &[PathBuf]) -> Result<ChunkTable> {
    let mut table: Option<ChunkTable> = None;
    for path in paths {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open chunk page {}", path.display()))?;
        let page = read_page(file, &path.display().to_string())?;
        info!(path = %path.display(), rows = page.rows.len(), "Loaded chunk page");

        match table.as_mut() {
            None => table = Some(page),
            Some(t) if t.count_columns == page.count_columns => t.rows.extend(page.rows),
            Some(_) => anyhow::bail!(
                "{}: theme columns differ from the first page",
                path.display()
            ),
        }
    }
    Ok(table.unwrap_or_default())
}
