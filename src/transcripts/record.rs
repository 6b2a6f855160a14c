// TranscriptRecord — one earnings-call (or other corporate event) transcript.
//
// Records are read from CSV exports of the transcript spreadsheets. The raw
// text can arrive either as a single `Transcript` column or split across
// management-discussion and Q&A columns (each optionally spilling into a
// "p2" column when the source cell hit the spreadsheet size limit).

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::info;

pub const TICKER: &str = "Ticker";
pub const COMPANY_NAME: &str = "Company Name";
pub const EVENT_TYPE: &str = "Event Type";
pub const DATE: &str = "Date";
pub const TRANSCRIPT: &str = "Transcript";
pub const TRANSCRIPT_MGMT: &str = "Transcript - Mgmt";
pub const TRANSCRIPT_MGMT_P2: &str = "Transcript - Mgmt p2";
pub const TRANSCRIPT_QA: &str = "Transcript - QA";
pub const TRANSCRIPT_QA_P2: &str = "Transcript - QA p2";

/// Identifying metadata carried by a record and every row derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordMeta {
    pub ticker: String,
    pub company_name: String,
    pub date: String,
    pub event_type: String,
}

impl RecordMeta {
    /// True when the event label mentions "earnings" (case-insensitive).
    pub fn is_earnings(&self) -> bool {
        self.event_type.to_lowercase().contains("earnings")
    }

    /// The date as a calendar date, if it is in one of the accepted formats.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Ordering/equality key for the date column.
    ///
    /// Parseable dates compare as calendar dates, so `2024-02-15` and
    /// `2024-02-15 00:00:00` are the same day. Anything else falls back to
    /// the raw text and sorts ahead of every real date.
    pub fn date_key(&self) -> (Option<NaiveDate>, String) {
        match self.parsed_date() {
            Some(d) => (Some(d), String::new()),
            None => (None, self.date.clone()),
        }
    }
}

/// A single transcript with its identifying metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRecord {
    pub meta: RecordMeta,
    /// Full transcript text. Missing cells are read as empty strings.
    pub transcript: String,
}

impl TranscriptRecord {
    pub fn new(
        ticker: &str,
        company_name: &str,
        event_type: &str,
        date: &str,
        transcript: &str,
    ) -> Self {
        Self {
            meta: RecordMeta {
                ticker: ticker.to_string(),
                company_name: company_name.to_string(),
                date: date.to_string(),
                event_type: event_type.to_string(),
            },
            transcript: transcript.to_string(),
        }
    }
}

/// Parse the date formats seen in transcript exports.
///
/// Accepts ISO dates (`2024-02-15`), ISO datetimes as written by spreadsheet
/// exports (`2024-02-15 00:00:00`) and US-style dates (`2/15/2024`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// Where the transcript text lives in a given file.
enum TextColumns {
    Single(usize),
    Split {
        mgmt: usize,
        mgmt_p2: Option<usize>,
        qa: usize,
        qa_p2: Option<usize>,
    },
}

struct ColumnLayout {
    ticker: usize,
    company_name: usize,
    event_type: usize,
    date: usize,
    text: TextColumns,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord, source: &str) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).with_context(|| format!("{source}: missing required column '{name}'"))
        };

        let text = match find(TRANSCRIPT) {
            Some(idx) => TextColumns::Single(idx),
            None => match (find(TRANSCRIPT_MGMT), find(TRANSCRIPT_QA)) {
                (Some(mgmt), Some(qa)) => TextColumns::Split {
                    mgmt,
                    mgmt_p2: find(TRANSCRIPT_MGMT_P2),
                    qa,
                    qa_p2: find(TRANSCRIPT_QA_P2),
                },
                _ => anyhow::bail!(
                    "{source}: missing transcript column, expected '{TRANSCRIPT}' or both \
                     '{TRANSCRIPT_MGMT}' and '{TRANSCRIPT_QA}'"
                ),
            },
        };

        Ok(Self {
            ticker: require(TICKER)?,
            company_name: require(COMPANY_NAME)?,
            event_type: require(EVENT_TYPE)?,
            date: require(DATE)?,
            text,
        })
    }

    fn record(&self, row: &StringRecord) -> TranscriptRecord {
        let transcript = match self.text {
            TextColumns::Single(idx) => cell(row, Some(idx)).to_string(),
            TextColumns::Split {
                mgmt,
                mgmt_p2,
                qa,
                qa_p2,
            } => format!(
                "{}{}\n{}{}",
                cell(row, Some(mgmt)),
                cell(row, mgmt_p2),
                cell(row, Some(qa)),
                cell(row, qa_p2),
            ),
        };

        TranscriptRecord::new(
            cell(row, Some(self.ticker)).trim(),
            cell(row, Some(self.company_name)).trim(),
            cell(row, Some(self.event_type)).trim(),
            cell(row, Some(self.date)).trim(),
            &transcript,
        )
    }
}

/// Missing columns and short rows both read as empty.
fn cell(row: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).unwrap_or("")
}

/// Read transcript records from any CSV source.
///
/// `source` is only used to label errors. Required columns are checked
/// against the header before any row is read.
pub fn read_transcripts<R: io::Read>(reader: R, source: &str) -> Result<Vec<TranscriptRecord>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{source}: failed to read CSV header"))?
        .clone();
    let layout = ColumnLayout::resolve(&headers, source)?;

    let mut records = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("{source}: malformed CSV at data row {}", line + 1))?;
        records.push(layout.record(&row));
    }
    Ok(records)
}

/// Load and concatenate transcript files in the order given.
pub fn load_transcripts(paths: &[PathBuf]) -> Result<Vec<TranscriptRecord>> {
    let mut all = Vec::new();
    for path in paths {
        let records = load_file(path)?;
        info!(path = %path.display(), records = records.len(), "Loaded transcript file");
        all.extend(records);
    }
    Ok(all)
}

fn load_file(path: &Path) -> Result<Vec<TranscriptRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open transcript file {}", path.display()))?;
    read_transcripts(file, &path.display().to_string())
}
