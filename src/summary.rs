// Mentions-by-quarter summary of chunk pages.
//
// Calls are bucketed into the fiscal quarter they report on: a call held in
// January to March covers Q4 of the previous year, April to June covers Q1,
// and so on.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use csv::Writer;

use crate::output::pages::{ensure_parent_dir, ChunkTable};

/// The quarter an earnings call reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportingQuarter {
    pub year: i32,
    /// 1 to 4.
    pub quarter: u32,
}

impl ReportingQuarter {
    pub fn for_call_date(date: NaiveDate) -> Self {
        match date.month() {
            1..=3 => Self {
                year: date.year() - 1,
                quarter: 4,
            },
            m => Self {
                year: date.year(),
                quarter: (m - 1) / 3,
            },
        }
    }
}

impl fmt::Display for ReportingQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} '{:02}", self.quarter, self.year.rem_euclid(100))
    }
}

/// Totals for one quarter. `quarter` is `None` for unparseable dates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuarterSummary {
    pub quarter: Option<ReportingQuarter>,
    pub chunks: usize,
    /// Distinct tickers with at least one chunk in the quarter.
    pub companies: usize,
    /// Per-theme totals aligned with the table's count columns.
    pub counts: Vec<usize>,
}

impl QuarterSummary {
    pub fn label(&self) -> String {
        self.quarter
            .map(|q| q.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[derive(Default)]
struct Bucket<'a> {
    chunks: usize,
    tickers: HashSet<&'a str>,
    counts: Vec<usize>,
}

impl<'a> Bucket<'a> {
    fn add(&mut self, ticker: &'a str, counts: &[usize]) {
        self.chunks += 1;
        self.tickers.insert(ticker);
        if self.counts.len() < counts.len() {
            self.counts.resize(counts.len(), 0);
        }
        for (acc, n) in self.counts.iter_mut().zip(counts) {
            *acc += n;
        }
    }

    fn finish(self, quarter: Option<ReportingQuarter>, themes: usize) -> QuarterSummary {
        let mut counts = self.counts;
        counts.resize(themes, 0);
        QuarterSummary {
            quarter,
            chunks: self.chunks,
            companies: self.tickers.len(),
            counts,
        }
    }
}

/// Sum theme counts per reporting quarter, oldest first, `Unknown` last.
pub fn summarize(table: &ChunkTable) -> Vec<QuarterSummary> {
    let mut known: BTreeMap<ReportingQuarter, Bucket<'_>> = BTreeMap::new();
    let mut unknown: Option<Bucket<'_>> = None;

    for row in &table.rows {
        let bucket = match row.meta.parsed_date() {
            Some(date) => known
                .entry(ReportingQuarter::for_call_date(date))
                .or_default(),
            None => unknown.get_or_insert_with(Bucket::default),
        };
        bucket.add(&row.meta.ticker, &row.counts);
    }

    let themes = table.count_columns.len();
    let mut out: Vec<QuarterSummary> = known
        .into_iter()
        .map(|(q, b)| b.finish(Some(q), themes))
        .collect();
    out.extend(unknown.map(|b| b.finish(None, themes)));
    out
}

/// Write the summary as CSV: `Quarter, Chunks, Companies, <count columns>`.
pub fn write_summary<W: io::Write>(
    writer: W,
    count_columns: &[String],
    summaries: &[QuarterSummary],
) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    let mut header = vec![
        "Quarter".to_string(),
        "Chunks".to_string(),
        "Companies".to_string(),
    ];
    header.extend(count_columns.iter().cloned());
    wtr.write_record(&header)?;

    for s in summaries {
        let mut row = vec![s.label(), s.chunks.to_string(), s.companies.to_string()];
        row.extend(s.counts.iter().map(|c| c.to_string()));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the summary CSV to disk.
pub fn save_summary(path: &Path, count_columns: &[String], summaries: &[QuarterSummary]) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_summary(file, count_columns, summaries)
        .with_context(|| format!("Failed to write {}", path.display()))
}
