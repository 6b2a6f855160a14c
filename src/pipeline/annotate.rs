// Annotation batch run: chunk rows for one theme -> classifier -> table.
//
// Rows are sent one at a time in page order. A failed row is recorded with
// the sentinel annotation and the run moves on; only the budget cap stops
// the run early.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use tracing::{info, warn};

use crate::annotate::budget::{Budget, CostModel};
use crate::annotate::traits::{Annotation, Annotator};
use crate::output::pages::{ensure_parent_dir, ChunkRow, ChunkTable, COMBINED_TRANSCRIPT};
use crate::output::{progress_bar, truncate_chars};
use crate::transcripts::record::{COMPANY_NAME, DATE, EVENT_TYPE, TICKER};

/// One annotated chunk row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRow {
    pub row: ChunkRow,
    /// This theme's keyword count for the row.
    pub count: usize,
    pub annotation: Annotation,
}

/// Result of an annotation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRun {
    pub theme: String,
    pub count_column: String,
    /// Rows with a non-zero count for the theme.
    pub eligible: usize,
    pub rows: Vec<AnnotatedRow>,
    pub failures: usize,
    pub estimated_cost: f64,
    /// True when the budget cap ended the run before every eligible row.
    pub stopped_on_budget: bool,
}

/// Options for [`run`].
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Theme name or count column; `None` picks the first theme.
    pub theme: Option<String>,
    pub max_cost: f64,
    pub cost_model: CostModel,
    /// Stop after this many rows (useful for a trial run).
    pub limit: Option<usize>,
}

/// Annotate every row of `table` that mentions the chosen theme.
pub async fn run(
    annotator: &dyn Annotator,
    table: &ChunkTable,
    options: &AnnotateOptions,
) -> Result<AnnotationRun> {
    let theme_idx = match options.theme.as_deref() {
        Some(name) => table
            .theme_index(name)
            .with_context(|| format!("Theme '{name}' not found in chunk pages"))?,
        None if table.count_columns.is_empty() => {
            anyhow::bail!("Chunk pages have no *_keyword_count columns to annotate")
        }
        None => 0,
    };
    let themes = table.themes();
    let theme = themes[theme_idx].to_string();
    let count_column = table.count_columns[theme_idx].clone();

    let eligible: Vec<&ChunkRow> = table
        .rows
        .iter()
        .filter(|r| r.counts.get(theme_idx).copied().unwrap_or(0) > 0)
        .collect();
    let take = options.limit.unwrap_or(eligible.len()).min(eligible.len());
    info!(theme = %theme, eligible = eligible.len(), take, "Annotating chunks");

    let mut budget = Budget::new(options.max_cost);
    let mut rows = Vec::with_capacity(take);
    let mut failures = 0;
    let mut stopped_on_budget = false;

    let pb = progress_bar(take, "Annotating");
    for row in eligible.iter().take(take) {
        if !budget.charge(options.cost_model.estimate(&row.text)) {
            warn!(
                cap = budget.cap(),
                spent = budget.spent(),
                "Stopping early, annotation budget cap reached"
            );
            stopped_on_budget = true;
            break;
        }

        let annotation = match annotator.annotate(&row.text, &theme).await {
            Ok(a) => a,
            Err(e) => {
                warn!(
                    ticker = %row.meta.ticker,
                    excerpt = %truncate_chars(&row.text, 60),
                    error = %e,
                    "Annotation failed"
                );
                failures += 1;
                Annotation::failed(&e)
            }
        };

        rows.push(AnnotatedRow {
            row: (*row).clone(),
            count: row.counts[theme_idx],
            annotation,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(AnnotationRun {
        theme,
        count_column,
        eligible: eligible.len(),
        rows,
        failures,
        estimated_cost: budget.spent(),
        stopped_on_budget,
    })
}

/// Write annotated rows as CSV.
pub fn write_annotations<W: io::Write>(writer: W, run: &AnnotationRun) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        TICKER,
        COMPANY_NAME,
        DATE,
        EVENT_TYPE,
        COMBINED_TRANSCRIPT,
        run.count_column.as_str(),
        "subthemes",
        "sentiment",
        "reasoning",
    ])?;

    for annotated in &run.rows {
        let meta = &annotated.row.meta;
        wtr.write_record([
            meta.ticker.as_str(),
            meta.company_name.as_str(),
            meta.date.as_str(),
            meta.event_type.as_str(),
            annotated.row.text.as_str(),
            annotated.count.to_string().as_str(),
            annotated.annotation.subthemes.join(", ").as_str(),
            annotated.annotation.sentiment.as_str(),
            annotated.annotation.reasoning.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write annotated rows to a file, creating its directory if needed.
pub fn save_annotations(path: &Path, run: &AnnotationRun) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_annotations(file, run).with_context(|| format!("Failed to write {}", path.display()))
}
