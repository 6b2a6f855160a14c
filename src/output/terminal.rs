// Colored terminal output for tagging, annotation and summary runs.
//
// main.rs delegates all human-facing formatting here.

use colored::Colorize;

use crate::output::truncate_chars;
use crate::pipeline::annotate::AnnotationRun;
use crate::pipeline::tag::TagReport;
use crate::summary::QuarterSummary;

/// Per-theme mention totals with a bar relative to the busiest theme.
pub fn display_tag_report(report: &TagReport) {
    println!(
        "\n{}",
        format!(
            "=== Thematic Mentions ({} chunks from {} transcripts) ===",
            report.chunks.len(),
            report.records_kept
        )
        .bold()
    );
    println!(
        "{}",
        format!(
            "  {} records loaded, {} after deduplication",
            report.records_loaded, report.records_kept
        )
        .dimmed()
    );
    println!();

    let totals: Vec<usize> = (0..report.vocab.len())
        .map(|i| report.chunks.iter().map(|c| c.hits.get(i)).sum())
        .collect();
    let max = totals.iter().copied().max().unwrap_or(0).max(1);
    let bar_width: usize = 20;

    for (i, (theme, total)) in report.vocab.themes().iter().zip(&totals).enumerate() {
        let chunks_with = report.chunks.iter().filter(|c| c.hits.get(i) > 0).count();
        let filled = (*total * bar_width).div_ceil(max).min(bar_width);
        let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(bar_width - filled));
        let colored_bar = if *total == 0 {
            bar.dimmed()
        } else {
            bar.bright_green()
        };
        println!(
            "  {:<30} {} {:>6} mentions in {:>5} chunks",
            theme.name.bold(),
            colored_bar,
            total,
            chunks_with
        );
    }

    println!();
    for page in &report.pages {
        println!("  Wrote {}", page.display().to_string().dimmed());
    }
}

/// Summary of an annotation run with a few sample rows.
pub fn display_annotation_run(run: &AnnotationRun) {
    println!(
        "\n{}",
        format!("=== Annotations for theme: {} ===", run.theme).bold()
    );
    println!(
        "  Annotated {} of {} chunks ({} failed)",
        run.rows.len(),
        run.eligible,
        run.failures
    );
    println!("  Estimated cost: ${:.2}", run.estimated_cost);
    if run.stopped_on_budget {
        println!("  {}", "Stopped early: budget cap reached.".yellow());
    }
    println!();

    for annotated in run.rows.iter().take(5) {
        let sentiment = if annotated.annotation.is_error() {
            annotated.annotation.sentiment.red().to_string()
        } else {
            annotated.annotation.sentiment.bold().to_string()
        };
        println!(
            "  {:<8} {:<12} sentiment {}",
            annotated.row.meta.ticker, annotated.row.meta.date, sentiment
        );
        if !annotated.annotation.subthemes.is_empty() {
            println!(
                "      Subthemes: {}",
                annotated.annotation.subthemes.join(", ").dimmed()
            );
        }
        println!(
            "      {}",
            truncate_chars(&annotated.annotation.reasoning, 100).dimmed()
        );
    }
}

/// Mentions-by-quarter table.
pub fn display_summary(themes: &[&str], summaries: &[QuarterSummary]) {
    if summaries.is_empty() {
        println!("No chunks found. Run `themetag tag` first.");
        return;
    }

    println!("\n{}", "=== Mentions by Quarter ===".bold());
    println!();

    let mut header = format!("  {:<8} {:>7} {:>9}", "Quarter", "Chunks", "Companies");
    for theme in themes {
        header.push_str(&format!(" {:>14}", truncate_chars(theme, 11)));
    }
    println!("{}", header.dimmed());
    println!("  {}", "-".repeat(26 + 15 * themes.len()).dimmed());

    for s in summaries {
        let mut line = format!("  {:<8} {:>7} {:>9}", s.label(), s.chunks, s.companies);
        for count in &s.counts {
            line.push_str(&format!(" {:>14}", count));
        }
        println!("{line}");
    }
}
