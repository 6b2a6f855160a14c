use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use themetag::annotate::budget::CostModel;
use themetag::annotate::openai::OpenAiAnnotator;
use themetag::config::Config;
use themetag::output::pages::read_pages;
use themetag::output::terminal;
use themetag::pipeline::annotate::{save_annotations, AnnotateOptions};
use themetag::pipeline::tag::TagOptions;

/// Themetag: thematic keyword tagging for earnings-call transcripts.
///
/// Finds where companies talk about the themes you track, keeps the
/// surrounding context, and packages it into chunks ready for counting,
/// charting, or LLM annotation.
#[derive(Parser)]
#[command(name = "themetag", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag transcripts with theme keyword counts and write chunk pages
    Tag {
        /// Transcript CSV files (e.g. one per year), read in order
        #[arg(long, num_args = 1.., required = true)]
        transcripts: Vec<PathBuf>,

        /// Theme vocabulary CSV (one column per theme)
        #[arg(long)]
        vocab: PathBuf,

        /// Output path prefix; pages are written as <prefix>_part<N>.csv
        #[arg(long)]
        output_prefix: Option<String>,

        /// Max sentences per combined chunk (default: 10)
        #[arg(long)]
        max_chunk_sentences: Option<usize>,

        /// Max data rows per output page
        #[arg(long)]
        page_rows: Option<usize>,

        /// Context neighbours: "record" (same transcript) or "positional"
        #[arg(long)]
        context_scope: Option<String>,
    },

    /// Annotate chunks for one theme with subthemes and sentiment via an LLM
    Annotate {
        /// Chunk page CSVs written by `tag`
        #[arg(long, num_args = 1.., required = true)]
        pages: Vec<PathBuf>,

        /// Where to write the annotated CSV
        #[arg(long)]
        output: PathBuf,

        /// Theme name (default: the first theme in the pages)
        #[arg(long)]
        theme: Option<String>,

        /// Budget cap in USD (default: 50)
        #[arg(long)]
        max_cost: Option<f64>,

        /// Only annotate the first N matching chunks
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Sum theme mentions by reporting quarter
    Summarize {
        /// Chunk page CSVs written by `tag`
        #[arg(long, num_args = 1.., required = true)]
        pages: Vec<PathBuf>,

        /// Also write the table as CSV
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the parsed theme vocabulary
    Vocab {
        /// Theme vocabulary CSV
        #[arg(long)]
        vocab: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("themetag=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tag {
            transcripts,
            vocab,
            output_prefix,
            max_chunk_sentences,
            page_rows,
            context_scope,
        } => {
            let mut config = Config::load()?;
            if let Some(prefix) = output_prefix {
                config.output_prefix = prefix;
            }
            if let Some(n) = max_chunk_sentences {
                config.max_chunk_sentences = n;
            }
            if let Some(n) = page_rows {
                config.page_rows = n;
            }
            if let Some(scope) = context_scope {
                config.context_scope = scope.parse()?;
            }
            config.validate()?;

            info!(
                files = transcripts.len(),
                max_chunk_sentences = config.max_chunk_sentences,
                context_scope = ?config.context_scope,
                "Tagging transcripts"
            );
            println!("Tagging {} transcript file(s)...", transcripts.len());

            let options = TagOptions {
                transcripts,
                vocab,
                output_prefix: config.output_prefix.clone(),
                settings: config.tagger_settings(),
                page_rows: config.page_rows,
            };
            let report = themetag::pipeline::tag::run(&options)?;

            terminal::display_tag_report(&report);
            println!("\n{}", "Tagging complete.".bold());
        }

        Commands::Annotate {
            pages,
            output,
            theme,
            max_cost,
            limit,
        } => {
            let mut config = Config::load()?;
            if let Some(cap) = max_cost {
                config.max_cost = cap;
            }
            config.validate()?;
            config.require_llm()?;

            let table = read_pages(&pages)?;
            println!(
                "Loaded {} chunks across {} theme(s).",
                table.rows.len(),
                table.count_columns.len()
            );

            let annotator = OpenAiAnnotator::new(
                &config.llm_url,
                config.llm_api_key.clone(),
                config.llm_model.clone(),
                config.llm_requests_per_second,
            );
            let options = AnnotateOptions {
                theme,
                max_cost: config.max_cost,
                cost_model: CostModel::default(),
                limit,
            };

            let run = themetag::pipeline::annotate::run(&annotator, &table, &options).await?;
            save_annotations(&output, &run)?;

            terminal::display_annotation_run(&run);
            println!(
                "\n{}",
                format!("Annotations saved to: {}", output.display()).bold()
            );
        }

        Commands::Summarize { pages, output } => {
            let table = read_pages(&pages)?;
            let summaries = themetag::summary::summarize(&table);
            terminal::display_summary(&table.themes(), &summaries);

            if let Some(path) = output {
                themetag::summary::save_summary(&path, &table.count_columns, &summaries)?;
                println!(
                    "\n{}",
                    format!("Summary saved to: {}", path.display()).bold()
                );
            }
        }

        Commands::Vocab { vocab } => {
            let vocab = themetag::themes::vocabulary::load_vocabulary(&vocab)?;
            vocab.display();
        }
    }

    Ok(())
}
