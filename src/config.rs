use std::env;
use std::str::FromStr;

use anyhow::Result;

use crate::annotate::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::pipeline::paginate::DEFAULT_PAGE_ROWS;
use crate::pipeline::tagger::{ContextScope, TaggerSettings, DEFAULT_MAX_CHUNK_SENTENCES};

pub const DEFAULT_OUTPUT_PREFIX: &str = "output/RAW Thematic Mentions";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override individual values per run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Sentence cap per combined chunk (THEMETAG_MAX_CHUNK_SENTENCES)
    pub max_chunk_sentences: usize,
    /// Data rows per output page (THEMETAG_PAGE_ROWS)
    pub page_rows: usize,
    /// Neighbour scope for the context filter (THEMETAG_CONTEXT_SCOPE)
    pub context_scope: ContextScope,
    /// Output page path prefix (THEMETAG_OUTPUT_PREFIX)
    pub output_prefix: String,
    /// API key for the annotation endpoint. Only `annotate` needs it.
    pub llm_api_key: String,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_requests_per_second: f64,
    /// Annotation budget cap in USD
    pub max_cost: f64,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset keys take defaults;
    /// set-but-invalid values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            max_chunk_sentences: parse_or(
                &lookup,
                "THEMETAG_MAX_CHUNK_SENTENCES",
                DEFAULT_MAX_CHUNK_SENTENCES,
            )?,
            page_rows: parse_or(&lookup, "THEMETAG_PAGE_ROWS", DEFAULT_PAGE_ROWS)?,
            context_scope: parse_or(&lookup, "THEMETAG_CONTEXT_SCOPE", ContextScope::default())?,
            output_prefix: lookup("THEMETAG_OUTPUT_PREFIX")
                .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
            llm_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            llm_url: lookup("THEMETAG_LLM_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_model: lookup("THEMETAG_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_requests_per_second: parse_or(&lookup, "THEMETAG_LLM_RPS", 1.0)?,
            max_cost: parse_or(&lookup, "THEMETAG_MAX_COST", 50.0)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Called after CLI overrides are applied too.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_sentences == 0 {
            anyhow::bail!("THEMETAG_MAX_CHUNK_SENTENCES must be at least 1");
        }
        if self.page_rows == 0 {
            anyhow::bail!("THEMETAG_PAGE_ROWS must be at least 1");
        }
        if self.llm_requests_per_second.is_nan() || self.llm_requests_per_second <= 0.0 {
            anyhow::bail!("THEMETAG_LLM_RPS must be greater than 0");
        }
        if self.max_cost.is_nan() || self.max_cost < 0.0 {
            anyhow::bail!("THEMETAG_MAX_COST cannot be negative");
        }
        Ok(())
    }

    pub fn tagger_settings(&self) -> TaggerSettings {
        TaggerSettings {
            max_chunk_sentences: self.max_chunk_sentences,
            context_scope: self.context_scope,
        }
    }

    /// Check that the annotation endpoint is usable.
    /// Call this before any operation that sends text to the LLM.
    pub fn require_llm(&self) -> Result<()> {
        if self.llm_api_key.is_empty() {
            anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}: invalid value '{raw}': {e}")),
    }
}
