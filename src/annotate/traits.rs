// Annotator trait — the seam between the batch run and the classifier.

use anyhow::Result;
use async_trait::async_trait;

/// Sentiment value recorded when a row could not be annotated.
pub const ERROR_SENTIMENT: &str = "Error";

/// What the classifier says about one chunk of transcript.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotation {
    /// 1 to 3 short, specific concepts within the theme.
    pub subthemes: Vec<String>,
    /// Tone on a -1 to +1 scale, kept as text since models answer
    /// with either numbers or strings.
    pub sentiment: String,
    /// One-line justification for the sentiment.
    pub reasoning: String,
}

impl Annotation {
    /// Sentinel for a failed row: no subthemes, `Error` sentiment, and the
    /// error text as the reasoning.
    pub fn failed(error: &anyhow::Error) -> Self {
        Self {
            subthemes: Vec::new(),
            sentiment: ERROR_SENTIMENT.to_string(),
            reasoning: format!("{error:#}"),
        }
    }

    pub fn is_error(&self) -> bool {
        self.sentiment == ERROR_SENTIMENT
    }
}

/// Classifies transcript excerpts within a theme. Async because every
/// real implementation is an HTTP call.
#[async_trait]
pub trait Annotator: Send + Sync {
    async fn annotate(&self, text: &str, theme: &str) -> Result<Annotation>;
}
