// OpenAI-compatible chat-completions annotator.
//
// Works against any endpoint that speaks the `/chat/completions` shape.
// The model is asked for strict JSON; replies are trimmed to the outermost
// braces before parsing since models like to wrap JSON in prose.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::{Annotation, Annotator};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Low temperature keeps tags consistent across rows.
const TEMPERATURE: f64 = 0.2;

pub struct OpenAiAnnotator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    rate_limiter: RateLimiter,
}

impl OpenAiAnnotator {
    pub fn new(base_url: &str, api_key: String, model: String, requests_per_second: f64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            rate_limiter: RateLimiter::new(requests_per_second),
        }
    }
}

#[async_trait]
impl Annotator for OpenAiAnnotator {
    async fn annotate(&self, text: &str, theme: &str) -> Result<Annotation> {
        self.rate_limiter.acquire().await;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(text, theme),
            }],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call chat-completions endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat-completions endpoint returned {}: {}", status, body);
        }

        let reply: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat-completions response")?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("Chat-completions response had no choices")?;

        debug!(theme, chars = content.len(), "Received annotation");
        parse_annotation(&content)
    }
}

/// The instruction sent for each excerpt.
pub fn build_prompt(text: &str, theme: &str) -> String {
    format!(
        "You are a professional equity strategist analyzing earnings call transcripts for thematic trends.\n\
         \n\
         Your task is to identify:\n\
         1. Subthemes (1-3): short, specific concepts within the theme of {theme}.\n\
         2. Sentiment: classified on a +1 to -1 scale, decimals allowed.\n\
         3. Reasoning: a brief explanation of why that sentiment was chosen.\n\
         \n\
         Requirements:\n\
         - Respond ONLY in valid JSON format.\n\
         - Use precise phrases (e.g., [\"Cost Reduction\", \"Internal GenAI Tools\"]).\n\
         - Avoid generic labels like \"AI\" or \"Strategy\".\n\
         \n\
         Here is the text to analyze: {text}\n\
         \n\
         Respond only in this JSON format:\n\
         {{\"subthemes\": [...], \"sentiment\": \"...\", \"reasoning\": \"...\"}}"
    )
}

/// Parse a model reply into an annotation.
///
/// Accepts subthemes as a list or a comma-separated string, and sentiment
/// as a number or a string. Missing fields come back empty.
pub fn parse_annotation(content: &str) -> Result<Annotation> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => anyhow::bail!("Reply contained no JSON object: {}", content.trim()),
    };

    let raw: RawAnnotation =
        serde_json::from_str(json).context("Reply was not a valid annotation object")?;

    let subthemes = match raw.subthemes {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        Value::Null => Vec::new(),
        other => anyhow::bail!("Unexpected subthemes value: {other}"),
    };

    Ok(Annotation {
        subthemes,
        sentiment: scalar_text(raw.sentiment),
        reasoning: scalar_text(raw.reasoning),
    })
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

// --- chat-completions request/response types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct RawAnnotation {
    #[serde(default)]
    subthemes: Value,
    #[serde(default)]
    sentiment: Value,
    #[serde(default)]
    reasoning: Value,
}
