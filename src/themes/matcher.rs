// ThemeMatcher — whole-word, case-insensitive keyword counting.
//
// Each theme compiles to a single alternation pattern over its keyword list,
// built once when the matcher is constructed and reused for every sentence.

use anyhow::{Context, Result};
use regex_lite::Regex;

use super::vocabulary::ThemeVocabulary;

/// Per-theme hit counts, indexed in vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordHits(Vec<usize>);

impl KeywordHits {
    /// All-zero counts for `themes` themes.
    pub fn zeros(themes: usize) -> Self {
        Self(vec![0; themes])
    }

    pub fn get(&self, theme: usize) -> usize {
        self.0.get(theme).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// The Thematic Term Count: hits summed across every theme.
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Element-wise accumulate another hit vector into this one.
    pub fn add(&mut self, other: &KeywordHits) {
        if self.0.len() < other.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        for (acc, n) in self.0.iter_mut().zip(&other.0) {
            *acc += n;
        }
    }
}

impl From<Vec<usize>> for KeywordHits {
    fn from(counts: Vec<usize>) -> Self {
        Self(counts)
    }
}

/// Compiled keyword patterns, one per theme.
///
/// Word boundaries and case folding are ASCII-only: `caf` matches inside
/// `café`, and `É` does not match `é`.
#[derive(Debug)]
pub struct ThemeMatcher {
    patterns: Vec<Regex>,
}

impl ThemeMatcher {
    /// Compile one pattern per theme in the vocabulary.
    pub fn new(vocab: &ThemeVocabulary) -> Result<Self> {
        let patterns = vocab
            .themes()
            .iter()
            .map(|theme| {
                let alternation = theme
                    .keywords
                    .iter()
                    .map(|k| regex_lite::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                    .with_context(|| format!("Failed to compile keywords for theme '{}'", theme.name))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn theme_count(&self) -> usize {
        self.patterns.len()
    }

    /// Count non-overlapping whole-word keyword matches per theme.
    pub fn count(&self, sentence: &str) -> KeywordHits {
        if sentence.trim().is_empty() {
            return KeywordHits::zeros(self.patterns.len());
        }
        KeywordHits(
            self.patterns
                .iter()
                .map(|p| p.find_iter(sentence).count())
                .collect(),
        )
    }
}
