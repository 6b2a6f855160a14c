// ThemeVocabulary — named themes and the keywords that signal them.
//
// The vocabulary spreadsheet has one column per theme: the header is the
// theme name and every non-blank cell below it is an extra keyword. The
// theme name itself always counts as a keyword.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use csv::ReaderBuilder;
use tracing::warn;

/// Suffix of the per-theme count columns in chunk pages.
pub const COUNT_SUFFIX: &str = "_keyword_count";

/// One theme and its keyword list. `keywords[0]` is the theme name.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Theme {
    /// Name of this theme's count column, e.g. `Supply_Chain_keyword_count`.
    pub fn count_column(&self) -> String {
        count_column(&self.name)
    }
}

/// Ordered, immutable-once-built collection of themes.
///
/// Keyword sets may overlap across themes; each theme counts its own hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeVocabulary {
    themes: Vec<Theme>,
}

impl ThemeVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a theme. Keywords are trimmed, blanks dropped, and repeats
    /// (ignoring case, since matching ignores case) removed keeping the
    /// first spelling.
    pub fn add_theme<I, S>(&mut self, name: &str, keywords: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Theme name cannot be blank");
        }
        if self.index_of(name).is_some() {
            anyhow::bail!("Duplicate theme '{name}' in vocabulary");
        }
        let column = count_column(name);
        if let Some(other) = self.themes.iter().find(|t| t.count_column() == column) {
            anyhow::bail!(
                "Themes '{}' and '{name}' would share the count column '{column}'",
                other.name
            );
        }

        let mut seen = HashSet::new();
        let keywords: Vec<String> = std::iter::once(name.to_string())
            .chain(keywords.into_iter().map(|k| k.as_ref().trim().to_string()))
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.to_lowercase()))
            .collect();

        self.themes.push(Theme {
            name: name.to_string(),
            keywords,
        });
        Ok(())
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Position of a theme by exact name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.themes.iter().position(|t| t.name == name)
    }

    /// Count column names in theme order.
    pub fn count_columns(&self) -> Vec<String> {
        self.themes.iter().map(Theme::count_column).collect()
    }

    /// Print the parsed vocabulary for a quick sanity check.
    pub fn display(&self) {
        println!(
            "\n{}",
            format!("=== Theme Vocabulary ({} themes) ===", self.themes.len()).bold()
        );
        println!();
        for (i, theme) in self.themes.iter().enumerate() {
            println!(
                "  {:>2}. {:<30} {}",
                i + 1,
                theme.name.bold(),
                format!("({} keywords)", theme.keywords.len()).dimmed()
            );
            println!("      Keywords: {}", theme.keywords.join(", ").dimmed());
            println!();
        }
    }
}

/// Count column name for a theme: whitespace becomes `_`, case is kept.
pub fn count_column(theme: &str) -> String {
    let base: String = theme
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{base}{COUNT_SUFFIX}")
}

/// Read a vocabulary laid out one theme per column.
pub fn read_vocabulary<R: io::Read>(reader: R, source: &str) -> Result<ThemeVocabulary> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{source}: failed to read vocabulary header"))?
        .clone();

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for row in rdr.records() {
        let row = row.with_context(|| format!("{source}: malformed vocabulary row"))?;
        for (column, cell) in columns.iter_mut().zip(row.iter()) {
            if !cell.trim().is_empty() {
                column.push(cell.to_string());
            }
        }
    }

    let mut vocab = ThemeVocabulary::new();
    for (idx, (header, keywords)) in headers.iter().zip(columns).enumerate() {
        if header.trim().is_empty() {
            warn!(column = idx + 1, "Skipping vocabulary column with blank header");
            continue;
        }
        vocab
            .add_theme(header, keywords)
            .with_context(|| format!("{source}: invalid vocabulary"))?;
    }

    if vocab.is_empty() {
        warn!(source, "Vocabulary contains no themes, every count will be zero");
    }
    Ok(vocab)
}

/// Load the vocabulary CSV from disk.
pub fn load_vocabulary(path: &Path) -> Result<ThemeVocabulary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open vocabulary file {}", path.display()))?;
    read_vocabulary(file, &path.display().to_string())
}
