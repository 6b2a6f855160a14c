// ThemeTagger — turns transcripts into keyword-annotated, size-bounded chunks.
//
// Stages, each returning a fresh sequence:
// 1. explode: split every record into sentence rows and count keyword hits
// 2. retain_context: keep hit rows plus one neighbour on either side
// 3. combine_chunks: regroup surviving rows per record under a sentence cap
// 4. drop_unmatched: discard chunks whose total count is zero

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::output::progress_bar;
use crate::pipeline::sentences::{estimate_sentence_count, split_sentences};
use crate::themes::matcher::{KeywordHits, ThemeMatcher};
use crate::themes::vocabulary::ThemeVocabulary;
use crate::transcripts::record::{RecordMeta, TranscriptRecord};

/// Default cap on sentences per combined chunk.
pub const DEFAULT_MAX_CHUNK_SENTENCES: usize = 10;

/// Which rows count as neighbours when keeping context around a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextScope {
    /// Neighbours must come from the same transcript record.
    #[default]
    WithinRecord,
    /// Any adjacent row in the exploded table, even across records.
    /// Reproduces the legacy spreadsheet output.
    Positional,
}

impl FromStr for ContextScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "record" | "within-record" => Ok(Self::WithinRecord),
            "positional" => Ok(Self::Positional),
            other => anyhow::bail!("Unknown context scope '{other}' (expected 'record' or 'positional')"),
        }
    }
}

/// Tunables for a tagging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggerSettings {
    pub max_chunk_sentences: usize,
    pub context_scope: ContextScope,
}

impl Default for TaggerSettings {
    fn default() -> Self {
        Self {
            max_chunk_sentences: DEFAULT_MAX_CHUNK_SENTENCES,
            context_scope: ContextScope::default(),
        }
    }
}

/// One sentence of one record, with its keyword hits.
#[derive(Debug, Clone)]
pub struct SentenceRow<'a> {
    /// Index of the parent record in the tagged slice.
    pub record: usize,
    pub meta: &'a RecordMeta,
    pub text: &'a str,
    pub hits: KeywordHits,
}

impl SentenceRow<'_> {
    pub fn thematic_term_count(&self) -> usize {
        self.hits.total()
    }
}

/// A run of consecutive sentences from one record with aggregated counts.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedChunk {
    pub meta: RecordMeta,
    /// Constituent sentences joined by single spaces.
    pub text: String,
    /// Sum of the estimated sentence counts of the rows in this chunk.
    pub sentence_count: usize,
    /// Number of sentence rows combined into this chunk.
    pub rows: usize,
    pub hits: KeywordHits,
}

impl CombinedChunk {
    pub fn thematic_term_count(&self) -> usize {
        self.hits.total()
    }
}

/// The tagger owns its vocabulary and the patterns compiled from it.
#[derive(Debug)]
pub struct ThemeTagger {
    vocab: ThemeVocabulary,
    matcher: ThemeMatcher,
    settings: TaggerSettings,
}

impl ThemeTagger {
    pub fn new(vocab: ThemeVocabulary, settings: TaggerSettings) -> Result<Self> {
        if settings.max_chunk_sentences == 0 {
            anyhow::bail!("Chunk sentence cap must be at least 1");
        }
        let matcher = ThemeMatcher::new(&vocab)?;
        Ok(Self {
            vocab,
            matcher,
            settings,
        })
    }

    pub fn vocabulary(&self) -> &ThemeVocabulary {
        &self.vocab
    }

    /// Split every record into sentence rows and count keyword hits.
    pub fn explode<'a>(&self, records: &'a [TranscriptRecord]) -> Vec<SentenceRow<'a>> {
        let pb = progress_bar(records.len(), "Counting");
        let mut rows = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            rows.extend(split_sentences(&record.transcript).map(|span| SentenceRow {
                record: idx,
                meta: &record.meta,
                text: span.text,
                hits: self.matcher.count(span.text),
            }));
            pb.inc(1);
        }
        pb.finish_and_clear();
        rows
    }

    /// Run every stage short of pagination.
    pub fn tag(&self, records: &[TranscriptRecord]) -> Vec<CombinedChunk> {
        let rows = self.explode(records);
        info!(
            records = records.len(),
            sentences = rows.len(),
            themes = self.vocab.len(),
            "Split transcripts into sentences"
        );

        let retained = retain_context(rows, self.settings.context_scope);
        info!(rows = retained.len(), "Kept keyword hits and their context");

        let chunks = combine_chunks(
            &retained,
            self.settings.max_chunk_sentences,
            self.vocab.len(),
        );
        let combined = chunks.len();
        let chunks = drop_unmatched(chunks);
        info!(combined, kept = chunks.len(), "Combined sentences into chunks");
        chunks
    }
}

/// Keep rows with a hit, plus the row immediately before and after each hit.
pub fn retain_context<'a>(rows: Vec<SentenceRow<'a>>, scope: ContextScope) -> Vec<SentenceRow<'a>> {
    let hit: Vec<bool> = rows.iter().map(|r| r.thematic_term_count() > 0).collect();
    let neighbour_hit = |i: usize, j: usize| {
        hit[j]
            && match scope {
                ContextScope::WithinRecord => rows[i].record == rows[j].record,
                ContextScope::Positional => true,
            }
    };

    let keep: Vec<bool> = (0..rows.len())
        .map(|i| {
            hit[i]
                || (i > 0 && neighbour_hit(i, i - 1))
                || (i + 1 < rows.len() && neighbour_hit(i, i + 1))
        })
        .collect();

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect()
}

type GroupKey<'a> = (&'a str, &'a str, (Option<NaiveDate>, String), &'a str);

fn group_key<'a>(meta: &'a RecordMeta) -> GroupKey<'a> {
    (
        meta.ticker.as_str(),
        meta.company_name.as_str(),
        meta.date_key(),
        meta.event_type.as_str(),
    )
}

/// Regroup rows by (Ticker, Company Name, Date, Event Type) and fold each
/// group into chunks of at most `max_sentences` estimated sentences.
///
/// A row is never split: one that alone exceeds the cap becomes its own
/// chunk. Groups come out ordered by their key.
pub fn combine_chunks(
    rows: &[SentenceRow<'_>],
    max_sentences: usize,
    themes: usize,
) -> Vec<CombinedChunk> {
    let mut groups: BTreeMap<GroupKey<'_>, Vec<&SentenceRow<'_>>> = BTreeMap::new();
    for row in rows {
        groups.entry(group_key(row.meta)).or_default().push(row);
    }

    let mut chunks = Vec::new();
    for group in groups.values() {
        let mut builder = ChunkBuilder::new(themes);
        for row in group {
            let weight = estimate_sentence_count(row.text);
            if !builder.is_empty() && builder.sentence_count + weight > max_sentences {
                chunks.extend(builder.finish(row.meta));
                builder = ChunkBuilder::new(themes);
            }
            builder.push(row, weight);
        }
        if let Some(row) = group.last() {
            chunks.extend(builder.finish(row.meta));
        }
    }
    chunks
}

/// Drop chunks with no keyword hits at all.
pub fn drop_unmatched(chunks: Vec<CombinedChunk>) -> Vec<CombinedChunk> {
    chunks
        .into_iter()
        .filter(|c| c.thematic_term_count() > 0)
        .collect()
}

struct ChunkBuilder<'a> {
    parts: Vec<&'a str>,
    sentence_count: usize,
    hits: KeywordHits,
}

impl<'a> ChunkBuilder<'a> {
    fn new(themes: usize) -> Self {
        Self {
            parts: Vec::new(),
            sentence_count: 0,
            hits: KeywordHits::zeros(themes),
        }
    }

    fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn push(&mut self, row: &SentenceRow<'a>, weight: usize) {
        self.parts.push(row.text);
        self.sentence_count += weight;
        self.hits.add(&row.hits);
    }

    fn finish(self, meta: &RecordMeta) -> Option<CombinedChunk> {
        if self.is_empty() {
            return None;
        }
        Some(CombinedChunk {
            meta: meta.clone(),
            text: self.parts.join(" ").trim().to_string(),
            sentence_count: self.sentence_count,
            rows: self.parts.len(),
            hits: self.hits,
        })
    }
}
