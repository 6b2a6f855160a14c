// Transcript records — loading from tabular input and deduplication.

pub mod dedup;
pub mod record;
