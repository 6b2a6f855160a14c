// Pipelines: sentence splitting, theme tagging, pagination, and the batch
// runs built on them.

pub mod annotate;
pub mod paginate;
pub mod sentences;
pub mod tag;
pub mod tagger;
