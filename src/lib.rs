// Themetag: thematic keyword tagging for earnings-call transcripts
//
// This is the library root. Each module corresponds to a stage of the
// transcript -> thematic mention workflow.

pub mod annotate;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod summary;
pub mod themes;
pub mod transcripts;
