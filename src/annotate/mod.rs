// Thematic annotation — subthemes, sentiment and reasoning from an LLM.
//
// The classifier is an external black box: text in, a small JSON object
// out. Everything behind the Annotator trait can be swapped without
// touching the batch run in `pipeline::annotate`.

pub mod budget;
pub mod openai;
pub mod rate_limiter;
pub mod traits;
