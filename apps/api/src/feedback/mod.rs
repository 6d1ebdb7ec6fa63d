//! Transcript-to-feedback pipeline: flatten the transcript, score it with
//! the model against a fixed category schema, persist the result.

pub mod generate;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod transcript;
