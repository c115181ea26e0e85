//! Query orchestration: prompt composition, the single collaborator call and reply
//! normalization.

pub mod engine;
pub mod prompt;
pub mod reply;
pub mod types;

use thiserror::Error;

use crate::llm::LlmError;

pub use engine::SearchEngine;
pub use reply::parse_reply;
pub use types::*;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please provide a valid search query")]
    EmptyQuery,

    #[error("LLM returned invalid response format: {0}")]
    MalformedReply(String),

    #[error(transparent)]
    Collaborator(#[from] LlmError),
}
