//! Reasoning service: the `Collaborator` seam, the Gemini client and its health probe.

pub mod client;
pub mod health;

use std::future::Future;
use thiserror::Error;

pub use client::LlmClient;
pub use health::{check_health, HealthReport, HealthStatus, ServiceState};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured")]
    NotConfigured,

    #[error("LLM client not initialized")]
    NotInitialized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM response contained no text")]
    EmptyResponse,
}

impl LlmError {
    /// The service could not be reached at all (as opposed to failing a call)
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LlmError::NotConfigured | LlmError::NotInitialized)
    }

    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            LlmError::Api { status, message } => {
                let message = message.to_lowercase();
                *status == 429 || message.contains("quota") || message.contains("too many requests")
            }
            _ => false,
        }
    }
}

/// A text-completion service that answers one prompt per call
pub trait Collaborator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Credentials are present
    fn is_configured(&self) -> bool;

    /// Ready to accept calls
    fn is_initialized(&self) -> bool;
}
