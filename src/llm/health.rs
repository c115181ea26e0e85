use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{Collaborator, LlmError};

const PROBE_PROMPT: &str = "Respond with just the word \"OK\" if you can understand this message.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    NoCredentials,
    NotInitialized,
    InvalidCredentials,
    QuotaExceeded,
    NetworkError,
    UnexpectedResponse,
}

impl HealthStatus {
    /// Fixed user-facing status line
    pub fn message(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "LLM is working normally",
            HealthStatus::NoCredentials => "SYSTEM DOWN - No API key configured",
            HealthStatus::NotInitialized => "SYSTEM DOWN - LLM not initialized",
            HealthStatus::InvalidCredentials => "SYSTEM DOWN - Invalid or expired API key",
            HealthStatus::QuotaExceeded => "SYSTEM DOWN - API quota exceeded",
            HealthStatus::NetworkError => "SYSTEM DOWN - Network connectivity issues",
            HealthStatus::UnexpectedResponse => "SYSTEM DOWN - LLM malfunction",
        }
    }

    pub fn service_state(&self) -> ServiceState {
        match self {
            HealthStatus::Healthy => ServiceState::Up,
            _ => ServiceState::Down,
        }
    }

    /// Categorize a failed probe call
    pub fn from_error(error: &LlmError) -> Self {
        match error {
            LlmError::NotConfigured => HealthStatus::NoCredentials,
            LlmError::NotInitialized => HealthStatus::NotInitialized,
            LlmError::Network(_) | LlmError::Timeout(_) => HealthStatus::NetworkError,
            e if e.is_quota_exceeded() => HealthStatus::QuotaExceeded,
            LlmError::Api { status, message } => {
                if matches!(status, 401 | 403) || message.to_lowercase().contains("api key") {
                    HealthStatus::InvalidCredentials
                } else {
                    HealthStatus::UnexpectedResponse
                }
            }
            LlmError::EmptyResponse => HealthStatus::UnexpectedResponse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceState {
    Up,
    Down,
}

/// Result of probing the reasoning service
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub available: bool,
    pub credentials_configured: bool,
    pub initialized: bool,
    pub last_checked: DateTime<Utc>,
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
    pub message: String,
    pub service_state: ServiceState,
}

impl HealthReport {
    fn new(status: HealthStatus, collaborator: &impl Collaborator) -> Self {
        HealthReport {
            status,
            available: status == HealthStatus::Healthy,
            credentials_configured: collaborator.is_configured(),
            initialized: collaborator.is_initialized(),
            last_checked: Utc::now(),
            response_time_ms: None,
            error: None,
            message: status.message().to_string(),
            service_state: status.service_state(),
        }
    }
}

/// Probe the service with a tiny prompt and classify the outcome
pub async fn check_health<C: Collaborator>(collaborator: &C) -> HealthReport {
    if !collaborator.is_configured() {
        let mut report = HealthReport::new(HealthStatus::NoCredentials, collaborator);
        report.error = Some("No API key configured".to_string());
        return report;
    }

    if !collaborator.is_initialized() {
        let mut report = HealthReport::new(HealthStatus::NotInitialized, collaborator);
        report.error = Some("LLM client not initialized".to_string());
        return report;
    }

    let started = Instant::now();
    let outcome = collaborator.generate(PROBE_PROMPT).await;
    let elapsed = started.elapsed().as_millis() as u64;

    let report = match outcome {
        Ok(reply) if reply.to_lowercase().contains("ok") => {
            HealthReport::new(HealthStatus::Healthy, collaborator)
        }
        Ok(_) => {
            let mut report = HealthReport::new(HealthStatus::UnexpectedResponse, collaborator);
            report.error = Some("LLM responded but with unexpected content".to_string());
            report
        }
        Err(e) => {
            let mut report = HealthReport::new(HealthStatus::from_error(&e), collaborator);
            report.error = Some(e.to_string());
            report
        }
    };

    log::info!("LLM health check: {:?} in {}ms", report.status, elapsed);
    HealthReport {
        response_time_ms: Some(elapsed),
        ..report
    }
}
