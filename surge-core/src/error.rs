use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurgeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Load test did not finish within {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}
