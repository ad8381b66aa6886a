use std::time::Duration;

/// Whether a single invocation of the unit of work succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResult {
    Success,
    Failure(String),
}

/// The recorded result of one invocation.
///
/// Created once by the invoker and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    latency: Duration,
    result: InvocationResult,
}

impl RequestOutcome {
    pub fn success(latency: Duration) -> Self {
        Self {
            latency,
            result: InvocationResult::Success,
        }
    }

    pub fn failure(latency: Duration, error: impl Into<String>) -> Self {
        Self {
            latency,
            result: InvocationResult::Failure(error.into()),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency.as_nanos() as f64 / 1e6
    }

    pub fn result(&self) -> &InvocationResult {
        &self.result
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, InvocationResult::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.result {
            InvocationResult::Success => None,
            InvocationResult::Failure(err) => Some(err),
        }
    }
}
