use crate::{
    SurgeError, DEFAULT_CONCURRENCY, DEFAULT_REQUESTS, DEFAULT_REQUESTS_PER_WORKER,
    DEFAULT_STRESS_DURATION, DEFAULT_STRESS_MAX_CONCURRENCY, DEFAULT_STRESS_RAMP_UP,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::num::NonZeroU32;
use std::time::Duration;

/// Parameters of a single load test run.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoadTestConfig {
    pub name: String,
    pub requests: usize,
    pub concurrency: usize,
    pub tps_limit: Option<NonZeroU32>,
    #[serde_as(as = "Option<DurationSeconds>")]
    pub timeout: Option<Duration>,
    pub sample_resources: bool,
}

impl LoadTestConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Reject configurations which cannot be dispatched. Nothing runs when this fails.
    pub fn validate(&self) -> Result<(), SurgeError> {
        if self.requests < 1 {
            return Err(SurgeError::InvalidConfig(
                "request count must be at least 1".to_string(),
            ));
        }

        if self.concurrency < 1 {
            return Err(SurgeError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        if self.concurrency > self.requests {
            return Err(SurgeError::InvalidConfig(format!(
                "concurrency ({}) cannot exceed request count ({})",
                self.concurrency, self.requests
            )));
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(SurgeError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            name: "load_test".to_string(),
            requests: DEFAULT_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
            tps_limit: None,
            timeout: None,
            sample_resources: true,
        }
    }
}

/// Parameters of a ramping stress test.
///
/// A stress test repeats load tests until `duration` has elapsed. During the first `ramp_up`
/// the concurrency grows linearly up to `max_concurrency`; each round issues
/// `concurrency * requests_per_worker` requests.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StressTestConfig {
    #[serde_as(as = "DurationSeconds")]
    pub duration: Duration,
    #[serde_as(as = "DurationSeconds")]
    pub ramp_up: Duration,
    pub max_concurrency: usize,
    pub requests_per_worker: usize,
}

impl StressTestConfig {
    pub fn validate(&self) -> Result<(), SurgeError> {
        if self.duration.is_zero() {
            return Err(SurgeError::InvalidConfig(
                "stress duration must be greater than zero".to_string(),
            ));
        }

        if self.max_concurrency < 1 {
            return Err(SurgeError::InvalidConfig(
                "max concurrency must be at least 1".to_string(),
            ));
        }

        if self.requests_per_worker < 1 {
            return Err(SurgeError::InvalidConfig(
                "requests per worker must be at least 1".to_string(),
            ));
        }

        // Round sizes never exceed this product, so bounding it here bounds every round.
        if self
            .max_concurrency
            .checked_mul(self.requests_per_worker)
            .is_none()
        {
            return Err(SurgeError::InvalidConfig(format!(
                "max concurrency ({}) times requests per worker ({}) overflows",
                self.max_concurrency, self.requests_per_worker
            )));
        }

        Ok(())
    }

    /// Concurrency for a round starting `elapsed` into the test.
    pub fn concurrency_at(&self, elapsed: Duration) -> usize {
        let concurrency = if elapsed < self.ramp_up {
            let progress = elapsed.as_secs_f64() / self.ramp_up.as_secs_f64();
            (progress * self.max_concurrency as f64) as usize
        } else {
            self.max_concurrency
        };

        concurrency.max(1)
    }
}

impl Default for StressTestConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_STRESS_DURATION,
            ramp_up: DEFAULT_STRESS_RAMP_UP,
            max_concurrency: DEFAULT_STRESS_MAX_CONCURRENCY,
            requests_per_worker: DEFAULT_REQUESTS_PER_WORKER,
        }
    }
}
