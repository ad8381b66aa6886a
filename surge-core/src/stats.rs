use crate::RequestOutcome;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, trace};

/// Point-in-time process resource usage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceUsage {
    pub cpu_usage_percent: f64,
    pub memory_usage_mb: f64,
}

/// Summary statistics for a single load test run.
///
/// Latency statistics only consider successful requests. When no request succeeded, every latency
/// field is `0.0`. Throughput counts every request, successful or not.
///
/// Serializes as a flat object with floats rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    #[serde(serialize_with = "round2")]
    pub avg_latency_ms: f64,
    #[serde(serialize_with = "round2")]
    pub min_latency_ms: f64,
    #[serde(serialize_with = "round2")]
    pub max_latency_ms: f64,
    #[serde(serialize_with = "round2")]
    pub p50_latency_ms: f64,
    #[serde(serialize_with = "round2")]
    pub p95_latency_ms: f64,
    #[serde(serialize_with = "round2")]
    pub p99_latency_ms: f64,
    #[serde(serialize_with = "round2")]
    pub throughput_rps: f64,
    #[serde(serialize_with = "round2")]
    pub total_duration_s: f64,
    #[serde(serialize_with = "round2")]
    pub cpu_usage_percent: f64,
    #[serde(serialize_with = "round2")]
    pub memory_usage_mb: f64,
}

impl PerformanceMetrics {
    pub fn from_outcomes(
        outcomes: &[RequestOutcome],
        elapsed: Duration,
        resources: ResourceUsage,
    ) -> Self {
        let mut latencies: Vec<f64> = outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(RequestOutcome::latency_ms)
            .collect();
        latencies.sort_by(f64::total_cmp);

        let total_requests = outcomes.len() as u64;
        let successful_requests = latencies.len() as u64;
        let failed_requests = total_requests - successful_requests;
        let total_duration_s = elapsed.as_secs_f64();

        let throughput_rps = if total_duration_s > 0. {
            total_requests as f64 / total_duration_s
        } else {
            0.
        };

        let (avg, min, max) = if latencies.is_empty() {
            debug!("No successful requests; reporting zero latencies.");
            (0., 0., 0.)
        } else {
            (
                statistical::mean(&latencies),
                latencies[0],
                latencies[latencies.len() - 1],
            )
        };

        Self {
            total_requests,
            successful_requests,
            failed_requests,
            avg_latency_ms: avg,
            min_latency_ms: min,
            max_latency_ms: max,
            p50_latency_ms: percentile(&latencies, 50.),
            p95_latency_ms: percentile(&latencies, 95.),
            p99_latency_ms: percentile(&latencies, 99.),
            throughput_rps,
            total_duration_s,
            cpu_usage_percent: resources.cpu_usage_percent,
            memory_usage_mb: resources.memory_usage_mb,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.
        } else {
            self.failed_requests as f64 / self.total_requests as f64
        }
    }

    /// Flat key/value view used by report renderers.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            other => {
                error!("Unexpected metrics serialization: {other:?}");
                Map::new()
            }
        }
    }
}

impl fmt::Display for PerformanceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = Duration::from_millis((self.total_duration_s * 1_000.) as u64);
        write!(
            f,
            "Requests={}/{}, TPS={:.2}, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, elapsed={}",
            self.successful_requests,
            self.total_requests,
            self.throughput_rps,
            self.p50_latency_ms,
            self.p95_latency_ms,
            self.p99_latency_ms,
            humantime::format_duration(elapsed),
        )
    }
}

/// Nearest-rank percentile over an ascending slice. Returns `0.0` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.;
    }

    let rank = (p * sorted.len() as f64 / 100.).ceil() as usize;
    let idx = rank.clamp(1, sorted.len()) - 1;
    sorted[idx]
}

fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.).round() / 100.)
}
