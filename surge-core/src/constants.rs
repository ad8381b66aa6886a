use std::time::Duration;

/// Number of requests issued when none is configured.
pub const DEFAULT_REQUESTS: usize = 100;

/// Number of concurrent workers used when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default total duration of a stress test.
pub const DEFAULT_STRESS_DURATION: Duration = Duration::from_secs(60);

/// Default ramp-up window of a stress test.
pub const DEFAULT_STRESS_RAMP_UP: Duration = Duration::from_secs(10);

/// Default peak concurrency of a stress test.
pub const DEFAULT_STRESS_MAX_CONCURRENCY: usize = 50;

/// Requests issued per worker in each stress round.
pub const DEFAULT_REQUESTS_PER_WORKER: usize = 10;
