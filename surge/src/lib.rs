#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod driver;
pub mod invoker;
pub mod resources;
pub mod stress;

pub use load_test::{ConfigurableLoadTest, LoadTest};
pub use stress::StressTest;
pub use surge_core::{
    percentile, InvocationResult, LoadTestConfig, PerformanceMetrics, RequestOutcome,
    ResourceUsage, StressTestConfig, SurgeError, DEFAULT_CONCURRENCY, DEFAULT_REQUESTS,
};
pub use surge_macros::scenario;

pub mod prelude {
    pub use crate::load_test::{ConfigurableLoadTest, LoadTest};
    pub use surge_core::{
        InvocationResult, LoadTestConfig, PerformanceMetrics, RequestOutcome, StressTestConfig,
        SurgeError,
    };
    pub use surge_macros::scenario;
}
