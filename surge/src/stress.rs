//! Ramping stress test built from repeated load tests
use crate::load_test::run_load_test;
use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use surge_core::{LoadTestConfig, PerformanceMetrics, StressTestConfig, SurgeError};
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

pub type StressTestResult = Result<Vec<PerformanceMetrics>, SurgeError>;

/// Stress test structure
///
/// Created from a load test with [crate::ConfigurableLoadTest::stress]. Awaiting it yields one
/// [PerformanceMetrics] per round.
#[pin_project::pin_project]
pub struct StressTest<T> {
    func: T,
    runner_fut: Option<Pin<Box<dyn Future<Output = StressTestResult> + Send>>>,
    base: LoadTestConfig,
    config: StressTestConfig,
}

impl<T> StressTest<T> {
    pub(crate) fn new(func: T, base: LoadTestConfig, config: StressTestConfig) -> Self {
        Self {
            func,
            runner_fut: None,
            base,
            config,
        }
    }
}

impl<T, F, R, E> Future for StressTest<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    type Output = StressTestResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let func = self.func.clone();
            let base = self.base.clone();
            let config = self.config.clone();
            self.runner_fut = Some(Box::pin(async move {
                run_stress_test(func, base, config).await
            }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

#[instrument(name = "stress_test", skip_all, fields(name = %base.name))]
async fn run_stress_test<T, F, R, E>(
    func: T,
    base: LoadTestConfig,
    config: StressTestConfig,
) -> StressTestResult
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    config.validate()?;
    info!("Running stress test with config {:?}", &config);

    let start = Instant::now();
    let mut rounds = vec![];
    loop {
        let elapsed = start.elapsed();
        if elapsed >= config.duration {
            break;
        }

        let concurrency = config.concurrency_at(elapsed);
        let round = LoadTestConfig {
            requests: concurrency * config.requests_per_worker,
            concurrency,
            ..base.clone()
        };
        debug!("Round {} at concurrency {concurrency}", rounds.len());

        rounds.push(run_load_test(func.clone(), round).await?);
    }

    info!("Stress test complete after {} rounds", rounds.len());
    Ok(rounds)
}
