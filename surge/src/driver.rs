//! Fixed-size worker pool issuing a set number of invocations.
use crate::invoker::invoke;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics_util::AtomicBucket;
use std::fmt::Display;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use surge_core::{LoadTestConfig, RequestOutcome, SurgeError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Raw output of one load test run, before aggregation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Outcomes in completion order. The index carries no relation to dispatch order.
    pub outcomes: Vec<RequestOutcome>,
    pub elapsed: Duration,
}

/// Issue `config.requests` invocations of `func` across `config.concurrency` workers.
///
/// The configuration is validated before anything is spawned. Individual failures never stop the
/// run; every request is attempted. Returns [SurgeError::Timeout] if `config.timeout` elapses first,
/// in which case the remaining workers are aborted.
#[instrument(name = "load_test", skip_all, fields(name = %config.name))]
pub async fn run<T, F, R, E>(func: T, config: &LoadTestConfig) -> Result<RunOutput, SurgeError>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    config.validate()?;

    info!(
        "Dispatching {} requests across {} workers",
        config.requests, config.concurrency
    );

    let total = config.requests;
    let next = Arc::new(AtomicUsize::new(0));
    let bucket = Arc::new(AtomicBucket::<RequestOutcome>::new());
    let limiter = config.tps_limit.map(|tps| Arc::new(rate_limiter(tps)));
    let name: Arc<str> = Arc::from(config.name.as_str());

    let start = Instant::now();
    let mut tasks: Vec<JoinHandle<()>> = (0..config.concurrency)
        .map(|worker| {
            let func = func.clone();
            let next = next.clone();
            let bucket = bucket.clone();
            let limiter = limiter.clone();
            let name = name.clone();

            tokio::spawn(async move {
                let mut completed = 0usize;
                loop {
                    let ticket = next.fetch_add(1, Ordering::Relaxed);
                    if ticket >= total {
                        break;
                    }

                    if let Some(limiter) = &limiter {
                        limiter.until_ready().await;
                    }

                    bucket.push(invoke(&name, &func).await);
                    completed += 1;
                }
                trace!("Worker {worker} finished after {completed} requests");
            })
        })
        .collect();

    debug!("All workers dispatched; collecting");

    let joined = match config.timeout {
        Some(timeout) => match tokio::time::timeout(timeout, join_all(&mut tasks)).await {
            Ok(res) => res,
            Err(_) => Err(SurgeError::Timeout(timeout)),
        },
        None => join_all(&mut tasks).await,
    };

    if let Err(err) = joined {
        warn!("Load test aborted: {err}");
        for handle in &tasks {
            handle.abort();
        }
        return Err(err);
    }

    let elapsed = start.elapsed();

    // Blocks drain newest first; each block is already in push order.
    let mut blocks: Vec<Vec<RequestOutcome>> = Vec::new();
    bucket.clear_with(|chunk| blocks.push(chunk.to_vec()));
    let mut outcomes = Vec::with_capacity(total);
    outcomes.extend(blocks.into_iter().rev().flatten());
    debug!("Collected {} outcomes in {elapsed:?}", outcomes.len());

    Ok(RunOutput { outcomes, elapsed })
}

async fn join_all(tasks: &mut [JoinHandle<()>]) -> Result<(), SurgeError> {
    for handle in tasks.iter_mut() {
        if let Err(err) = handle.await {
            error!("Worker task failed to join: {err}");
            return Err(SurgeError::WorkerFailed(err.to_string()));
        }
    }
    Ok(())
}

fn rate_limiter(tps_limit: NonZeroU32) -> DefaultDirectRateLimiter {
    // NOTE: Burst of one keeps the dispatch rate smooth across workers.
    RateLimiter::direct(Quota::per_second(tps_limit).allow_burst(NonZeroU32::MIN))
}
