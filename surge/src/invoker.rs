//! Single invocation of the unit of work.
use futures_util::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use surge_core::RequestOutcome;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, trace, warn};

/// Run `func` once and record how long it took and whether it succeeded.
///
/// An `Err` or a panic from the unit of work becomes a failed [RequestOutcome]; neither escapes
/// this function. `name` labels the emitted metrics.
pub async fn invoke<T, F, R, E>(name: &str, func: &T) -> RequestOutcome
where
    T: Fn() -> F,
    F: Future<Output = Result<R, E>>,
    E: Display,
{
    let start = Instant::now();
    let res = AssertUnwindSafe(async { func().await })
        .catch_unwind()
        .await;
    let elapsed = start.elapsed();

    let outcome = match res {
        Ok(Ok(_)) => RequestOutcome::success(elapsed),
        Ok(Err(err)) => RequestOutcome::failure(elapsed, err.to_string()),
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            warn!("Unit of work panicked: {msg}");
            RequestOutcome::failure(elapsed, format!("panicked: {msg}"))
        }
    };

    #[cfg(feature = "metrics")]
    record(name, &outcome);
    #[cfg(not(feature = "metrics"))]
    let _ = name;

    outcome
}

#[cfg(feature = "metrics")]
fn record(name: &str, outcome: &RequestOutcome) {
    metrics::histogram!("surge_latency", "load_test" => name.to_string())
        .record(outcome.latency().as_secs_f64());

    if outcome.is_success() {
        metrics::counter!("surge_success", "load_test" => name.to_string()).increment(1);
    } else {
        metrics::counter!("surge_error", "load_test" => name.to_string()).increment(1);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
