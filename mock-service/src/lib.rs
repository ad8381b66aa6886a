use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
#[allow(unused)]
use metrics::{counter, gauge, histogram};
use rand_distr::{Distribution, SkewNormal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::debug;

#[derive(Clone, Default)]
struct MockState {
    fail_counter: Arc<AtomicU64>,
    limiters: Arc<RwLock<HashMap<u32, Arc<DefaultDirectRateLimiter>>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub tokens: u32,
}

pub fn router() -> Router {
    Router::new()
        .route("/delay/ms/:delay_ms", get(delay))
        .route("/fail/every/:n/delay/ms/:delay_ms", get(fail_every))
        .route("/max/:max_tps/delay/ms/:delay_ms", get(max))
        .route("/v1/completions", post(completions))
        .with_state(MockState::default())
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, router()).await
}

/// Serve on an ephemeral local port in the background and return the bound address.
pub async fn spawn() -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = run(listener).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });
    Ok(addr)
}

#[debug_handler]
async fn delay(Path(delay_ms): Path<u64>) {
    counter!("mock-service.requests").increment(1);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}

/// Every `n`-th request to this route (counted per server) fails with a 500.
#[debug_handler]
async fn fail_every(
    State(state): State<MockState>,
    Path((n, delay_ms)): Path<(u64, u64)>,
) -> Result<(), StatusCode> {
    counter!("mock-service.requests").increment(1);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    let count = state.fail_counter.fetch_add(1, Ordering::Relaxed) + 1;
    if n > 0 && count % n == 0 {
        debug!("MOCK SERVER ___ FAIL {count}");
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        Ok(())
    }
}

#[debug_handler]
async fn max(
    State(state): State<MockState>,
    Path((max_tps, delay_ms)): Path<(u32, u64)>,
) -> Result<(), StatusCode> {
    counter!("mock-service.requests").increment(1);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    let read = state
        .limiters
        .read()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .get(&max_tps)
        .cloned();
    let limiter = match read {
        Some(limiter) => limiter,
        None => {
            let limiter = Arc::new(rate_limiter(max_tps)?);
            state
                .limiters
                .write()
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
                .entry(max_tps)
                .or_insert(limiter)
                .clone()
        }
    };

    match limiter.check() {
        Ok(_) => Ok(()),
        Err(_) => {
            debug!("MOCK SERVER ___ OVER {max_tps} TPS");
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}

#[debug_handler]
async fn completions(Json(req): Json<CompletionRequest>) -> Json<CompletionResponse> {
    counter!("mock-service.requests").increment(1);

    let secs = SkewNormal::<f64>::new(0.020, 0.005, 5.)
        .map(|d| d.sample(&mut rand::thread_rng()).max(0.))
        .unwrap_or(0.020);
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;

    let tokens = req.max_tokens.unwrap_or(16);
    Json(CompletionResponse {
        text: format!("echo: {}", req.prompt),
        tokens,
    })
}

/** Utils **/

pub fn rate_limiter(tps: u32) -> Result<DefaultDirectRateLimiter, StatusCode> {
    let tps = NonZeroU32::new(tps).ok_or(StatusCode::BAD_REQUEST)?;
    Ok(RateLimiter::direct(Quota::per_second(tps)))
}
