use std::num::NonZeroU32;
use std::time::Duration;
use surge::prelude::*;
use surge_tests::url;

#[tokio::test]
#[ntest::timeout(30_000)]
async fn scenario_delay() {
    let metrics = delay_5ms()
        .requests(50)
        .concurrency(10)
        .await
        .unwrap();

    assert_eq!(metrics.total_requests, 50);
    assert_eq!(metrics.successful_requests, 50);
    assert_eq!(metrics.failed_requests, 0);
    assert!(metrics.min_latency_ms >= 5.);
    assert!(metrics.min_latency_ms <= metrics.p50_latency_ms);
    assert!(metrics.p50_latency_ms <= metrics.p95_latency_ms);
    assert!(metrics.p95_latency_ms <= metrics.p99_latency_ms);
    assert!(metrics.p99_latency_ms <= metrics.max_latency_ms);
    assert!(metrics.throughput_rps > 0.);
    assert!(metrics.memory_usage_mb > 0.);

    let map = metrics.to_map();
    for key in [
        "total_requests",
        "avg_latency_ms",
        "p95_latency_ms",
        "throughput_rps",
        "cpu_usage_percent",
    ] {
        assert!(map.contains_key(key), "missing {key}");
    }
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn scenario_tps_limited_stays_under_server_limit() {
    let metrics = max_40_tps()
        .requests(40)
        .concurrency(4)
        .tps(NonZeroU32::new(20).unwrap())
        .await
        .unwrap();

    assert_eq!(metrics.failed_requests, 0);
    assert!(metrics.total_duration_s >= 1.8);
    assert!(metrics.throughput_rps <= 21.);
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn scenario_overload_records_failures() {
    let metrics = max_30_tps()
        .requests(200)
        .concurrency(20)
        .sample_resources(false)
        .await
        .unwrap();

    assert_eq!(metrics.total_requests, 200);
    assert!(metrics.failed_requests > 0);
    assert!(metrics.successful_requests > 0);
    assert_eq!(
        metrics.successful_requests + metrics.failed_requests,
        metrics.total_requests
    );
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn scenario_timeout() {
    let res = delay_2s()
        .requests(4)
        .concurrency(2)
        .timeout(Duration::from_millis(200))
        .await;

    assert!(matches!(res, Err(SurgeError::Timeout(_))));
}

/* Scenario Helpers */

#[scenario]
async fn delay_5ms() -> Result<(), reqwest::Error> {
    reqwest::get(url("/delay/ms/5")).await?.error_for_status()?;
    Ok(())
}

#[scenario]
async fn delay_2s() -> Result<(), reqwest::Error> {
    reqwest::get(url("/delay/ms/2000")).await?.error_for_status()?;
    Ok(())
}

#[scenario]
async fn max_40_tps() -> Result<(), reqwest::Error> {
    reqwest::get(url("/max/40/delay/ms/1"))
        .await?
        .error_for_status()?;
    Ok(())
}

#[scenario]
async fn max_30_tps() -> anyhow::Result<()> {
    let res = reqwest::get(url("/max/30/delay/ms/1")).await?;

    if res.status().is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Status {}", res.status()))
    }
}
