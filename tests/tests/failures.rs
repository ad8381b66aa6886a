use surge::prelude::*;
use surge_tests::init_tracing;

#[tokio::test]
#[ntest::timeout(30_000)]
async fn every_other_request_fails() {
    init_tracing();
    let addr = mock_service::spawn().await.unwrap();
    let url = format!("http://{addr}/fail/every/2/delay/ms/1");

    let metrics = LoadTest::new("every_other", move || {
        let url = url.clone();
        async move {
            reqwest::get(url).await?.error_for_status()?;
            Ok::<_, reqwest::Error>(())
        }
    })
    .requests(10)
    .concurrency(3)
    .await
    .unwrap();

    assert_eq!(metrics.total_requests, 10);
    assert_eq!(metrics.failed_requests, 5);
    assert_eq!(metrics.successful_requests, 5);
    assert!(metrics.avg_latency_ms > 0.);
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn all_requests_fail() {
    init_tracing();
    let addr = mock_service::spawn().await.unwrap();
    let url = format!("http://{addr}/fail/every/1/delay/ms/1");

    let metrics = LoadTest::new("all_fail", move || {
        let url = url.clone();
        async move {
            reqwest::get(url).await?.error_for_status()?;
            Ok::<_, reqwest::Error>(())
        }
    })
    .requests(10)
    .concurrency(10)
    .await
    .unwrap();

    assert_eq!(metrics.successful_requests, 0);
    assert_eq!(metrics.failed_requests, 10);
    assert_eq!(metrics.avg_latency_ms, 0.);
    assert_eq!(metrics.min_latency_ms, 0.);
    assert_eq!(metrics.max_latency_ms, 0.);
    assert_eq!(metrics.p50_latency_ms, 0.);
    assert!(metrics.throughput_rps > 0.);
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn unreachable_endpoint_is_a_failure_not_an_error() {
    init_tracing();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = format!("http://{addr}/delay/ms/1");

    let metrics = LoadTest::new("unreachable", move || {
        let url = url.clone();
        async move { reqwest::get(url).await.map(|_| ()) }
    })
    .requests(3)
    .concurrency(1)
    .await
    .unwrap();

    assert_eq!(metrics.failed_requests, 3);
}
