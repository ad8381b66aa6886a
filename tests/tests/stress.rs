use std::time::Duration;
use surge::prelude::*;
use surge_tests::url;

#[tokio::test]
#[ntest::timeout(30_000)]
async fn stress_ramps_up() {
    let rounds = delay_10ms()
        .sample_resources(false)
        .stress(StressTestConfig {
            duration: Duration::from_secs(1),
            ramp_up: Duration::from_millis(500),
            max_concurrency: 4,
            requests_per_worker: 2,
        })
        .await
        .unwrap();

    assert!(!rounds.is_empty());
    assert_eq!(rounds[0].total_requests, 2);
    for round in &rounds {
        assert_eq!(round.total_requests % 2, 0);
        assert!(round.total_requests <= 8);
        assert_eq!(round.failed_requests, 0);
    }
}

#[scenario]
async fn delay_10ms() -> Result<(), reqwest::Error> {
    reqwest::get(url("/delay/ms/10")).await?.error_for_status()?;
    Ok(())
}
