// [libs/infra/ratelimit/tests/sliding_window.rs]

use paygate_infra_ratelimit::SlidingWindowRateLimiter;
use testcontainers_modules::redis::Redis;
use testcontainers_modules::testcontainers::runners::AsyncRunner;

// Invariant 8: across any window, admitted requests for one identifier
// never exceed max_requests.
#[tokio::test]
async fn admits_at_most_max_requests_within_the_window() {
    let container = Redis::default().start().await.expect("failed to start redis");
    let port = container
        .get_host_port_ipv4(6379)
        .await
        .expect("failed to map redis port");
    let url = format!("redis://127.0.0.1:{port}");

    let limiter = SlidingWindowRateLimiter::connect(&url, 3, 60, "test:ratelimit:")
        .await
        .expect("failed to connect to test redis");

    let mut admitted = 0;
    let mut denied = 0;
    for _ in 0..5 {
        let (allowed, _remaining) = limiter.is_allowed("caller-1").await.unwrap();
        if allowed {
            admitted += 1;
        } else {
            denied += 1;
        }
    }

    assert_eq!(admitted, 3);
    assert_eq!(denied, 2);
}

#[tokio::test]
async fn identifiers_are_tracked_independently() {
    let container = Redis::default().start().await.expect("failed to start redis");
    let port = container
        .get_host_port_ipv4(6379)
        .await
        .expect("failed to map redis port");
    let url = format!("redis://127.0.0.1:{port}");

    let limiter = SlidingWindowRateLimiter::connect(&url, 1, 60, "test:ratelimit:")
        .await
        .expect("failed to connect to test redis");

    let (allowed_a, _) = limiter.is_allowed("caller-a").await.unwrap();
    let (allowed_b, _) = limiter.is_allowed("caller-b").await.unwrap();

    assert!(allowed_a);
    assert!(allowed_b);
}
