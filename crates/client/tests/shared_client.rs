#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use advisor_client::{Command, MockClient, Reply, StoreClient};
use futures::future::join_all;

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_client() {
    let mock = Arc::new(
        MockClient::standalone()
            .on(["GET"], Reply::bulk("v"))
            .with_delay(Duration::from_millis(50)),
    );
    let client: Arc<dyn StoreClient> = mock.clone();

    let t0 = tokio::time::Instant::now();
    let calls = (0..8).map(|i| {
        let c = Arc::clone(&client);
        async move { c.send_command(Command::new("GET").arg(format!("k{}", i))).await }
    });
    let out = join_all(calls).await;
    assert!(out.iter().all(|r| r.as_ref().map(|v| v == &Reply::bulk("v")).unwrap_or(false)));
    // All eight calls overlap instead of queueing behind each other.
    assert!(t0.elapsed() < Duration::from_millis(100), "elapsed {:?}", t0.elapsed());
    assert_eq!(mock.round_trips(), 8);
}
