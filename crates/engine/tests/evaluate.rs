#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use advisor_engine::{Info, KeySample, KeyType, MockClient, Recommendation, RecommendationEngine, RecommendationInput, RecommendationName as N, Reply};

fn rich_keys() -> Vec<KeySample> {
    vec![
        KeySample::new("h", KeyType::Hash, 6_000, 4_096),
        KeySample::new("z", KeyType::ZSet, 200, 4_096),
        KeySample::new("s", KeyType::Set, 6_000, 4_096),
        KeySample::new("small", KeyType::String, 1, 10),
        KeySample::new("blob", KeyType::String, 1, 6_000_000),
        KeySample::new("l", KeyType::List, 2_000, 4_096),
        KeySample::new("st", KeyType::Stream, 3, 512),
        KeySample::new("doc", KeyType::Json, 1, 512),
    ]
}

/// Store double answering every probe in a way that makes its heuristic fire.
fn rich_store(mock: MockClient) -> MockClient {
    mock.on(["INFO", "memory"], Reply::bulk("# Memory\r\nnumber_of_cached_scripts:20\r\n"))
        .on(["INFO", "clients"], Reply::bulk("# Clients\r\nconnected_clients:500\r\n"))
        .on(["INFO", "keyspace"], Reply::bulk("# Keyspace\r\ndb0:keys=1,expires=0,avg_ttl=0\r\ndb1:keys=5,expires=0,avg_ttl=0\r\n"))
        .on(["INFO", "server"], Reply::bulk("# Server\r\nredis_version:5.0.0\r\n"))
        .on(["ACL", "LIST"], Reply::strings(["user default on nopass ~* &* +@all"]))
        .on(["CONFIG", "GET", "set-max-intset-entries"], Reply::strings(["set-max-intset-entries", "512"]))
        .on(["CONFIG", "GET", "hash-max-ziplist-entries"], Reply::strings(["hash-max-ziplist-entries", "128"]))
        .on(["CONFIG", "GET", "zset-max-ziplist-entries"], Reply::strings(["zset-max-ziplist-entries", "128"]))
        .on(["CONFIG", "GET", "notify-keyspace-events"], Reply::strings(["notify-keyspace-events", "KEA"]))
        .on(["FUNCTION", "LIST"], Reply::Array(vec![]))
        .on(["ZRANGE"], Reply::strings(["member:1", "1700000000"]))
        .on(["TYPE"], Reply::Status("hash".into()))
        .on(["GET"], Reply::bulk(r#"{"user":"alice"}"#))
}

fn rich_input(mock: Arc<MockClient>) -> RecommendationInput {
    RecommendationInput::new(mock).with_keys(rich_keys()).with_total(2_000_000)
}

fn names(found: &[Recommendation]) -> Vec<N> { found.iter().map(|r| r.name).collect() }

#[tokio::test]
async fn every_heuristic_fires_on_a_rich_snapshot() {
    let engine = RecommendationEngine::default();
    let found = engine.evaluate(&rich_input(Arc::new(rich_store(MockClient::standalone())))).await;
    assert_eq!(names(&found), N::ALL.to_vec());
}

#[tokio::test]
async fn big_hash_scenario() {
    let engine = RecommendationEngine::default();
    let input = RecommendationInput::new(Arc::new(MockClient::standalone()))
        .with_keys(vec![KeySample::new("h1", KeyType::Hash, 5_001, 10)]);
    let found = engine.evaluate(&input).await;
    let big: Vec<_> = found.iter().filter(|r| r.name == N::BigHashes).collect();
    assert_eq!(big.len(), 1);
    assert_eq!(big[0].keys(), ["h1".to_string()]);
    // The same hash also trips the field-name and search hints; nothing else applies.
    assert_eq!(names(&found), vec![N::BigHashes, N::CompressHashFieldNames, N::SearchHash]);

    let excluded = input.excluding([N::BigHashes]);
    assert!(!names(&engine.evaluate(&excluded).await).contains(&N::BigHashes));
}

#[tokio::test]
async fn known_index_suppresses_search_hint() {
    let engine = RecommendationEngine::default();
    let keys = vec![KeySample::new("doc", KeyType::Json, 1, 10)];
    let plain = RecommendationInput::new(Arc::new(MockClient::standalone())).with_keys(keys.clone());
    assert!(names(&engine.evaluate(&plain).await).contains(&N::SearchJson));

    let indexed = plain.with_indexes(vec!["idx1".into()]);
    assert!(!names(&engine.evaluate(&indexed).await).contains(&N::SearchJson));
}

#[tokio::test]
async fn outdated_server_from_carried_info() {
    let engine = RecommendationEngine::default();
    let input = RecommendationInput::new(Arc::new(MockClient::standalone()))
        .with_info(Info::default().with("server", "redis_version", "5.0.0"));
    let found = engine.evaluate(&input).await;
    assert_eq!(found, vec![Recommendation::bare(N::RedisVersion)]);
    assert!(found[0].params.is_none());
}

#[tokio::test]
async fn exclusion_skips_io() {
    let mock = Arc::new(rich_store(MockClient::standalone()));
    let input = rich_input(mock.clone()).excluding([N::SetPassword, N::IncreaseSetMaxIntsetEntries, N::Rts, N::SearchIndexes, N::StringToJson]);
    let found = RecommendationEngine::default().evaluate(&input).await;

    for n in [N::SetPassword, N::IncreaseSetMaxIntsetEntries, N::Rts, N::SearchIndexes, N::StringToJson] {
        assert!(!names(&found).contains(&n), "{} reported", n);
    }
    let calls = mock.calls();
    assert_eq!(mock.count("ACL"), 0);
    assert_eq!(mock.count("ZRANGE"), 0);
    assert_eq!(mock.count("TYPE"), 0);
    assert_eq!(mock.count("GET"), 0);
    assert!(!calls.iter().any(|c| c.command.to_string().contains("set-max-intset-entries")));
    assert_eq!(found.len(), N::ALL.len() - 5);
}

#[tokio::test]
async fn failing_heuristic_is_isolated() {
    let mock = rich_store(MockClient::standalone()).fail(["INFO", "clients"], "connection reset");
    let found = RecommendationEngine::default().evaluate(&rich_input(Arc::new(mock))).await;
    let expected: Vec<N> = N::ALL.iter().copied().filter(|n| *n != N::BigAmountOfConnectedClients).collect();
    assert_eq!(names(&found), expected);
}

#[tokio::test]
async fn repeated_rounds_agree() {
    let engine = RecommendationEngine::default();
    let input = rich_input(Arc::new(rich_store(MockClient::standalone())));
    let first: HashSet<_> = engine.evaluate(&input).await.into_iter().map(|r| (r.name, r.keys().to_vec())).collect();
    let second: HashSet<_> = engine.evaluate(&input).await.into_iter().map(|r| (r.name, r.keys().to_vec())).collect();
    assert_eq!(first, second);
}

#[tokio::test]
async fn cluster_round_matches_standalone_for_sampling() {
    let engine = RecommendationEngine::default();
    let standalone = engine.evaluate(&rich_input(Arc::new(rich_store(MockClient::standalone())))).await;
    let cluster = engine.evaluate(&rich_input(Arc::new(rich_store(MockClient::cluster())))).await;
    for n in [N::Rts, N::SearchIndexes, N::StringToJson] {
        let a = standalone.iter().find(|r| r.name == n).map(|r| r.keys().to_vec());
        let b = cluster.iter().find(|r| r.name == n).map(|r| r.keys().to_vec());
        assert_eq!(a, b, "{}", n);
    }
    // Logical databases only exist outside cluster mode.
    assert!(!names(&cluster).contains(&N::AvoidLogicalDatabases));
}

#[tokio::test(start_paused = true)]
async fn heuristics_run_concurrently() {
    let delay = Duration::from_millis(50);
    let mock = Arc::new(rich_store(MockClient::standalone()).with_delay(delay));
    let input = rich_input(mock.clone());
    let t0 = tokio::time::Instant::now();
    let found = RecommendationEngine::default().evaluate(&input).await;
    let took = t0.elapsed();
    assert_eq!(found.len(), N::ALL.len());
    assert!(mock.round_trips() > 10);
    // Longest chain is two round trips; serial execution would take far longer.
    assert!(took < delay * 4, "took {:?}", took);
}
