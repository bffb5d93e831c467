//! Heuristics that probe a capped number of candidate keys with extra reads.

use anyhow::{Context, Result};
use advisor_client::{Command, Reply};
use advisor_core::{KeySample, KeyType, Recommendation, RecommendationName as N, Thresholds};
use tracing::debug;

use crate::sampler::{sampler_for, Probe};
use crate::RecommendationInput;

fn candidates<'a>(keys: &'a [KeySample], t: &KeyType, pred: impl Fn(&KeySample) -> bool) -> Vec<&'a KeySample> {
    keys.iter().filter(|k| k.is(t) && pred(k)).collect()
}

async fn sample_first(input: &RecommendationInput, cap: usize, cands: Vec<&KeySample>, probe: &dyn Probe, name: N) -> Result<Option<Recommendation>> {
    if cands.is_empty() {
        return Ok(None);
    }
    let hit = sampler_for(input, cap)
        .find_first(&cands, probe)
        .await
        .with_context(|| format!("sampling {} candidates for {}", cands.len().min(cap), name))?;
    Ok(hit.map(|k| Recommendation::for_key(name, &k.name)))
}

/// Integral score inside the plausible unix-time window; millisecond values are scaled down.
pub(crate) fn looks_like_timestamp(score: &str, t: &Thresholds) -> bool {
    let Ok(v) = score.trim().parse::<f64>() else { return false };
    if !v.is_finite() || v.fract() != 0.0 || v < 0.0 {
        return false;
    }
    let mut secs = v;
    if secs >= (t.timestamp_min_secs as f64) * 1000.0 {
        secs /= 1000.0;
    }
    secs >= t.timestamp_min_secs as f64 && secs <= t.timestamp_max_secs as f64
}

struct TimeSeriesProbe<'t> {
    members: usize,
    thresholds: &'t Thresholds,
}

impl Probe for TimeSeriesProbe<'_> {
    fn first(&self, key: &KeySample) -> Command {
        let stop = self.members.saturating_sub(1).to_string();
        Command::new("ZRANGE").arg(key.name.clone()).arg("0").arg(stop).arg("WITHSCORES")
    }

    fn accept(&self, _key: &KeySample, first: &Reply, _second: Option<&Reply>) -> bool {
        let Some(items) = first.as_array() else { return false };
        // members and scores alternate
        let scores: Vec<_> = items.iter().skip(1).step_by(2).collect();
        !scores.is_empty()
            && scores
                .iter()
                .all(|s| s.as_text().map(|s| looks_like_timestamp(&s, self.thresholds)).unwrap_or(false))
    }
}

pub async fn rts(input: &RecommendationInput, t: &Thresholds) -> Result<Option<Recommendation>> {
    let probe = TimeSeriesProbe { members: t.rts_members_to_check, thresholds: t };
    let cands = candidates(&input.keys, &KeyType::ZSet, |_| true);
    sample_first(input, t.sorted_set_count_for_check, cands, &probe, N::Rts).await
}

/// Sorted sets used as hand-rolled indexes: their first member names a hash or JSON document.
struct IndexedMemberProbe;

impl Probe for IndexedMemberProbe {
    fn first(&self, key: &KeySample) -> Command { Command::new("ZRANGE").arg(key.name.clone()).arg("0").arg("0") }

    fn follow_up(&self, _key: &KeySample, first: &Reply) -> Option<Command> {
        let member = first.as_array()?.first()?.as_bytes()?;
        Some(Command::new("TYPE").arg(bytes::Bytes::copy_from_slice(member)))
    }

    fn accept(&self, _key: &KeySample, _first: &Reply, second: Option<&Reply>) -> bool {
        match second.and_then(Reply::as_text).map(|s| KeyType::from(&*s)) {
            Some(KeyType::Hash) | Some(KeyType::Json) => true,
            _ => false,
        }
    }
}

pub async fn search_indexes(input: &RecommendationInput, t: &Thresholds) -> Result<Option<Recommendation>> {
    if input.has_indexes() {
        debug!("search indexes already present");
        return Ok(None);
    }
    let cands = candidates(&input.keys, &KeyType::ZSet, |_| true);
    sample_first(input, t.sorted_set_count_for_check, cands, &IndexedMemberProbe, N::SearchIndexes).await
}

struct JsonDocumentProbe;

impl Probe for JsonDocumentProbe {
    fn first(&self, key: &KeySample) -> Command { Command::new("GET").arg(key.name.clone()) }

    fn accept(&self, _key: &KeySample, first: &Reply, _second: Option<&Reply>) -> bool {
        let Some(raw) = first.as_bytes() else { return false };
        matches!(
            serde_json::from_slice::<serde_json::Value>(raw),
            Ok(serde_json::Value::Object(_)) | Ok(serde_json::Value::Array(_))
        )
    }
}

pub async fn string_to_json(input: &RecommendationInput, t: &Thresholds) -> Result<Option<Recommendation>> {
    let cands = candidates(&input.keys, &KeyType::String, |k| k.memory <= t.max_json_string_memory);
    sample_first(input, t.sorted_set_count_for_check, cands, &JsonDocumentProbe, N::StringToJson).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use advisor_client::MockClient;

    use super::*;

    fn zset(name: &'static str) -> KeySample { KeySample::new(name, KeyType::ZSet, 10, 100) }

    #[test]
    fn timestamp_window() {
        let t = Thresholds::default();
        assert!(looks_like_timestamp("1700000000", &t));
        assert!(looks_like_timestamp("1700000000000", &t));
        assert!(!looks_like_timestamp("1700000000.5", &t));
        assert!(!looks_like_timestamp("42", &t));
        assert!(!looks_like_timestamp("-1700000000", &t));
        assert!(!looks_like_timestamp("score", &t));
    }

    #[tokio::test]
    async fn rts_needs_every_score_to_be_a_timestamp() {
        let mock = MockClient::standalone()
            .on(["ZRANGE", "mixed"], Reply::strings(["a", "1700000000", "b", "3"]))
            .on(["ZRANGE", "times"], Reply::strings(["a", "1700000000", "b", "1700000100"]));
        let input = RecommendationInput::new(Arc::new(mock)).with_keys(vec![zset("mixed"), zset("times")]);
        let r = rts(&input, &Thresholds::default()).await.unwrap().expect("time series");
        assert_eq!(r.keys(), ["times".to_string()]);
    }

    #[tokio::test]
    async fn rts_ignores_empty_sets() {
        let mock = MockClient::standalone().on(["ZRANGE"], Reply::Array(vec![]));
        let input = RecommendationInput::new(Arc::new(mock)).with_keys(vec![zset("z")]);
        assert_eq!(rts(&input, &Thresholds::default()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn search_indexes_follows_first_member() {
        let mock = Arc::new(
            MockClient::standalone()
                .on(["ZRANGE", "by-age"], Reply::strings(["user:1"]))
                .on(["ZRANGE", "scores"], Reply::strings(["alice"]))
                .on(["TYPE", "user:1"], Reply::Status("hash".into()))
                .on(["TYPE", "alice"], Reply::Status("none".into())),
        );
        let input = RecommendationInput::new(mock.clone()).with_keys(vec![zset("scores"), zset("by-age")]);
        let r = search_indexes(&input, &Thresholds::default()).await.unwrap().expect("index candidate");
        assert_eq!(r.keys(), ["by-age".to_string()]);
        assert_eq!(mock.pipelines(), 2);

        let indexed = RecommendationInput::new(mock.clone()).with_keys(vec![zset("by-age")]).with_indexes(vec!["idx".into()]);
        let before = mock.round_trips();
        assert_eq!(search_indexes(&indexed, &Thresholds::default()).await.unwrap(), None);
        assert_eq!(mock.round_trips(), before);
    }

    #[tokio::test]
    async fn string_to_json_parses_documents_only() {
        let mock = MockClient::standalone()
            .on(["GET", "plain"], Reply::bulk("hello"))
            .on(["GET", "number"], Reply::bulk("12"))
            .on(["GET", "doc"], Reply::bulk(r#"{"a":1}"#));
        let keys = vec![
            KeySample::new("plain", KeyType::String, 1, 10),
            KeySample::new("number", KeyType::String, 1, 10),
            KeySample::new("doc", KeyType::String, 1, 10),
        ];
        let input = RecommendationInput::new(Arc::new(mock)).with_keys(keys);
        let r = string_to_json(&input, &Thresholds::default()).await.unwrap().expect("json string");
        assert_eq!(r.keys(), ["doc".to_string()]);
    }

    #[tokio::test]
    async fn large_strings_are_never_fetched() {
        let mock = Arc::new(MockClient::standalone().on(["GET"], Reply::bulk(r#"{"a":1}"#)));
        let keys: Vec<KeySample> = (0..100).map(|i| KeySample::new(format!("blob{}", i), KeyType::String, 1, 4_999_999)).collect();
        let input = RecommendationInput::new(mock.clone()).with_keys(keys);
        assert_eq!(string_to_json(&input, &Thresholds::default()).await.unwrap(), None);
        assert_eq!(mock.count("GET"), 0);
        assert_eq!(mock.round_trips(), 0);

        let t = Thresholds::default();
        let input = RecommendationInput::new(mock.clone()).with_keys(vec![
            KeySample::new("big", KeyType::String, 1, t.max_json_string_memory + 1),
            KeySample::new("edge", KeyType::String, 1, t.max_json_string_memory),
        ]);
        assert_eq!(string_to_json(&input, &t).await.unwrap().unwrap().keys(), ["edge".to_string()]);
        assert_eq!(mock.count("GET"), 1);
    }

    #[tokio::test]
    async fn no_candidates_means_no_round_trips() {
        let mock = Arc::new(MockClient::cluster());
        let input = RecommendationInput::new(mock.clone()).with_keys(vec![KeySample::new("h", KeyType::Hash, 1, 1)]);
        assert_eq!(rts(&input, &Thresholds::default()).await.unwrap(), None);
        assert_eq!(string_to_json(&input, &Thresholds::default()).await.unwrap(), None);
        assert_eq!(mock.round_trips(), 0);
    }
}
