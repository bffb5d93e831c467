//! Heuristics comparing sampled keys against a live configuration value.

use anyhow::{Context, Result};
use advisor_client::config_get;
use advisor_core::{KeyType, Recommendation, RecommendationName as N};
use tracing::debug;

use crate::sample::first_of;
use crate::RecommendationInput;

/// Fetch `param` and report the first key of type `t` longer than its value.
async fn longer_than_config(input: &RecommendationInput, name: N, param: &str, t: KeyType) -> Result<Option<Recommendation>> {
    let raw = config_get(input.client.as_ref(), param)
        .await
        .with_context(|| format!("CONFIG GET {}", param))?;
    let Some(raw) = raw else {
        debug!(param, "config parameter not reported by server");
        return Ok(None);
    };
    let limit: u64 = raw.trim().parse().with_context(|| format!("parsing {}={:?}", param, raw))?;
    Ok(first_of(&input.keys, &t, |k| k.length > limit).map(|k| Recommendation::for_key(name, &k.name)))
}

pub async fn increase_set_max_intset_entries(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    longer_than_config(input, N::IncreaseSetMaxIntsetEntries, "set-max-intset-entries", KeyType::Set).await
}

pub async fn hash_hashtable_to_ziplist(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    longer_than_config(input, N::HashHashtableToZiplist, "hash-max-ziplist-entries", KeyType::Hash).await
}

pub async fn zset_hashtable_to_ziplist(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    longer_than_config(input, N::ZSetHashtableToZiplist, "zset-max-ziplist-entries", KeyType::ZSet).await
}
