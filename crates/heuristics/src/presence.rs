//! Heuristics that suggest search features when no index exists yet.

use advisor_core::{KeyType, Recommendation, RecommendationName as N, Thresholds};

use crate::sample::first_of;
use crate::RecommendationInput;

pub fn search_json(input: &RecommendationInput) -> Option<Recommendation> {
    if input.has_indexes() {
        return None;
    }
    first_of(&input.keys, &KeyType::Json, |_| true).map(|k| Recommendation::for_key(N::SearchJson, &k.name))
}

pub fn search_hash(input: &RecommendationInput, t: &Thresholds) -> Option<Recommendation> {
    if input.has_indexes() {
        return None;
    }
    first_of(&input.keys, &KeyType::Hash, |k| k.length > t.max_hash_length).map(|k| Recommendation::for_key(N::SearchHash, &k.name))
}
