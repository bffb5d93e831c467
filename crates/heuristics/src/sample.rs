//! Heuristics that are pure functions of the sampled keys.

use advisor_core::{KeySample, KeyType, Recommendation, RecommendationName as N, Thresholds};

/// First key of type `t` satisfying `pred`.
pub(crate) fn first_of<'a, F>(keys: &'a [KeySample], t: &KeyType, pred: F) -> Option<&'a KeySample>
where
    F: Fn(&KeySample) -> bool,
{
    keys.iter().find(|k| k.is(t) && pred(k))
}

fn keyed(name: N, key: Option<&KeySample>) -> Option<Recommendation> {
    key.map(|k| Recommendation::for_key(name, &k.name))
}

pub fn big_hashes(keys: &[KeySample], t: &Thresholds) -> Option<Recommendation> {
    keyed(N::BigHashes, first_of(keys, &KeyType::Hash, |k| k.length > t.max_hash_length))
}

pub fn use_smaller_keys(total: Option<u64>, t: &Thresholds) -> Option<Recommendation> {
    match total {
        Some(n) if n > t.max_database_total => Some(Recommendation::bare(N::UseSmallerKeys)),
        _ => None,
    }
}

pub fn combine_small_strings_to_hashes(keys: &[KeySample], t: &Thresholds) -> Option<Recommendation> {
    keyed(N::CombineSmallStringsToHashes, first_of(keys, &KeyType::String, |k| k.memory < t.max_small_string_memory))
}

pub fn compress_hash_field_names(keys: &[KeySample], t: &Thresholds) -> Option<Recommendation> {
    keyed(N::CompressHashFieldNames, first_of(keys, &KeyType::Hash, |k| k.length > t.max_compress_hash_length))
}

pub fn compression_for_list(keys: &[KeySample], t: &Thresholds) -> Option<Recommendation> {
    keyed(N::CompressionForList, first_of(keys, &KeyType::List, |k| k.length > t.max_list_length))
}

pub fn big_strings(keys: &[KeySample], t: &Thresholds) -> Option<Recommendation> {
    keyed(N::BigStrings, first_of(keys, &KeyType::String, |k| k.memory > t.big_string_memory))
}

pub fn big_sets(keys: &[KeySample], t: &Thresholds) -> Option<Recommendation> {
    keyed(N::BigSets, first_of(keys, &KeyType::Set, |k| k.length > t.big_set_length))
}
