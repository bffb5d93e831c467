//! Heuristic library: one evaluator per `RecommendationName`.
//!
//! Evaluators only read from the store. They return `Ok(None)` when they do
//! not apply and `Err` when evidence could not be gathered; turning errors
//! into "no recommendation" is the caller's job.

#![forbid(unsafe_code)]

mod bounded;
mod config;
mod input;
mod library;
mod presence;
mod sample;
pub mod sampler;
mod server;
mod version;

use advisor_core::{Recommendation, RecommendationName as N, Thresholds};
use anyhow::Result;

pub use input::RecommendationInput;
pub use version::{compare_versions, version_lt};

/// Dispatches a recommendation name to its evaluator.
#[derive(Debug, Clone, Default)]
pub struct HeuristicProvider {
    thresholds: Thresholds,
}

impl HeuristicProvider {
    pub fn new() -> Self { Self::default() }

    pub fn with_thresholds(thresholds: Thresholds) -> Self { Self { thresholds } }

    pub fn thresholds(&self) -> &Thresholds { &self.thresholds }

    pub async fn evaluate(&self, name: N, input: &RecommendationInput) -> Result<Option<Recommendation>> {
        let t = &self.thresholds;
        let keys = &input.keys[..];
        match name {
            N::LuaScript => server::lua_script(input, t).await,
            N::BigHashes => Ok(sample::big_hashes(keys, t)),
            N::UseSmallerKeys => Ok(sample::use_smaller_keys(input.total, t)),
            N::AvoidLogicalDatabases => server::avoid_logical_databases(input).await,
            N::CombineSmallStringsToHashes => Ok(sample::combine_small_strings_to_hashes(keys, t)),
            N::IncreaseSetMaxIntsetEntries => config::increase_set_max_intset_entries(input).await,
            N::HashHashtableToZiplist => config::hash_hashtable_to_ziplist(input).await,
            N::ZSetHashtableToZiplist => config::zset_hashtable_to_ziplist(input).await,
            N::CompressHashFieldNames => Ok(sample::compress_hash_field_names(keys, t)),
            N::CompressionForList => Ok(sample::compression_for_list(keys, t)),
            N::BigStrings => Ok(sample::big_strings(keys, t)),
            N::BigSets => Ok(sample::big_sets(keys, t)),
            N::BigAmountOfConnectedClients => server::big_amount_of_connected_clients(input, t).await,
            N::SetPassword => server::set_password(input).await,
            N::RedisVersion => server::redis_version(input, t).await,
            N::Rts => bounded::rts(input, t).await,
            N::SearchIndexes => bounded::search_indexes(input, t).await,
            N::SearchJson => Ok(presence::search_json(input)),
            N::SearchHash => Ok(presence::search_hash(input, t)),
            N::StringToJson => bounded::string_to_json(input, t).await,
            N::LuaToFunctions => library::lua_to_functions(input).await,
            N::FunctionsWithKeyspace => library::functions_with_keyspace(input).await,
            N::FunctionsWithStreams => library::functions_with_streams(input).await,
        }
    }
}
