//! Closed catalogue of recommendation kinds.
//!
//! This module provides:
//! - Stable wire names (camelCase, as stored by callers)
//! - Registration order used by the engine when reporting results
//! - Short human titles and the heuristic family of each entry

#![forbid(unsafe_code)]

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationName {
    #[serde(rename = "luaScript")]
    LuaScript,
    #[serde(rename = "bigHashes")]
    BigHashes,
    #[serde(rename = "useSmallerKeys")]
    UseSmallerKeys,
    #[serde(rename = "avoidLogicalDatabases")]
    AvoidLogicalDatabases,
    #[serde(rename = "combineSmallStringsToHashes")]
    CombineSmallStringsToHashes,
    #[serde(rename = "increaseSetMaxIntsetEntries")]
    IncreaseSetMaxIntsetEntries,
    #[serde(rename = "hashHashtableToZiplist")]
    HashHashtableToZiplist,
    #[serde(rename = "zSetHashtableToZiplist")]
    ZSetHashtableToZiplist,
    #[serde(rename = "compressHashFieldNames")]
    CompressHashFieldNames,
    #[serde(rename = "compressionForList")]
    CompressionForList,
    #[serde(rename = "bigStrings")]
    BigStrings,
    #[serde(rename = "bigSets")]
    BigSets,
    #[serde(rename = "bigAmountOfConnectedClients")]
    BigAmountOfConnectedClients,
    #[serde(rename = "setPassword")]
    SetPassword,
    #[serde(rename = "redisVersion")]
    RedisVersion,
    #[serde(rename = "RTS")]
    Rts,
    #[serde(rename = "searchIndexes")]
    SearchIndexes,
    #[serde(rename = "searchJSON")]
    SearchJson,
    #[serde(rename = "searchHash")]
    SearchHash,
    #[serde(rename = "stringToJson")]
    StringToJson,
    #[serde(rename = "luaToFunctions")]
    LuaToFunctions,
    #[serde(rename = "functionsWithKeyspace")]
    FunctionsWithKeyspace,
    #[serde(rename = "functionsWithStreams")]
    FunctionsWithStreams,
}

/// How a heuristic gathers its evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicFamily {
    /// Pure scan over the sampled keys.
    Sample,
    /// One INFO / CONFIG / ACL round trip.
    ServerState,
    /// Live config value compared against the sampled keys.
    ConfigRelative,
    /// Capped secondary lookups over candidate keys.
    BoundedSampling,
    /// Short-circuits on known indexes, then scans keys.
    Presence,
    /// Depends on the loaded function libraries.
    Library,
}

impl RecommendationName {
    /// Registration order. Results are reported in this order.
    pub const ALL: [RecommendationName; 23] = [
        RecommendationName::LuaScript,
        RecommendationName::BigHashes,
        RecommendationName::UseSmallerKeys,
        RecommendationName::AvoidLogicalDatabases,
        RecommendationName::CombineSmallStringsToHashes,
        RecommendationName::IncreaseSetMaxIntsetEntries,
        RecommendationName::HashHashtableToZiplist,
        RecommendationName::ZSetHashtableToZiplist,
        RecommendationName::CompressHashFieldNames,
        RecommendationName::CompressionForList,
        RecommendationName::BigStrings,
        RecommendationName::BigSets,
        RecommendationName::BigAmountOfConnectedClients,
        RecommendationName::SetPassword,
        RecommendationName::RedisVersion,
        RecommendationName::Rts,
        RecommendationName::SearchIndexes,
        RecommendationName::SearchJson,
        RecommendationName::SearchHash,
        RecommendationName::StringToJson,
        RecommendationName::LuaToFunctions,
        RecommendationName::FunctionsWithKeyspace,
        RecommendationName::FunctionsWithStreams,
    ];

    pub fn as_str(self) -> &'static str {
        use RecommendationName::*;
        match self {
            LuaScript => "luaScript",
            BigHashes => "bigHashes",
            UseSmallerKeys => "useSmallerKeys",
            AvoidLogicalDatabases => "avoidLogicalDatabases",
            CombineSmallStringsToHashes => "combineSmallStringsToHashes",
            IncreaseSetMaxIntsetEntries => "increaseSetMaxIntsetEntries",
            HashHashtableToZiplist => "hashHashtableToZiplist",
            ZSetHashtableToZiplist => "zSetHashtableToZiplist",
            CompressHashFieldNames => "compressHashFieldNames",
            CompressionForList => "compressionForList",
            BigStrings => "bigStrings",
            BigSets => "bigSets",
            BigAmountOfConnectedClients => "bigAmountOfConnectedClients",
            SetPassword => "setPassword",
            RedisVersion => "redisVersion",
            Rts => "RTS",
            SearchIndexes => "searchIndexes",
            SearchJson => "searchJSON",
            SearchHash => "searchHash",
            StringToJson => "stringToJson",
            LuaToFunctions => "luaToFunctions",
            FunctionsWithKeyspace => "functionsWithKeyspace",
            FunctionsWithStreams => "functionsWithStreams",
        }
    }

    pub fn title(self) -> &'static str {
        use RecommendationName::*;
        match self {
            LuaScript => "Avoid dynamic Lua script",
            BigHashes => "Shard big hashes to small hashes",
            UseSmallerKeys => "Use smaller keys",
            AvoidLogicalDatabases => "Avoid using logical databases",
            CombineSmallStringsToHashes => "Combine small strings to hashes",
            IncreaseSetMaxIntsetEntries => "Increase the set-max-intset-entries",
            HashHashtableToZiplist => "Convert hashtable to ziplist for hashes",
            ZSetHashtableToZiplist => "Convert hashtable to ziplist for sorted sets",
            CompressHashFieldNames => "Compress hash field names",
            CompressionForList => "Enable compression for the list",
            BigStrings => "Do not store large strings",
            BigSets => "Switch to Bloom filter, cuckoo filter, or HyperLogLog",
            BigAmountOfConnectedClients => "Don't open a new connection for every request",
            SetPassword => "Set the password",
            RedisVersion => "Upgrade Redis",
            Rts => "Optimize the use of time series",
            SearchIndexes => "Enhance your search indexes",
            SearchJson => "Search and query JSON documents",
            SearchHash => "Search and query hashes",
            StringToJson => "Use JSON for document-like strings",
            LuaToFunctions => "Migrate Lua scripts to functions",
            FunctionsWithKeyspace => "Use functions with keyspace notifications",
            FunctionsWithStreams => "Use functions with streams",
        }
    }

    pub fn family(self) -> HeuristicFamily {
        use HeuristicFamily as F;
        use RecommendationName::*;
        match self {
            BigHashes | UseSmallerKeys | CombineSmallStringsToHashes | CompressHashFieldNames
            | CompressionForList | BigStrings | BigSets => F::Sample,
            LuaScript | AvoidLogicalDatabases | BigAmountOfConnectedClients | SetPassword | RedisVersion => F::ServerState,
            IncreaseSetMaxIntsetEntries | HashHashtableToZiplist | ZSetHashtableToZiplist => F::ConfigRelative,
            Rts | SearchIndexes | StringToJson => F::BoundedSampling,
            SearchJson | SearchHash => F::Presence,
            LuaToFunctions | FunctionsWithKeyspace | FunctionsWithStreams => F::Library,
        }
    }
}

impl FromStr for RecommendationName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecommendationName::ALL
            .iter()
            .copied()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| CoreError::UnknownRecommendation(s.to_string()))
    }
}

impl std::fmt::Display for RecommendationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}
