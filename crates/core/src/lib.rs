//! Advisor core types: sampled key metadata, recommendations and tunables.

#![forbid(unsafe_code)]

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod catalogue;
pub mod thresholds;

pub use catalogue::RecommendationName;
pub use thresholds::Thresholds;

/// Errors raised by core parsing helpers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown recommendation: {0}")]
    UnknownRecommendation(String),
    #[error("invalid threshold {name}: {value}")]
    InvalidThreshold { name: String, value: String },
}

/// Store data-type tag as reported by `TYPE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyType {
    String,
    Hash,
    List,
    Set,
    ZSet,
    Stream,
    Json,
    TimeSeries,
    Graph,
    Other(String),
}

impl KeyType {
    pub fn as_str(&self) -> &str {
        match self {
            KeyType::String => "string",
            KeyType::Hash => "hash",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::ZSet => "zset",
            KeyType::Stream => "stream",
            KeyType::Json => "ReJSON-RL",
            KeyType::TimeSeries => "TSDB-TYPE",
            KeyType::Graph => "graphdata",
            KeyType::Other(tag) => tag.as_str(),
        }
    }
}

impl From<&str> for KeyType {
    fn from(tag: &str) -> Self {
        match tag {
            "string" => KeyType::String,
            "hash" => KeyType::Hash,
            "list" => KeyType::List,
            "set" => KeyType::Set,
            "zset" => KeyType::ZSet,
            "stream" => KeyType::Stream,
            "ReJSON-RL" => KeyType::Json,
            "TSDB-TYPE" => KeyType::TimeSeries,
            "graphdata" => KeyType::Graph,
            other => KeyType::Other(other.to_string()),
        }
    }
}

impl From<String> for KeyType {
    fn from(tag: String) -> Self { KeyType::from(tag.as_str()) }
}

impl From<KeyType> for String {
    fn from(t: KeyType) -> Self { t.as_str().to_string() }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// Metadata about one sampled key, produced by an external sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySample {
    pub name: Bytes,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// Element/member count; meaning depends on the data type.
    pub length: u64,
    /// Estimated size in bytes.
    pub memory: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

impl KeySample {
    pub fn new(name: impl Into<Bytes>, key_type: KeyType, length: u64, memory: u64) -> Self {
        Self { name: name.into(), key_type, length, memory, ttl: None }
    }

    pub fn is(&self, t: &KeyType) -> bool { &self.key_type == t }

    /// Key name rendered for humans and JSON payloads.
    pub fn name_lossy(&self) -> String { String::from_utf8_lossy(&self.name).into_owned() }
}

/// Evidence attached to a recommendation, most commonly the offending keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationParams {
    pub keys: SmallVec<[String; 1]>,
}

/// Output unit of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: RecommendationName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<RecommendationParams>,
}

impl Recommendation {
    /// Recommendation without evidence (server-wide findings).
    pub fn bare(name: RecommendationName) -> Self { Self { name, params: None } }

    /// Recommendation pointing at a single offending key.
    pub fn for_key(name: RecommendationName, key: &[u8]) -> Self {
        let mut keys = SmallVec::new();
        keys.push(String::from_utf8_lossy(key).into_owned());
        Self { name, params: Some(RecommendationParams { keys }) }
    }

    /// Names of the keys carried as evidence, if any.
    pub fn keys(&self) -> &[String] {
        self.params.as_ref().map(|p| p.keys.as_slice()).unwrap_or(&[])
    }
}

pub mod prelude {
    pub use super::{CoreError, KeySample, KeyType, Recommendation, RecommendationName, RecommendationParams, Thresholds};
}
