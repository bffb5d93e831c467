//! Tunable thresholds and sampling caps used by the heuristics.
//!
//! Every constant a heuristic compares against lives here so it can be tuned
//! without touching the algorithms. Values can be overridden from a partial
//! JSON object (missing fields keep their defaults) or from `ADVISOR_*`
//! environment variables, e.g. `ADVISOR_MAX_HASH_LENGTH=10000`.

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Cached Lua scripts above this count trigger `luaScript`.
    pub max_lua_scripts: u64,
    /// Hash length above which a hash is "big".
    pub max_hash_length: u64,
    /// Total keys above which smaller key names pay off.
    pub max_database_total: u64,
    /// Strings below this many bytes are worth packing into hashes.
    pub max_small_string_memory: u64,
    /// Hash length above which field-name compression pays off.
    pub max_compress_hash_length: u64,
    /// List length above which list compression pays off.
    pub max_list_length: u64,
    /// String size in bytes above which a string is "big".
    pub big_string_memory: u64,
    /// Set length above which a probabilistic structure is suggested.
    pub big_set_length: u64,
    /// Largest string in bytes fetched whole when looking for JSON documents.
    pub max_json_string_memory: u64,
    pub max_connected_clients: u64,
    /// Oldest server version that does not trigger an upgrade hint.
    pub min_redis_version: String,
    /// Candidate cap for heuristics that probe keys with extra round trips.
    pub sorted_set_count_for_check: usize,
    /// Members fetched per sorted set when looking for timestamp scores.
    pub rts_members_to_check: usize,
    /// Lower bound (unix seconds) for a score to look like a timestamp.
    pub timestamp_min_secs: i64,
    /// Upper bound (unix seconds) for a score to look like a timestamp.
    pub timestamp_max_secs: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_lua_scripts: 10,
            max_hash_length: 5_000,
            max_database_total: 1_000_000,
            max_small_string_memory: 200,
            max_compress_hash_length: 1_000,
            max_list_length: 1_000,
            big_string_memory: 5_000_000,
            big_set_length: 5_000,
            max_json_string_memory: 4_096,
            max_connected_clients: 100,
            min_redis_version: "6.0.0".to_string(),
            sorted_set_count_for_check: 100,
            rts_members_to_check: 100,
            timestamp_min_secs: 946_684_800,   // 2000-01-01
            timestamp_max_secs: 4_102_444_800, // 2100-01-01
        }
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, raw: String) -> Result<T, CoreError> {
    raw.trim().parse::<T>().map_err(|_| CoreError::InvalidThreshold { name: name.to_string(), value: raw })
}

impl Thresholds {
    /// Defaults with `ADVISOR_*` environment overrides applied.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary lookup (variable name -> raw value).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        macro_rules! field {
            ($field:ident, $var:literal) => {
                if let Some(raw) = lookup($var) {
                    self.$field = parse_field($var, raw)?;
                }
            };
        }
        field!(max_lua_scripts, "ADVISOR_MAX_LUA_SCRIPTS");
        field!(max_hash_length, "ADVISOR_MAX_HASH_LENGTH");
        field!(max_database_total, "ADVISOR_MAX_DATABASE_TOTAL");
        field!(max_small_string_memory, "ADVISOR_MAX_SMALL_STRING_MEMORY");
        field!(max_compress_hash_length, "ADVISOR_MAX_COMPRESS_HASH_LENGTH");
        field!(max_list_length, "ADVISOR_MAX_LIST_LENGTH");
        field!(big_string_memory, "ADVISOR_BIG_STRING_MEMORY");
        field!(big_set_length, "ADVISOR_BIG_SET_LENGTH");
        field!(max_json_string_memory, "ADVISOR_MAX_JSON_STRING_MEMORY");
        field!(max_connected_clients, "ADVISOR_MAX_CONNECTED_CLIENTS");
        field!(min_redis_version, "ADVISOR_MIN_REDIS_VERSION");
        field!(sorted_set_count_for_check, "ADVISOR_SORTED_SET_COUNT_FOR_CHECK");
        field!(rts_members_to_check, "ADVISOR_RTS_MEMBERS_TO_CHECK");
        field!(timestamp_min_secs, "ADVISOR_TIMESTAMP_MIN_SECS");
        field!(timestamp_max_secs, "ADVISOR_TIMESTAMP_MAX_SECS");
        Ok(self)
    }
}
