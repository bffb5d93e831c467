//! Parsed `INFO` output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// INFO fields grouped by lower-cased section name.
///
/// Fields that appear before any `# Section` header land in `default`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Info {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

/// One `dbN:keys=..,expires=..` line of the keyspace section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyspaceEntry {
    pub db: u32,
    pub keys: u64,
    pub expires: u64,
}

impl Info {
    pub fn parse(raw: &str) -> Self {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current = "default".to_string();
        for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(header) = line.strip_prefix('#') {
                current = header.trim().to_ascii_lowercase();
                sections.entry(current.clone()).or_default();
                continue;
            }
            if let Some((k, v)) = line.split_once(':') {
                sections.entry(current.clone()).or_default().insert(k.to_string(), v.to_string());
            }
        }
        Self { sections }
    }

    /// Builder used to assemble an already-known INFO snapshot.
    pub fn with(mut self, section: &str, field: &str, value: impl Into<String>) -> Self {
        self.sections
            .entry(section.to_ascii_lowercase())
            .or_default()
            .insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, section: &str, field: &str) -> Option<&str> {
        self.sections.get(section).and_then(|s| s.get(field)).map(String::as_str)
    }

    /// Look a field up in any section.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.sections.values().find_map(|s| s.get(field)).map(String::as_str)
    }

    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, String>> { self.sections.get(name) }

    pub fn is_empty(&self) -> bool { self.sections.values().all(|s| s.is_empty()) }

    /// Logical databases listed in the keyspace section, ordered by index.
    pub fn keyspace(&self) -> Vec<KeyspaceEntry> {
        let Some(section) = self.sections.get("keyspace") else { return Vec::new() };
        let mut out: Vec<KeyspaceEntry> = section
            .iter()
            .filter_map(|(name, value)| {
                let db = name.strip_prefix("db")?.parse().ok()?;
                let mut entry = KeyspaceEntry { db, keys: 0, expires: 0 };
                for kv in value.split(',') {
                    match kv.split_once('=') {
                        Some(("keys", n)) => entry.keys = n.trim().parse().unwrap_or(0),
                        Some(("expires", n)) => entry.expires = n.trim().parse().unwrap_or(0),
                        _ => {}
                    }
                }
                Some(entry)
            })
            .collect();
        out.sort_by_key(|e| e.db);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_and_crlf() {
        let info = Info::parse("# Server\r\nredis_version:7.2.4\r\nredis_mode:standalone\r\n\r\n# Clients\r\nconnected_clients:3\r\n");
        assert_eq!(info.get("server", "redis_version"), Some("7.2.4"));
        assert_eq!(info.get("clients", "connected_clients"), Some("3"));
        assert_eq!(info.field("redis_mode"), Some("standalone"));
        assert_eq!(info.get("clients", "redis_version"), None);
    }

    #[test]
    fn keyspace_tolerates_indented_lines() {
        let info = Info::parse("# Keyspace\r\ndb0:keys=2,expires=0,avg_ttl=0\r\n\n  db2:keys=20,expires=1,avg_ttl=0\r\n");
        let ks = info.keyspace();
        assert_eq!(ks, vec![
            KeyspaceEntry { db: 0, keys: 2, expires: 0 },
            KeyspaceEntry { db: 2, keys: 20, expires: 1 },
        ]);
    }

    #[test]
    fn builder_and_serde_shape() {
        let info = Info::default().with("Server", "redis_version", "5.0.0");
        assert_eq!(info.get("server", "redis_version"), Some("5.0.0"));
        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(v, serde_json::json!({ "server": { "redis_version": "5.0.0" } }));
        assert!(!info.is_empty());
        assert!(Info::default().is_empty());
    }
}
