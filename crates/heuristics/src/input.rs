//! Per-run input snapshot shared by every heuristic.

use std::collections::HashSet;
use std::sync::Arc;

use advisor_client::{ConnectionType, Info, StoreClient};
use advisor_core::{KeySample, RecommendationName};

/// Snapshot handed to one evaluation round. Heuristics only ever see `&self`.
#[derive(Clone)]
pub struct RecommendationInput {
    /// Client bound to the database under analysis.
    pub client: Arc<dyn StoreClient>,
    /// Sampled keys, already bounded by the caller.
    pub keys: Arc<[KeySample]>,
    /// Already fetched INFO, preferred over a fresh fetch when it has the field.
    pub info: Option<Info>,
    /// Total key count of the database.
    pub total: Option<u64>,
    /// Cluster-level client used by the cluster sampling strategy.
    pub global_client: Option<Arc<dyn StoreClient>>,
    pub exclude: HashSet<RecommendationName>,
    /// Names of existing search indexes; `None` when unknown.
    pub indexes: Option<Vec<String>>,
    /// Names of loaded function libraries; `None` when unknown.
    pub libraries: Option<Vec<String>>,
}

impl RecommendationInput {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self {
            client,
            keys: Arc::from(Vec::new()),
            info: None,
            total: None,
            global_client: None,
            exclude: HashSet::new(),
            indexes: None,
            libraries: None,
        }
    }

    pub fn with_keys(mut self, keys: Vec<KeySample>) -> Self {
        self.keys = Arc::from(keys);
        self
    }

    pub fn with_info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_global_client(mut self, client: Arc<dyn StoreClient>) -> Self {
        self.global_client = Some(client);
        self
    }

    pub fn excluding<I: IntoIterator<Item = RecommendationName>>(mut self, names: I) -> Self {
        self.exclude.extend(names);
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<String>) -> Self {
        self.indexes = Some(indexes);
        self
    }

    pub fn with_libraries(mut self, libraries: Vec<String>) -> Self {
        self.libraries = Some(libraries);
        self
    }

    pub fn topology(&self) -> ConnectionType { self.client.connection_type() }

    pub fn has_indexes(&self) -> bool { self.indexes.as_ref().map(|i| !i.is_empty()).unwrap_or(false) }
}

impl std::fmt::Debug for RecommendationInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationInput")
            .field("topology", &self.topology())
            .field("keys", &self.keys.len())
            .field("info", &self.info.is_some())
            .field("total", &self.total)
            .field("global_client", &self.global_client.is_some())
            .field("exclude", &self.exclude)
            .field("indexes", &self.indexes)
            .field("libraries", &self.libraries)
            .finish()
    }
}
