//! Recommendation orchestrator.
//!
//! One `evaluate` call is one round: compute the active set, run every active
//! heuristic concurrently on the caller's runtime, join them all and keep the
//! non-empty results in registration order.

#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::time::Instant;

use futures::future::join_all;
use metrics::{counter, histogram};
use tracing::{debug, info, warn};

pub use advisor_client::{Command, ConnectionType, Info, MockClient, Reply, StoreClient};
pub use advisor_core::{KeySample, KeyType, Recommendation, RecommendationName, RecommendationParams, Thresholds};
pub use advisor_heuristics::{HeuristicProvider, RecommendationInput};

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    provider: HeuristicProvider,
}

impl RecommendationEngine {
    pub fn new(provider: HeuristicProvider) -> Self { Self { provider } }

    pub fn with_thresholds(thresholds: Thresholds) -> Self { Self::new(HeuristicProvider::with_thresholds(thresholds)) }

    pub fn provider(&self) -> &HeuristicProvider { &self.provider }

    /// Catalogue names minus `exclude`, in registration order.
    pub fn active(&self, exclude: &HashSet<RecommendationName>) -> Vec<RecommendationName> {
        RecommendationName::ALL.iter().copied().filter(|n| !exclude.contains(n)).collect()
    }

    /// Run one evaluation round. Excluded heuristics are never invoked; a
    /// failing heuristic is logged and contributes nothing.
    pub async fn evaluate(&self, input: &RecommendationInput) -> Vec<Recommendation> {
        let t0 = Instant::now();
        let active = self.active(&input.exclude);
        info!(active = active.len(), excluded = input.exclude.len(), keys = input.keys.len(), topology = ?input.topology(), "engine: evaluate start");

        let runs = active.iter().map(|&name| async move {
            let h0 = Instant::now();
            let outcome = self.provider.evaluate(name, input).await;
            counter!("recommendation_heuristic_runs_total", 1u64, "heuristic" => name.as_str());
            match outcome {
                Ok(found) => {
                    debug!(heuristic = %name, found = found.is_some(), took_ms = %h0.elapsed().as_millis(), "engine: heuristic done");
                    found
                }
                Err(e) => {
                    warn!(heuristic = %name, error = %format!("{:#}", e), "engine: heuristic failed");
                    counter!("recommendation_heuristic_failures_total", 1u64, "heuristic" => name.as_str());
                    None
                }
            }
        });
        let results: Vec<Recommendation> = join_all(runs).await.into_iter().flatten().collect();

        histogram!("recommendation_evaluate_ms", t0.elapsed().as_secs_f64() * 1000.0);
        info!(found = results.len(), took_ms = %t0.elapsed().as_millis(), "engine: evaluate ok");
        results
    }
}
