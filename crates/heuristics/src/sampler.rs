//! Capped candidate probing, one strategy per topology.
//!
//! A `Probe` describes at most two round trips per candidate key: a first
//! command, an optional follow-up derived from the first reply, and an
//! acceptance test. Both samplers stop at the same candidate cap and report
//! the first accepted candidate in input order, so a key population yields
//! the same answer on either topology.

use advisor_client::{ClientError, ClientResult, Command, ConnectionType, Reply, StoreClient};
use advisor_core::KeySample;
use tracing::debug;

use crate::RecommendationInput;

pub trait Probe: Send + Sync {
    fn first(&self, key: &KeySample) -> Command;

    /// Second command for this candidate; `None` skips the second round.
    fn follow_up(&self, _key: &KeySample, _first: &Reply) -> Option<Command> { None }

    fn accept(&self, key: &KeySample, first: &Reply, second: Option<&Reply>) -> bool;
}

#[async_trait::async_trait]
pub trait CandidateSampler: Send + Sync {
    /// First candidate accepted by `probe`, looking at no more than the cap.
    async fn find_first<'k>(&self, candidates: &[&'k KeySample], probe: &dyn Probe) -> ClientResult<Option<&'k KeySample>>;

    fn cap(&self) -> usize;
}

/// Batches all first probes into one pipeline and all follow-ups into a second.
pub struct StandaloneSampler<'c> {
    client: &'c dyn StoreClient,
    cap: usize,
}

impl<'c> StandaloneSampler<'c> {
    pub fn new(client: &'c dyn StoreClient, cap: usize) -> Self { Self { client, cap } }
}

#[async_trait::async_trait]
impl<'c> CandidateSampler for StandaloneSampler<'c> {
    async fn find_first<'k>(&self, candidates: &[&'k KeySample], probe: &dyn Probe) -> ClientResult<Option<&'k KeySample>> {
        let batch: Vec<&'k KeySample> = candidates.iter().take(self.cap).copied().collect();
        if batch.is_empty() {
            return Ok(None);
        }
        let firsts = self.client.send_pipeline(batch.iter().map(|k| probe.first(k)).collect()).await?;
        if firsts.len() != batch.len() {
            return Err(ClientError::UnexpectedReply(format!("pipeline returned {} replies for {} commands", firsts.len(), batch.len())));
        }

        let (slots, follow): (Vec<usize>, Vec<Command>) = batch
            .iter()
            .zip(&firsts)
            .enumerate()
            .filter(|(_, (_, r))| !matches!(r, Reply::Error(_)))
            .filter_map(|(i, (k, r))| probe.follow_up(k, r).map(|c| (i, c)))
            .unzip();
        let mut seconds: Vec<Option<Reply>> = vec![None; batch.len()];
        if !follow.is_empty() {
            let expected = follow.len();
            let replies = self.client.send_pipeline(follow).await?;
            if replies.len() != expected {
                return Err(ClientError::UnexpectedReply(format!("pipeline returned {} replies for {} commands", replies.len(), expected)));
            }
            for (slot, reply) in slots.into_iter().zip(replies) { seconds[slot] = Some(reply); }
        }

        let hit = (0..batch.len())
            .find(|&i| !matches!(firsts[i], Reply::Error(_)) && probe.accept(batch[i], &firsts[i], seconds[i].as_ref()))
            .map(|i| batch[i]);
        debug!(candidates = batch.len(), found = hit.is_some(), "standalone sampling done");
        Ok(hit)
    }

    fn cap(&self) -> usize { self.cap }
}

/// Walks candidates one by one with single-key round trips.
pub struct ClusterSampler<'c> {
    client: &'c dyn StoreClient,
    cap: usize,
}

impl<'c> ClusterSampler<'c> {
    pub fn new(client: &'c dyn StoreClient, cap: usize) -> Self { Self { client, cap } }
}

#[async_trait::async_trait]
impl<'c> CandidateSampler for ClusterSampler<'c> {
    async fn find_first<'k>(&self, candidates: &[&'k KeySample], probe: &dyn Probe) -> ClientResult<Option<&'k KeySample>> {
        for (checked, key) in candidates.iter().take(self.cap).enumerate() {
            let first = self.client.send_command(probe.first(key)).await?;
            if matches!(first, Reply::Error(_)) {
                continue;
            }
            let second = match probe.follow_up(key, &first) {
                Some(cmd) => Some(self.client.send_command(cmd).await?),
                None => None,
            };
            if probe.accept(key, &first, second.as_ref()) {
                debug!(checked = checked + 1, "cluster sampling hit");
                return Ok(Some(*key));
            }
        }
        Ok(None)
    }

    fn cap(&self) -> usize { self.cap }
}

/// Strategy for the input's topology. Cluster probing goes through the
/// cluster-level client when one is supplied.
pub fn sampler_for(input: &RecommendationInput, cap: usize) -> Box<dyn CandidateSampler + '_> {
    match input.topology() {
        ConnectionType::Standalone => Box::new(StandaloneSampler::new(input.client.as_ref(), cap)),
        ConnectionType::Cluster => {
            let client = input.global_client.as_deref().unwrap_or(input.client.as_ref());
            Box::new(ClusterSampler::new(client, cap))
        }
    }
}
