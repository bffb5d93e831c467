//! Recorded store snapshot: sampled keys plus scripted command replies.

use std::path::Path;
use std::sync::Arc;

use advisor_client::{ConnectionType, Info, MockClient, Reply};
use advisor_core::{KeySample, Thresholds};
use advisor_engine::RecommendationInput;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FixtureReply {
    Nil,
    Int(i64),
    Text(String),
    List(Vec<FixtureReply>),
    Error { error: String },
    Status { status: String },
}

impl From<FixtureReply> for Reply {
    fn from(r: FixtureReply) -> Self {
        match r {
            FixtureReply::Nil => Reply::Nil,
            FixtureReply::Int(i) => Reply::Int(i),
            FixtureReply::Text(s) => Reply::bulk(s),
            FixtureReply::List(items) => Reply::array(items.into_iter().map(Reply::from)),
            FixtureReply::Error { error } => Reply::Error(error),
            FixtureReply::Status { status } => Reply::Status(status),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedCommand {
    /// Argument prefix the reply answers, e.g. `["INFO", "memory"]`.
    pub command: Vec<String>,
    #[serde(default)]
    pub reply: Option<FixtureReply>,
    /// Simulated transport failure instead of a reply.
    #[serde(default)]
    pub fail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub connection_type: ConnectionType,
    pub keys: Vec<KeySample>,
    pub info: Option<Info>,
    pub total: Option<u64>,
    pub indexes: Option<Vec<String>>,
    pub libraries: Option<Vec<String>>,
    pub thresholds: Option<Thresholds>,
    pub replies: Vec<ScriptedCommand>,
    /// Replies of the cluster-level client; absent means probes use `replies`.
    pub global_replies: Option<Vec<ScriptedCommand>>,
}

fn scripted(kind: ConnectionType, replies: &[ScriptedCommand]) -> MockClient {
    replies.iter().fold(MockClient::new(kind), |mock, s| match (&s.fail, &s.reply) {
        (Some(msg), _) => mock.fail(s.command.clone(), msg),
        (None, Some(reply)) => mock.on(s.command.clone(), reply.clone().into()),
        (None, None) => mock.on(s.command.clone(), Reply::Nil),
    })
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading fixture {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn client(&self) -> MockClient { scripted(self.connection_type, &self.replies) }

    pub fn global_client(&self) -> Option<MockClient> {
        self.global_replies.as_deref().map(|r| scripted(self.connection_type, r))
    }

    pub fn input(&self) -> RecommendationInput {
        let mut input = RecommendationInput::new(Arc::new(self.client())).with_keys(self.keys.clone());
        input.info = self.info.clone();
        input.total = self.total;
        input.indexes = self.indexes.clone();
        input.libraries = self.libraries.clone();
        match self.global_client() {
            Some(global) => input.with_global_client(Arc::new(global)),
            None => input,
        }
    }
}
