//! Scriptable in-memory `StoreClient` for tests and offline fixtures.
//!
//! Replies are keyed by an argument prefix; the longest matching prefix wins.
//! The command name is matched case-insensitively, other arguments exactly.
//! Every command is recorded so tests can assert which round trips happened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use tracing::trace;

use crate::{ClientError, ClientResult, Command, ConnectionType, Reply, StoreClient};

#[derive(Debug, Clone)]
enum Outcome {
    Reply(Reply),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Rule {
    prefix: Vec<Bytes>,
    outcome: Outcome,
}

impl Rule {
    fn matches(&self, cmd: &Command) -> bool {
        let args = cmd.args();
        if self.prefix.len() > args.len() { return false; }
        self.prefix.iter().zip(args.iter()).enumerate().all(|(i, (p, a))| {
            if i == 0 { p.eq_ignore_ascii_case(a) } else { p == a }
        })
    }
}

/// Recorded call: a single command or a member of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: Command,
    /// Index of the pipeline this command was part of, if any.
    pub pipeline: Option<usize>,
}

pub struct MockClient {
    kind: ConnectionType,
    rules: Vec<Rule>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    singles: AtomicUsize,
    pipelines: AtomicUsize,
}

impl MockClient {
    pub fn new(kind: ConnectionType) -> Self {
        Self {
            kind,
            rules: Vec::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
            singles: AtomicUsize::new(0),
            pipelines: AtomicUsize::new(0),
        }
    }

    pub fn standalone() -> Self { Self::new(ConnectionType::Standalone) }

    pub fn cluster() -> Self { Self::new(ConnectionType::Cluster) }

    /// Script a reply for every command starting with `prefix`.
    pub fn on<I, S>(mut self, prefix: I, reply: Reply) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        self.rules.push(Rule { prefix: prefix.into_iter().map(Into::into).collect(), outcome: Outcome::Reply(reply) });
        self
    }

    /// Simulate a transport failure for every command starting with `prefix`.
    pub fn fail<I, S>(mut self, prefix: I, message: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        self.rules.push(Rule { prefix: prefix.into_iter().map(Into::into).collect(), outcome: Outcome::Fail(message.to_string()) });
        self
    }

    /// Sleep this long before answering each round trip.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of recorded commands (pipelined ones included) named `name`.
    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.command.name().eq_ignore_ascii_case(name)).count()
    }

    pub fn pipelines(&self) -> usize { self.pipelines.load(Ordering::SeqCst) }

    /// Single commands plus pipelines.
    pub fn round_trips(&self) -> usize { self.singles.load(Ordering::SeqCst) + self.pipelines() }

    fn record(&self, command: &Command, pipeline: Option<usize>) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(RecordedCall { command: command.clone(), pipeline });
    }

    fn resolve(&self, cmd: &Command) -> ClientResult<Reply> {
        let rule = self
            .rules
            .iter()
            .filter(|r| r.matches(cmd))
            .max_by_key(|r| r.prefix.len())
            .ok_or_else(|| ClientError::NoScript(cmd.to_string()))?;
        match &rule.outcome {
            Outcome::Reply(r) => Ok(r.clone()),
            Outcome::Fail(msg) => Err(ClientError::Transport(msg.clone())),
        }
    }

    async fn pause(&self) {
        if let Some(d) = self.delay { tokio::time::sleep(d).await; }
    }
}

#[async_trait::async_trait]
impl StoreClient for MockClient {
    async fn send_command(&self, cmd: Command) -> ClientResult<Reply> {
        self.singles.fetch_add(1, Ordering::SeqCst);
        self.record(&cmd, None);
        trace!(cmd = %cmd, "mock: command");
        self.pause().await;
        self.resolve(&cmd)
    }

    async fn send_pipeline(&self, cmds: Vec<Command>) -> ClientResult<Vec<Reply>> {
        let id = self.pipelines.fetch_add(1, Ordering::SeqCst);
        for c in &cmds { self.record(c, Some(id)); }
        trace!(len = cmds.len(), "mock: pipeline");
        self.pause().await;
        cmds.iter().map(|c| self.resolve(c)).collect()
    }

    fn connection_type(&self) -> ConnectionType { self.kind }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn longest_prefix_wins() {
        let m = MockClient::standalone()
            .on(["TYPE"], Reply::Status("none".into()))
            .on(["TYPE", "user:1"], Reply::Status("hash".into()));
        assert_eq!(m.send_command(Command::new("TYPE").arg("user:1")).await.unwrap(), Reply::Status("hash".into()));
        assert_eq!(m.send_command(Command::new("type").arg("other")).await.unwrap(), Reply::Status("none".into()));
        assert_eq!(m.round_trips(), 2);
    }

    #[tokio::test]
    async fn unscripted_and_failing_commands() {
        let m = MockClient::standalone().fail(["ACL"], "connection reset");
        assert_eq!(m.send_command(Command::new("ACL").arg("LIST")).await, Err(ClientError::Transport("connection reset".into())));
        assert!(matches!(m.send_command(Command::new("GET").arg("k")).await, Err(ClientError::NoScript(_))));
    }

    #[tokio::test]
    async fn pipeline_is_one_round_trip() {
        let m = MockClient::cluster().on(["GET"], Reply::bulk("v"));
        let out = m.send_pipeline(vec![Command::new("GET").arg("a"), Command::new("GET").arg("b")]).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(m.pipelines(), 1);
        assert_eq!(m.round_trips(), 1);
        assert_eq!(m.count("get"), 2);
        assert!(m.calls().iter().all(|c| c.pipeline == Some(0)));
        assert_eq!(m.connection_type(), ConnectionType::Cluster);
    }
}
