//! Advisor store client surface.
//!
//! The engine never speaks a wire protocol itself. It consumes this trait and
//! issues read-only commands, pipelines and INFO fetches through it. A real
//! connection (standalone node or cluster router) lives outside this
//! workspace; `MockClient` provides a scriptable in-memory double.

#![forbid(unsafe_code)]

use std::borrow::Cow;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod info;
pub mod mock;

pub use info::{Info, KeyspaceEntry};
pub use mock::MockClient;

/// Topology of the logical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Standalone,
    Cluster,
}

/// Client errors surfaced to heuristics.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("server: {0}")]
    Server(String),
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
    #[error("no scripted reply for: {0}")]
    NoScript(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// A single command: name followed by its arguments, all binary safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: SmallVec<[Bytes; 4]>,
}

impl Command {
    pub fn new(name: &'static str) -> Self {
        let mut args = SmallVec::new();
        args.push(Bytes::from_static(name.as_bytes()));
        Self { args }
    }

    pub fn arg(mut self, a: impl Into<Bytes>) -> Self {
        self.args.push(a.into());
        self
    }

    pub fn args(&self) -> &[Bytes] { &self.args }

    /// Upper-cased command name.
    pub fn name(&self) -> String {
        self.args.first().map(|a| String::from_utf8_lossy(a).to_ascii_uppercase()).unwrap_or_default()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<Cow<'_, str>> = self.args.iter().map(|a| String::from_utf8_lossy(a)).collect();
        f.write_str(&parts.join(" "))
    }
}

/// Decoded reply value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Int(i64),
    Bulk(Bytes),
    Status(String),
    Array(Vec<Reply>),
    /// Per-command server error (e.g. inside a pipeline).
    Error(String),
}

impl Reply {
    pub fn bulk(v: impl Into<Bytes>) -> Self { Reply::Bulk(v.into()) }

    pub fn array<I: IntoIterator<Item = Reply>>(items: I) -> Self { Reply::Array(items.into_iter().collect()) }

    /// Array of bulk strings, the common shape of list-like replies.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        Reply::Array(items.into_iter().map(|s| Reply::Bulk(s.into())).collect())
    }

    pub fn is_nil(&self) -> bool { matches!(self, Reply::Nil) }

    /// Text view of bulk/status/integer replies.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Reply::Bulk(b) => Some(String::from_utf8_lossy(b)),
            Reply::Status(s) => Some(Cow::Borrowed(s.as_str())),
            Reply::Int(i) => Some(Cow::Owned(i.to_string())),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::Bulk(b) => Some(b),
            Reply::Status(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(i) => Some(*i),
            _ => self.as_text().and_then(|t| t.trim().parse().ok()),
        }
    }

    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Turn an error reply into `ClientError::Server`.
    pub fn into_result(self) -> ClientResult<Reply> {
        match self {
            Reply::Error(msg) => Err(ClientError::Server(msg)),
            other => Ok(other),
        }
    }
}

/// Read-only view of one logical store connection.
///
/// Implementations must accept concurrent calls on `&self`; the engine issues
/// commands from many heuristics at once and does not serialize them.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    async fn send_command(&self, cmd: Command) -> ClientResult<Reply>;

    /// Send commands in one round trip. Replies come back in command order;
    /// per-command failures are `Reply::Error`.
    async fn send_pipeline(&self, cmds: Vec<Command>) -> ClientResult<Vec<Reply>>;

    /// Fetch and parse `INFO [section]`.
    async fn get_info(&self, section: Option<&str>) -> ClientResult<Info> {
        let cmd = match section {
            Some(s) => Command::new("INFO").arg(s.to_string()),
            None => Command::new("INFO"),
        };
        let reply = self.send_command(cmd).await?.into_result()?;
        let text = reply
            .as_text()
            .ok_or_else(|| ClientError::UnexpectedReply(format!("INFO returned {:?}", reply)))?;
        Ok(Info::parse(&text))
    }

    fn connection_type(&self) -> ConnectionType;
}

/// `CONFIG GET <name>`; `None` when the server does not know the parameter.
pub async fn config_get(client: &dyn StoreClient, name: &str) -> ClientResult<Option<String>> {
    let reply = client
        .send_command(Command::new("CONFIG").arg("GET").arg(name.to_string()))
        .await?
        .into_result()?;
    let items = reply
        .as_array()
        .ok_or_else(|| ClientError::UnexpectedReply(format!("CONFIG GET {} returned {:?}", name, reply)))?;
    // Reply is a flat [name, value, name, value, ...] list.
    let value = items
        .chunks(2)
        .find(|pair| pair.first().and_then(|n| n.as_text()).map(|n| n.eq_ignore_ascii_case(name)).unwrap_or(false))
        .and_then(|pair| pair.get(1))
        .and_then(|v| v.as_text())
        .map(|v| v.into_owned());
    Ok(value)
}
