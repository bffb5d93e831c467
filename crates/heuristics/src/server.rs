//! Server-state heuristics: one INFO / ACL / CONFIG round trip each.

use anyhow::{anyhow, Context, Result};
use advisor_client::{config_get, ClientError, Command, ConnectionType, Reply};
use advisor_core::{Recommendation, RecommendationName as N, Thresholds};
use tracing::debug;

use crate::version::version_lt;
use crate::RecommendationInput;

/// Read `section.field`, preferring the INFO already carried by the input.
pub(crate) async fn info_value(input: &RecommendationInput, section: &str, field: &str) -> Result<Option<String>> {
    if let Some(v) = input.info.as_ref().and_then(|i| i.get(section, field)) {
        return Ok(Some(v.to_string()));
    }
    let info = input
        .client
        .get_info(Some(section))
        .await
        .with_context(|| format!("fetching INFO {}", section))?;
    Ok(info.get(section, field).map(str::to_string))
}

/// Numeric INFO field; a missing field is `None`, a malformed one an error.
pub(crate) async fn info_number(input: &RecommendationInput, section: &str, field: &str) -> Result<Option<u64>> {
    match info_value(input, section, field).await? {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .with_context(|| format!("parsing {}:{}={:?}", section, field, raw)),
        None => Ok(None),
    }
}

pub async fn lua_script(input: &RecommendationInput, t: &Thresholds) -> Result<Option<Recommendation>> {
    let scripts = info_number(input, "memory", "number_of_cached_scripts").await?;
    Ok(scripts.filter(|n| *n > t.max_lua_scripts).map(|_| Recommendation::bare(N::LuaScript)))
}

pub async fn avoid_logical_databases(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    if input.topology() == ConnectionType::Cluster {
        return Ok(None);
    }
    let keyspace = match input.info.as_ref().filter(|i| i.section("keyspace").is_some()) {
        Some(info) => info.keyspace(),
        None => input.client.get_info(Some("keyspace")).await.context("fetching INFO keyspace")?.keyspace(),
    };
    let populated = keyspace.iter().filter(|db| db.keys > 0).count();
    debug!(populated, "logical databases with keys");
    Ok((populated > 1).then(|| Recommendation::bare(N::AvoidLogicalDatabases)))
}

pub async fn big_amount_of_connected_clients(input: &RecommendationInput, t: &Thresholds) -> Result<Option<Recommendation>> {
    let clients = info_number(input, "clients", "connected_clients").await?;
    Ok(clients.filter(|n| *n > t.max_connected_clients).map(|_| Recommendation::bare(N::BigAmountOfConnectedClients)))
}

/// True when an ACL rule line describes an enabled user without a password.
fn open_user(rule: &str) -> bool {
    let tokens: Vec<&str> = rule.split_whitespace().collect();
    tokens.contains(&"on") && tokens.contains(&"nopass")
}

pub async fn set_password(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    let acl = input.client.send_command(Command::new("ACL").arg("LIST")).await.and_then(Reply::into_result);
    match acl {
        Ok(reply) => {
            let rules = reply.as_array().ok_or_else(|| anyhow!("ACL LIST returned {:?}", reply))?;
            let open = rules.iter().filter_map(|r| r.as_text()).any(|r| open_user(&r));
            Ok(open.then(|| Recommendation::bare(N::SetPassword)))
        }
        // Servers without ACL support answer with an error reply; fall back to requirepass.
        Err(ClientError::Server(msg)) => {
            debug!(error = %msg, "ACL LIST unsupported; checking requirepass");
            let pass = config_get(input.client.as_ref(), "requirepass").await.context("CONFIG GET requirepass")?;
            let empty = pass.map(|p| p.is_empty()).unwrap_or(true);
            Ok(empty.then(|| Recommendation::bare(N::SetPassword)))
        }
        Err(e) => Err(e).context("ACL LIST"),
    }
}

pub async fn redis_version(input: &RecommendationInput, t: &Thresholds) -> Result<Option<Recommendation>> {
    let Some(version) = info_value(input, "server", "redis_version").await? else { return Ok(None) };
    let outdated = version_lt(&version, &t.min_redis_version)
        .ok_or_else(|| anyhow!("cannot compare versions {:?} and {:?}", version, t.min_redis_version))?;
    debug!(version = %version, min = %t.min_redis_version, outdated, "server version checked");
    Ok(outdated.then(|| Recommendation::bare(N::RedisVersion)))
}
