//! Function-library heuristics: migration hints for servers without libraries.

use anyhow::{anyhow, Context, Result};
use advisor_client::{config_get, ClientError, Command, Reply};
use advisor_core::{KeyType, Recommendation, RecommendationName as N};
use tracing::debug;

use crate::sample::first_of;
use crate::server::info_number;
use crate::RecommendationInput;

fn library_names(reply: &Reply) -> Result<Vec<String>> {
    let libs = reply.as_array().ok_or_else(|| anyhow!("FUNCTION LIST returned {:?}", reply))?;
    let mut names = Vec::with_capacity(libs.len());
    for lib in libs {
        let fields = lib.as_array().ok_or_else(|| anyhow!("library entry {:?}", lib))?;
        let name = fields
            .chunks(2)
            .find(|pair| pair.first().and_then(Reply::as_text).map(|k| k == "library_name").unwrap_or(false))
            .and_then(|pair| pair.get(1))
            .and_then(Reply::as_text)
            .ok_or_else(|| anyhow!("library entry without library_name"))?;
        names.push(name.into_owned());
    }
    Ok(names)
}

/// Loaded libraries from the input, else `FUNCTION LIST`. `None` when the
/// server has no function support.
pub(crate) async fn loaded_libraries(input: &RecommendationInput) -> Result<Option<Vec<String>>> {
    if let Some(libs) = &input.libraries {
        return Ok(Some(libs.clone()));
    }
    match input.client.send_command(Command::new("FUNCTION").arg("LIST")).await.and_then(Reply::into_result) {
        Ok(reply) => library_names(&reply).map(Some),
        Err(ClientError::Server(msg)) => {
            debug!(error = %msg, "functions unsupported");
            Ok(None)
        }
        Err(e) => Err(e).context("FUNCTION LIST"),
    }
}

async fn without_libraries(input: &RecommendationInput) -> Result<bool> {
    Ok(matches!(loaded_libraries(input).await?, Some(libs) if libs.is_empty()))
}

pub async fn lua_to_functions(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    if !without_libraries(input).await? {
        return Ok(None);
    }
    let scripts = info_number(input, "memory", "number_of_cached_scripts").await?;
    Ok(scripts.filter(|n| *n > 0).map(|_| Recommendation::bare(N::LuaToFunctions)))
}

pub async fn functions_with_keyspace(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    if !without_libraries(input).await? {
        return Ok(None);
    }
    let events = config_get(input.client.as_ref(), "notify-keyspace-events")
        .await
        .context("CONFIG GET notify-keyspace-events")?;
    // Notifications only fire with a keyspace (K) or keyevent (E) class.
    let enabled = events.map(|e| e.contains('K') || e.contains('E')).unwrap_or(false);
    Ok(enabled.then(|| Recommendation::bare(N::FunctionsWithKeyspace)))
}

pub async fn functions_with_streams(input: &RecommendationInput) -> Result<Option<Recommendation>> {
    let Some(stream) = first_of(&input.keys, &KeyType::Stream, |_| true) else { return Ok(None) };
    if !without_libraries(input).await? {
        return Ok(None);
    }
    Ok(Some(Recommendation::for_key(N::FunctionsWithStreams, &stream.name)))
}
