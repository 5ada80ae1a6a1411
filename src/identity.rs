use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::engine::score_keeper::ANONYMOUS;

#[derive(Debug, Deserialize)]
struct InitResponse {
    #[serde(default)]
    username: Option<String>,
}

/// Pull a usable username out of an init response body. Missing, blank or
/// `anonymous` names all mean "no identity".
pub fn parse_username(body: &str) -> Result<Option<String>> {
    let response: InitResponse = serde_json::from_str(body)?;
    Ok(response
        .username
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && name != ANONYMOUS))
}

#[cfg(feature = "network")]
pub fn fetch_username(url: &str, timeout: Duration) -> Result<Option<String>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let body = client.get(url).send()?.error_for_status()?.text()?;
    parse_username(&body)
}

#[cfg(not(feature = "network"))]
pub fn fetch_username(_url: &str, _timeout: Duration) -> Result<Option<String>> {
    Ok(None)
}

/// Best-effort lookup. Any failure is logged and treated as anonymous.
pub fn resolve_username(url: &str, timeout: Duration) -> String {
    match fetch_username(url, timeout) {
        Ok(Some(name)) => {
            debug!(username = %name, "identity resolved");
            name
        }
        Ok(None) => ANONYMOUS.to_string(),
        Err(e) => {
            warn!(error = %e, url, "identity lookup failed, staying anonymous");
            ANONYMOUS.to_string()
        }
    }
}
