//! Certificate-transparency discovery via crt.sh.
//!
//! The response body is handled by a two-variant parser: strict JSON-array
//! extraction of the `name_value` field, with a regex sweep over the raw
//! text as the fallback when JSON extraction yields nothing. The text sweep
//! is scoped to the target domain so error pages cannot inject unrelated
//! hosts. Both variants strip the leading `*.` wildcard marker from every
//! extracted name.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{CtConfig, HttpConfig};

/// Hostname-shaped strings, wildcard prefix included, for text-mode parsing.
static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\*\.)?[A-Za-z0-9][A-Za-z0-9_-]*(?:\.[A-Za-z0-9][A-Za-z0-9_-]*)+")
        .expect("hostname regex is valid")
});

/// One entry from the crt.sh JSON API. Only `name_value` matters here; it
/// carries the certificate SANs, newline-separated.
#[derive(Debug, Deserialize)]
struct CrtShEntry {
    name_value: Option<String>,
}

/// Parser variants for the CT response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtParser {
    Json,
    Text,
}

impl CtParser {
    /// Extract candidate hostnames from a response body. Wildcard markers
    /// are stripped; blank names are dropped. Order follows the body.
    pub fn extract(&self, body: &str, target: &str) -> Vec<String> {
        match self {
            CtParser::Json => Self::extract_json(body),
            CtParser::Text => Self::extract_text(body, target),
        }
    }

    fn extract_json(body: &str) -> Vec<String> {
        let entries: Vec<CrtShEntry> = match serde_json::from_str(body) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut names = Vec::new();
        for entry in entries {
            if let Some(name_value) = entry.name_value {
                for name in name_value.lines() {
                    if let Some(cleaned) = clean_name(name) {
                        names.push(cleaned);
                    }
                }
            }
        }
        names
    }

    /// The text sweep only keeps names under the target domain. An error
    /// page mentions plenty of unrelated infrastructure (the CT endpoint
    /// itself, CA status hosts); those must never enter the candidate pool.
    fn extract_text(body: &str, target: &str) -> Vec<String> {
        HOSTNAME_REGEX
            .find_iter(body)
            .filter_map(|m| clean_name(m.as_str()))
            .filter(|name| belongs_to_target(name, target))
            .collect()
    }
}

/// Strip whitespace and a leading `*.` wildcard marker.
fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_prefix("*.").unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// True when `name` is the target domain or one of its subdomains
/// (case-insensitive).
fn belongs_to_target(name: &str, target: &str) -> bool {
    let name = name.to_lowercase();
    let target = target.to_lowercase();
    name == target || name.ends_with(&format!(".{}", target))
}

/// Extract hostnames from a CT response: JSON-array mode first, with the
/// target-scoped plain-text sweep as the fallback whenever JSON mode yields
/// nothing (non-JSON bodies, but also JSON error objects).
pub fn extract_hostnames(body: &str, target: &str) -> Vec<String> {
    let names = CtParser::Json.extract(body, target);
    if !names.is_empty() {
        return names;
    }
    debug!("CT response yielded no JSON entries, falling back to text extraction");
    CtParser::Text.extract(body, target)
}

pub struct CtLogClient {
    client: Client,
    base_url: String,
}

impl CtLogClient {
    pub fn new(http: &HttpConfig, ct: &CtConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .user_agent(http.user_agent.clone())
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: ct.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client against an explicit endpoint, used by tests with a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(&HttpConfig::default(), &CtConfig {
            base_url: base_url.into(),
        })
    }

    /// Query the CT endpoint for certificates matching `%.<target>` and
    /// return the extracted (wildcard-stripped) hostnames.
    pub async fn fetch(&self, domain: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/?q=%25.{}&output=json",
            self.base_url,
            urlencoding::encode(domain)
        );
        debug!("Querying CT logs: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("CT query failed for {}", domain))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "CT endpoint returned status {} for {}",
                response.status(),
                domain
            ));
        }

        let body = response.text().await.context("Failed to read CT response body")?;
        if body.is_empty() || body == "[]" {
            return Ok(Vec::new());
        }

        let names = extract_hostnames(&body, domain);
        if names.is_empty() {
            warn!("CT response for {} yielded no hostnames", domain);
        }
        Ok(names)
    }
}
