//! Where a feed document comes from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

/// A JSON document location: an `http(s)://` URL or a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            anyhow::bail!("feed source is empty");
        }
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Source::Url(value.to_string()))
        } else {
            Ok(Source::File(PathBuf::from(value)))
        }
    }

    /// Read and parse the document.
    pub async fn load_json(&self, client: &Client) -> Result<Value> {
        match self {
            Source::Url(url) => {
                let response = client
                    .get(url)
                    .header("Cache-Control", "no-cache")
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch {}", url))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(anyhow::anyhow!("Fetch of {} failed: {} {}", url, status, body));
                }

                response
                    .json::<Value>()
                    .await
                    .with_context(|| format!("Failed to parse response from {}", url))
            }
            Source::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse {}", path.display()))
            }
        }
    }
}

impl FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Source::parse(s)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}
