//! URL processor: fetch a page and summarize it
//!
//! This module contains:
//! - HTTP fetching with URL normalization and error classification
//! - Title and email extraction
//! - Keyed email obfuscation

mod extract;
mod fetcher;
mod hash;

pub use extract::{extract_email, extract_page_details, PageDetails};
pub use fetcher::{build_http_client, fetch_body, format_url};
pub use hash::hash_email;

use crate::config::{HttpConfig, Secret};
use crate::FetchResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Summary of one successfully processed URL
///
/// Serialized as one JSON object per output line. Missing fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlInfo {
    /// The URL as it was discovered in the input
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HMAC-SHA256 hex digest of the first email found on the page
    #[serde(
        rename = "emailHash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub email_hash: Option<String>,
}

impl UrlInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            email_hash: None,
        }
    }
}

/// Anything that can turn a URL into a [`UrlInfo`]
///
/// The scheduler only depends on this trait, so tests can drive it with
/// scripted processors instead of the network.
#[async_trait]
pub trait UrlProcessor: Send + Sync {
    async fn process(&self, url: &str) -> FetchResult<UrlInfo>;
}

/// Processor backed by a real HTTP client
pub struct HttpUrlProcessor {
    client: Client,
    secret: Secret,
}

impl HttpUrlProcessor {
    /// Creates a processor with a client built from `config`
    pub fn new(config: &HttpConfig, secret: Secret) -> FetchResult<Self> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, secret))
    }

    /// Creates a processor around an existing client
    pub fn with_client(client: Client, secret: Secret) -> Self {
        Self { client, secret }
    }
}

#[async_trait]
impl UrlProcessor for HttpUrlProcessor {
    async fn process(&self, url: &str) -> FetchResult<UrlInfo> {
        let target = format_url(url);
        tracing::debug!("Fetching {}", target);

        let body = fetch_body(&self.client, &target).await?;
        let details = extract_page_details(&body);

        Ok(UrlInfo {
            url: url.to_string(),
            title: details.title,
            email_hash: details
                .email
                .map(|email| hash_email(&email, self.secret.expose())),
        })
    }
}
