//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the processor, including:
//! - Building HTTP clients with a user agent and bounded timeouts
//! - Normalizing bare URLs to `https://`
//! - GET requests to fetch page content
//! - Error classification into network and HTTP failures

use crate::config::HttpConfig;
use crate::{FetchError, FetchResult};
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use bracket_fetch::config::HttpConfig;
/// use bracket_fetch::processor::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Prefixes `https://` unless the URL already carries an http(s) scheme
pub fn format_url(url: &str) -> String {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Fetches a URL and returns its body as text
///
/// # Error Mapping
///
/// | Condition | Error |
/// |-----------|-------|
/// | Timeout | `Network` ("Request timeout") |
/// | Connect failure, DNS, TLS | `Network` |
/// | Non-2xx status | `Http` with the status code |
/// | Body read failure | `Network` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch, already normalized
pub async fn fetch_body(client: &Client, url: &str) -> FetchResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| network_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| network_error(url, &e))
}

fn network_error(url: &str, e: &reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        "Request timeout".to_string()
    } else {
        e.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
