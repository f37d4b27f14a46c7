//! HTTP client with browser-like headers, rate limiting, and cookie support

use crate::core::rate_limit::RateLimiter;
use crate::http::response::HttpResponse;
use anyhow::Result;
use reqwest::{header, redirect::Policy, Client};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub timeout: Duration,
    pub cookies: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            cookies: None,
            headers: HashMap::new(),
        }
    }
}

/// Cheap to clone; clones share the connection pool and the limiter.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    limiter: RateLimiter,
}

impl HttpClient {
    pub fn new(options: ClientOptions, limiter: RateLimiter) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static(DEFAULT_ACCEPT));

        for (key, value) in &options.headers {
            match (
                header::HeaderName::from_bytes(key.as_bytes()),
                header::HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    default_headers.insert(name, value);
                }
                _ => tracing::warn!("Ignoring malformed header {}: {}", key, value),
            }
        }

        if let Some(ref cookies) = options.cookies {
            default_headers.insert(header::COOKIE, header::HeaderValue::from_str(cookies)?);
        }

        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(default_headers)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(true)
            .redirect(Policy::limited(10))
            .build()?;

        Ok(Self { client, limiter })
    }

    /// Client with default headers and no rate limit
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientOptions::default(), RateLimiter::unlimited())
    }

    pub async fn get(&self, url: &Url) -> Result<HttpResponse> {
        self.limiter.wait().await;

        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await?.to_vec();
        let elapsed_ms = start.elapsed().as_millis();

        tracing::debug!(
            "GET {} -> {} ({} bytes, {}, {}ms)",
            url,
            status,
            body.len(),
            content_type.as_deref().unwrap_or("no content-type"),
            elapsed_ms
        );
        if final_url != *url {
            tracing::debug!("  redirected to {}", final_url);
        }

        Ok(HttpResponse {
            status,
            final_url,
            content_type,
            body,
            elapsed_ms,
        })
    }

    /// GET `url` and return its body, failing on transport errors and
    /// non-2xx statuses.
    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        let resp = self.get(url).await?;
        if !resp.is_success() {
            anyhow::bail!("HTTP {} for {}", resp.status, url);
        }
        Ok(resp.body_text())
    }
}
