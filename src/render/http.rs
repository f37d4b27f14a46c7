use crate::http::client::HttpClient;
use crate::render::RenderBackend;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Fetches the target over plain HTTP and returns the parsed document.
/// No script runs; the session is the shared HTTP connection pool.
pub struct HttpRenderer {
    client: HttpClient,
}

impl HttpRenderer {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

/// Serialized document, or `None` when parsing produced no `<body>`
/// (frameset documents).
fn rendered_document(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let body = Selector::parse("body").ok()?;
    document.select(&body).next()?;
    Some(document.root_element().html())
}

#[async_trait]
impl RenderBackend for HttpRenderer {
    async fn render_and_wait(&self, url: &str, timeout: Duration) -> anyhow::Result<String> {
        let target = Url::parse(url)?;
        let resp = tokio::time::timeout(timeout, self.client.get(&target))
            .await
            .map_err(|_| anyhow::anyhow!("Timed out after {:?} waiting for {}", timeout, url))??;

        rendered_document(&resp.body_text())
            .ok_or_else(|| anyhow::anyhow!("No <body> element in {}", url))
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
