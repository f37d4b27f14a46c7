//! Page-rendering backends used by the injection driver.
//!
//! A backend is one owned session: the engine builds it, hands it to the
//! driver by reference, and calls [`RenderBackend::shutdown`] on every exit
//! path of the injection stage.

use crate::http::client::HttpClient;
use async_trait::async_trait;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "browser")]
pub mod chrome;
pub mod http;
#[cfg(test)]
pub mod recording;

pub use http::HttpRenderer;

#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Navigate to `url`, wait up to `timeout` for the document body, and
    /// return the final DOM.
    async fn render_and_wait(&self, url: &str, timeout: Duration) -> anyhow::Result<String>;

    async fn shutdown(&self) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Http,
    Chrome,
}

impl FromStr for RendererKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(RendererKind::Http),
            "chrome" | "chromium" | "browser" => Ok(RendererKind::Chrome),
            other => anyhow::bail!("Unknown renderer: {}", other),
        }
    }
}

impl RendererKind {
    pub async fn launch(self, client: &HttpClient) -> anyhow::Result<Box<dyn RenderBackend>> {
        match self {
            RendererKind::Http => Ok(Box::new(HttpRenderer::new(client.clone()))),
            #[cfg(feature = "browser")]
            RendererKind::Chrome => Ok(Box::new(chrome::ChromeRenderer::launch().await?)),
            #[cfg(not(feature = "browser"))]
            RendererKind::Chrome => anyhow::bail!(
                "Chrome rendering requires the 'browser' feature. \
                 Compile with: cargo build --features browser"
            ),
        }
    }
}
