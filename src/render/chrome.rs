//! Headless Chromium backend.
//!
//! One browser, one page. Navigation is serialized behind the page mutex so
//! concurrent workers never drive the same page at once.

use crate::render::RenderBackend;
use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub struct ChromeRenderer {
    browser: Mutex<Option<Browser>>,
    page: Mutex<Page>,
    handler: JoinHandle<()>,
}

impl ChromeRenderer {
    pub async fn launch() -> anyhow::Result<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| anyhow::anyhow!("Browser config error: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch Chrome/Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        tracing::info!("Headless browser session started");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page: Mutex::new(page),
            handler,
        })
    }
}

#[async_trait]
impl RenderBackend for ChromeRenderer {
    async fn render_and_wait(&self, url: &str, timeout: Duration) -> anyhow::Result<String> {
        let page = self.page.lock().await;

        let render = async {
            page.goto(url).await?;
            page.find_element("body").await?;
            let html = page.content().await?;
            Ok::<_, anyhow::Error>(html)
        };

        tokio::time::timeout(timeout, render)
            .await
            .map_err(|_| anyhow::anyhow!("Timed out after {:?} waiting for {}", timeout, url))?
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        let mut outcome = Ok(());

        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(e) = browser.close().await {
                tracing::error!("Error closing headless browser: {}", e);
                outcome = Err(anyhow::anyhow!("Browser close failed: {}", e));
            }
            match browser.wait().await {
                Ok(_) => tracing::info!("Headless browser closed"),
                Err(e) => tracing::warn!("Browser process did not exit cleanly: {}", e),
            }
        }

        // Handler task never outlives the session
        self.handler.abort();
        outcome
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a local Chrome/Chromium binary
    #[tokio::test]
    #[ignore]
    async fn test_shutdown_is_idempotent() {
        let renderer = ChromeRenderer::launch().await.unwrap();
        let dom = renderer
            .render_and_wait("about:blank", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(dom.contains("<body"));

        renderer.shutdown().await.unwrap();
        assert!(renderer.browser.lock().await.is_none());
        renderer.shutdown().await.unwrap();
    }
}
