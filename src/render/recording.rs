//! In-memory backend that records every navigation.

use crate::render::RenderBackend;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct RecordingRenderer {
    visited: Mutex<Vec<String>>,
    failing: HashSet<String>,
    closed: AtomicBool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigations to these targets fail.
    pub fn failing_on<I: IntoIterator<Item = String>>(targets: I) -> Self {
        Self {
            failing: targets.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderBackend for RecordingRenderer {
    async fn render_and_wait(&self, url: &str, _timeout: Duration) -> anyhow::Result<String> {
        self.visited.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            anyhow::bail!("navigation failed: {}", url);
        }
        Ok("<html><head></head><body></body></html>".to_string())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
