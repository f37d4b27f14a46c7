//! Per-run counters collected from each stage.

use crate::scanner::crawler::CrawlStats;
use crate::scanner::params::ExtractStats;
use crate::xss::driver::InjectionStats;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: String,
    pub target: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub crawl: Option<CrawlStats>,
    pub extract: Option<ExtractStats>,
    pub inject: Option<InjectionStats>,
    /// Set when the sitemap could not be resolved
    pub aborted: bool,
}

impl RunSummary {
    pub fn new(mode: &str, target: &str) -> Self {
        Self {
            mode: mode.to_string(),
            target: target.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
            crawl: None,
            extract: None,
            inject: None,
            aborted: false,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Utc::now().to_rfc3339());
    }

    pub fn interrupted(&self) -> bool {
        self.crawl.as_ref().is_some_and(|c| c.interrupted)
            || self.extract.as_ref().is_some_and(|e| e.interrupted)
            || self.inject.as_ref().is_some_and(|i| i.interrupted)
    }
}
