//! Payload injection driver.
//!
//! Walks probe URL x modifier x payload, skips anything already recorded,
//! renders the rest through a bounded worker pool and appends rendered
//! targets to the result file in batches. A render counts as "tested"; no
//! attempt is made to decide whether the payload fired.

use crate::core::rate_limit::Jitter;
use crate::core::shutdown::Shutdown;
use crate::payload::{load_payloads, Combinations};
use crate::render::RenderBackend;
use crate::store::LineStore;
use crate::xss::processed::ProcessedSet;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_XSS_WORKERS: usize = 4;
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct DriverOptions {
    pub workers: usize,
    pub batch_size: usize,
    pub render_timeout: Duration,
    pub jitter: Jitter,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_XSS_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            jitter: Jitter::from_millis(150, 170),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InjectionStats {
    pub probe_urls: usize,
    pub payloads: usize,
    /// Full cross-product size before filtering
    pub combinations: usize,
    pub previously_recorded: usize,
    pub skipped: usize,
    pub dispatched: usize,
    pub rendered: usize,
    pub failed: usize,
    pub batches_written: usize,
    pub interrupted: bool,
}

pub struct InjectionDriver<'a> {
    backend: &'a dyn RenderBackend,
    options: DriverOptions,
    shutdown: Shutdown,
}

impl<'a> InjectionDriver<'a> {
    pub fn new(backend: &'a dyn RenderBackend, options: DriverOptions, shutdown: Shutdown) -> Self {
        Self {
            backend,
            options: DriverOptions {
                workers: options.workers.max(1),
                batch_size: options.batch_size.max(1),
                ..options
            },
            shutdown,
        }
    }

    pub async fn run<P: AsRef<Path>>(
        &self,
        probes: &LineStore,
        payloads: P,
        results: &LineStore,
    ) -> anyhow::Result<InjectionStats> {
        let probe_urls = probes.read_or_empty();
        let payload_set = load_payloads(payloads);
        let mut processed = ProcessedSet::load(results);

        tracing::info!(
            "Testing {} probe URLs with {} payloads from {} via {} renderer ({} workers)",
            probe_urls.len(),
            payload_set.len(),
            payload_set.name,
            self.backend.name(),
            self.options.workers
        );

        let stats = self
            .dispatch(&probe_urls, &payload_set.payloads, &mut processed, results)
            .await;

        tracing::info!(
            "XSS test results saved to {} ({} rendered, {} failed, {} skipped)",
            results.path().display(),
            stats.rendered,
            stats.failed,
            stats.skipped
        );
        Ok(stats)
    }

    pub async fn dispatch(
        &self,
        probes: &[String],
        payloads: &[String],
        processed: &mut ProcessedSet,
        results: &LineStore,
    ) -> InjectionStats {
        let combinations = Combinations::new(probes, payloads);
        let mut stats = InjectionStats {
            probe_urls: probes.len(),
            payloads: payloads.len(),
            combinations: combinations.total(),
            previously_recorded: processed.loaded(),
            ..InjectionStats::default()
        };

        let shutdown = self.shutdown.clone();
        let mut skipped = 0usize;
        let mut dispatched = 0usize;
        let mut batch: Vec<String> = Vec::with_capacity(self.options.batch_size);

        {
            // Claiming at submission keeps identical targets from being
            // dispatched twice even while earlier ones are still in flight.
            let mut completed = stream::iter(combinations)
                .take_while(move |_| futures::future::ready(!shutdown.is_triggered()))
                .filter_map(|combo| {
                    let target = combo.target();
                    let fresh = processed.claim(&target);
                    if fresh {
                        dispatched += 1;
                    } else {
                        skipped += 1;
                    }
                    futures::future::ready(fresh.then_some(target))
                })
                .map(|target| self.attempt(target))
                .buffer_unordered(self.options.workers);

            while let Some(result) = completed.next().await {
                match result {
                    Some(target) => {
                        stats.rendered += 1;
                        batch.push(target);
                        if batch.len() >= self.options.batch_size {
                            self.flush(&mut batch, results, &mut stats);
                        }
                    }
                    None => stats.failed += 1,
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, results, &mut stats);
        }

        stats.skipped = skipped;
        stats.dispatched = dispatched;
        stats.interrupted = self.shutdown.is_triggered();
        stats
    }

    /// Render one target, then pause. Failures are logged and dropped.
    async fn attempt(&self, target: String) -> Option<String> {
        let outcome = self
            .backend
            .render_and_wait(&target, self.options.render_timeout)
            .await;

        let result = match outcome {
            Ok(_) => {
                tracing::info!("Tested XSS: {}", target);
                Some(target)
            }
            Err(e) => {
                tracing::error!("Error testing {}: {}", target, e);
                None
            }
        };

        self.options.jitter.pause().await;
        result
    }

    fn flush(&self, batch: &mut Vec<String>, results: &LineStore, stats: &mut InjectionStats) {
        match results.append(batch.iter()) {
            Ok(n) => {
                stats.batches_written += 1;
                tracing::debug!("Saved {} results to {}", n, results.path().display());
            }
            Err(e) => tracing::error!("Error writing to {}: {:#}", results.path().display(), e),
        }
        batch.clear();
    }
}
