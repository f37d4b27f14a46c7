//! Pipeline orchestrator.
//!
//! Runs the stages a mode asks for, in order, over the files connecting
//! them. An interrupted stage ends the run; the rendering backend is shut
//! down on every exit path of the injection stage.

use crate::core::context::{Context, Pipeline};
use crate::core::rate_limit::RateLimiter;
use crate::core::shutdown::Shutdown;
use crate::http::client::HttpClient;
use crate::render::RenderBackend;
use crate::reporting::{json, text, RunSummary};
use crate::scanner::crawler::{CrawlOutcome, Crawler};
use crate::scanner::params::{ExtractStats, ParamExtractor};
use crate::store::LineStore;
use crate::xss::driver::{InjectionDriver, InjectionStats};
use std::path::Path;

pub struct Engine {
    ctx: Context,
    shutdown: Shutdown,
}

impl Engine {
    pub fn new(ctx: Context) -> anyhow::Result<Self> {
        Ok(Self {
            ctx,
            shutdown: Shutdown::new(),
        })
    }

    /// Handle tripped by Ctrl-C once [`Shutdown::listen`] is called on it.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let pipeline = &self.ctx.pipeline;
        let mut summary = RunSummary::new(pipeline.name(), &pipeline.target());

        tracing::info!("Starting {} run against {}", pipeline.name(), pipeline.target());
        if self.ctx.rate_limit > 0 {
            tracing::info!("Rate limit: {} req/sec", self.ctx.rate_limit);
        }
        if self.ctx.client.cookies.is_some() {
            tracing::info!("  Cookie: <redacted>");
        }
        if !self.ctx.client.headers.is_empty() {
            tracing::info!("  Custom headers: {}", self.ctx.client.headers.len());
        }

        let client = HttpClient::new(
            self.ctx.client.clone(),
            RateLimiter::new(self.ctx.rate_limit),
        )?;

        match pipeline {
            Pipeline::Full {
                target,
                mapped_sites,
                parameters,
                payloads,
            } => {
                let mapped = LineStore::new(mapped_sites);
                let crawler = Crawler::new(
                    client.clone(),
                    self.ctx.flush_threshold,
                    self.shutdown.clone(),
                );

                match crawler.crawl(target, &mapped).await? {
                    CrawlOutcome::Completed(stats) => summary.crawl = Some(stats),
                    CrawlOutcome::NoSitemap => {
                        summary.aborted = true;
                        summary.finish();
                        return Ok(summary);
                    }
                }

                if !summary.interrupted() {
                    let probes = LineStore::new(parameters);
                    summary.extract = Some(self.extract(&client, &mapped, &probes).await?);

                    if !summary.interrupted() {
                        summary.inject = Some(self.inject(&client, &probes, payloads).await?);
                    }
                }
            }
            Pipeline::Params { urls, output } => {
                let stats = self
                    .extract(&client, &LineStore::new(urls), &LineStore::new(output))
                    .await?;
                summary.extract = Some(stats);
            }
            Pipeline::Xss { probes, payloads } => {
                let stats = self
                    .inject(&client, &LineStore::new(probes), payloads)
                    .await?;
                summary.inject = Some(stats);
            }
        }

        summary.finish();
        tracing::info!("{} run finished", pipeline.name());
        Ok(summary)
    }

    async fn extract(
        &self,
        client: &HttpClient,
        input: &LineStore,
        output: &LineStore,
    ) -> anyhow::Result<ExtractStats> {
        let extractor = ParamExtractor::new(
            client.clone(),
            self.ctx.scanner.build(),
            self.ctx.param_workers,
            self.shutdown.clone(),
        );
        extractor.extract_all(input, output).await
    }

    async fn inject(
        &self,
        client: &HttpClient,
        probes: &LineStore,
        payloads: &Path,
    ) -> anyhow::Result<InjectionStats> {
        let backend = self.ctx.renderer.launch(client).await?;
        tracing::info!("Rendering backend ready: {}", backend.name());
        self.inject_with(backend.as_ref(), probes, payloads).await
    }

    /// Drive `backend` over the combinations, then shut it down whatever
    /// the driver returned.
    async fn inject_with(
        &self,
        backend: &dyn RenderBackend,
        probes: &LineStore,
        payloads: &Path,
    ) -> anyhow::Result<InjectionStats> {
        let results = LineStore::new(&self.ctx.results_file);
        let driver = InjectionDriver::new(backend, self.ctx.driver, self.shutdown.clone());
        let outcome = driver.run(probes, payloads, &results).await;

        if let Err(e) = backend.shutdown().await {
            tracing::warn!("Rendering backend shutdown failed: {:#}", e);
        }
        outcome
    }

    /// Print the summary and write the JSON report when one was requested.
    pub fn report(&self, summary: &RunSummary) -> anyhow::Result<()> {
        if !self.ctx.quiet {
            text::print(summary);
        }

        if let Some(ref path) = self.ctx.report_file {
            json::write(summary, path)?;
            tracing::info!("Report written to {}", path.display());
        }
        Ok(())
    }
}
