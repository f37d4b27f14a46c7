//! Breadth-first sitemap crawler.
//!
//! Resolves a starting sitemap for a seed, walks nested sitemap indices
//! once each, and streams discovered content URLs to a [`LineStore`] in
//! bounded batches.

use crate::core::shutdown::Shutdown;
use crate::http::client::HttpClient;
use crate::scanner::sitemap::{
    extract_content_urls, extract_nested_sitemaps, is_sitemap_seed, origin_of, parse_seed,
    robots_sitemap,
};
use crate::store::LineStore;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet, VecDeque};
use url::Url;

pub const DEFAULT_FLUSH_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    pub start_sitemap: String,
    pub resources_visited: usize,
    pub resources_failed: usize,
    pub urls_written: usize,
    pub flushes: usize,
    pub interrupted: bool,
}

#[derive(Debug)]
pub enum CrawlOutcome {
    Completed(CrawlStats),
    /// Neither `/sitemap.xml` nor a robots `Sitemap:` directive resolved.
    NoSitemap,
}

pub struct Crawler {
    client: HttpClient,
    flush_threshold: usize,
    shutdown: Shutdown,
}

impl Crawler {
    pub fn new(client: HttpClient, flush_threshold: usize, shutdown: Shutdown) -> Self {
        Self {
            client,
            flush_threshold: flush_threshold.max(1),
            shutdown,
        }
    }

    /// Starting sitemap for `seed`: the seed itself when it names a sitemap,
    /// otherwise `/sitemap.xml`, otherwise the first robots directive.
    pub async fn resolve_start(&self, seed: &str) -> anyhow::Result<Option<Url>> {
        let seed_url = parse_seed(seed)?;
        if is_sitemap_seed(seed) {
            return Ok(Some(seed_url));
        }

        let base = origin_of(&seed_url);
        let conventional = Url::parse(&format!("{}/sitemap.xml", base))?;
        match self.client.get(&conventional).await {
            Ok(resp) if resp.is_success() => return Ok(Some(conventional)),
            Ok(resp) => tracing::debug!("{} answered {}", conventional, resp.status),
            Err(e) => tracing::debug!("{} unreachable: {}", conventional, e),
        }

        let robots = Url::parse(&format!("{}/robots.txt", base))?;
        let body = match self.client.get(&robots).await {
            Ok(resp) => resp.body_text(),
            Err(e) => {
                tracing::debug!("{} unreachable: {}", robots, e);
                return Ok(None);
            }
        };

        Ok(robots_sitemap(&body).and_then(|s| match Url::parse(&s) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Ignoring malformed robots sitemap {}: {}", s, e);
                None
            }
        }))
    }

    pub async fn crawl(&self, seed: &str, output: &LineStore) -> anyhow::Result<CrawlOutcome> {
        output.reset()?;

        let start = match self.resolve_start(seed).await? {
            Some(url) => url,
            None => {
                tracing::error!("No sitemap found for {}", seed);
                return Ok(CrawlOutcome::NoSitemap);
            }
        };

        tracing::info!("Starting sitemap crawl at {}", start);

        let mut stats = CrawlStats {
            start_sitemap: start.to_string(),
            ..CrawlStats::default()
        };
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<Url> = VecDeque::new();
        let mut found: BTreeSet<String> = BTreeSet::new();

        queue.push_back(start);

        while let Some(resource) = queue.pop_front() {
            if self.shutdown.is_triggered() {
                stats.interrupted = true;
                break;
            }

            if !visited.insert(resource.as_str().to_string()) {
                continue;
            }
            stats.resources_visited += 1;

            let body = match self.client.fetch_text(&resource).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Error fetching URLs from {}: {}", resource, e);
                    stats.resources_failed += 1;
                    continue;
                }
            };

            let (source, urls) = extract_content_urls(&body, &resource);
            tracing::debug!("{} yielded {} URLs via {:?}", resource, urls.len(), source);
            found.extend(urls);

            for nested in extract_nested_sitemaps(&body) {
                match Url::parse(&nested) {
                    Ok(url) if !visited.contains(url.as_str()) => queue.push_back(url),
                    Ok(_) => {}
                    Err(e) => tracing::debug!("Skipping malformed sitemap {}: {}", nested, e),
                }
            }

            // Dedup only spans one batch; a URL may reappear in a later one.
            if found.len() > self.flush_threshold {
                self.flush(&mut found, output, &mut stats);
            }
        }

        if !found.is_empty() {
            self.flush(&mut found, output, &mut stats);
        }
        if stats.flushes == 0 {
            output.write(std::iter::empty::<&str>(), false)?;
        }

        tracing::info!(
            "URLs written to {} ({} URLs from {} sitemaps)",
            output.path().display(),
            stats.urls_written,
            stats.resources_visited
        );

        Ok(CrawlOutcome::Completed(stats))
    }

    fn flush(&self, found: &mut BTreeSet<String>, output: &LineStore, stats: &mut CrawlStats) {
        match output.append(found.iter()) {
            Ok(n) => {
                stats.urls_written += n;
                stats.flushes += 1;
                tracing::debug!("Flushed {} URLs to {}", n, output.path().display());
            }
            Err(e) => tracing::error!("Error writing to {}: {:#}", output.path().display(), e),
        }
        found.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urlset(urls: &[String]) -> String {
        let entries: String = urls
            .iter()
            .map(|u| format!("<url><loc>{}</loc></url>\n", u))
            .collect();
        format!("<urlset>\n{}</urlset>", entries)
    }

    async fn mount(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn crawler(threshold: usize) -> Crawler {
        Crawler::new(HttpClient::with_defaults().unwrap(), threshold, Shutdown::new())
    }

    #[tokio::test]
    async fn test_robots_fallback_and_overlapping_children() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount(&server, "/sitemap.xml", 404, String::new()).await;
        mount(
            &server,
            "/robots.txt",
            200,
            format!("User-agent: *\nSitemap: {}/sitemap_index.xml\n", base),
        )
        .await;
        mount(
            &server,
            "/sitemap_index.xml",
            200,
            format!(
                "<sitemapindex><sitemap><loc>{b}/sitemap-a.xml</loc></sitemap>\
                 <sitemap><loc>{b}/sitemap-b.xml</loc></sitemap></sitemapindex>",
                b = base
            ),
        )
        .await;
        mount(
            &server,
            "/sitemap-a.xml",
            200,
            urlset(&[format!("{}/one", base), format!("{}/two", base), format!("{}/three", base)]),
        )
        .await;
        mount(
            &server,
            "/sitemap-b.xml",
            200,
            urlset(&[format!("{}/three", base), format!("{}/four", base), format!("{}/five", base)]),
        )
        .await;

        let dir = TempDir::new().unwrap();
        let output = LineStore::new(dir.path().join("mappedsites.txt"));
        let outcome = crawler(DEFAULT_FLUSH_THRESHOLD).crawl(&base, &output).await.unwrap();

        let stats = match outcome {
            CrawlOutcome::Completed(stats) => stats,
            CrawlOutcome::NoSitemap => panic!("expected a sitemap"),
        };
        assert_eq!(stats.resources_visited, 3);

        let mut lines = output.read().unwrap();
        lines.sort();
        let mut expected: Vec<String> = ["five", "four", "one", "three", "two"]
            .iter()
            .map(|p| format!("{}/{}", base, p))
            .collect();
        expected.sort();
        assert_eq!(lines, expected);
    }

    #[tokio::test]
    async fn test_shared_children_visited_once() {
        let server = MockServer::start().await;
        let base = server.uri();

        let index = |children: &[&str]| {
            children
                .iter()
                .map(|c| format!("<sitemap><loc>{}/{}</loc></sitemap>", base, c))
                .collect::<String>()
        };

        mount(&server, "/sitemap.xml", 200, index(&["sitemap-x.xml", "sitemap-y.xml"])).await;
        mount(&server, "/sitemap-x.xml", 200, index(&["sitemap-leaf.xml", "sitemap.xml"])).await;
        mount(&server, "/sitemap-y.xml", 200, index(&["sitemap-leaf.xml"])).await;
        Mock::given(method("GET"))
            .and(path("/sitemap-leaf.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[format!("{}/leaf", base)])))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let output = LineStore::new(dir.path().join("out.txt"));
        let outcome = crawler(DEFAULT_FLUSH_THRESHOLD).crawl(&base, &output).await.unwrap();

        match outcome {
            CrawlOutcome::Completed(stats) => assert_eq!(stats.resources_visited, 4),
            CrawlOutcome::NoSitemap => panic!("expected a sitemap"),
        }
        assert_eq!(output.read().unwrap(), vec![format!("{}/leaf", base)]);
    }

    #[tokio::test]
    async fn test_no_sitemap_is_failure_and_truncates_output() {
        let server = MockServer::start().await;
        mount(&server, "/sitemap.xml", 404, String::new()).await;
        mount(&server, "/robots.txt", 200, "User-agent: *\nDisallow:\n".to_string()).await;

        let dir = TempDir::new().unwrap();
        let output = LineStore::new(dir.path().join("out.txt"));
        output.write(["stale"], false).unwrap();

        let outcome = crawler(DEFAULT_FLUSH_THRESHOLD)
            .crawl(&server.uri(), &output)
            .await
            .unwrap();
        assert!(matches!(outcome, CrawlOutcome::NoSitemap));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_failed_resource_is_skipped() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount(
            &server,
            "/sitemap.xml",
            200,
            format!(
                "<loc>{b}/sitemap-broken.xml</loc><loc>{b}/sitemap-ok.xml</loc>",
                b = base
            ),
        )
        .await;
        mount(&server, "/sitemap-broken.xml", 500, String::new()).await;
        mount(&server, "/sitemap-ok.xml", 200, urlset(&[format!("{}/page", base)])).await;

        let dir = TempDir::new().unwrap();
        let output = LineStore::new(dir.path().join("out.txt"));
        let outcome = crawler(DEFAULT_FLUSH_THRESHOLD).crawl(&base, &output).await.unwrap();

        match outcome {
            CrawlOutcome::Completed(stats) => assert_eq!(stats.resources_failed, 1),
            CrawlOutcome::NoSitemap => panic!("expected a sitemap"),
        }
        assert_eq!(output.read().unwrap(), vec![format!("{}/page", base)]);
    }

    #[tokio::test]
    async fn test_batches_flush_past_threshold() {
        let server = MockServer::start().await;
        let base = server.uri();
        let first: Vec<String> = (0..4).map(|i| format!("{}/a{}", base, i)).collect();
        let second: Vec<String> = vec![format!("{}/a0", base), format!("{}/b", base)];

        mount(
            &server,
            "/sitemap.xml",
            200,
            format!("<loc>{b}/sitemap-1.xml</loc><loc>{b}/sitemap-2.xml</loc>", b = base),
        )
        .await;
        mount(&server, "/sitemap-1.xml", 200, urlset(&first)).await;
        mount(&server, "/sitemap-2.xml", 200, urlset(&second)).await;

        let dir = TempDir::new().unwrap();
        let output = LineStore::new(dir.path().join("out.txt"));
        let outcome = crawler(3).crawl(&format!("{}/sitemap.xml", base), &output).await.unwrap();

        match outcome {
            CrawlOutcome::Completed(stats) => {
                assert_eq!(stats.flushes, 2);
                assert_eq!(stats.urls_written, 6);
            }
            CrawlOutcome::NoSitemap => panic!("expected a sitemap"),
        }

        // a0 lands in both batches: dedup does not span flushes
        let lines = output.read().unwrap();
        assert_eq!(lines.iter().filter(|l| l.ends_with("/a0")).count(), 2);
    }

    #[tokio::test]
    async fn test_interrupt_stops_traversal() {
        let server = MockServer::start().await;
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let dir = TempDir::new().unwrap();
        let output = LineStore::new(dir.path().join("out.txt"));
        let crawler = Crawler::new(HttpClient::with_defaults().unwrap(), 10, shutdown);
        let outcome = crawler
            .crawl(&format!("{}/sitemap.xml", server.uri()), &output)
            .await
            .unwrap();

        match outcome {
            CrawlOutcome::Completed(stats) => {
                assert!(stats.interrupted);
                assert_eq!(stats.resources_visited, 0);
            }
            CrawlOutcome::NoSitemap => panic!("seed names a sitemap"),
        }
        assert!(output.read().unwrap().is_empty());
    }
}
