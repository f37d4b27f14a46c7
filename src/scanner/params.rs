//! Parameter extraction: one probe URL per unique (domain, parameter name).

use crate::core::shutdown::Shutdown;
use crate::http::client::HttpClient;
use crate::scanner::markup::{is_param_name, script_candidates, MarkupScanner, ScriptRef};
use crate::store::LineStore;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

pub const DEFAULT_PARAM_WORKERS: usize = 10;

/// `<url>?<name>=`
pub fn probe_url(url: &str, name: &str) -> String {
    format!("{}?{}=", url, name)
}

/// Host plus explicit port, the key probe URLs are deduplicated under.
pub fn domain_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Parameters found on one page, keyed by name.
#[derive(Debug, Clone)]
pub struct PageParams {
    pub url: Url,
    pub probes: BTreeMap<String, String>,
}

/// domain -> parameter name -> first probe URL recorded for it
#[derive(Debug, Default)]
pub struct DomainParamMap {
    map: BTreeMap<String, BTreeMap<String, String>>,
}

impl DomainParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the pair already has a probe; the first one stays.
    pub fn insert_first(&mut self, domain: &str, name: &str, probe: String) -> bool {
        let params = self.map.entry(domain.to_string()).or_default();
        if params.contains_key(name) {
            return false;
        }
        params.insert(name.to_string(), probe);
        true
    }

    pub fn merge(&mut self, page: PageParams) -> usize {
        let domain = domain_key(&page.url);
        page.probes
            .into_iter()
            .filter(|(name, probe)| self.insert_first(&domain, name, probe.clone()))
            .count()
    }

    #[cfg(test)]
    pub fn get(&self, domain: &str, name: &str) -> Option<&String> {
        self.map.get(domain).and_then(|p| p.get(name))
    }

    pub fn len(&self) -> usize {
        self.map.values().map(|p| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn probe_urls(&self) -> Vec<String> {
        self.map
            .values()
            .flat_map(|params| params.values().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractStats {
    pub urls_total: usize,
    pub urls_scanned: usize,
    pub urls_failed: usize,
    pub probe_urls: usize,
    pub interrupted: bool,
}

pub struct ParamExtractor {
    client: HttpClient,
    scanner: Box<dyn MarkupScanner>,
    workers: usize,
    shutdown: Shutdown,
}

impl ParamExtractor {
    pub fn new(
        client: HttpClient,
        scanner: Box<dyn MarkupScanner>,
        workers: usize,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            client,
            scanner,
            workers: workers.max(1),
            shutdown,
        }
    }

    /// Candidate names on `page_url`, already filtered. `None` when the page
    /// itself could not be fetched.
    pub async fn page_parameters(&self, page_url: &Url) -> Option<BTreeSet<String>> {
        let resp = match self.client.get(page_url).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Error fetching {}: {}", page_url, e);
                return None;
            }
        };
        if !resp.is_success() {
            tracing::debug!("{} answered {}", page_url, resp.status);
            return None;
        }

        // Findings are plain data; the parsed document never crosses an await.
        let findings = self.scanner.scan(&resp.body_text());

        let mut names: BTreeSet<String> = findings.static_candidates().cloned().collect();

        for script in &findings.scripts {
            let body = match script {
                ScriptRef::Inline(text) => text.clone(),
                ScriptRef::External(src) => match page_url.join(src) {
                    Ok(script_url) => match self.client.fetch_text(&script_url).await {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::debug!("Skipping script {}: {}", script_url, e);
                            continue;
                        }
                    },
                    Err(e) => {
                        tracing::debug!("Unresolvable script src {}: {}", src, e);
                        continue;
                    }
                },
            };
            names.extend(script_candidates(&body));
        }

        names.retain(|n| is_param_name(n));
        Some(names)
    }

    async fn process_url(&self, raw: String) -> Option<PageParams> {
        let url = match Url::parse(&raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping malformed URL {}: {}", raw, e);
                return None;
            }
        };

        let names = self.page_parameters(&url).await?;
        let probes = names
            .into_iter()
            .map(|name| {
                let probe = probe_url(&raw, &name);
                (name, probe)
            })
            .collect();

        Some(PageParams { url, probes })
    }

    /// Scan `urls` with a bounded worker pool and merge per domain.
    pub async fn collect(&self, urls: Vec<String>, stats: &mut ExtractStats) -> DomainParamMap {
        let shutdown = self.shutdown.clone();
        let mut merged = DomainParamMap::new();
        stats.urls_total = urls.len();

        let mut results = stream::iter(urls)
            .take_while(move |_| futures::future::ready(!shutdown.is_triggered()))
            .map(|url| self.process_url(url))
            .buffer_unordered(self.workers);

        while let Some(result) = results.next().await {
            match result {
                Some(page) => {
                    stats.urls_scanned += 1;
                    let added = merged.merge(page);
                    tracing::debug!("{} new probe URLs", added);
                }
                None => stats.urls_failed += 1,
            }
        }

        stats.interrupted = self.shutdown.is_triggered();
        merged
    }

    pub async fn extract_all(
        &self,
        input: &LineStore,
        output: &LineStore,
    ) -> anyhow::Result<ExtractStats> {
        let urls = input.read_or_empty();
        tracing::info!(
            "Extracting parameters from {} URLs ({} workers, {} parser)",
            urls.len(),
            self.workers,
            self.scanner.name()
        );

        let mut stats = ExtractStats::default();
        let merged = self.collect(urls, &mut stats).await;

        let probes = merged.probe_urls();
        stats.probe_urls = output.write(&probes, false)?;

        tracing::info!(
            "Parameters written to {} ({} probe URLs)",
            output.path().display(),
            stats.probe_urls
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::markup::{DomScanner, LexicalScanner};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn extractor(scanner: Box<dyn MarkupScanner>, workers: usize) -> ParamExtractor {
        ParamExtractor::new(
            HttpClient::with_defaults().unwrap(),
            scanner,
            workers,
            Shutdown::new(),
        )
    }

    #[test]
    fn test_first_insertion_wins() {
        let mut map = DomainParamMap::new();
        assert!(map.insert_first("a.test", "q", "https://a.test/one?q=".into()));
        assert!(!map.insert_first("a.test", "q", "https://a.test/two?q=".into()));
        assert!(map.insert_first("b.test", "q", "https://b.test/one?q=".into()));

        assert_eq!(map.get("a.test", "q").unwrap(), "https://a.test/one?q=");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_domain_key_keeps_port() {
        assert_eq!(domain_key(&Url::parse("http://127.0.0.1:8080/x").unwrap()), "127.0.0.1:8080");
        assert_eq!(domain_key(&Url::parse("https://a.test/x").unwrap()), "a.test");
    }

    #[tokio::test]
    async fn test_form_and_anchor_parameters() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/page",
            200,
            r#"<html><body><form><input name="q"></form><a href="/search?lang=en">s</a></body></html>"#,
        )
        .await;

        let page = format!("{}/page", server.uri());
        let dir = TempDir::new().unwrap();
        let input = LineStore::new(dir.path().join("urls.txt"));
        let output = LineStore::new(dir.path().join("params.txt"));
        input.write([&page], false).unwrap();

        let stats = extractor(Box::new(DomScanner), 10)
            .extract_all(&input, &output)
            .await
            .unwrap();
        assert_eq!(stats.probe_urls, 2);

        let mut lines = output.read().unwrap();
        lines.sort();
        assert_eq!(lines, vec![format!("{}?lang=", page), format!("{}?q=", page)]);
    }

    #[tokio::test]
    async fn test_scripts_inline_and_external() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/app",
            200,
            r#"<script src="/js/main.js"></script>
               <script src="/js/gone.js"></script>
               <script>loadPage("/x?item=1");</script>
               <input name="rows[]">"#,
        )
        .await;
        mount(&server, "/js/main.js", 200, "var a = '&token=' + tok; track ();").await;
        mount(&server, "/js/gone.js", 404, "submitGone()").await;

        let ex = extractor(Box::new(LexicalScanner), 2);
        let url = Url::parse(&format!("{}/app", server.uri())).unwrap();
        let names: Vec<String> = ex.page_parameters(&url).await.unwrap().into_iter().collect();

        assert_eq!(names, vec!["item", "loadPage", "token", "track"]);
    }

    #[tokio::test]
    async fn test_same_parameter_on_one_domain_kept_once() {
        let server = MockServer::start().await;
        let form = r#"<form><input name="q"></form>"#;
        mount(&server, "/a", 200, form).await;
        mount(&server, "/b", 200, form).await;
        mount(&server, "/down", 503, form).await;

        let urls = vec![
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
            format!("{}/down", server.uri()),
        ];

        // one worker keeps completion order equal to input order
        let ex = extractor(Box::new(DomScanner), 1);
        let mut stats = ExtractStats::default();
        let merged = ex.collect(urls, &mut stats).await;

        assert_eq!(stats.urls_scanned, 2);
        assert_eq!(stats.urls_failed, 1);
        assert_eq!(merged.probe_urls(), vec![format!("{}/a?q=", server.uri())]);
    }

    #[tokio::test]
    async fn test_interrupt_dispatches_nothing() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let ex = ParamExtractor::new(
            HttpClient::with_defaults().unwrap(),
            Box::new(DomScanner),
            4,
            shutdown,
        );

        let mut stats = ExtractStats::default();
        let merged = ex
            .collect(vec!["http://127.0.0.1:9/a".to_string()], &mut stats)
            .await;
        assert!(merged.is_empty());
        assert!(stats.interrupted);
        assert_eq!(stats.urls_scanned + stats.urls_failed, 0);
    }
}
