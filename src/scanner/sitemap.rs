//! Pattern extraction over fetched sitemap resources and robots files.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static LOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<loc>(.*?)</loc>").expect("valid loc pattern"));

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href=["'](.*?)["']"#).expect("valid href pattern"));

static NESTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<loc>\s*(https?://[^<]*?sitemap[^<]*\.xml)\s*</loc>")
        .expect("valid nested sitemap pattern")
});

static ROBOTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Sitemap:\s*(https?://\S+)").expect("valid robots pattern")
});

pub const SITEMAP_EXTENSION: &str = ".xml";

/// Where a content URL was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Loc,
    Href,
}

/// `scheme://host[:port]` of a URL.
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Seeds ending in the sitemap extension are used as-is.
pub fn is_sitemap_seed(seed: &str) -> bool {
    seed.to_ascii_lowercase().ends_with(SITEMAP_EXTENSION)
}

/// Accept `example.com` as well as `https://example.com`.
pub fn parse_seed(seed: &str) -> anyhow::Result<Url> {
    let seed = seed.trim();
    let url = if seed.contains("://") {
        Url::parse(seed)?
    } else {
        Url::parse(&format!("https://{}", seed))?
    };
    if url.host_str().is_none() {
        anyhow::bail!("Seed has no host: {}", seed);
    }
    Ok(url)
}

/// Content URLs are parameterless, non-script, non-fragment-terminated.
pub fn is_content_url(url: &str) -> bool {
    !url.is_empty()
        && !url.contains("javascript:void(0)")
        && !url.ends_with('#')
        && !url.contains('?')
}

/// Nested sitemap references (`<loc>` entries that point at `*sitemap*.xml`).
pub fn extract_nested_sitemaps(body: &str) -> Vec<String> {
    NESTED_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Content URLs from `<loc>` tags, falling back to raw `href` attributes
/// resolved against the resource's origin. Nested sitemap references are
/// left out; they are traversed, not emitted.
pub fn extract_content_urls(body: &str, resource: &Url) -> (UrlSource, Vec<String>) {
    let locs: Vec<String> = LOC_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();

    let (source, candidates) = if !locs.is_empty() {
        (UrlSource::Loc, locs)
    } else {
        let origin = origin_of(resource);
        let hrefs = HREF_RE
            .captures_iter(body)
            .filter_map(|c| c.get(1))
            .map(|m| {
                let href = m.as_str().trim();
                if href.starts_with("http") {
                    href.to_string()
                } else {
                    format!("{}/{}", origin, href.trim_start_matches('/'))
                }
            })
            .collect();
        (UrlSource::Href, hrefs)
    };

    let nested: HashSet<String> = extract_nested_sitemaps(body).into_iter().collect();
    let mut seen = HashSet::new();
    let urls = candidates
        .into_iter()
        .filter(|u| is_content_url(u) && !nested.contains(u))
        .filter(|u| seen.insert(u.clone()))
        .collect();

    (source, urls)
}

/// First `Sitemap:` directive in a robots file.
pub fn robots_sitemap(body: &str) -> Option<String> {
    ROBOTS_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.test/sitemap.xml").unwrap()
    }

    #[test]
    fn test_loc_extraction() {
        let body = r#"<urlset>
            <url><loc>https://example.test/a</loc></url>
            <url><loc> https://example.test/b </loc></url>
            <url><loc>https://example.test/a</loc></url>
        </urlset>"#;
        let (source, urls) = extract_content_urls(body, &base());
        assert_eq!(source, UrlSource::Loc);
        assert_eq!(urls, vec!["https://example.test/a", "https://example.test/b"]);
    }

    #[test]
    fn test_loc_filters_queries_and_fragments() {
        let body = "<loc>https://example.test/ok</loc>\
                    <loc>https://example.test/search?q=1</loc>\
                    <loc>https://example.test/page#</loc>\
                    <loc>javascript:void(0)</loc>";
        let (_, urls) = extract_content_urls(body, &base());
        assert_eq!(urls, vec!["https://example.test/ok"]);
    }

    #[test]
    fn test_href_fallback_resolves_against_origin() {
        let body = r#"<a href="/about">x</a><a HREF='contact'>y</a>
                      <a href="https://other.test/page">z</a>
                      <a href="javascript:void(0)">j</a><a href="/list?page=2">p</a>"#;
        let resource = Url::parse("https://example.test:8443/deep/index.html").unwrap();
        let (source, urls) = extract_content_urls(body, &resource);
        assert_eq!(source, UrlSource::Href);
        assert_eq!(
            urls,
            vec![
                "https://example.test:8443/about",
                "https://example.test:8443/contact",
                "https://other.test/page",
            ]
        );
    }

    #[test]
    fn test_nested_sitemaps_not_emitted() {
        let body = "<sitemapindex>\
            <sitemap><loc>https://example.test/sitemap-posts.xml</loc></sitemap>\
            <sitemap><loc> https://example.test/Sitemap_pages.XML </loc></sitemap>\
            <sitemap><loc>https://example.test/feed.xml</loc></sitemap>\
            </sitemapindex>";
        let nested = extract_nested_sitemaps(body);
        assert_eq!(
            nested,
            vec![
                "https://example.test/sitemap-posts.xml",
                "https://example.test/Sitemap_pages.XML",
            ]
        );

        let (_, urls) = extract_content_urls(body, &base());
        assert_eq!(urls, vec!["https://example.test/feed.xml"]);
    }

    #[test]
    fn test_robots_directive() {
        let body = "User-agent: *\nDisallow: /admin\nsitemap: https://example.test/sitemap_index.xml\nSitemap: https://example.test/second.xml\n";
        assert_eq!(
            robots_sitemap(body).as_deref(),
            Some("https://example.test/sitemap_index.xml")
        );
        assert_eq!(robots_sitemap("User-agent: *\n"), None);
    }

    #[test]
    fn test_seed_helpers() {
        assert!(is_sitemap_seed("https://example.test/sitemap.xml"));
        assert!(!is_sitemap_seed("https://example.test"));
        assert_eq!(parse_seed("example.test").unwrap().as_str(), "https://example.test/");
        assert_eq!(origin_of(&parse_seed("http://example.test:8080/x").unwrap()), "http://example.test:8080");
    }
}
