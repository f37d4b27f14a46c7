//! Markup scanning strategies for parameter discovery.
//!
//! Both strategies report the same [`MarkupFindings`]; the extractor does not
//! care which one produced them.

use regex::Regex;
use scraper::{Html, Selector};
use std::str::FromStr;
use std::sync::LazyLock;

static ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]([a-zA-Z0-9_]+)=").expect("valid assignment pattern"));

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z0-9_]+)\s*\(").expect("valid call pattern"));

static PARAM_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid name pattern"));

static LEX_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(?:input|textarea|select|form)\b[^>]*?[\s"']name\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid field pattern")
});

static LEX_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?[\s"']href\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid anchor pattern")
});

static LEX_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid script pattern")
});

static LEX_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[\s"'])src\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("valid src pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRef {
    Inline(String),
    External(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupFindings {
    /// `name` attributes of input/textarea/select/form elements
    pub field_names: Vec<String>,
    /// Query-string keys of every anchor `href`
    pub query_keys: Vec<String>,
    pub scripts: Vec<ScriptRef>,
}

impl MarkupFindings {
    /// Field names and query keys, without script-derived candidates.
    pub fn static_candidates(&self) -> impl Iterator<Item = &String> {
        self.field_names.iter().chain(self.query_keys.iter())
    }
}

pub trait MarkupScanner: Send + Sync {
    fn scan(&self, html: &str) -> MarkupFindings;

    fn name(&self) -> &'static str;
}

/// CSS-selector scan over a parsed document.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomScanner;

impl MarkupScanner for DomScanner {
    fn scan(&self, html: &str) -> MarkupFindings {
        let document = Html::parse_document(html);
        let mut findings = MarkupFindings::default();

        if let Ok(sel) = Selector::parse("input[name], textarea[name], select[name], form[name]") {
            for el in document.select(&sel) {
                if let Some(name) = el.value().attr("name") {
                    findings.field_names.push(name.to_string());
                }
            }
        }

        if let Ok(sel) = Selector::parse("a[href]") {
            for el in document.select(&sel) {
                if let Some(href) = el.value().attr("href") {
                    findings.query_keys.extend(query_keys(href));
                }
            }
        }

        if let Ok(sel) = Selector::parse("script") {
            for el in document.select(&sel) {
                match el.value().attr("src") {
                    Some(src) if !src.trim().is_empty() => {
                        findings.scripts.push(ScriptRef::External(src.trim().to_string()))
                    }
                    _ => findings
                        .scripts
                        .push(ScriptRef::Inline(el.text().collect::<String>())),
                }
            }
        }

        findings
    }

    fn name(&self) -> &'static str {
        "dom"
    }
}

/// Regex scan of raw markup; tolerant of documents a parser would reshape.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalScanner;

fn first_group(caps: &regex::Captures<'_>, from: usize) -> Option<String> {
    (from..caps.len())
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().to_string())
}

impl MarkupScanner for LexicalScanner {
    fn scan(&self, html: &str) -> MarkupFindings {
        let mut findings = MarkupFindings::default();

        for caps in LEX_FIELD_RE.captures_iter(html) {
            if let Some(name) = first_group(&caps, 1) {
                findings.field_names.push(name);
            }
        }

        for caps in LEX_ANCHOR_RE.captures_iter(html) {
            if let Some(href) = first_group(&caps, 1) {
                findings.query_keys.extend(query_keys(&href.replace("&amp;", "&")));
            }
        }

        for caps in LEX_SCRIPT_RE.captures_iter(html) {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let src = LEX_SRC_RE
                .captures(attrs)
                .and_then(|c| first_group(&c, 1))
                .filter(|s| !s.trim().is_empty());

            match src {
                Some(src) => findings.scripts.push(ScriptRef::External(src.trim().to_string())),
                None => findings.scripts.push(ScriptRef::Inline(
                    caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                )),
            }
        }

        findings
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerKind {
    #[default]
    Dom,
    Lexical,
}

impl ScannerKind {
    pub fn build(self) -> Box<dyn MarkupScanner> {
        match self {
            ScannerKind::Dom => Box::new(DomScanner),
            ScannerKind::Lexical => Box::new(LexicalScanner),
        }
    }
}

impl FromStr for ScannerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dom" => Ok(ScannerKind::Dom),
            "lexical" | "regex" => Ok(ScannerKind::Lexical),
            other => anyhow::bail!("Unknown markup parser: {}", other),
        }
    }
}

/// Keys of the query string in `href` that carry a non-empty value.
pub fn query_keys(href: &str) -> Vec<String> {
    let query = match href.split_once('?') {
        Some((_, rest)) => rest.split('#').next().unwrap_or(""),
        None => return Vec::new(),
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .map(|(k, _)| k.into_owned())
        .collect()
}

/// Assignment-like (`?id=`, `&page=`) and call-like (`submit(`) tokens.
pub fn script_candidates(js: &str) -> Vec<String> {
    ASSIGNMENT_RE
        .captures_iter(js)
        .chain(CALL_RE.captures_iter(js))
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Bracketed names (`items[]`, `user[name]`) and anything outside the
/// identifier-like class are rejected.
pub fn is_param_name(name: &str) -> bool {
    !name.contains('[') && !name.contains(']') && PARAM_NAME_RE.is_match(name)
}
