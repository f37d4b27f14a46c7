//! XSSHUNT: sitemap crawling, parameter extraction and XSS payload injection.
//!
//! Stages communicate only through newline-delimited files, so each one can
//! be run on its own:
//!
//! 1. [`scanner::crawler`] resolves a sitemap and writes content URLs.
//! 2. [`scanner::params`] turns those pages into `<url>?<name>=` probes.
//! 3. [`xss::driver`] renders every probe x modifier x payload combination
//!    through a [`render::RenderBackend`] and records what was rendered.

pub mod cli;
pub mod core;
pub mod http;
pub mod payload;
pub mod render;
pub mod reporting;
pub mod scanner;
pub mod store;
pub mod xss;
