//! Global context for a run

use crate::cli::args::{Cli, Mode};
use crate::core::rate_limit::Jitter;
use crate::http::client::{ClientOptions, DEFAULT_USER_AGENT};
use crate::render::RendererKind;
use crate::scanner::markup::ScannerKind;
use crate::xss::driver::DriverOptions;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Intermediate and final files used by `full`.
pub const MAPPED_SITES_FILE: &str = "mappedsites.txt";
pub const PARAMETERS_FILE: &str = "parameters.txt";

/// Which stages run and the files connecting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pipeline {
    Full {
        target: String,
        mapped_sites: PathBuf,
        parameters: PathBuf,
        payloads: PathBuf,
    },
    Params {
        urls: PathBuf,
        output: PathBuf,
    },
    Xss {
        probes: PathBuf,
        payloads: PathBuf,
    },
}

impl Pipeline {
    pub fn name(&self) -> &'static str {
        match self {
            Pipeline::Full { .. } => "full",
            Pipeline::Params { .. } => "params",
            Pipeline::Xss { .. } => "xss",
        }
    }

    pub fn target(&self) -> String {
        match self {
            Pipeline::Full { target, .. } => target.clone(),
            Pipeline::Params { urls, .. } => urls.display().to_string(),
            Pipeline::Xss { probes, .. } => probes.display().to_string(),
        }
    }
}

pub struct Context {
    pub pipeline: Pipeline,
    pub rate_limit: u32,
    pub quiet: bool,
    pub client: ClientOptions,
    // Crawl / extract
    pub flush_threshold: usize,
    pub param_workers: usize,
    pub scanner: ScannerKind,
    // Injection
    pub renderer: RendererKind,
    pub driver: DriverOptions,
    pub results_file: PathBuf,
    // Output
    pub report_file: Option<PathBuf>,
}

/// `"Name: value"` pairs; entries without a colon are ignored.
pub fn parse_headers(raw: &[String]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for header in raw {
        match header.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => tracing::warn!("Ignoring malformed header: {}", header),
        }
    }
    headers
}

impl Context {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let opts = cli.options;

        let pipeline = match cli.mode {
            Mode::Full { target } => Pipeline::Full {
                target,
                mapped_sites: PathBuf::from(MAPPED_SITES_FILE),
                parameters: PathBuf::from(PARAMETERS_FILE),
                payloads: PathBuf::from(&opts.payloads),
            },
            Mode::Params {
                urls_file,
                output_file,
            } => Pipeline::Params {
                urls: PathBuf::from(urls_file),
                output: PathBuf::from(output_file),
            },
            Mode::Xss {
                urls_file,
                payloads_file,
            } => Pipeline::Xss {
                probes: PathBuf::from(urls_file),
                payloads: PathBuf::from(payloads_file),
            },
        };

        let client = ClientOptions {
            user_agent: opts
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout: Duration::from_secs(opts.timeout.max(1)),
            cookies: opts.cookie,
            headers: parse_headers(&opts.headers),
        };

        let driver = DriverOptions {
            workers: opts.xss_workers,
            batch_size: opts.batch_size,
            render_timeout: Duration::from_secs(opts.render_timeout.max(1)),
            jitter: Jitter::from_millis(opts.delay_min_ms, opts.delay_max_ms),
        };

        Ok(Self {
            pipeline,
            rate_limit: opts.rate,
            quiet: opts.quiet,
            client,
            flush_threshold: opts.flush_threshold.max(1),
            param_workers: opts.param_workers,
            scanner: opts.parser.parse()?,
            renderer: opts.renderer.parse()?,
            driver,
            results_file: PathBuf::from(opts.results),
            report_file: opts.report.map(PathBuf::from),
        })
    }
}
