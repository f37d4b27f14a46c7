use clap::{Args, Parser, Subcommand};

/// XSSHUNT – sitemap crawler, parameter extractor and XSS payload driver
#[derive(Parser, Debug)]
#[command(
    name = "xsshunt",
    version,
    about = "XSSHUNT – sitemap crawler, parameter extractor and XSS payload driver",
    long_about = r#"
XSSHUNT maps a site through its sitemaps, turns every page into probe URLs
(one per unique parameter name per domain) and drives a rendering backend
through every probe x modifier x payload combination.

PIPELINE:
  • Crawl      sitemap.xml / robots.txt → nested sitemaps → content URLs
  • Extract    form fields, link query keys, script tokens → <url>?<name>=
  • Inject     <probe><modifier><payload>, modifiers: "" and ">
  • Record     rendered combinations appended in batches; reruns resume

Results are a record of what was rendered, not a verdict on execution."#,
    after_help = r#"EXAMPLES:
  xsshunt full example.com
  xsshunt full https://example.com/sitemap_index.xml --renderer chrome
  xsshunt params mappedsites.txt parameters.txt --parser lexical
  xsshunt xss parameters.txt payloads.txt --xss-workers 8 --report run.json"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Mode {
    /// Crawl, extract and inject end-to-end
    Full {
        /// Domain (example.com) or sitemap URL
        target: String,
    },

    /// Extract probe URLs from a list of pages
    Params {
        /// File with one URL per line
        urls_file: String,
        /// Where probe URLs are written
        output_file: String,
    },

    /// Inject payloads into a list of probe URLs
    Xss {
        /// File with one probe URL per line
        urls_file: String,
        /// File with one payload per line
        payloads_file: String,
    },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Full { .. } => "full",
            Mode::Params { .. } => "params",
            Mode::Xss { .. } => "xss",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    // ═══════════════════════════════════════════════════════════════════
    // HTTP
    // ═══════════════════════════════════════════════════════════════════

    /// Maximum HTTP requests per second (0 = unlimited)
    #[arg(long, global = true, default_value_t = 0, help_heading = "HTTP")]
    pub rate: u32,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = 30, help_heading = "HTTP")]
    pub timeout: u64,

    /// Override the User-Agent header
    #[arg(long = "user-agent", global = true, help_heading = "HTTP")]
    pub user_agent: Option<String>,

    /// Cookie header value (e.g. "session=abc123")
    #[arg(long, global = true, help_heading = "HTTP")]
    pub cookie: Option<String>,

    /// Extra header "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", global = true, help_heading = "HTTP")]
    pub headers: Vec<String>,

    // ═══════════════════════════════════════════════════════════════════
    // CRAWL / EXTRACT
    // ═══════════════════════════════════════════════════════════════════

    /// URLs held in memory before flushing to the crawl output
    #[arg(long = "flush-threshold", global = true, default_value_t = 1000, help_heading = "CRAWL / EXTRACT")]
    pub flush_threshold: usize,

    /// Concurrent page fetches during parameter extraction
    #[arg(long = "param-workers", global = true, default_value_t = 10, help_heading = "CRAWL / EXTRACT")]
    pub param_workers: usize,

    /// Markup scanner (dom, lexical)
    #[arg(long, global = true, default_value = "dom", help_heading = "CRAWL / EXTRACT")]
    pub parser: String,

    // ═══════════════════════════════════════════════════════════════════
    // INJECTION
    // ═══════════════════════════════════════════════════════════════════

    /// Rendering backend (http, chrome)
    #[arg(long, global = true, default_value = "http", help_heading = "INJECTION")]
    pub renderer: String,

    /// Concurrent renders
    #[arg(long = "xss-workers", global = true, default_value_t = 4, help_heading = "INJECTION")]
    pub xss_workers: usize,

    /// Rendered combinations per result-file append
    #[arg(long = "batch-size", global = true, default_value_t = 50, help_heading = "INJECTION")]
    pub batch_size: usize,

    /// Seconds to wait for the page body
    #[arg(long = "render-timeout", global = true, default_value_t = 10, help_heading = "INJECTION")]
    pub render_timeout: u64,

    /// Lower bound of the pause after each render (ms)
    #[arg(long = "delay-min-ms", global = true, default_value_t = 150, help_heading = "INJECTION")]
    pub delay_min_ms: u64,

    /// Upper bound of the pause after each render (ms)
    #[arg(long = "delay-max-ms", global = true, default_value_t = 170, help_heading = "INJECTION")]
    pub delay_max_ms: u64,

    /// Result file
    #[arg(long, global = true, default_value = "xss_results.txt", help_heading = "INJECTION")]
    pub results: String,

    /// Payload file used by `full`
    #[arg(long, global = true, default_value = "payloads.txt", help_heading = "INJECTION")]
    pub payloads: String,

    // ═══════════════════════════════════════════════════════════════════
    // OUTPUT
    // ═══════════════════════════════════════════════════════════════════

    /// Write a JSON run summary to this path
    #[arg(long, global = true, help_heading = "OUTPUT")]
    pub report: Option<String>,

    /// Skip the banner display
    #[arg(long, global = true, help_heading = "OUTPUT")]
    pub no_banner: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose", help_heading = "OUTPUT")]
    pub quiet: bool,

    /// Verbose output (debug level)
    #[arg(short, long, global = true, help_heading = "OUTPUT")]
    pub verbose: bool,
}
