use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use xsshunt::cli::args::Cli;
use xsshunt::core::context::Context;
use xsshunt::core::engine::Engine;

const BANNER: &str = r#"
 ╔════════════════════════════════════════════════════════════════════╗
 ║                                                                    ║
 ║    ██╗  ██╗███████╗███████╗██╗  ██╗██╗   ██╗███╗   ██╗████████╗    ║
 ║    ╚██╗██╔╝██╔════╝██╔════╝██║  ██║██║   ██║████╗  ██║╚══██╔══╝    ║
 ║     ╚███╔╝ ███████╗███████╗███████║██║   ██║██╔██╗ ██║   ██║       ║
 ║     ██╔██╗ ╚════██║╚════██║██╔══██║██║   ██║██║╚██╗██║   ██║       ║
 ║    ██╔╝ ██╗███████║███████║██║  ██║╚██████╔╝██║ ╚████║   ██║       ║
 ║    ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝  ╚═╝ ╚═════╝ ╚═╝  ╚═══╝   ╚═╝       ║
 ║                                                                    ║
 ║    Sitemap crawl → parameter extraction → XSS payload injection    ║
 ║                                                                    ║
 ╚════════════════════════════════════════════════════════════════════╝
"#;

fn print_banner() {
    println!("\x1b[36m{}\x1b[0m", BANNER); // Cyan color
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Bad or missing arguments print usage and exit non-zero here
    let cli = Cli::parse();

    if !cli.options.no_banner && !cli.options.quiet {
        print_banner();
    }

    init_logging(cli.options.quiet, cli.options.verbose);

    let ctx = Context::from_cli(cli)?;
    let engine = Engine::new(ctx)?;
    engine.shutdown_handle().listen();

    let summary = engine.run().await?;
    engine.report(&summary)?;

    if summary.aborted {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
