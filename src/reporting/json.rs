use crate::reporting::summary::RunSummary;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Report<'a> {
    tool: &'static str,
    version: &'static str,
    report_format: &'static str,
    run: &'a RunSummary,
}

pub fn render(summary: &RunSummary) -> anyhow::Result<String> {
    let report = Report {
        tool: "xsshunt",
        version: env!("CARGO_PKG_VERSION"),
        report_format: "application/json",
        run: summary,
    };

    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}

pub fn write<P: AsRef<Path>>(summary: &RunSummary, path: P) -> anyhow::Result<()> {
    std::fs::write(path, render(summary)?)?;
    Ok(())
}
