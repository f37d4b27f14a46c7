use crate::reporting::summary::RunSummary;
use unicode_width::UnicodeWidthStr;

const BOX_WIDTH: usize = 70;
const INNER_WIDTH: usize = BOX_WIDTH - 2;

fn top_border() -> String {
    format!("╔{}╗", "═".repeat(INNER_WIDTH))
}

fn middle_border() -> String {
    format!("╠{}╣", "═".repeat(INNER_WIDTH))
}

fn bottom_border() -> String {
    format!("╚{}╝", "═".repeat(INNER_WIDTH))
}

/// Left-aligned box line; long content is left unpadded rather than cut.
fn box_line(content: &str) -> String {
    let padded = format!(" {} ", content);
    let padding = INNER_WIDTH.saturating_sub(UnicodeWidthStr::width(padded.as_str()));
    format!("║{}{}║", padded, " ".repeat(padding))
}

fn box_line_centered(content: &str) -> String {
    let padded = format!(" {} ", content);
    let width = UnicodeWidthStr::width(padded.as_str());
    if width >= INNER_WIDTH {
        return box_line(content);
    }

    let remaining = INNER_WIDTH - width;
    let left = remaining / 2;
    format!("║{}{}{}║", " ".repeat(left), padded, " ".repeat(remaining - left))
}

fn kv(key: &str, value: impl std::fmt::Display) -> String {
    box_line(&format!("{:<22}{}", key, value))
}

pub fn render(summary: &RunSummary) -> String {
    let mut out = Vec::new();

    out.push(top_border());
    out.push(box_line_centered(&format!("RUN SUMMARY ({})", summary.mode.to_uppercase())));
    out.push(middle_border());
    out.push(kv("Target:", &summary.target));

    if summary.aborted {
        out.push(kv("Status:", "aborted (no sitemap found)"));
    } else if summary.interrupted() {
        out.push(kv("Status:", "interrupted"));
    }

    if let Some(c) = &summary.crawl {
        out.push(middle_border());
        out.push(kv("Start sitemap:", &c.start_sitemap));
        out.push(kv("Sitemaps visited:", c.resources_visited));
        out.push(kv("Sitemaps failed:", c.resources_failed));
        out.push(kv("URLs written:", c.urls_written));
    }

    if let Some(e) = &summary.extract {
        out.push(middle_border());
        out.push(kv("URLs scanned:", format!("{}/{}", e.urls_scanned, e.urls_total)));
        out.push(kv("URLs failed:", e.urls_failed));
        out.push(kv("Probe URLs:", e.probe_urls));
    }

    if let Some(i) = &summary.inject {
        out.push(middle_border());
        out.push(kv(
            "Combinations:",
            format!("{} ({} x 2 x {})", i.combinations, i.probe_urls, i.payloads),
        ));
        out.push(kv("Already recorded:", i.skipped));
        out.push(kv("Rendered:", i.rendered));
        out.push(kv("Failed:", i.failed));
    }

    out.push(bottom_border());
    out.join("\n")
}

pub fn print(summary: &RunSummary) {
    println!("\n{}\n", render(summary));
}
