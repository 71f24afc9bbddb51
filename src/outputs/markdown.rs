//! Markdown rendering of pipeline reports.
//!
//! Labels, titles and display names come from the [`RenderConfig`] passed
//! in; the renderers hold no state of their own.

use crate::config::RenderConfig;
use crate::models::{CrawlReport, KeywordReport, KeywordResult, TrendReport};
use std::fmt::Write;

/// Render the category × month table, the peak month and its keywords.
pub fn trends_to_markdown(report: &TrendReport, render: &RenderConfig) -> String {
    let mut md = String::new();
    writeln!(md, "# {}\n", render.title).unwrap();

    match report.peak {
        Some(peak) => writeln!(
            md,
            "**🎯 Peak month**: {} ({} {})\n",
            peak.month, peak.total, render.count_label
        )
        .unwrap(),
        None => writeln!(md, "No dated paragraphs found.\n").unwrap(),
    }

    if !report.failed_documents.is_empty() {
        writeln!(md, "Unreadable documents:\n").unwrap();
        for path in &report.failed_documents {
            writeln!(md, "- `{}`", path).unwrap();
        }
        md.push('\n');
    }

    write!(md, "| {} |", render.month_label).unwrap();
    for row in &report.matrix.rows {
        write!(md, " {} |", render.display_name(&row.category)).unwrap();
    }
    write!(md, "\n|---|").unwrap();
    for _ in &report.matrix.rows {
        md.push_str("---:|");
    }
    md.push('\n');
    for (i, month) in report.matrix.months.iter().enumerate() {
        write!(md, "| {} |", month).unwrap();
        for row in &report.matrix.rows {
            write!(md, " {} |", row.counts[i]).unwrap();
        }
        md.push('\n');
    }

    if let Some(peak) = report.peak {
        writeln!(md, "\n## 📑 {} top {} keywords\n", peak.month, report.peak_keywords.len()).unwrap();
        push_keywords(&mut md, &report.peak_keywords);
    }
    md
}

/// Render the weighted keyword list of one document.
pub fn keywords_to_markdown(report: &KeywordReport) -> String {
    let mut md = String::new();
    writeln!(md, "# {}\n", report.source).unwrap();
    writeln!(md, "## Top {} keywords (weighted)\n", report.keywords.len()).unwrap();
    push_keywords(&mut md, &report.keywords);
    md
}

/// Render the parsed list, fetch statistics, preview and keywords.
pub fn crawl_to_markdown(report: &CrawlReport) -> String {
    let mut md = String::new();
    writeln!(md, "# {}\n", report.source).unwrap();
    writeln!(
        md,
        "Parsed {} items, fetched {} articles.\n",
        report.items.len(),
        report.fetched
    )
    .unwrap();

    for item in &report.items {
        if item.url.is_empty() {
            writeln!(md, "- {} {}", item.date, item.title).unwrap();
        } else {
            writeln!(md, "- {} [{}]({})", item.date, item.title, item.url).unwrap();
        }
    }

    writeln!(md, "\n## Preview\n\n{}\n", report.preview).unwrap();
    writeln!(md, "## Top {} keywords\n", report.keywords.len()).unwrap();
    push_keywords(&mut md, &report.keywords);
    md
}

fn push_keywords(md: &mut String, keywords: &[KeywordResult]) {
    for (i, keyword) in keywords.iter().enumerate() {
        writeln!(md, "{}. {}：{}", i + 1, keyword.term, keyword.score).unwrap();
    }
}
