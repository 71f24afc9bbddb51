//! # Press Trends
//!
//! Analyses press release collections: how many releases each channel
//! published per month, which month was busiest and what it talked about,
//! and what the articles behind a list of links are about.
//!
//! ## Features
//!
//! - Finds the publication date embedded in each paragraph (`2021-03-05`,
//!   `2021/3/5`, `2021年3月5日`, `2021.03.05`)
//! - Counts dated paragraphs per channel and month over January 2020 to
//!   April 2025 and picks the peak month
//! - Extracts frequency and TF-IDF keywords from Chinese text
//! - Parses `[YYYY-MM-DD] title url` lists and crawls the linked articles
//!   with a bounded, order-preserving request pool
//! - Outputs JSON reports and optional Markdown reports
//!
//! ## Usage
//!
//! ```sh
//! press_trends -j ./json trends a.docx b.docx c.docx d.docx e.docx
//! press_trends -j ./json keywords release.docx
//! press_trends -j ./json -m ./markdown crawl list.docx
//! ```
//!
//! ## Architecture
//!
//! 1. **Reading**: Load `.docx` or text documents as paragraphs
//! 2. **Dating**: Extract the first valid date of each paragraph
//! 3. **Aggregating**: Count per channel and month, find the peak month
//! 4. **Keywords**: Rank words of the peak month, a document, or crawled text
//! 5. **Output**: Write JSON and Markdown reports

use clap::Parser;
use std::error::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};
use press_trends::config::load_config;
use press_trends::fetcher::ContentFetcher;
use press_trends::keywords::KeywordExtractor;
use press_trends::outputs::{json, markdown};
use press_trends::pipeline;
use press_trends::utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("press_trends starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.json_output_dir, ?args.markdown_output_dir, ?args.command, "Parsed CLI arguments");

    let mut config = load_config(args.config.as_deref())?;

    // Early check: ensure output dirs are writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }
    if let Some(dir) = &args.markdown_output_dir {
        ensure_writable_dir(dir).await?;
    }

    // Reject a malformed batch before loading the dictionary.
    if let Command::Trends { files } = &args.command {
        if let Err(e) = pipeline::check_batch_shape(files, config.expected_documents) {
            error!(error = %e, "Rejected trends batch");
            return Err(e.into());
        }
    }

    let keywords = KeywordExtractor::new();
    info!("Loaded segmentation dictionary");

    let (name, rendered) = match args.command {
        Command::Trends { files } => {
            let report = pipeline::run_trends(&files, &config, &keywords)?;
            if let Some(peak) = report.peak {
                info!(month = %peak.month, total = peak.total, "🎯 Busiest month");
            }
            for (rank, keyword) in report.peak_keywords.iter().enumerate() {
                debug!(rank = rank + 1, term = %keyword.term, score = %keyword.score, "Peak month keyword");
            }
            json::write_report(&report, &args.json_output_dir, "trends").await?;
            ("trends", markdown::trends_to_markdown(&report, &config.render))
        }
        Command::Keywords { file, top_k, pos } => {
            let top_k = top_k.unwrap_or(config.keywords.document_top_k);
            let pos = if pos.is_empty() {
                config.keywords.allowed_pos.clone()
            } else {
                pos
            };
            let report = pipeline::run_keywords(&file, top_k, &pos, &keywords)?;
            json::write_report(&report, &args.json_output_dir, "keywords").await?;
            ("keywords", markdown::keywords_to_markdown(&report))
        }
        Command::Crawl { file, concurrency } => {
            if let Some(concurrency) = concurrency {
                config.fetch.concurrency = concurrency;
            }
            let fetcher = ContentFetcher::new(&config.fetch)?;

            // Ctrl-C stops outstanding requests; finished items are kept.
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received; cancelling outstanding fetches");
                    let _ = cancel_tx.send(true);
                }
            });

            let report = pipeline::run_crawl(&file, &config, &keywords, &fetcher, cancel_rx).await?;
            info!(
                items = report.items.len(),
                fetched = report.fetched,
                preview = %truncate_for_log(&report.preview, 80),
                "Crawl summary"
            );
            json::write_report(&report, &args.json_output_dir, "crawl").await?;
            ("crawl", markdown::crawl_to_markdown(&report))
        }
    };

    // ---- Markdown output ----
    if let Some(dir) = &args.markdown_output_dir {
        let output_markdown_filename = format!("{}/{}.md", dir.trim_end_matches('/'), name);
        info!(path = %output_markdown_filename, "Writing Markdown");
        if let Err(e) = tokio::fs::write(&output_markdown_filename, rendered).await {
            error!(path = %output_markdown_filename, error = %e, "Failed writing Markdown");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
