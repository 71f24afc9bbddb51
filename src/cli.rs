//! Command-line interface definitions for Press Trends.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Global options can also be provided via environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Press Trends application.
///
/// # Examples
///
/// ```sh
/// # Monthly counts for the five channel documents
/// press_trends -j ./json trends 台辦動態.docx 交流交往.docx 政務要聞.docx 部門涉台.docx 新聞發佈.docx
///
/// # Weighted keywords of one release, nouns only
/// press_trends -j ./json keywords release.docx --pos n,ns
///
/// # Parse a link list and crawl every article
/// press_trends -j ./json -m ./markdown crawl list.docx --concurrency 8
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSON reports
    #[arg(short, long, env = "PRESS_TRENDS_JSON_DIR", default_value = "./out")]
    pub json_output_dir: String,

    /// Optional output directory for Markdown reports
    #[arg(short, long, env = "PRESS_TRENDS_MARKDOWN_DIR")]
    pub markdown_output_dir: Option<String>,

    /// Optional path to config.yaml file
    #[arg(short, long, env = "PRESS_TRENDS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count dated paragraphs per channel and month, find the peak month
    Trends {
        /// Exactly five channel documents (.docx or plain text)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Weighted keywords of a single document
    Keywords {
        file: PathBuf,

        /// Number of keywords to keep (defaults to the configured value)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Comma separated part-of-speech tags to keep
        #[arg(long, value_delimiter = ',')]
        pos: Vec<String>,
    },
    /// Parse a "[YYYY-MM-DD] title url" list and fetch every linked article
    Crawl {
        file: PathBuf,

        /// Requests in flight at once (defaults to the configured value)
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_trends() {
        let cli = Cli::parse_from([
            "press_trends",
            "--json-output-dir",
            "./json",
            "trends",
            "a.docx",
            "b.docx",
        ]);

        assert_eq!(cli.json_output_dir, "./json");
        assert!(cli.markdown_output_dir.is_none());
        let Command::Trends { files } = cli.command else {
            panic!("expected trends");
        };
        assert_eq!(files, vec![PathBuf::from("a.docx"), PathBuf::from("b.docx")]);
    }

    #[test]
    fn test_cli_short_flags_and_keywords() {
        let cli = Cli::parse_from([
            "press_trends",
            "-j",
            "/tmp/json",
            "-m",
            "/tmp/markdown",
            "keywords",
            "one.docx",
            "-k",
            "10",
            "--pos",
            "n,ns,vn",
        ]);

        assert_eq!(cli.json_output_dir, "/tmp/json");
        assert_eq!(cli.markdown_output_dir.as_deref(), Some("/tmp/markdown"));
        let Command::Keywords { file, top_k, pos } = cli.command else {
            panic!("expected keywords");
        };
        assert_eq!(file, PathBuf::from("one.docx"));
        assert_eq!(top_k, Some(10));
        assert_eq!(pos, vec!["n", "ns", "vn"]);
    }

    #[test]
    fn test_cli_crawl() {
        let cli = Cli::parse_from(["press_trends", "crawl", "list.docx", "--concurrency", "8"]);
        let Command::Crawl { file, concurrency } = cli.command else {
            panic!("expected crawl");
        };
        assert_eq!(file, PathBuf::from("list.docx"));
        assert_eq!(concurrency, Some(8));
    }

    #[test]
    fn test_cli_trends_requires_files() {
        assert!(Cli::try_parse_from(["press_trends", "trends"]).is_err());
    }
}
