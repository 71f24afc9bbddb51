//! The three analysis pipelines.
//!
//! 1. **Trends**: five category documents → dated paragraph counts per
//!    category and month → peak month → frequency keywords of that month.
//! 2. **Keywords**: one document → weighted keywords.
//! 3. **Crawl**: one list document → list items → fetched article text →
//!    frequency keywords and a preview of the text.

use crate::aggregate::TemporalAggregator;
use crate::category::CategoryClassifier;
use crate::config::Config;
use crate::dates::DateExtractor;
use crate::documents::read_document;
use crate::error::PipelineError;
use crate::fetcher::ContentFetcher;
use crate::keywords::KeywordExtractor;
use crate::listing::ListParser;
use crate::models::{CrawlReport, KeywordReport, TrendReport};
use crate::utils::preview;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// Reject a batch that does not hold exactly `expected` documents.
pub fn check_batch_shape(paths: &[PathBuf], expected: usize) -> Result<(), PipelineError> {
    if paths.len() == expected {
        Ok(())
    } else {
        Err(PipelineError::InputShape {
            expected,
            actual: paths.len(),
        })
    }
}

/// Count dated paragraphs per category and month and find the peak month.
///
/// A document that cannot be read is reported in
/// [`TrendReport::failed_documents`]; the others are still counted.
///
/// # Errors
///
/// Returns [`PipelineError::InputShape`] before reading anything when the
/// batch size is not `config.expected_documents`.
#[instrument(level = "info", skip_all, fields(documents = paths.len()))]
pub fn run_trends(
    paths: &[PathBuf],
    config: &Config,
    keywords: &KeywordExtractor,
) -> Result<TrendReport, PipelineError> {
    check_batch_shape(paths, config.expected_documents)?;

    let mut documents = Vec::with_capacity(paths.len());
    let mut failed_documents = Vec::new();
    for path in paths {
        match read_document(path) {
            Ok(document) => documents.push(document),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Skipping unreadable document");
                failed_documents.push(path.display().to_string());
            }
        }
    }

    let classifier = CategoryClassifier::new(config.categories.clone());
    let aggregator = TemporalAggregator::new(DateExtractor::new(&config.separators));
    let aggregation = aggregator.aggregate(&documents, |d| classifier.classify(&d.source));

    let peak = aggregation.peak_month();
    let peak_keywords = match peak {
        Some(peak) => {
            info!(month = %peak.month, total = peak.total, "Peak month");
            let text = aggregation.texts_for_month(peak.month).join("\n");
            keywords.top_frequent(&text, config.keywords.peak_top_k)
        }
        None => {
            warn!("No paragraph carried a date inside the horizon");
            Vec::new()
        }
    };

    Ok(TrendReport {
        matrix: aggregation.materialize(),
        peak,
        peak_keywords,
        failed_documents,
    })
}

/// Weighted keywords of a single document.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn run_keywords(
    path: &Path,
    top_k: usize,
    allowed_pos: &[String],
    keywords: &KeywordExtractor,
) -> Result<KeywordReport, PipelineError> {
    let document = read_document(path)?;
    let result = keywords.top_weighted(&document.full_text(), top_k, allowed_pos);
    info!(terms = result.len(), "Extracted weighted keywords");
    Ok(KeywordReport {
        source: document.source,
        keywords: result,
    })
}

/// Parse a list document, fetch every linked page and summarise the text.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn run_crawl(
    path: &Path,
    config: &Config,
    keywords: &KeywordExtractor,
    fetcher: &ContentFetcher,
    cancel: watch::Receiver<bool>,
) -> Result<CrawlReport, PipelineError> {
    let document = read_document(path)?;
    let items = ListParser::default().parse(&document.full_text());
    if items.is_empty() {
        warn!("No list items found; check the [YYYY-MM-DD] title url format");
    }

    let items: Vec<_> = fetcher
        .fetch_all(items, cancel)
        .await
        .into_iter()
        .map(|(item, _)| item)
        .collect();
    let fetched = items.iter().filter(|i| !i.content.is_empty()).count();
    info!(items = items.len(), fetched, "Crawl complete");

    let full_text = items
        .iter()
        .map(|i| i.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(CrawlReport {
        source: document.source,
        preview: preview(full_text.trim(), config.preview_chars),
        keywords: keywords.top_frequent(&full_text, config.keywords.crawl_top_k),
        fetched,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryRule;
    use crate::documents::tests::write_docx;
    use crate::models::CalendarMonth;
    use once_cell::sync::Lazy;

    static EXTRACTOR: Lazy<KeywordExtractor> = Lazy::new(KeywordExtractor::new);

    fn month(key: &str) -> CalendarMonth {
        key.parse().unwrap()
    }

    #[test]
    fn test_wrong_batch_size_is_rejected_before_reading() {
        let paths = vec![PathBuf::from("/nonexistent/a.docx"); 4];
        let err = run_trends(&paths, &Config::default(), &EXTRACTOR).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InputShape {
                expected: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_trends_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let dates = ["2021-03-05", "2021-03-20", "2021-04-01", "2021-03-02", "2021-03-02"];
        let paths: Vec<PathBuf> = dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let text = format!("{date} 兩岸交流合作");
                write_docx(dir.path(), &format!("press_{i}.docx"), &[text.as_str()])
            })
            .collect();

        let config = Config {
            categories: vec![CategoryRule::new("press", "發佈")],
            ..Config::default()
        };
        let report = run_trends(&paths, &config, &EXTRACTOR).unwrap();

        assert_eq!(report.matrix.months.len(), 64);
        assert_eq!(report.matrix.rows.len(), 1);
        let row = &report.matrix.rows[0];
        assert_eq!(row.category, "發佈");
        let at = |key: &str| {
            let index = report.matrix.months.iter().position(|m| *m == month(key)).unwrap();
            row.counts[index]
        };
        assert_eq!(at("2021-03"), 4);
        assert_eq!(at("2021-04"), 1);
        assert_eq!(row.counts.iter().sum::<u32>(), 5);

        let peak = report.peak.unwrap();
        assert_eq!(peak.month, month("2021-03"));
        assert_eq!(peak.total, 4);
        assert!(report.peak_keywords.len() <= 20);
        assert!(report.failed_documents.is_empty());
    }

    #[test]
    fn test_unreadable_document_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths: Vec<PathBuf> = (0..4)
            .map(|i| write_docx(dir.path(), &format!("台辦動態_{i}.docx"), &["2022-01-10 記者會"]))
            .collect();
        paths.push(dir.path().join("missing.docx"));

        let report = run_trends(&paths, &Config::default(), &EXTRACTOR).unwrap();
        assert_eq!(report.failed_documents.len(), 1);
        assert!(report.failed_documents[0].ends_with("missing.docx"));
        assert_eq!(report.matrix.rows.len(), 1);
        assert_eq!(report.matrix.rows[0].category, "台辦動態");
        assert_eq!(report.peak.unwrap().total, 4);
    }

    #[test]
    fn test_keywords_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(
            dir.path(),
            "single.docx",
            &["国务院台湾事务办公室举行新闻发布会", "发言人介绍两岸交流合作情况"],
        );
        let report = run_keywords(&path, 30, &[], &EXTRACTOR).unwrap();
        assert_eq!(report.source, "single.docx");
        assert!(!report.keywords.is_empty());
        assert!(report.keywords.len() <= 30);
    }

    #[tokio::test]
    async fn test_crawl_with_unreachable_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(
            &path,
            "新聞列表\n[2022-07-01] 第一則 http://127.0.0.1:9/a\n[2019-01-01] 太早 http://127.0.0.1:9/b\n[2023-2-3] 沒有連結\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.fetch.timeout_ms = 500;
        let fetcher = ContentFetcher::new(&config.fetch).unwrap();
        let (_tx, rx) = watch::channel(false);
        let report = run_crawl(&path, &config, &EXTRACTOR, &fetcher, rx).await.unwrap();

        let titles: Vec<_> = report.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["第一則", "沒有連結"]);
        assert_eq!(report.fetched, 0);
        assert!(report.items.iter().all(|i| i.content.is_empty()));
        assert_eq!(report.preview, "");
        assert!(report.keywords.is_empty());
    }
}
