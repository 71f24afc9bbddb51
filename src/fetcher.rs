//! Retrieval of the article text behind list links.
//!
//! One GET per URL with a bounded timeout and no retry. The body is decoded
//! with the charset the server declares, or a detected one when it declares
//! none, and the text of the configured content container is returned.
//!
//! Fetching never fails: every problem becomes a [`FetchOutcome`] variant
//! that degrades to empty content, so one bad link cannot abort a crawl.
//!
//! [`ContentFetcher::fetch_all`] runs a bounded pool of requests and returns
//! items in input order, whatever order the responses arrive in.

use crate::config::FetchConfig;
use crate::models::ListItem;
use crate::utils::truncate_for_log;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// What happened when fetching one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Text of the content container.
    Ok(String),
    /// Connection error, timeout, invalid URL or non-success status.
    NetworkError(String),
    /// The page loaded but has no content container.
    MissingContainer,
    /// The crawl was cancelled before this request finished.
    Cancelled,
}

impl FetchOutcome {
    /// The fetched text; empty for every failure.
    pub fn into_content(self) -> String {
        match self {
            FetchOutcome::Ok(text) => text,
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
    container: Selector,
    concurrency: usize,
}

impl ContentFetcher {
    /// Build a fetcher from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container selector does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self, Box<dyn Error>> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let container = Selector::parse(&config.container_selector)
            .map_err(|e| format!("invalid container selector {:?}: {e}", config.container_selector))?;
        Ok(Self {
            client,
            container,
            concurrency: config.concurrency.max(1),
        })
    }

    /// Fetch one URL and extract its content container.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let t0 = Instant::now();
        let outcome = match parse_http_url(url) {
            Err(e) => FetchOutcome::NetworkError(e),
            Ok(parsed) => match self.download(parsed).await {
                Ok(html) => self.extract(&html),
                Err(e) => FetchOutcome::NetworkError(e.to_string()),
            },
        };
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match &outcome {
            FetchOutcome::Ok(text) => debug!(%url, chars = text.chars().count(), elapsed_ms, "Fetched content"),
            FetchOutcome::NetworkError(e) => warn!(%url, error = %e, elapsed_ms, "Fetch failed; using empty content"),
            FetchOutcome::MissingContainer => warn!(%url, elapsed_ms, "Content container missing; using empty content"),
            FetchOutcome::Cancelled => {}
        }
        outcome
    }

    async fn download(&self, url: Url) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_label)
            .and_then(|label| Encoding::for_label(label.as_bytes()));
        let bytes = response.bytes().await?;
        Ok(decode(&bytes, declared))
    }

    fn extract(&self, html: &str) -> FetchOutcome {
        let document = Html::parse_document(html);
        match document.select(&self.container).next() {
            Some(element) => {
                let text = element.text().collect::<Vec<_>>().join("\n");
                FetchOutcome::Ok(text.trim().to_string())
            }
            None => FetchOutcome::MissingContainer,
        }
    }

    /// Fetch the content of every item through a bounded pool.
    ///
    /// Items come back in the order given. Once `cancel` turns `true`,
    /// requests still in flight or not yet started end as
    /// [`FetchOutcome::Cancelled`].
    #[instrument(level = "info", skip_all, fields(items = items.len(), concurrency = self.concurrency))]
    pub async fn fetch_all(
        &self,
        items: Vec<ListItem>,
        cancel: watch::Receiver<bool>,
    ) -> Vec<(ListItem, FetchOutcome)> {
        let total = items.len();
        let results: Vec<(ListItem, FetchOutcome)> = stream::iter(items)
            .map(|item| {
                let mut cancel = cancel.clone();
                async move {
                    let outcome = if *cancel.borrow() {
                        FetchOutcome::Cancelled
                    } else {
                        tokio::select! {
                            outcome = self.fetch(&item.url) => outcome,
                            Ok(_) = cancel.wait_for(|cancelled| *cancelled) => FetchOutcome::Cancelled,
                        }
                    };
                    (item, outcome)
                }
            })
            .buffered(self.concurrency)
            .map(|(mut item, outcome)| {
                item.content = outcome.clone().into_content();
                (item, outcome)
            })
            .collect()
            .await;

        let fetched = results.iter().filter(|(item, _)| !item.content.is_empty()).count();
        info!(total, fetched, "Fetched list contents");
        results
    }
}

/// Only absolute http(s) links are requested.
fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid URL {raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme {other:?} in {raw:?}")),
    }
}

/// The `charset` parameter of a `Content-Type` header value.
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode a body with the declared encoding, or a detected one.
fn decode(bytes: &[u8], declared: Option<&'static Encoding>) -> String {
    let encoding = declared.unwrap_or_else(|| {
        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        detector.guess(None, true)
    });
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(
            encoding = used.name(),
            preview = %truncate_for_log(&text, 80),
            "Body contained malformed sequences"
        );
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(timeout_ms: u64) -> FetchConfig {
        FetchConfig {
            timeout_ms,
            ..FetchConfig::default()
        }
    }

    fn item(url: &str) -> ListItem {
        ListItem {
            date: NaiveDate::from_ymd_opt(2022, 7, 1).unwrap(),
            title: "t".into(),
            url: url.into(),
            content: String::new(),
        }
    }

    /// Serve `body` with `content_type` to every connection.
    async fn serve(content_type: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(&body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}/")
    }

    /// Accept connections and never answer.
    async fn serve_hanging() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}/")
    }

    #[test]
    fn test_charset_label() {
        assert_eq!(charset_label("text/html; charset=GBK"), Some("GBK"));
        assert_eq!(charset_label("text/html;charset=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset_label("text/html"), None);
    }

    #[test]
    fn test_decode_detects_gbk() {
        let text = "国务院台湾事务办公室今天上午举行例行新闻发布会，发言人就两岸关系等问题回答记者提问。".repeat(4);
        let (bytes, _, _) = encoding_rs::GBK.encode(&text);
        assert_eq!(decode(&bytes, None), text);
    }

    #[tokio::test]
    async fn test_extracts_container_text() {
        let html = r#"<html><body><div class="nav">menu</div>
            <div class="TRS_Editor"><p>第一段</p><p>第二段</p></div></body></html>"#;
        let url = serve("text/html; charset=utf-8", html.as_bytes().to_vec()).await;
        let fetcher = ContentFetcher::new(&config(2_000)).unwrap();
        assert_eq!(fetcher.fetch(&url).await, FetchOutcome::Ok("第一段\n第二段".into()));
    }

    #[tokio::test]
    async fn test_declared_charset_is_used() {
        let html = r#"<div class="TRS_Editor">两岸交流</div>"#;
        let (bytes, _, _) = encoding_rs::GBK.encode(html);
        let url = serve("text/html; charset=gbk", bytes.into_owned()).await;
        let fetcher = ContentFetcher::new(&config(2_000)).unwrap();
        assert_eq!(fetcher.fetch(&url).await.into_content(), "两岸交流");
    }

    #[tokio::test]
    async fn test_missing_container() {
        let url = serve("text/html", b"<html><body><p>nothing</p></body></html>".to_vec()).await;
        let fetcher = ContentFetcher::new(&config(2_000)).unwrap();
        let outcome = fetcher.fetch(&url).await;
        assert_eq!(outcome, FetchOutcome::MissingContainer);
        assert_eq!(outcome.into_content(), "");
    }

    #[tokio::test]
    async fn test_timeout_returns_empty_content() {
        let url = serve_hanging().await;
        let fetcher = ContentFetcher::new(&config(300)).unwrap();
        let t0 = Instant::now();
        let outcome = fetcher.fetch(&url).await;
        assert!(t0.elapsed() < Duration::from_secs(3));
        assert!(matches!(outcome, FetchOutcome::NetworkError(_)));
        assert_eq!(outcome.into_content(), "");
    }

    #[tokio::test]
    async fn test_bad_urls_never_fail() {
        let fetcher = ContentFetcher::new(&config(500)).unwrap();
        assert!(matches!(fetcher.fetch("").await, FetchOutcome::NetworkError(_)));
        assert!(matches!(fetcher.fetch("not a url").await, FetchOutcome::NetworkError(_)));
        assert!(matches!(fetcher.fetch("ftp://example.com/a.html").await, FetchOutcome::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_order() {
        let good = serve("text/html", br#"<div class="TRS_Editor">ok</div>"#.to_vec()).await;
        let hanging = serve_hanging().await;
        let items = vec![item(&hanging), item(&good), item(""), item(&good)];
        let fetcher = ContentFetcher::new(&FetchConfig {
            timeout_ms: 300,
            concurrency: 3,
            ..FetchConfig::default()
        })
        .unwrap();
        let (_tx, rx) = watch::channel(false);
        let results = fetcher.fetch_all(items, rx).await;

        let urls: Vec<_> = results.iter().map(|(i, _)| i.url.as_str()).collect();
        assert_eq!(urls, vec![hanging.as_str(), good.as_str(), "", good.as_str()]);
        let contents: Vec<_> = results.iter().map(|(i, _)| i.content.as_str()).collect();
        assert_eq!(contents, vec!["", "ok", "", "ok"]);
    }

    #[tokio::test]
    async fn test_cancelled_crawl() {
        let hanging = serve_hanging().await;
        let fetcher = ContentFetcher::new(&config(10_000)).unwrap();
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = tx.send(true);
        });
        let t0 = Instant::now();
        let results = fetcher.fetch_all(vec![item(&hanging), item(&hanging)], rx).await;
        assert!(t0.elapsed() < Duration::from_secs(5));
        assert!(results.iter().all(|(_, o)| *o == FetchOutcome::Cancelled));
    }
}
