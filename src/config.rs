//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```yaml
//! categories:
//!   - { key: "tbdt", label: "台辦動態" }
//!   - { key: "jljw", label: "交流交往" }
//! fetch:
//!   timeout_ms: 8000
//!   concurrency: 8
//! keywords:
//!   allowed_pos: ["n", "ns", "vn"]
//! ```

use crate::category::{CategoryRule, default_rules};
use crate::dates::SeparatorStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered `key → label` rules applied to document file names.
    pub categories: Vec<CategoryRule>,
    /// Date separator conventions recognised in paragraphs.
    pub separators: Vec<SeparatorStyle>,
    /// How many category documents the trends pipeline expects.
    pub expected_documents: usize,
    /// Characters of crawled text kept in the crawl report preview.
    pub preview_chars: usize,
    pub keywords: KeywordConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: default_rules(),
            separators: SeparatorStyle::ALL.to_vec(),
            expected_documents: 5,
            preview_chars: 500,
            keywords: KeywordConfig::default(),
            fetch: FetchConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Frequency keywords listed for the peak month.
    pub peak_top_k: usize,
    /// Weighted keywords listed for a single document.
    pub document_top_k: usize,
    /// Frequency keywords listed for crawled content.
    pub crawl_top_k: usize,
    /// Part-of-speech tags kept by weighted extraction; empty keeps all.
    pub allowed_pos: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            peak_top_k: 20,
            document_top_k: 30,
            crawl_top_k: 20,
            allowed_pos: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Requests in flight at once.
    pub concurrency: usize,
    /// CSS selector of the element holding the article body.
    pub container_selector: String,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            concurrency: 4,
            container_selector: "div.TRS_Editor".to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Labels used when rendering reports. Passed explicitly to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    pub month_label: String,
    pub count_label: String,
    /// Optional display names keyed by category label.
    pub display_names: BTreeMap<String, String>,
}

impl RenderConfig {
    /// The display name of `category`, or the category itself.
    pub fn display_name<'a>(&'a self, category: &'a str) -> &'a str {
        self.display_names
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "2020.01–2025.04 國台辦各欄目新聞稿數量變化".to_string(),
            month_label: "年月".to_string(),
            count_label: "數量".to_string(),
            display_names: BTreeMap::new(),
        }
    }
}

/// Load configuration from `path`, or defaults when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`Config`].
#[instrument(level = "info")]
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(Config::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    let config: Config = serde_yaml::from_str(&raw)?;
    info!(
        path = %path.display(),
        categories = config.categories.len(),
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.expected_documents, 5);
        assert_eq!(config.fetch.timeout_ms, 5_000);
        assert_eq!(config.fetch.container_selector, "div.TRS_Editor");
        assert_eq!(config.keywords.peak_top_k, 20);
        assert_eq!(config.keywords.document_top_k, 30);
        assert_eq!(config.separators.len(), 4);
        assert_eq!(config.categories.len(), 5);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
categories:
  - { key: "tbdt", label: "台辦動態" }
  - { key: "xwfb", label: "新聞發佈" }
separators: [dash, unit_glyph]
fetch:
  concurrency: 8
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.categories[0], CategoryRule::new("tbdt", "台辦動態"));
        assert_eq!(config.categories[1].label, "新聞發佈");
        assert_eq!(
            config.separators,
            vec![SeparatorStyle::Dash, SeparatorStyle::UnitGlyph]
        );
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.fetch.timeout_ms, 5_000);
        assert_eq!(config.keywords, KeywordConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "preview_chars: 100\nrender:\n  title: Trends").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.preview_chars, 100);
        assert_eq!(config.render.title, "Trends");
        assert_eq!(config.render.count_label, "數量");
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Some(Path::new("/nonexistent/press_trends.yaml"))).is_err());
        assert_eq!(load_config(None).unwrap(), Config::default());
    }

    #[test]
    fn test_display_name_fallback() {
        let mut render = RenderConfig::default();
        render.display_names.insert("tbdt".into(), "台辦動態".into());
        assert_eq!(render.display_name("tbdt"), "台辦動態");
        assert_eq!(render.display_name("other"), "other");
    }
}
