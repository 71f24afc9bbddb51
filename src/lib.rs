//! Press release trend analysis.
//!
//! The library holds the pipelines behind the `press_trends` binary: date
//! extraction, channel classification, monthly aggregation, keyword
//! extraction, list parsing and article fetching.

pub mod aggregate;
pub mod category;
pub mod config;
pub mod dates;
pub mod documents;
mod error;
pub mod fetcher;
pub mod keywords;
pub mod listing;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod utils;

pub use aggregate::{Aggregation, TemporalAggregator};
pub use category::{CategoryClassifier, CategoryRule};
pub use config::Config;
pub use dates::{DateExtractor, DateMatch, Horizon, SeparatorStyle};
pub use error::PipelineError;
pub use fetcher::{ContentFetcher, FetchOutcome};
pub use keywords::KeywordExtractor;
pub use listing::{LineScan, ListParser, UnmatchedReason};
