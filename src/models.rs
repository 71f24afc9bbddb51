//! Data models shared by the ingestion, aggregation and crawl pipelines.
//!
//! This module defines the core data structures used throughout the application:
//! - [`CalendarMonth`]: The `YYYY-MM` key every count is bucketed by
//! - [`Document`]: One loaded input file, split into paragraphs
//! - [`DatedParagraph`] and [`CategoryBucket`]: Intermediate aggregation state
//! - [`CountMatrix`]: The rectangular category × month table handed to outputs
//! - [`ListItem`]: One `[date] title url` entry of a list document
//! - [`KeywordResult`]: One ranked keyword
//! - Report types: [`TrendReport`], [`KeywordReport`], [`CrawlReport`]

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A calendar month, ordered chronologically and keyed as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// Build a month, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error returned when a string is not a `YYYY-MM` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a YYYY-MM month key: {0:?}")]
pub struct ParseMonthError(pub String);

impl FromStr for CalendarMonth {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        CalendarMonth::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for CalendarMonth {
    type Error = ParseMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarMonth> for String {
    fn from(month: CalendarMonth) -> Self {
        month.to_string()
    }
}

/// One input document, already split into paragraphs.
///
/// # Fields
///
/// * `source` - The identifier the document was loaded from (its file name)
/// * `paragraphs` - Paragraph texts in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The file name (or other identifier) of the document.
    pub source: String,
    /// Paragraph texts in source order.
    pub paragraphs: Vec<String>,
}

impl Document {
    /// Join all paragraphs with newlines.
    pub fn full_text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// A paragraph whose first date token was valid and inside the horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedParagraph {
    pub month: CalendarMonth,
    pub date: NaiveDate,
    pub text: String,
    pub category: String,
}

/// Per-category monthly counts.
///
/// Counts are only ever incremented, so every value is at least one for the
/// months present; absent months mean zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    /// The channel label the bucket belongs to.
    pub name: String,
    /// Counts keyed by month; months without activity are absent.
    pub monthly_counts: BTreeMap<CalendarMonth, u32>,
}

impl CategoryBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            monthly_counts: BTreeMap::new(),
        }
    }

    /// Add one to the count of `month`.
    pub fn increment(&mut self, month: CalendarMonth) {
        *self.monthly_counts.entry(month).or_insert(0) += 1;
    }

    /// Count for `month`, zero when absent.
    pub fn count(&self, month: CalendarMonth) -> u32 {
        self.monthly_counts.get(&month).copied().unwrap_or(0)
    }

    /// Sum over all months.
    pub fn total(&self) -> u32 {
        self.monthly_counts.values().sum()
    }
}

/// One row of a [`CountMatrix`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub category: String,
    /// One count per month of the matrix spine, zero filled.
    pub counts: Vec<u32>,
}

/// Category × month counts over the complete month spine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMatrix {
    pub months: Vec<CalendarMonth>,
    pub rows: Vec<MatrixRow>,
}

impl CountMatrix {
    /// Sum of every row for each month of the spine.
    pub fn column_totals(&self) -> Vec<u32> {
        let mut totals = vec![0u32; self.months.len()];
        for row in &self.rows {
            for (total, count) in totals.iter_mut().zip(&row.counts) {
                *total += count;
            }
        }
        totals
    }
}

/// An entry parsed from a list document.
///
/// `content` stays empty until the linked page has been fetched, and also
/// when fetching failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub date: NaiveDate,
    pub title: String,
    /// The linked page, empty when the line carried no URL.
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Score attached to a keyword: an occurrence count or a TF-IDF weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordScore {
    Count(u32),
    Weight(f64),
}

impl fmt::Display for KeywordScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordScore::Count(count) => write!(f, "{count}"),
            KeywordScore::Weight(weight) => write!(f, "{weight:.3}"),
        }
    }
}

/// A ranked keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub term: String,
    pub score: KeywordScore,
}

/// The month with the most dated paragraphs across all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakMonth {
    pub month: CalendarMonth,
    pub total: u32,
}

/// Output of the trends pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub matrix: CountMatrix,
    pub peak: Option<PeakMonth>,
    /// Frequency keywords of the paragraphs dated in the peak month.
    pub peak_keywords: Vec<KeywordResult>,
    /// Sources that could not be read; they contribute nothing to the matrix.
    pub failed_documents: Vec<String>,
}

/// Output of the single-document keyword pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub source: String,
    pub keywords: Vec<KeywordResult>,
}

/// Output of the list parse and crawl pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub source: String,
    pub items: Vec<ListItem>,
    /// Number of items whose page yielded non-empty content.
    pub fetched: usize,
    /// The first characters of all fetched content joined together.
    pub preview: String,
    pub keywords: Vec<KeywordResult>,
}
