//! List documents: one `[YYYY-M-D] title url` entry per line.
//!
//! Each line is scanned once. The scan either yields a [`ListItem`] or says
//! why the line was passed over; lines are never an error.

use crate::dates::Horizon;
use crate::models::ListItem;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

static LIST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d{4})-(\d{1,2})-(\d{1,2})\](.*?)(https?://\S+|$)").unwrap()
});

/// Why a line produced no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// No `[YYYY-M-D]` marker on the line.
    NoMarker,
    /// The marker does not name a real calendar day.
    InvalidDate,
    /// The date lies outside the analysis horizon.
    OutOfHorizon,
}

/// Outcome of scanning one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineScan {
    Matched(ListItem),
    Unmatched(UnmatchedReason),
}

#[derive(Debug, Clone, Default)]
pub struct ListParser {
    horizon: Horizon,
}

impl ListParser {
    pub fn new(horizon: Horizon) -> Self {
        Self { horizon }
    }

    /// Scan a single line.
    pub fn scan_line(&self, line: &str) -> LineScan {
        let Some(caps) = LIST_LINE.captures(line) else {
            return LineScan::Unmatched(UnmatchedReason::NoMarker);
        };

        let date = match (
            caps[1].parse::<i32>(),
            caps[2].parse::<u32>(),
            caps[3].parse::<u32>(),
        ) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        };
        let Some(date) = date else {
            return LineScan::Unmatched(UnmatchedReason::InvalidDate);
        };
        if !self.horizon.contains(date) {
            return LineScan::Unmatched(UnmatchedReason::OutOfHorizon);
        }

        LineScan::Matched(ListItem {
            date,
            title: caps[4].trim().to_string(),
            url: caps[5].to_string(),
            content: String::new(),
        })
    }

    /// Every item of `text`, in line order.
    #[instrument(level = "info", skip_all, fields(bytes = text.len()))]
    pub fn parse(&self, text: &str) -> Vec<ListItem> {
        let mut skipped = 0usize;
        let items: Vec<ListItem> = text
            .lines()
            .filter_map(|line| match self.scan_line(line) {
                LineScan::Matched(item) => Some(item),
                LineScan::Unmatched(reason) => {
                    if reason != UnmatchedReason::NoMarker {
                        debug!(?reason, line, "Skipped list line");
                    }
                    skipped += 1;
                    None
                }
            })
            .collect();
        info!(items = items.len(), skipped, "Parsed list document");
        items
    }
}
