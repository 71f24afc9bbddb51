//! Date tokens embedded in free text.
//!
//! Press releases carry their publication date somewhere inside the
//! paragraph, written in one of several conventions:
//!
//! | Style | Example |
//! |-------|---------|
//! | [`SeparatorStyle::Dash`] | `2021-03-05` |
//! | [`SeparatorStyle::Slash`] | `2021/3/5` |
//! | [`SeparatorStyle::UnitGlyph`] | `2021年3月5日` |
//! | [`SeparatorStyle::Dot`] | `2021.03.05` |
//!
//! All styles share one grammar: a year in `2020..=2025`, a month in
//! `1..=12` and a day in `1..=31`, each optionally zero padded, with an
//! optional trailing `日`. Separators may be mixed within a token as long as
//! each one belongs to an enabled style.

use crate::models::CalendarMonth;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The separator conventions a [`DateExtractor`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorStyle {
    /// `-`
    Dash,
    /// `/`
    Slash,
    /// `年` between year and month, `月` between month and day.
    UnitGlyph,
    /// `.`
    Dot,
}

impl SeparatorStyle {
    pub const ALL: [SeparatorStyle; 4] = [
        SeparatorStyle::Dash,
        SeparatorStyle::Slash,
        SeparatorStyle::UnitGlyph,
        SeparatorStyle::Dot,
    ];

    fn year_month_separator(self) -> &'static str {
        match self {
            SeparatorStyle::Dash => "-",
            SeparatorStyle::Slash => "/",
            SeparatorStyle::UnitGlyph => "年",
            SeparatorStyle::Dot => r"\.",
        }
    }

    fn month_day_separator(self) -> &'static str {
        match self {
            SeparatorStyle::Dash => "-",
            SeparatorStyle::Slash => "/",
            SeparatorStyle::UnitGlyph => "月",
            SeparatorStyle::Dot => r"\.",
        }
    }
}

/// The fixed analysis window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    start: NaiveDate,
    end: NaiveDate,
}

impl Horizon {
    /// January 2020 through April 2025.
    pub const STANDARD: Horizon = Horizon {
        start: match NaiveDate::from_ymd_opt(2020, 1, 1) {
            Some(date) => date,
            None => NaiveDate::MIN,
        },
        end: match NaiveDate::from_ymd_opt(2025, 4, 30) {
            Some(date) => date,
            None => NaiveDate::MAX,
        },
    };

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn first_month(&self) -> CalendarMonth {
        CalendarMonth::of(self.start)
    }

    pub fn last_month(&self) -> CalendarMonth {
        CalendarMonth::of(self.end)
    }

    /// Every month of the window in calendar order.
    pub fn months(&self) -> Vec<CalendarMonth> {
        let last = self.last_month();
        std::iter::successors(Some(self.first_month()), |m| Some(m.succ()))
            .take_while(|m| *m <= last)
            .collect()
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon::STANDARD
    }
}

/// Result of scanning one line for a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMatch {
    Found(NaiveDate),
    Absent,
}

impl DateMatch {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateMatch::Found(date) => Some(date),
            DateMatch::Absent => None,
        }
    }
}

/// Finds the first date token in a line and validates it.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    pattern: Regex,
    horizon: Horizon,
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new(&SeparatorStyle::ALL)
    }
}

impl DateExtractor {
    /// Build an extractor accepting the given separator styles.
    ///
    /// An empty style list falls back to all styles.
    pub fn new(styles: &[SeparatorStyle]) -> Self {
        let styles: &[SeparatorStyle] = if styles.is_empty() {
            &SeparatorStyle::ALL
        } else {
            styles
        };
        let year_month = styles
            .iter()
            .map(|s| s.year_month_separator())
            .collect::<Vec<_>>()
            .join("|");
        let month_day = styles
            .iter()
            .map(|s| s.month_day_separator())
            .collect::<Vec<_>>()
            .join("|");
        // Longer alternatives first: the regex engine takes the first
        // alternative that matches, not the longest.
        let source = format!(
            r"(202[0-5])(?:{year_month})(1[0-2]|0?[1-9])(?:{month_day})(3[01]|[12][0-9]|0?[1-9])日?"
        );
        let pattern = Regex::new(&source).expect("Not a valid date grammar");
        Self {
            pattern,
            horizon: Horizon::STANDARD,
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Scan `line` for its first date token.
    ///
    /// Only the first token counts: when it names an impossible day (say
    /// April 31) or lies outside the horizon, the line has no date.
    pub fn extract(&self, line: &str) -> DateMatch {
        let Some(caps) = self
            .pattern
            .captures_iter(line)
            .find(|caps| caps.get(0).is_some_and(|m| is_isolated(line, m.start(), m.end())))
        else {
            return DateMatch::Absent;
        };

        let year = caps[1].parse::<i32>();
        let month = caps[2].parse::<u32>();
        let day = caps[3].parse::<u32>();
        let date = match (year, month, day) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        };

        match date {
            Some(date) if self.horizon.contains(date) => DateMatch::Found(date),
            Some(date) => {
                trace!(%date, "date outside horizon");
                DateMatch::Absent
            }
            None => {
                trace!(token = &caps[0], "not a calendar date");
                DateMatch::Absent
            }
        }
    }
}

/// A token must not continue a longer run of digits on either side.
///
/// A trailing `日` closes the token, so digits may follow it directly.
fn is_isolated(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].chars().next_back();
    if before.is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    if line[..end].ends_with('日') {
        return true;
    }
    !line[end..].chars().next().is_some_and(|c| c.is_ascii_digit())
}
