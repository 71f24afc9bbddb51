//! Keyword extraction over Chinese text.
//!
//! Two ranking modes share one segmenter:
//!
//! - **Frequency**: segment, drop noise tokens, count, keep the top K with
//!   ties ordered by first appearance.
//! - **Weighted**: TF-IDF weights from the segmenter's bundled IDF table,
//!   optionally restricted to parts of speech.
//!
//! Loading the dictionary is the expensive part, so build one
//! [`KeywordExtractor`] per process and share it.

use crate::models::{KeywordResult, KeywordScore};
use itertools::Itertools;
use jieba_rs::{Jieba, KeywordExtract, TfIdf};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub struct KeywordExtractor {
    jieba: Jieba,
    tfidf: TfIdf,
}

impl std::fmt::Debug for KeywordExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordExtractor").finish_non_exhaustive()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    /// Load the default dictionary and IDF table.
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
            tfidf: TfIdf::default(),
        }
    }

    /// Segment `text` into words with the HMM enabled for unknown words.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.jieba.cut(text, true)
    }

    /// The `k` most frequent words of `text`.
    ///
    /// Single-character tokens and tokens without any letter or digit are
    /// skipped. Equal counts keep the order in which the words first appear.
    #[instrument(level = "debug", skip_all, fields(bytes = text.len(), k))]
    pub fn top_frequent(&self, text: &str, k: usize) -> Vec<KeywordResult> {
        if text.trim().is_empty() || k == 0 {
            return Vec::new();
        }

        let mut counts: HashMap<&str, (u32, usize)> = HashMap::new();
        for (position, token) in self
            .segment(text)
            .into_iter()
            .filter(|t| is_meaningful(t))
            .enumerate()
        {
            counts.entry(token).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, u32, usize)> = counts
            .into_iter()
            .map(|(term, (count, first))| (term, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(k);

        debug!(terms = ranked.len(), "Ranked terms by frequency");
        ranked
            .into_iter()
            .map(|(term, count, _)| KeywordResult {
                term: term.to_string(),
                score: KeywordScore::Count(count),
            })
            .collect()
    }

    /// The `k` terms of `text` with the highest TF-IDF weight.
    ///
    /// `allowed_pos` restricts results to the given part-of-speech tags
    /// (`n`, `ns`, `v`, ...); an empty slice keeps every tag.
    #[instrument(level = "debug", skip_all, fields(bytes = text.len(), k))]
    pub fn top_weighted(&self, text: &str, k: usize, allowed_pos: &[String]) -> Vec<KeywordResult> {
        if text.trim().is_empty() || k == 0 {
            return Vec::new();
        }

        let mut keywords = self
            .tfidf
            .extract_keywords(&self.jieba, text, k, allowed_pos.to_vec());
        keywords.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        let keywords: Vec<_> = keywords
            .into_iter()
            .unique_by(|kw| kw.keyword.clone())
            .take(k)
            .collect();

        debug!(terms = keywords.len(), "Ranked terms by weight");
        keywords
            .into_iter()
            .map(|kw| KeywordResult {
                term: kw.keyword,
                score: KeywordScore::Weight(kw.weight),
            })
            .collect()
    }
}

fn is_meaningful(token: &str) -> bool {
    token.chars().count() > 1 && token.chars().any(char::is_alphanumeric)
}
