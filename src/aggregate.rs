//! Category × month aggregation of dated paragraphs.
//!
//! Every paragraph of every document is scanned with a [`DateExtractor`]. A
//! paragraph with a valid in-range date adds one to the cell of its
//! document's category and the date's month; anything else is skipped
//! without being reported.
//!
//! The resulting [`Aggregation`] only lives for one run. It exposes the full
//! month spine of the horizon, a zero-filled matrix over that spine and the
//! peak month.

use crate::dates::{DateExtractor, DateMatch, Horizon};
use crate::models::{
    CalendarMonth, CategoryBucket, CountMatrix, DatedParagraph, Document, MatrixRow, PeakMonth,
};
use tracing::{debug, info, instrument};

/// Builds [`Aggregation`]s from documents.
#[derive(Debug, Clone, Default)]
pub struct TemporalAggregator {
    extractor: DateExtractor,
}

impl TemporalAggregator {
    pub fn new(extractor: DateExtractor) -> Self {
        Self { extractor }
    }

    /// Count the dated paragraphs of `documents` per category and month.
    ///
    /// `category_of` maps a document to its channel label. Buckets appear in
    /// the order their category is first seen.
    #[instrument(level = "info", skip_all, fields(documents = documents.len()))]
    pub fn aggregate<F>(&self, documents: &[Document], category_of: F) -> Aggregation
    where
        F: Fn(&Document) -> String,
    {
        let mut aggregation = Aggregation::new(self.extractor.horizon());

        for document in documents {
            let category = category_of(document);
            // Documents without any dated paragraph still get a (zero) row.
            aggregation.bucket_mut(&category);

            let mut matched = 0usize;
            for text in &document.paragraphs {
                let DateMatch::Found(date) = self.extractor.extract(text) else {
                    continue;
                };
                let month = CalendarMonth::of(date);
                aggregation.bucket_mut(&category).increment(month);
                aggregation.paragraphs.push(DatedParagraph {
                    month,
                    date,
                    text: text.clone(),
                    category: category.clone(),
                });
                matched += 1;
            }
            debug!(
                source = %document.source,
                %category,
                paragraphs = document.paragraphs.len(),
                matched,
                "Aggregated document"
            );
        }

        info!(
            categories = aggregation.buckets.len(),
            dated_paragraphs = aggregation.paragraphs.len(),
            "Aggregation complete"
        );
        aggregation
    }
}

/// The counts of one aggregation run.
#[derive(Debug, Clone)]
pub struct Aggregation {
    horizon: Horizon,
    buckets: Vec<CategoryBucket>,
    paragraphs: Vec<DatedParagraph>,
}

impl Aggregation {
    fn new(horizon: Horizon) -> Self {
        Self {
            horizon,
            buckets: Vec::new(),
            paragraphs: Vec::new(),
        }
    }

    fn bucket_mut(&mut self, category: &str) -> &mut CategoryBucket {
        let index = match self.buckets.iter().position(|b| b.name == category) {
            Some(index) => index,
            None => {
                self.buckets.push(CategoryBucket::new(category));
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[index]
    }

    pub fn buckets(&self) -> &[CategoryBucket] {
        &self.buckets
    }

    pub fn bucket(&self, category: &str) -> Option<&CategoryBucket> {
        self.buckets.iter().find(|b| b.name == category)
    }

    /// Every month of the horizon, in order, whether or not it has counts.
    pub fn spine(&self) -> Vec<CalendarMonth> {
        self.horizon.months()
    }

    /// Category × month matrix over [`Aggregation::spine`], zero filled.
    pub fn materialize(&self) -> CountMatrix {
        let months = self.spine();
        let rows = self
            .buckets
            .iter()
            .map(|bucket| MatrixRow {
                category: bucket.name.clone(),
                counts: months.iter().map(|m| bucket.count(*m)).collect(),
            })
            .collect();
        CountMatrix { months, rows }
    }

    /// The month with the highest total across categories.
    ///
    /// Ties go to the earliest month. `None` when nothing was counted.
    pub fn peak_month(&self) -> Option<PeakMonth> {
        let matrix = self.materialize();
        let totals = matrix.column_totals();
        let mut peak: Option<PeakMonth> = None;
        for (month, total) in matrix.months.into_iter().zip(totals) {
            if total > peak.map_or(0, |p| p.total) {
                peak = Some(PeakMonth { month, total });
            }
        }
        peak
    }

    /// Texts of the paragraphs dated in `month`, in source order.
    pub fn texts_for_month(&self, month: CalendarMonth) -> Vec<&str> {
        self.paragraphs
            .iter()
            .filter(|p| p.month == month)
            .map(|p| p.text.as_str())
            .collect()
    }

    pub fn dated_paragraphs(&self) -> &[DatedParagraph] {
        &self.paragraphs
    }
}
