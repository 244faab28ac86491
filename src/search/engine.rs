//! Search Engine Integration
//!
//! Ties together filtering, pattern compilation, field matching and
//! ranking. A search is a pure function of its inputs: the corpus is an
//! immutable snapshot and nothing is cached between calls.

use super::error::SearchError;
use super::filter::{apply_filters, Filter};
use super::fuzzy::FieldMatcher;
use super::pattern::{Pattern, Query, TermMode, DEFAULT_MIN_MATCH_LEN};
use super::ranking::{score_record, score_terms, FieldSelection, RecordScore, ScoringWeights};
use super::record::{FieldValue, Record};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_THRESHOLD: f64 = 0.4;
pub const DEFAULT_LIMIT: usize = 10;

/// Per-search knobs
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub fields: FieldSelection,
    /// Largest score a result may have, in [0, 1]
    pub threshold: f64,
    pub limit: usize,
    /// Patterns shorter than this (in chars) match nothing
    pub min_match_len: usize,
    pub term_mode: TermMode,
    pub weights: ScoringWeights,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: FieldSelection::All,
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            min_match_len: DEFAULT_MIN_MATCH_LEN,
            term_mode: TermMode::Contiguous,
            weights: ScoringWeights::default(),
        }
    }
}

impl SearchOptions {
    pub fn with_fields(mut self, fields: FieldSelection) -> Self {
        self.fields = fields;
        self
    }

    /// Clamped to [0, 1]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_min_match_len(mut self, min_match_len: usize) -> Self {
        self.min_match_len = min_match_len;
        self
    }

    pub fn with_term_mode(mut self, term_mode: TermMode) -> Self {
        self.term_mode = term_mode;
        self
    }
}

/// One ranked hit
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    /// The matched record, with its full field set
    pub record: &'a Record,
    /// 0 is an exact match; never above the threshold
    pub score: f64,
    /// Field that produced the score; None in pass-through mode
    pub matched_field: Option<String>,
}

impl<'a> MatchResult<'a> {
    pub fn id(&self) -> &'a str {
        &self.record.id
    }

    pub fn fields(&self) -> &'a BTreeMap<String, FieldValue> {
        &self.record.fields
    }
}

/// Search engine bound to a set of options
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    options: SearchOptions,
}

impl SearchEngine {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Filter, score, threshold, sort and truncate
    ///
    /// Results are ordered by score ascending; equal scores keep corpus
    /// order. Rejected queries and empty candidate sets yield an empty list.
    pub fn search<'a>(&self, corpus: &'a [Record], query: &Query, filters: &[Filter]) -> Vec<MatchResult<'a>> {
        let options = &self.options;

        let candidates = apply_filters(corpus, filters);
        if candidates.is_empty() {
            debug!(corpus = corpus.len(), "{}", SearchError::EmptyCorpus);
            return Vec::new();
        }

        let raw = match query {
            Query::All => {
                return candidates
                    .into_iter()
                    .take(options.limit)
                    .map(|record| MatchResult {
                        record,
                        score: 0.0,
                        matched_field: None,
                    })
                    .collect();
            }
            Query::Text(raw) => raw,
        };

        let terms = match Pattern::compile_query(raw, options.min_match_len, options.term_mode) {
            Ok(terms) => terms,
            Err(e) => {
                debug!("{}", e);
                return Vec::new();
            }
        };

        let matcher = FieldMatcher::new(options.threshold, options.weights.clone());
        let threshold = options.threshold.clamp(0.0, 1.0);

        let mut results: Vec<MatchResult<'a>> = candidates
            .into_iter()
            .filter_map(|record| {
                let RecordScore {
                    score,
                    matched_field,
                } = match options.term_mode {
                    TermMode::Contiguous => score_record(&matcher, record, &terms[0], &options.fields)?,
                    TermMode::AllTerms => score_terms(&matcher, record, &terms, &options.fields)?,
                };

                (score <= threshold).then_some(MatchResult {
                    record,
                    score,
                    matched_field: Some(matched_field),
                })
            })
            .collect();

        // Stable: ties stay in corpus order
        results.sort_by(|a, b| a.score.total_cmp(&b.score));
        results.truncate(options.limit);

        debug!(
            query = %raw,
            matched = results.len(),
            "search complete"
        );

        results
    }
}

/// Run one search with the given options
pub fn search<'a>(
    corpus: &'a [Record],
    query: &Query,
    options: &SearchOptions,
    filters: &[Filter],
) -> Vec<MatchResult<'a>> {
    SearchEngine::new(options.clone()).search(corpus, query, filters)
}
