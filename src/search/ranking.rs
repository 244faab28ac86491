//! Scoring: per-field score weighting and per-record reduction
//!
//! Scores are distances: 0 is a perfect match, 1 is the worst. A record is
//! as good as its best searched field.

use super::fuzzy::FieldMatcher;
use super::pattern::Pattern;
use super::record::Record;

/// Relative weight of the two terms of a field score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    /// Weight of the mismatch ratio (errors / pattern length)
    pub errors: f64,
    /// Weight of the match offset ratio (offset / field length)
    pub location: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            errors: 0.6,
            location: 0.4,
        }
    }
}

impl ScoringWeights {
    /// Weighted sum of the error and location terms, clamped to [0, 1]
    pub fn score(&self, errors: usize, pattern_len: usize, offset: usize, field_len: usize) -> f64 {
        let error_term = errors as f64 / pattern_len.max(1) as f64;
        let location_term = offset as f64 / field_len.max(1) as f64;

        (self.errors * error_term + self.location * location_term).clamp(0.0, 1.0)
    }
}

/// Which fields of a record take part in matching
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSelection {
    /// Every field the record carries (the identifier is never a field)
    #[default]
    All,
    Only(Vec<String>),
}

impl FieldSelection {
    /// Empty lists mean "all fields"
    pub fn from_names(names: Vec<String>) -> Self {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            FieldSelection::All
        } else {
            FieldSelection::Only(names)
        }
    }
}

/// Reduced score of one record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordScore {
    pub score: f64,
    /// Field that produced the score
    pub matched_field: String,
}

/// Best score across the selected fields of a record
///
/// Absent, blank and non-matching fields are left out of the minimum rather
/// than counted as worst-case. None means no selected field matched.
pub fn score_record(
    matcher: &FieldMatcher,
    record: &Record,
    pattern: &Pattern,
    fields: &FieldSelection,
) -> Option<RecordScore> {
    let mut best: Option<RecordScore> = None;

    let mut consider = |name: &str| {
        let Some(value) = record.get(name) else {
            return;
        };
        let Some(hit) = matcher.match_value(value, pattern) else {
            return;
        };

        if best.as_ref().map_or(true, |b| hit.score < b.score) {
            best = Some(RecordScore {
                score: hit.score,
                matched_field: name.to_string(),
            });
        }
    };

    match fields {
        FieldSelection::All => record.fields.keys().for_each(|name| consider(name)),
        FieldSelection::Only(names) => names.iter().for_each(|name| consider(name)),
    }

    best
}

/// Boolean AND over several terms: every term must match somewhere
///
/// The record is scored by its worst term.
pub fn score_terms(
    matcher: &FieldMatcher,
    record: &Record,
    terms: &[Pattern],
    fields: &FieldSelection,
) -> Option<RecordScore> {
    let mut worst: Option<RecordScore> = None;

    for term in terms {
        let term_score = score_record(matcher, record, term, fields)?;
        if worst.as_ref().map_or(true, |w| term_score.score > w.score) {
            worst = Some(term_score);
        }
    }

    worst
}
