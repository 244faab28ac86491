//! Field matcher: approximate substring search
//!
//! Finds where a pattern occurs inside a field while tolerating a bounded
//! number of errors. An error is a substituted character, an adjacent
//! transposition, or a single character inserted into or missing from the
//! matched window. The scan is the free-start edit distance recurrence
//! (Sellers), extended with transpositions, and carries the start offset of
//! the cheapest alignment ending at every column of the field.

use super::pattern::{normalize, Pattern};
use super::ranking::ScoringWeights;
use super::record::FieldValue;

/// Best alignment of a pattern within one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMatch {
    /// Edit operations needed to turn the matched window into the pattern
    pub errors: usize,
    /// Char offset of the window in the normalized field text
    pub offset: usize,
    /// Combined score in [0, 1], 0 being an exact match at the start
    pub score: f64,
}

/// Alignment cost and where it started; ordered by cost, then earliest start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cell {
    errors: usize,
    start: usize,
}

impl Cell {
    fn step(self, cost: usize) -> Self {
        Self {
            errors: self.errors + cost,
            start: self.start,
        }
    }
}

/// Scores field text against compiled patterns
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    threshold: f64,
    weights: ScoringWeights,
}

impl FieldMatcher {
    pub fn new(threshold: f64, weights: ScoringWeights) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            weights,
        }
    }

    /// Largest error count that can still produce a score within the threshold
    ///
    /// Grows with both the threshold and the pattern length, never exceeds
    /// the pattern length.
    pub fn error_budget(&self, pattern_len: usize) -> usize {
        if self.weights.errors <= 0.0 {
            return pattern_len;
        }

        let budget = (self.threshold * pattern_len as f64 / self.weights.errors + 1e-9).floor();
        (budget as usize).min(pattern_len)
    }

    /// Match a pattern inside raw field text
    ///
    /// Returns None (no match) when either side is empty or when every
    /// alignment needs more errors than the budget allows.
    pub fn match_text(&self, text: &str, pattern: &Pattern) -> Option<FieldMatch> {
        let needle = pattern.chars();
        if needle.is_empty() {
            return None;
        }

        let haystack: Vec<char> = normalize(text).chars().collect();
        if haystack.is_empty() {
            return None;
        }

        let budget = self.error_budget(needle.len());
        let field_len = haystack.len();

        best_alignments(&haystack, needle)
            .into_iter()
            .filter(|cell| cell.errors <= budget)
            .map(|cell| FieldMatch {
                errors: cell.errors,
                offset: cell.start,
                score: self
                    .weights
                    .score(cell.errors, needle.len(), cell.start, field_len),
            })
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Match against any cell value using its canonical text form
    pub fn match_value(&self, value: &FieldValue, pattern: &Pattern) -> Option<FieldMatch> {
        let text = value.as_text()?;
        self.match_text(&text, pattern)
    }
}

/// Cheapest alignment ending at each text column (index 0 = before the text)
fn best_alignments(haystack: &[char], needle: &[char]) -> Vec<Cell> {
    let n = haystack.len();

    // Row 0: an empty pattern prefix fits anywhere for free
    let mut before_prev: Vec<Cell> = Vec::new();
    let mut prev: Vec<Cell> = (0..=n).map(|j| Cell { errors: 0, start: j }).collect();

    for (i, &pc) in needle.iter().enumerate() {
        let mut cur = Vec::with_capacity(n + 1);
        cur.push(Cell {
            errors: i + 1,
            start: 0,
        });

        for j in 1..=n {
            let tc = haystack[j - 1];

            let mut best = prev[j - 1].step(usize::from(pc != tc));
            best = best.min(prev[j].step(1));
            best = best.min(cur[j - 1].step(1));

            if i > 0 && j > 1 && pc == haystack[j - 2] && needle[i - 1] == tc {
                best = best.min(before_prev[j - 2].step(1));
            }

            cur.push(best);
        }

        before_prev = std::mem::replace(&mut prev, cur);
    }

    prev
}
