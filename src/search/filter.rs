//! Filter stage: exact and range predicates applied before scoring
//!
//! Filters only shrink the candidate set; they never touch scores. A record
//! whose target field is missing or cannot be interpreted fails the filter.

use super::error::SearchError;
use super::record::{FieldValue, Record};
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// A single predicate over one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    DateOnOrAfter { field: String, date: NaiveDate },
    DateOnOrBefore { field: String, date: NaiveDate },
    /// Case-insensitive equality with the trimmed canonical text
    Equals { field: String, value: String },
    NumberAtLeast { field: String, value: f64 },
    NumberAtMost { field: String, value: f64 },
}

impl Filter {
    pub fn field(&self) -> &str {
        match self {
            Filter::DateOnOrAfter { field, .. }
            | Filter::DateOnOrBefore { field, .. }
            | Filter::Equals { field, .. }
            | Filter::NumberAtLeast { field, .. }
            | Filter::NumberAtMost { field, .. } => field,
        }
    }

    /// Evaluate against one record
    ///
    /// Err means the predicate could not be evaluated at all; callers treat
    /// that the same as a failed predicate.
    pub fn evaluate(&self, record: &Record) -> Result<bool, SearchError> {
        let field = self.field();
        let value = record
            .get(field)
            .ok_or_else(|| SearchError::unparseable(field, "field is missing"))?;

        match self {
            Filter::DateOnOrAfter { date, .. } => Ok(date_value(field, value)? >= *date),
            Filter::DateOnOrBefore { date, .. } => Ok(date_value(field, value)? <= *date),
            Filter::NumberAtLeast { value: min, .. } => Ok(number_value(field, value)? >= *min),
            Filter::NumberAtMost { value: max, .. } => Ok(number_value(field, value)? <= *max),
            Filter::Equals { value: expected, .. } => {
                let expected = expected.trim().to_lowercase();
                let equals = |v: &FieldValue| {
                    v.as_text()
                        .is_some_and(|t| t.trim().to_lowercase() == expected)
                };

                match value {
                    // Multi-select cells match when any option does
                    FieldValue::List(items) => Ok(items.iter().any(equals) || equals(value)),
                    other => {
                        if other.as_text().is_none() {
                            return Err(SearchError::unparseable(field, "field has no text value"));
                        }
                        Ok(equals(other))
                    }
                }
            }
        }
    }
}

/// Parses `FIELD>=VALUE`, `FIELD<=VALUE` and `FIELD=VALUE`
///
/// Range values are read as dates first, then as numbers.
impl FromStr for Filter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| AppError::InvalidInput(format!("Invalid filter '{}': {}", s, reason));

        let (field, op, raw) = if let Some((f, v)) = s.split_once(">=") {
            (f, ">=", v)
        } else if let Some((f, v)) = s.split_once("<=") {
            (f, "<=", v)
        } else if let Some((f, v)) = s.split_once('=') {
            (f, "=", v)
        } else {
            return Err(invalid("expected FIELD>=VALUE, FIELD<=VALUE or FIELD=VALUE"));
        };

        let field = field.trim().to_string();
        let raw = raw.trim();
        if field.is_empty() {
            return Err(invalid("field name is empty"));
        }
        if raw.is_empty() {
            return Err(invalid("value is empty"));
        }

        if op == "=" {
            return Ok(Filter::Equals {
                field,
                value: raw.to_string(),
            });
        }

        if let Some(date) = parse_date(raw) {
            return Ok(match op {
                ">=" => Filter::DateOnOrAfter { field, date },
                _ => Filter::DateOnOrBefore { field, date },
            });
        }

        let value = parse_number(raw).ok_or_else(|| invalid("value is neither a date nor a number"))?;
        Ok(match op {
            ">=" => Filter::NumberAtLeast { field, value },
            _ => Filter::NumberAtMost { field, value },
        })
    }
}

/// Keep the records that pass every filter, preserving corpus order
pub fn apply_filters<'a>(corpus: &'a [Record], filters: &[Filter]) -> Vec<&'a Record> {
    corpus
        .iter()
        .filter(|record| {
            filters.iter().all(|filter| match filter.evaluate(record) {
                Ok(passed) => passed,
                Err(e) => {
                    debug!(record = %record.id, "excluded: {}", e);
                    false
                }
            })
        })
        .collect()
}

/// Calendar date from `YYYY-MM-DD`, an RFC 3339 timestamp (UTC day) or `M/D/YYYY`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(text, "%m/%d/%Y").ok()
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn date_value(field: &str, value: &FieldValue) -> Result<NaiveDate, SearchError> {
    value
        .as_text()
        .and_then(|t| parse_date(&t))
        .ok_or_else(|| SearchError::unparseable(field, "value is not a date"))
}

fn number_value(field: &str, value: &FieldValue) -> Result<f64, SearchError> {
    match value {
        FieldValue::Number(n) => Ok(*n),
        other => other
            .as_text()
            .and_then(|t| parse_number(&t))
            .ok_or_else(|| SearchError::unparseable(field, "value is not a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grants() -> Vec<Record> {
        vec![
            Record::new("a")
                .with_field("Deadline", "2024-06-01")
                .with_field("Status", "Open")
                .with_field("Amount", 5000.0),
            Record::new("b")
                .with_field("Deadline", "2024-01-15")
                .with_field("Status", "closed")
                .with_field("Amount", "$12,500"),
            Record::new("c")
                .with_field("Deadline", "not yet announced")
                .with_field("Status", "Open"),
            Record::new("d").with_field("Status", " open "),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_date_cutoff_fails_closed() {
        let corpus = grants();
        let filters = vec![Filter::DateOnOrAfter {
            field: "Deadline".into(),
            date: date(2024, 3, 1),
        }];

        // c is unparseable and d has no deadline: both excluded
        assert_eq!(ids(&apply_filters(&corpus, &filters)), vec!["a"]);
    }

    #[test]
    fn test_date_cutoff_inclusive() {
        let record = Record::new("a").with_field("Deadline", "2024-06-01");
        let on = Filter::DateOnOrAfter {
            field: "Deadline".into(),
            date: date(2024, 6, 1),
        };
        let before = Filter::DateOnOrBefore {
            field: "Deadline".into(),
            date: date(2024, 6, 1),
        };
        assert_eq!(on.evaluate(&record), Ok(true));
        assert_eq!(before.evaluate(&record), Ok(true));
    }

    #[test]
    fn test_unparseable_is_an_error() {
        let record = Record::new("c").with_field("Deadline", "soon");
        let filter = Filter::DateOnOrAfter {
            field: "Deadline".into(),
            date: date(2024, 1, 1),
        };
        assert!(matches!(
            filter.evaluate(&record),
            Err(SearchError::UnparseableFilterValue { .. })
        ));

        let missing = Record::new("d");
        assert!(filter.evaluate(&missing).is_err());
    }

    #[test]
    fn test_equals_case_insensitive() {
        let corpus = grants();
        let filters = vec![Filter::Equals {
            field: "Status".into(),
            value: "OPEN".into(),
        }];
        assert_eq!(ids(&apply_filters(&corpus, &filters)), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_equals_any_list_item() {
        let record = Record::new("a").with_field(
            "Disciplines",
            FieldValue::List(vec!["Biology".into(), "Ecology".into()]),
        );
        let filter = Filter::Equals {
            field: "Disciplines".into(),
            value: "ecology".into(),
        };
        assert_eq!(filter.evaluate(&record), Ok(true));
    }

    #[test]
    fn test_number_range_reads_text() {
        let corpus = grants();
        let filters = vec![Filter::NumberAtLeast {
            field: "Amount".into(),
            value: 10000.0,
        }];
        assert_eq!(ids(&apply_filters(&corpus, &filters)), vec!["b"]);

        let filters = vec![Filter::NumberAtMost {
            field: "Amount".into(),
            value: 10000.0,
        }];
        assert_eq!(ids(&apply_filters(&corpus, &filters)), vec!["a"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let corpus = grants();
        let status = Filter::Equals {
            field: "Status".into(),
            value: "open".into(),
        };
        let deadline = Filter::DateOnOrAfter {
            field: "Deadline".into(),
            date: date(2024, 1, 1),
        };

        let both = apply_filters(&corpus, &[status.clone(), deadline.clone()]);
        let status_only = apply_filters(&corpus, &[status]);
        let deadline_only = apply_filters(&corpus, &[deadline]);

        let expected: Vec<String> = ids(&status_only)
            .into_iter()
            .filter(|id| ids(&deadline_only).contains(id))
            .collect();
        assert_eq!(ids(&both), expected);
        assert_eq!(ids(&both), vec!["a"]);
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        let corpus = grants();
        assert_eq!(apply_filters(&corpus, &[]).len(), corpus.len());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-05-01"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01T23:30:00.000Z"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01T23:30:00-05:00"), Some(date(2024, 5, 2)));
        assert_eq!(parse_date("5/1/2024"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("May 1st"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "Deadline>=2024-05-01".parse::<Filter>().unwrap(),
            Filter::DateOnOrAfter {
                field: "Deadline".into(),
                date: date(2024, 5, 1)
            }
        );
        assert_eq!(
            "Amount <= 5000".parse::<Filter>().unwrap(),
            Filter::NumberAtMost {
                field: "Amount".into(),
                value: 5000.0
            }
        );
        assert_eq!(
            "Status=Open".parse::<Filter>().unwrap(),
            Filter::Equals {
                field: "Status".into(),
                value: "Open".into()
            }
        );
        assert!("Deadline>=soon".parse::<Filter>().is_err());
        assert!("=Open".parse::<Filter>().is_err());
        assert!("Status".parse::<Filter>().is_err());
    }

    #[test]
    fn test_serde_tagged() {
        let filter: Filter = serde_json::from_value(json!({
            "kind": "date_on_or_after",
            "field": "Deadline",
            "date": "2024-05-01"
        }))
        .unwrap();
        assert_eq!(
            filter,
            Filter::DateOnOrAfter {
                field: "Deadline".into(),
                date: date(2024, 5, 1)
            }
        );
    }
}
