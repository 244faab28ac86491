//! Fuzzy record search
//!
//! Filters a corpus of records, scores each survivor against the query by
//! approximate substring matching and returns a stably ordered page of hits.

pub mod engine;
pub mod error;
pub mod filter;
pub mod fuzzy;
pub mod pattern;
pub mod ranking;
pub mod record;


pub use engine::{search, MatchResult, SearchEngine, SearchOptions};
pub use error::SearchError;
pub use filter::Filter;
pub use pattern::{Query, TermMode};
pub use ranking::FieldSelection;
pub use record::{FieldValue, Record};
