//! Error taxonomy for the matching core
//!
//! None of these abort a search on their own: the ranker absorbs them and
//! expresses the outcome as an exclusion from the result list.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Nothing left to rank after filtering
    #[error("Corpus is empty")]
    EmptyCorpus,
    /// Query did not survive normalization
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },
    /// A filter could not be evaluated against one record
    #[error("Cannot evaluate filter on field '{field}': {reason}")]
    UnparseableFilterValue { field: String, reason: String },
}

impl SearchError {
    pub(crate) fn invalid_query(reason: impl Into<String>) -> Self {
        SearchError::InvalidQuery {
            reason: reason.into(),
        }
    }

    pub(crate) fn unparseable(field: &str, reason: impl Into<String>) -> Self {
        SearchError::UnparseableFilterValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
