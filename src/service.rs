//! Search service
//!
//! Request handling shared by the HTTP server and the CLI: validate the
//! request, fetch a fresh corpus snapshot, restrict it to the allowed
//! fields, run the engine and shape the response.

use crate::corpus::CorpusSupplier;
use crate::error::{validate_query, validate_threshold, AppError};
use crate::search::{
    search, FieldSelection, FieldValue, Filter, MatchResult, Query, SearchOptions, TermMode,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Largest result count a caller may ask for
pub const MAX_LIMIT: usize = 200;

/// Incoming search parameters; every member is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub search_fields: Vec<String>,
    pub limit: Option<usize>,
    pub threshold: Option<f64>,
    pub min_match_length: Option<usize>,
    pub term_mode: Option<TermMode>,
    pub filters: Vec<Filter>,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(q) = &self.query {
            validate_query(q)?;
        }
        if let Some(t) = self.threshold {
            validate_threshold(t)?;
        }
        if self.filters.iter().any(|f| f.field().trim().is_empty()) {
            return Err(AppError::InvalidInput("Filter field name is empty".to_string()));
        }
        Ok(())
    }

    /// Absent or empty query text means "list everything"
    pub fn query(&self) -> Query {
        Query::parse(self.query.as_deref())
    }

    /// Merge the request over the service defaults
    pub fn options(&self, defaults: &SearchOptions) -> SearchOptions {
        let mut options = defaults.clone();

        if !self.search_fields.is_empty() {
            options = options.with_fields(FieldSelection::from_names(self.search_fields.clone()));
        }
        if let Some(limit) = self.limit {
            options = options.with_limit(limit.min(MAX_LIMIT));
        }
        if let Some(threshold) = self.threshold {
            options = options.with_threshold(threshold);
        }
        if let Some(min) = self.min_match_length {
            options = options.with_min_match_len(min);
        }
        if let Some(mode) = self.term_mode {
            options = options.with_term_mode(mode);
        }

        options
    }
}

/// One ranked record as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_field: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl From<MatchResult<'_>> for SearchHit {
    fn from(result: MatchResult<'_>) -> Self {
        Self {
            id: result.id().to_string(),
            score: result.score,
            fields: result.fields().clone(),
            matched_field: result.matched_field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub count: usize,
    /// Query text as received ("" when listing everything)
    pub query: String,
}

/// Fetch-then-search over a corpus supplier
pub struct SearchService<S> {
    supplier: S,
    allowed_fields: Vec<String>,
    defaults: SearchOptions,
}

impl<S: CorpusSupplier> SearchService<S> {
    pub fn new(supplier: S) -> Self {
        Self {
            supplier,
            allowed_fields: Vec::new(),
            defaults: SearchOptions::default(),
        }
    }

    /// Only these fields are returned or searched; empty means all
    pub fn with_allowed_fields(mut self, allowed_fields: Vec<String>) -> Self {
        self.allowed_fields = allowed_fields;
        self
    }

    pub fn with_defaults(mut self, defaults: SearchOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse, AppError> {
        request.validate()?;

        let query = request.query();
        let options = request.options(&self.defaults);
        debug!(query = ?query, limit = options.limit, threshold = options.threshold, "Search request");

        let mut corpus = self.supplier.fetch_records().await?;
        if !self.allowed_fields.is_empty() {
            corpus = corpus.iter().map(|r| r.project(&self.allowed_fields)).collect();
        }

        let results = search(&corpus, &query, &options, &request.filters);
        let results: Vec<SearchHit> = results.into_iter().map(SearchHit::from).collect();

        info!(corpus = corpus.len(), results = results.len(), "Search complete");

        Ok(SearchResponse {
            count: results.len(),
            results,
            query: request.query.clone().unwrap_or_default(),
        })
    }
}

/// Render a response as markdown for terminal output
pub fn format_markdown(response: &SearchResponse) -> String {
    let mut out = if response.query.is_empty() {
        String::from("# Records\n\n")
    } else {
        format!("# Search results for \"{}\"\n\n", response.query)
    };

    if response.results.is_empty() {
        out.push_str("No matching records.\n");
        return out;
    }

    out.push_str(&format!(
        "Found {} record{}.\n",
        response.count,
        if response.count == 1 { "" } else { "s" }
    ));

    for (i, hit) in response.results.iter().enumerate() {
        out.push_str(&format!("\n## {}. {} (score {:.3})\n", i + 1, hit.id, hit.score));

        for (name, value) in &hit.fields {
            let Some(text) = value.as_text() else {
                continue;
            };
            let marker = if hit.matched_field.as_deref() == Some(name.as_str()) {
                " *"
            } else {
                ""
            };
            out.push_str(&format!("- **{}**{}: {}\n", name, marker, text));
        }
    }

    out
}
