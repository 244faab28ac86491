//! Wire types for the Airtable list-records endpoint

use crate::search::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of `GET /v0/{base}/{table}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListRecordsResponse {
    #[serde(default)]
    pub records: Vec<Record>,
    /// Present while more pages remain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Error body; the store sends either a bare code or `{ type, message }`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Value,
}

impl ErrorResponse {
    pub fn describe(&self) -> String {
        match &self.error {
            Value::String(code) => code.clone(),
            Value::Object(map) => {
                let kind = map.get("type").and_then(Value::as_str);
                let message = map.get("message").and_then(Value::as_str);
                match (kind, message) {
                    (Some(k), Some(m)) => format!("{}: {}", k, m),
                    (Some(k), None) => k.to_string(),
                    (None, Some(m)) => m.to_string(),
                    (None, None) => self.error.to_string(),
                }
            }
            other => other.to_string(),
        }
    }
}
