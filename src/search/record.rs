//! Record model
//!
//! A record is a store-assigned identifier plus an ordered map of named,
//! optional values. Absence is explicit: a field is either in the map or not.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A single cell value as delivered by the table store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Multi-select options, linked record names, lookups
    List(Vec<FieldValue>),
    /// Structured cells (collaborators, attachments, buttons)
    Other(Value),
}

impl FieldValue {
    /// Canonical text form used for matching and filtering
    ///
    /// Returns None for values that carry no searchable text: blank strings,
    /// empty lists and structured cells without a `name`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(s) if s.trim().is_empty() => None,
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            FieldValue::Number(n) => Some(Cow::Owned(n.to_string())),
            FieldValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            FieldValue::List(items) => {
                let parts: Vec<Cow<'_, str>> = items.iter().filter_map(|v| v.as_text()).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(Cow::Owned(parts.join(", ")))
                }
            }
            FieldValue::Other(value) => value
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.trim().is_empty())
                .map(Cow::Borrowed),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One row of the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque store-assigned identifier, never searched
    pub id: String,
    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Searchable text of a field; None when the field is absent or blank
    pub fn field_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    /// Copy of this record restricted to the given field names
    ///
    /// An empty whitelist means "no restriction".
    pub fn project(&self, allowed: &[String]) -> Record {
        if allowed.is_empty() {
            return self.clone();
        }

        Record {
            id: self.id.clone(),
            created_time: self.created_time.clone(),
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| allowed.iter().any(|a| a == *name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_wire_record() {
        let value = json!({
            "id": "rec123",
            "createdTime": "2024-03-01T10:00:00.000Z",
            "fields": {
                "Title": "Marine Biology Grant",
                "Amount": 5000,
                "Open": true,
                "Tags": ["ocean", "science"],
                "Owner": {"id": "usr1", "email": "a@example.com", "name": "Ada"}
            }
        });

        let record: Record = serde_json::from_value(value).unwrap();
        assert_eq!(record.id, "rec123");
        assert_eq!(record.created_time.as_deref(), Some("2024-03-01T10:00:00.000Z"));
        assert_eq!(record.get("Title"), Some(&FieldValue::from("Marine Biology Grant")));
        assert_eq!(record.get("Amount"), Some(&FieldValue::Number(5000.0)));
        assert_eq!(record.get("Open"), Some(&FieldValue::Bool(true)));
        assert_eq!(record.field_text("Tags").as_deref(), Some("ocean, science"));
        assert_eq!(record.field_text("Owner").as_deref(), Some("Ada"));
    }

    #[test]
    fn test_missing_fields_object() {
        let record: Record = serde_json::from_value(json!({"id": "rec1"})).unwrap();
        assert!(record.fields.is_empty());
        assert!(record.field_text("Title").is_none());
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(FieldValue::Number(5000.0).as_text().as_deref(), Some("5000"));
        assert_eq!(FieldValue::Number(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(FieldValue::Bool(false).as_text().as_deref(), Some("false"));
        assert!(FieldValue::from("   ").as_text().is_none());
        assert!(FieldValue::List(vec![]).as_text().is_none());
        assert!(FieldValue::Other(json!({"url": "https://x"})).as_text().is_none());
    }

    #[test]
    fn test_project_whitelist() {
        let record = Record::new("rec1")
            .with_field("Title", "Grant")
            .with_field("Secret", "hidden");

        let projected = record.project(&["Title".to_string()]);
        assert_eq!(projected.id, "rec1");
        assert!(projected.get("Title").is_some());
        assert!(projected.get("Secret").is_none());

        let unrestricted = record.project(&[]);
        assert_eq!(unrestricted, record);
    }
}
