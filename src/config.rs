//! Table store configuration
//!
//! Read once at startup from flags or environment, validated, then handed to
//! the corpus supplier. Nothing below this layer reads the environment.

use crate::error::AppError;
use clap::Args;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.airtable.com";

/// Airtable connection settings
#[derive(Args, Debug, Clone, Default)]
pub struct AirtableConfig {
    /// Personal access token
    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base identifier (app...)
    #[arg(long, env = "AIRTABLE_BASE_ID")]
    pub base_id: Option<String>,

    /// Table name or identifier
    #[arg(long, env = "AIRTABLE_TABLE_NAME")]
    pub table_name: Option<String>,

    /// Optional view restricting which records are listed
    #[arg(long, env = "AIRTABLE_VIEW_NAME")]
    pub view_name: Option<String>,

    /// Comma separated whitelist of fields to fetch and return
    #[arg(long, env = "ALLOWED_FIELDS", value_delimiter = ',')]
    pub allowed_fields: Vec<String>,

    /// API root, overridable for testing
    #[arg(long, env = "AIRTABLE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// Validated settings, ready for the client
#[derive(Debug, Clone, PartialEq)]
pub struct AirtableSettings {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
    pub view_name: Option<String>,
    pub allowed_fields: Vec<String>,
    pub api_url: Url,
}

impl AirtableConfig {
    /// Check required values and normalize the optional ones
    pub fn validate(&self) -> Result<AirtableSettings, AppError> {
        let api_key = required(&self.api_key, "AIRTABLE_API_KEY")?;
        let base_id = required(&self.base_id, "AIRTABLE_BASE_ID")?;
        let table_name = required(&self.table_name, "AIRTABLE_TABLE_NAME")?;

        let view_name = self
            .view_name
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let api_url = Url::parse(self.api_url.trim())
            .map_err(|e| AppError::Config(format!("AIRTABLE_API_URL is not a valid URL: {}", e)))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "AIRTABLE_API_URL must be http or https, got '{}'",
                api_url.scheme()
            )));
        }

        Ok(AirtableSettings {
            api_key,
            base_id,
            table_name,
            view_name,
            allowed_fields: clean_field_list(&self.allowed_fields),
            api_url,
        })
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Config(format!("{} is not set", name)))
}

/// Trim entries and drop blanks and duplicates, keeping first occurrence
pub fn clean_field_list(fields: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for field in fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        if !cleaned.iter().any(|c| c == field) {
            cleaned.push(field.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AirtableConfig {
        AirtableConfig {
            api_key: Some("pat123".into()),
            base_id: Some("appXYZ".into()),
            table_name: Some("Grants".into()),
            view_name: None,
            allowed_fields: vec![],
            api_url: DEFAULT_API_URL.into(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let settings = config().validate().unwrap();
        assert_eq!(settings.api_key, "pat123");
        assert_eq!(settings.table_name, "Grants");
        assert_eq!(settings.view_name, None);
        assert_eq!(settings.api_url.as_str(), "https://api.airtable.com/");
    }

    #[test]
    fn test_missing_required() {
        let mut cfg = config();
        cfg.api_key = None;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("AIRTABLE_API_KEY")));

        let mut cfg = config();
        cfg.base_id = Some("   ".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_blank_view_ignored() {
        let mut cfg = config();
        cfg.view_name = Some("  ".into());
        assert_eq!(cfg.validate().unwrap().view_name, None);

        cfg.view_name = Some(" Open Grants ".into());
        assert_eq!(cfg.validate().unwrap().view_name.as_deref(), Some("Open Grants"));
    }

    #[test]
    fn test_bad_api_url() {
        let mut cfg = config();
        cfg.api_url = "not a url".into();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));

        cfg.api_url = "ftp://example.com".into();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_clean_field_list() {
        let fields = vec![" Title".into(), "".into(), "Funder ".into(), "Title".into()];
        assert_eq!(clean_field_list(&fields), vec!["Title".to_string(), "Funder".to_string()]);
    }
}
