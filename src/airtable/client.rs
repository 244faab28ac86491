//! Airtable REST client

use super::types::{ErrorResponse, ListRecordsResponse};
use crate::config::AirtableSettings;
use crate::error::AppError;
use crate::http::{client_with_timeout, STORE_TIMEOUT};
use crate::search::Record;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Upper bound on pages followed for one listing
pub const MAX_PAGES: usize = 100;

/// Records per page requested from the store (its own maximum)
const PAGE_SIZE: usize = 100;

/// Airtable API client bound to one table
pub struct AirtableClient {
    client: Client,
    settings: AirtableSettings,
}

impl AirtableClient {
    pub fn new(settings: AirtableSettings) -> Result<Self, AppError> {
        Ok(Self {
            client: client_with_timeout(STORE_TIMEOUT)?,
            settings,
        })
    }

    pub fn with_client(client: Client, settings: AirtableSettings) -> Self {
        Self { client, settings }
    }

    /// `{api}/v0/{base}/{table}` with both path segments percent-encoded
    pub fn list_url(&self) -> String {
        format!(
            "{}/v0/{}/{}",
            self.settings.api_url.as_str().trim_end_matches('/'),
            urlencoding::encode(&self.settings.base_id),
            urlencoding::encode(&self.settings.table_name)
        )
    }

    /// Query parameters for one page request
    pub fn page_params(&self, offset: Option<&str>) -> Vec<(String, String)> {
        let mut params = vec![("pageSize".to_string(), PAGE_SIZE.to_string())];

        if let Some(view) = &self.settings.view_name {
            params.push(("view".to_string(), view.clone()));
        }

        for field in &self.settings.allowed_fields {
            params.push(("fields[]".to_string(), field.clone()));
        }

        if let Some(o) = offset {
            params.push(("offset".to_string(), o.to_string()));
        }

        params
    }

    /// Fetch a single page of records
    pub async fn fetch_page(&self, offset: Option<&str>) -> Result<ListRecordsResponse, AppError> {
        let url = self.list_url();
        debug!(url = %url, offset = ?offset, "Fetching records page");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.settings.api_key)
            .query(&self.page_params(offset))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|e| e.describe())
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
            return Err(AppError::CorpusFetchFailed(format!(
                "Airtable API error {}: {}",
                status, detail
            )));
        }

        let page: ListRecordsResponse = serde_json::from_slice(&body)?;
        Ok(page)
    }

    /// Fetch every record, following offsets until the last page
    ///
    /// Stops after [`MAX_PAGES`] pages and returns what was collected.
    pub async fn fetch_all(&self) -> Result<Vec<Record>, AppError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let page = self.fetch_page(offset.as_deref()).await?;
            records.extend(page.records);

            match page.offset {
                Some(next) if !next.is_empty() => {
                    if page_number == MAX_PAGES {
                        warn!(
                            pages = MAX_PAGES,
                            records = records.len(),
                            "Page limit reached, remaining records skipped"
                        );
                    }
                    offset = Some(next);
                }
                _ => break,
            }
        }

        info!(
            table = %self.settings.table_name,
            records = records.len(),
            "Fetched corpus from Airtable"
        );

        Ok(records)
    }
}
