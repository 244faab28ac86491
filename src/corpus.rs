//! Corpus suppliers
//!
//! A supplier hands the search service a fresh snapshot of every record on
//! each call. Failures are fatal for that request and never retried here.

use crate::airtable::AirtableClient;
use crate::error::AppError;
use crate::search::Record;
use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of the records to search
pub trait CorpusSupplier: Send + Sync {
    fn fetch_records(&self) -> impl Future<Output = Result<Vec<Record>, AppError>> + Send;
}

impl CorpusSupplier for AirtableClient {
    async fn fetch_records(&self) -> Result<Vec<Record>, AppError> {
        self.fetch_all().await
    }
}

/// Records loaded from a local JSON export
///
/// Accepts either a bare array of records or a list-records page
/// (`{ "records": [...] }`).
#[derive(Debug, Clone)]
pub struct FileCorpus {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Records(Vec<Record>),
    Page { records: Vec<Record> },
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSupplier for FileCorpus {
    async fn fetch_records(&self) -> Result<Vec<Record>, AppError> {
        let data = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::CorpusFetchFailed(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        let records = match serde_json::from_str::<CorpusFile>(&data) {
            Ok(CorpusFile::Records(records)) | Ok(CorpusFile::Page { records }) => records,
            Err(e) => {
                return Err(AppError::CorpusParseFailed(format!(
                    "{} is not a record list: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        debug!(path = %self.path.display(), records = records.len(), "Loaded corpus file");
        Ok(records)
    }
}

/// The supplier chosen at startup
pub enum CorpusSource {
    Airtable(AirtableClient),
    File(FileCorpus),
}

impl CorpusSupplier for CorpusSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, AppError> {
        match self {
            CorpusSource::Airtable(client) => client.fetch_records().await,
            CorpusSource::File(file) => file.fetch_records().await,
        }
    }
}

/// In-memory supplier over a fixed snapshot
#[cfg(test)]
pub(crate) struct StaticCorpus(pub Vec<Record>);

#[cfg(test)]
impl CorpusSupplier for StaticCorpus {
    async fn fetch_records(&self) -> Result<Vec<Record>, AppError> {
        Ok(self.0.clone())
    }
}
