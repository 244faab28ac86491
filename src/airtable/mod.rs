//! Airtable corpus supplier
//!
//! Lists every record of one table (optionally through a view), following
//! the store's offset pagination.

pub mod client;
pub mod types;

pub use client::AirtableClient;
