//! Command-line interface
//!
//! `search` runs a single query and prints the results; `serve` starts the
//! HTTP server.

use crate::config::AirtableConfig;
use crate::search::{Filter, TermMode};
use crate::server::DEFAULT_PORT;
use crate::service::SearchRequest;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tablesearch CLI
#[derive(Parser, Debug)]
#[command(name = "tablesearch")]
#[command(about = "Fuzzy search over Airtable records", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one search and print the ranked records
    Search(SearchArgs),
    /// Serve POST /search over HTTP
    Serve(ServeArgs),
}

/// Where records come from
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Read records from a JSON file instead of Airtable
    #[arg(long, value_name = "PATH")]
    pub corpus_file: Option<PathBuf>,

    #[command(flatten)]
    pub airtable: AirtableConfig,
}

/// Search command arguments
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search text; omit to list records unranked
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Field to search (repeatable; default all fields)
    #[arg(short = 'f', long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Maximum number of results (default 10, max 200)
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Largest score to accept, 0 exact to 1 anything (default 0.4)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Shortest query, in characters, that is matched at all (default 2)
    #[arg(long)]
    pub min_match_length: Option<usize>,

    /// Require every query word to match somewhere in the record
    #[arg(long)]
    pub all_terms: bool,

    /// Filter such as `Deadline>=2024-05-01`, `Amount<=5000` or `Status=Open` (repeatable)
    #[arg(long = "filter", value_name = "EXPR")]
    pub filters: Vec<Filter>,

    /// Print the JSON response instead of markdown
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub corpus: CorpusArgs,
}

impl SearchArgs {
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            search_fields: self.fields.clone(),
            limit: self.limit,
            threshold: self.threshold,
            min_match_length: self.min_match_length,
            term_mode: self.all_terms.then_some(TermMode::AllTerms),
            filters: self.filters.clone(),
        }
    }
}

/// Serve command arguments
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Threshold used when a request does not set one
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Limit used when a request does not set one
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub corpus: CorpusArgs,
}
