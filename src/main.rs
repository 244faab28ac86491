//! tablesearch: fuzzy search over Airtable records (Rust)
//!
//! Two modes:
//! - `search`: run one query from the command line and print the results
//! - `serve`: expose `POST /search` over HTTP
//!
//! Records are fetched fresh from the table store for every search and
//! ranked by approximate substring matching.

mod airtable;
mod cli;
mod config;
mod corpus;
mod error;
mod http;
mod search;
mod server;
mod service;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, CorpusArgs};
use corpus::{CorpusSource, FileCorpus};
use error::AppError;
use search::SearchOptions;
use service::{format_markdown, SearchService};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Overall budget for one CLI search, fetch included
const CLI_TIMEOUT_SECS: u64 = 120;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags; RUST_LOG wins when set
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();

    let result = match cli.command {
        Commands::Search(args) => execute_search_cli(args).await,
        Commands::Serve(args) => execute_serve(args).await.map(|_| String::new()),
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

/// Pick the corpus supplier and the field whitelist
fn build_source(args: CorpusArgs) -> Result<(CorpusSource, Vec<String>), AppError> {
    let allowed_fields = config::clean_field_list(&args.airtable.allowed_fields);

    if let Some(path) = args.corpus_file {
        let file = FileCorpus::new(path);
        debug!("Using corpus file {}", file.path().display());
        return Ok((CorpusSource::File(file), allowed_fields));
    }

    let settings = args.airtable.validate()?;
    let client = airtable::AirtableClient::new(settings)?;
    Ok((CorpusSource::Airtable(client), allowed_fields))
}

/// Execute search command in CLI mode
async fn execute_search_cli(args: cli::SearchArgs) -> Result<String> {
    use tokio::time::{timeout, Duration};

    let request = args.to_request();
    let (source, allowed_fields) = build_source(args.corpus.clone())?;
    let service = SearchService::new(source).with_allowed_fields(allowed_fields);

    let response = timeout(Duration::from_secs(CLI_TIMEOUT_SECS), service.execute(&request))
        .await
        .map_err(|_| {
            AppError::Timeout(format!("Request exceeded {} second timeout", CLI_TIMEOUT_SECS))
        })??;

    if args.json {
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        Ok(format_markdown(&response))
    }
}

/// Execute serve command
async fn execute_serve(args: cli::ServeArgs) -> Result<()> {
    let (source, allowed_fields) = build_source(args.corpus.clone())?;

    let mut defaults = SearchOptions::default();
    if let Some(threshold) = args.threshold {
        error::validate_threshold(threshold)?;
        defaults = defaults.with_threshold(threshold);
    }
    if let Some(limit) = args.limit {
        defaults = defaults.with_limit(limit.min(service::MAX_LIMIT));
    }

    let service = SearchService::new(source)
        .with_allowed_fields(allowed_fields)
        .with_defaults(defaults);

    info!("Starting tablesearch server");
    server::serve(service, args.port).await?;
    Ok(())
}

/// Map errors to process exit codes
fn get_exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(app_err) => app_err.exit_code(),
        None => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let invalid = anyhow::Error::from(AppError::InvalidInput("bad".into()));
        assert_eq!(get_exit_code(&invalid), 1);

        let network = anyhow::Error::from(AppError::CorpusFetchFailed("down".into()));
        assert_eq!(get_exit_code(&network), 2);

        let timeout = anyhow::Error::from(AppError::Timeout("slow".into()));
        assert_eq!(get_exit_code(&timeout), 4);

        assert_eq!(get_exit_code(&anyhow::anyhow!("other")), 5);
    }

    #[test]
    fn test_missing_config_without_file() {
        let args = CorpusArgs {
            corpus_file: None,
            airtable: config::AirtableConfig {
                api_url: config::DEFAULT_API_URL.into(),
                ..Default::default()
            },
        };
        assert!(matches!(build_source(args), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_cli_search_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "a", "fields": {{"Title": "Marine Biology Grant"}}}},
                {{"id": "b", "fields": {{"Title": "Marine Biodiversity Fund"}}}},
                {{"id": "c", "fields": {{"Title": "Urban Planning Award"}}}}
            ]"#
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "tablesearch",
            "search",
            "-q",
            "marine biology",
            "--json",
            "--corpus-file",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };

        let output = execute_search_cli(args).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["results"][0]["id"], "a");
    }
}
