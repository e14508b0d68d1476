//! zotkit launcher entry point
//!
//! Speaks the launcher host's argv contract: a subcommand, a scope, and a
//! query string in; one JSON object per result line out. All heavy lifting
//! lives in zotkit-core.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use zotkit_core::{
    CitationClient, JsonStore, Pipeline, Scope, Searcher, WorkflowConfig, ZotError,
};

#[derive(Parser)]
#[command(name = "zotkit", version, about = "Search, cite, and export Zotero records")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the clone, the JSON document, and the search indexes
    Refresh {
        /// Rebuild even when everything is fresh
        #[arg(long)]
        force: bool,
    },
    /// Search items within a scope
    Search {
        /// Scope name: general, titles, creators, tags, collections,
        /// attachments, notes, date, in-collection, in-tag
        scope: String,
        /// Query text
        query: String,
        /// Group name for in-collection / in-tag scopes
        #[arg(long)]
        group: Option<String>,
        /// Maximum number of results
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
    /// List collections whose name contains the query
    Collections { query: String },
    /// List tags whose name contains the query
    Tags { query: String },
    /// Fetch a rendered citation for one item key
    Cite {
        key: String,
        /// Citation style override
        #[arg(long)]
        style: Option<String>,
        /// Locale override
        #[arg(long)]
        locale: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("zotkit: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ZotError> {
    let config = WorkflowConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Command::Refresh { force } => refresh(&config, force),
        Command::Search {
            scope,
            query,
            group,
            limit,
        } => search(&config, &scope, &query, group.as_deref(), limit),
        Command::Collections { query } => search(&config, "collections", &query, None, usize::MAX),
        Command::Tags { query } => search(&config, "tags", &query, None, usize::MAX),
        Command::Cite { key, style, locale } => cite(&config, &key, style, locale),
    }
}

fn refresh(config: &WorkflowConfig, force: bool) -> Result<(), ZotError> {
    let report = Pipeline::new(config).refresh(force)?;
    println!(
        "{}",
        json!({
            "items": report.items,
            "new": report.new_keys,
            "skipped": report.skipped,
        })
    );
    Ok(())
}

fn search(
    config: &WorkflowConfig,
    scope: &str,
    query: &str,
    group: Option<&str>,
    limit: usize,
) -> Result<(), ZotError> {
    let scope = Scope::parse(scope, group).map_err(ZotError::Search)?;
    let response = Searcher::new(config).search(&scope, query, limit)?;

    if let Some(reason) = response.invalid_query {
        println!("{}", json!({ "error": "invalid query", "reason": reason }));
        return Ok(());
    }

    let document = JsonStore::new(config.paths.cache_path())
        .load()
        .unwrap_or_default();
    for hit in response.hits {
        let line = match (&hit.label, document.get(&hit.key)) {
            // Group-listing results carry their own display name.
            (Some(label), _) => json!({ "key": hit.key, "name": label }),
            (None, Some(record)) => json!({
                "key": hit.key,
                "score": hit.score,
                "title": record.title(),
                "type": record.item_type,
                "creators": record
                    .creators
                    .iter()
                    .map(|c| c.display_name())
                    .collect::<Vec<_>>(),
            }),
            (None, None) => json!({ "key": hit.key, "score": hit.score }),
        };
        println!("{}", line);
    }
    Ok(())
}

fn cite(
    config: &WorkflowConfig,
    key: &str,
    style: Option<String>,
    locale: Option<String>,
) -> Result<(), ZotError> {
    let client = CitationClient::from_config(&config.citation).map_err(ZotError::Citation)?;
    let style = style.unwrap_or_else(|| config.citation.style.clone());
    let locale = locale.unwrap_or_else(|| config.citation.locale.clone());
    let citation = client
        .cite(key, &style, &locale)
        .map_err(ZotError::Citation)?;
    println!(
        "{}",
        json!({
            "key": key,
            "citation": citation.citation_html,
            "bibliography": citation.bibliography_html,
        })
    );
    Ok(())
}
