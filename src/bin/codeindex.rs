//! Minimal CLI front-end: `index`, `sync`, and `query` subcommands over a
//! workspace index, printing JSON to stdout. No table rendering, no budget
//! logic — both out of scope; this binary is ambient plumbing, not a
//! designed subsystem.

use clap::{Parser, Subcommand};
use codeindex::config::IndexConfig;
use codeindex::markov::MarkovQueryOptions;
use codeindex::model::SymbolKind;
use codeindex::query::QueryApi;
use codeindex::sync::SyncOptions;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "codeindex", about = "Persistent, incremental, multi-language source-code index")]
struct Cli {
    /// Workspace root to index/query. Defaults to the current directory.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the workspace and build or refresh the index from scratch.
    Index,
    /// Bring the index up to date with the filesystem.
    Sync {
        /// Reindex only these paths instead of the whole tree.
        #[arg(long)]
        file: Vec<String>,
        /// Rebuild the Markov suggestion chains after syncing.
        #[arg(long)]
        rebuild_chains: bool,
    },
    /// Query the index.
    Query {
        #[command(subcommand)]
        what: QueryCommand,
    },
}

#[derive(Subcommand)]
enum QueryCommand {
    /// List indexed files.
    Files {
        #[arg(long)]
        directory: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Rank-search symbols by name.
    Search {
        query: String,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Find references to a named symbol.
    References {
        symbol: String,
        #[arg(long)]
        file: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Suggest symbols related to a named symbol via the Markov chains.
    Suggest {
        symbol: String,
        #[arg(long)]
        file: Option<String>,
    },
}

fn parse_kind(kind: &str) -> Option<SymbolKind> {
    match kind {
        "function" => Some(SymbolKind::Function),
        "class" => Some(SymbolKind::Class),
        "interface" => Some(SymbolKind::Interface),
        "type_alias" => Some(SymbolKind::TypeAlias),
        "variable" => Some(SymbolKind::Variable),
        "property" => Some(SymbolKind::Property),
        "config_entry" => Some(SymbolKind::ConfigEntry),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let cli = Cli::parse();
    let root = cli
        .workspace
        .map(|p| p.canonicalize())
        .transpose()?
        .unwrap_or(std::env::current_dir()?);

    let config = IndexConfig::for_root(root);
    let api = QueryApi::open(config)?;

    match cli.command {
        Command::Index => {
            let summary = api.sync_index(SyncOptions { files: None, rebuild_chains: true, cancel: None }).await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "reindexed": summary.reindexed,
                "removed": summary.removed,
                "unchanged": summary.unchanged,
                "durationMs": summary.duration_ms,
                "chainIds": summary.chain_ids,
            }))?);
        }
        Command::Sync { file, rebuild_chains } => {
            let files = if file.is_empty() { None } else { Some(file) };
            let summary = api.sync_index(SyncOptions { files, rebuild_chains, cancel: None }).await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "reindexed": summary.reindexed,
                "removed": summary.removed,
                "unchanged": summary.unchanged,
                "durationMs": summary.duration_ms,
                "chainIds": summary.chain_ids,
            }))?);
        }
        Command::Query { what } => match what {
            QueryCommand::Files { directory, language, limit } => {
                let files = api.list_files(directory.as_deref(), language.as_deref(), limit, 0)?;
                println!("{}", serde_json::to_string_pretty(&files)?);
            }
            QueryCommand::Search { query, kind, limit } => {
                let kind = kind.as_deref().and_then(parse_kind);
                let results = api.search_symbols(&query, kind, limit)?;
                let json: Vec<_> = results
                    .into_iter()
                    .map(|r| serde_json::json!({"symbol": r.symbol, "score": r.score}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            QueryCommand::References { symbol, file, limit } => {
                let results = api.find_references(&symbol, file.as_deref(), limit)?;
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            QueryCommand::Suggest { symbol, file } => {
                let options = MarkovQueryOptions::default();
                let result = api.suggest_related(&symbol, file.as_deref(), options)?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        },
    }

    Ok(())
}
