//! A persistent, incremental, multi-language source-code index: parse once,
//! store the symbol graph in SQLite, keep it in sync with the filesystem,
//! and query it — by name, by call graph, by type hierarchy, or by
//! Markov-ranked "what's related to this" suggestions.

pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod id;
pub mod indexer;
pub mod markov;
pub mod model;
pub mod query;
pub mod resolver;
pub mod sync;
pub mod utils;
pub mod watcher;

pub use config::IndexConfig;
pub use database::SymbolDatabase;
pub use error::{CodeIndexError, Result};
pub use model::{Symbol, SymbolKind};
pub use query::QueryApi;
pub use resolver::{Resolution, ResolvedPath, ResolutionFailure};
pub use sync::{SyncEngine, SyncOptions, SyncSummary};
