//! Error taxonomy (§7).
//!
//! Follows the teacher's split: most internal call sites return
//! `anyhow::Result` (see `src/database/*.rs`, `src/watcher/handlers.rs`), but
//! the crate's public surface exposes a `thiserror`-derived enum so callers
//! outside the crate can match on error kind instead of parsing strings —
//! closer to `bartolli-codanna`'s `src/error.rs` top-level taxonomy.
//!
//! Per §7's policy, file-granularity errors (`PARSE_ERROR`, `IO_ERROR`,
//! `FILE_TOO_LARGE`, `CONFIG_INVALID`) never propagate as `CodeIndexError` —
//! they are folded into `FileRecord.parseWarnings` / sync summaries instead.
//! Only store-granularity failures (`STORE_INTEGRITY`) and resolver failures
//! reach this type; `PATH_NOT_FOUND` / `PATH_AMBIGUOUS` / `SYMBOL_NOT_FOUND`
//! are returned as structured `Failure` variants (see `resolver.rs`,
//! `query.rs`), never thrown, per §7.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeIndexError {
    #[error("store integrity error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodeIndexError>;
