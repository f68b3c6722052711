//! Language parsers and the extension-to-parser registry (§4.1, §4.2).

pub mod base;
pub mod config_lang;
pub mod javascript;
pub mod python;
pub mod registry;
pub mod typescript;

use crate::model::ParseResult;
use thiserror::Error;

/// Per-file failure from a single `parse_file` call. Per §7's severity
/// table these never propagate out of the indexer as a hard error; the
/// caller downgrades them to a `FileRecord` warning and a `Partial`/`Failed`
/// parse status.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("file exceeds the configured size limit ({0} bytes)")]
    FileTooLarge(u64),
    #[error("tree-sitter failed to produce a syntax tree for {0}")]
    SyntaxTreeUnavailable(String),
    #[error("unsupported language extension: {0}")]
    UnsupportedExtension(String),
    #[error("{0}")]
    Other(String),
}

/// Contract every language extractor implements (§4.1).
pub trait LanguageParser {
    fn language(&self) -> &'static str;
    fn parse(&self, file_path: &str, content: &str) -> Result<ParseResult, ParseError>;
}
