//! JavaScript/JSX extractor.
//!
//! The teacher keeps JavaScript and TypeScript as separate, heavily
//! duplicated extractors (`src/extractors/javascript.rs` re-implements most
//! of `typescript.rs`'s switch). Since tree-sitter-javascript's node kinds
//! are a subset of tree-sitter-typescript's, we drive the same visitor
//! (`typescript::run`) with the JS grammar instead of duplicating it; TS-only
//! constructs (`interface_declaration`, `: Type` annotations) simply never
//! appear in a JS parse tree.

use super::typescript::run;
use super::{LanguageParser, ParseError};
use crate::model::ParseResult;

pub struct JavaScriptExtractor {
    jsx: bool,
}

impl JavaScriptExtractor {
    pub fn new(jsx: bool) -> Self {
        Self { jsx }
    }
}

impl LanguageParser for JavaScriptExtractor {
    fn language(&self) -> &'static str {
        if self.jsx { "jsx" } else { "javascript" }
    }

    fn parse(&self, file_path: &str, content: &str) -> Result<ParseResult, ParseError> {
        run(self.language(), tree_sitter_javascript::LANGUAGE.into(), file_path, content)
    }
}
