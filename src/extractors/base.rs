//! Shared tree-sitter plumbing for the per-language extractors (§4.1).
//!
//! The teacher's extractors each hold a `BaseExtractor` that owns the file's
//! content and a running symbol table; we keep that shape (`ExtractorContext`
//! here) but point it at the closed `Symbol` union in `crate::model` instead
//! of the teacher's own ad-hoc `Symbol` struct, and track a parent-chain
//! stack so qualified names and nesting depth (§3, §4.1.1 "nesting
//! significance filter") fall out of normal recursive descent instead of a
//! second pass.

use crate::id::symbol_id;
use crate::model::{Location, Symbol, SymbolKind};
use std::collections::HashMap;
use tree_sitter::Node;

/// Qualified names are capped to the innermost `MAX_QUALIFIER_DEPTH` parents
/// per §3 ("parentChain joined by '.', depth cap 3").
pub const MAX_QUALIFIER_DEPTH: usize = 3;

/// §4.1.1 hard cap: "Functions at depth > 3 are not emitted."
pub const MAX_NESTING_DEPTH: u32 = 3;

#[derive(Debug, Clone)]
struct ParentFrame {
    name: String,
    is_function: bool,
}

pub struct ExtractorContext {
    pub language: String,
    pub file_path: String,
    pub content: String,
    pub symbols: Vec<Symbol>,
    pub symbol_map: HashMap<String, Symbol>,
    parent_stack: Vec<ParentFrame>,
}

impl ExtractorContext {
    pub fn new(language: impl Into<String>, file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            file_path: file_path.into(),
            content: content.into(),
            symbols: Vec::new(),
            symbol_map: HashMap::new(),
            parent_stack: Vec::new(),
        }
    }

    pub fn node_text(&self, node: &Node) -> String {
        self.content
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
            .to_string()
    }

    pub fn field_text(&self, node: &Node, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|n| self.node_text(&n))
    }

    pub fn location(&self, node: &Node) -> Location {
        Location {
            file_path: self.file_path.clone(),
            start_line: node.start_position().row as u32 + 1,
            end_line: node.end_position().row as u32 + 1,
        }
    }

    /// Walk backwards over preceding siblings collecting contiguous comment
    /// nodes, giving the raw doc-comment text (JSDoc or Python docstring
    /// extraction parse this further). Returns `None` if the immediately
    /// preceding sibling isn't a comment.
    pub fn leading_comment(&self, node: &Node) -> Option<String> {
        let mut lines = Vec::new();
        let mut cursor = node.prev_sibling();
        while let Some(sibling) = cursor {
            if sibling.kind().contains("comment") {
                lines.push(self.node_text(&sibling));
                cursor = sibling.prev_sibling();
            } else {
                break;
            }
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join("\n"))
    }

    /// First statement of a Python function/class body when it's a bare
    /// string literal expression, i.e. a docstring.
    pub fn leading_docstring(&self, body: &Node) -> Option<String> {
        let mut cursor = body.walk();
        let first = body.children(&mut cursor).find(|c| c.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let mut inner = first.walk();
        let string_node = first.children(&mut inner).next()?;
        if string_node.kind() != "string" {
            return None;
        }
        let raw = self.node_text(&string_node);
        Some(
            raw.trim_matches(|c| c == '"' || c == '\'')
                .trim()
                .to_string(),
        )
    }

    pub fn qualified_name(&self, name: &str) -> String {
        let depth = self.parent_stack.len();
        let skip = depth.saturating_sub(MAX_QUALIFIER_DEPTH);
        let mut parts: Vec<&str> = self.parent_stack[skip..].iter().map(|f| f.name.as_str()).collect();
        parts.push(name);
        parts.join(".")
    }

    /// §4.1.1: "0 at file or class scope, otherwise depth in enclosing
    /// functions" — class frames on the stack don't count, only function
    /// frames do, so a method sitting directly under a class is depth 0.
    pub fn nesting_depth(&self) -> u32 {
        self.parent_stack.iter().filter(|f| f.is_function).count() as u32
    }

    pub fn enclosing_function(&self) -> Option<String> {
        self.parent_stack.iter().rev().find(|f| f.is_function).map(|f| f.name.clone())
    }

    pub fn enclosing_class(&self) -> Option<String> {
        self.parent_stack.iter().rev().find(|f| !f.is_function).map(|f| f.name.clone())
    }

    pub fn push_parent(&mut self, name: impl Into<String>, is_function: bool) {
        self.parent_stack.push(ParentFrame { name: name.into(), is_function });
    }

    pub fn pop_parent(&mut self) {
        self.parent_stack.pop();
    }

    pub fn generate_id(&self, qualified_name: &str, kind: SymbolKind, start_line: u32) -> String {
        symbol_id(&self.file_path, qualified_name, kind, start_line)
    }

    pub fn register(&mut self, symbol: Symbol) {
        self.symbol_map.insert(symbol.id().to_string(), symbol.clone());
        self.symbols.push(symbol);
    }

    /// §4.1.1's nesting significance filter: an inner function is only a
    /// symbol in its own right if its body spans at least `min_lines` lines
    /// and it isn't a trivial inline callback passed straight to an
    /// iteration method (`.map(x => ...)`, `.filter(...)`, etc.).
    pub fn is_significant_nested_function(&self, node: &Node, min_lines: u32) -> bool {
        let span = node.end_position().row as u32 - node.start_position().row as u32 + 1;
        if span < min_lines {
            return false;
        }
        if let Some(parent) = node.parent() {
            if parent.kind() == "arguments" {
                if let Some(call) = parent.parent() {
                    if let Some(callee) = call.child_by_field_name("function") {
                        let callee_text = self.node_text(&callee);
                        if let Some(method) = callee_text.rsplit('.').next() {
                            if matches!(method, "map" | "filter" | "forEach" | "reduce" | "some" | "every" | "find" | "flatMap" | "sort") {
                                return false;
                            }
                        }
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_caps_depth_at_three() {
        let mut ctx = ExtractorContext::new("typescript", "a.ts", "");
        ctx.push_parent("Outer", false);
        ctx.push_parent("mid", true);
        ctx.push_parent("inner", true);
        assert_eq!(ctx.qualified_name("leaf"), "Outer.mid.inner.leaf");
        ctx.push_parent("deeper", true);
        assert_eq!(ctx.qualified_name("leaf"), "mid.inner.deeper.leaf");
    }
}
