//! Cross-file ID resolution (§4.4): a separate pass that walks every row
//! left with an empty `symbol_id`/`callee_symbol_id`/`target_symbol_id` by
//! the single-file extractor pass and fills in the most likely symbol by
//! name, since a parser only sees the file it's parsing and can't know
//! which file actually declares `callee_name`.

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::{Symbol, SymbolKind};

/// Ambiguity policy, in order: same-file beats cross-file, exported beats
/// non-exported, `Function` beats other kinds (only relevant for call
/// edges), then `(file_path, start_line)` order — first wins.
fn pick_candidate<'a>(candidates: &'a [Symbol], referencing_file: &str, prefer_function: bool) -> Option<&'a Symbol> {
    let mut best: Option<&Symbol> = None;
    for candidate in candidates {
        best = Some(match best {
            None => candidate,
            Some(current) => {
                let candidate_same_file = candidate.location().file_path == referencing_file;
                let current_same_file = current.location().file_path == referencing_file;
                if candidate_same_file != current_same_file {
                    if candidate_same_file { candidate } else { current }
                } else if candidate.is_exported() != current.is_exported() {
                    if candidate.is_exported() { candidate } else { current }
                } else if prefer_function
                    && (candidate.kind() == SymbolKind::Function) != (current.kind() == SymbolKind::Function)
                {
                    if candidate.kind() == SymbolKind::Function { candidate } else { current }
                } else if candidate.location().file_path != current.location().file_path {
                    if candidate.location().file_path < current.location().file_path { candidate } else { current }
                } else if candidate.location().start_line < current.location().start_line {
                    candidate
                } else {
                    current
                }
            }
        });
    }
    best
}

impl SymbolDatabase {
    /// Resolves as many unresolved references, call edges, and type
    /// relationships as possible. Returns the number resolved.
    pub fn resolve_unresolved(&self) -> Result<usize> {
        let mut resolved = 0;

        for reference in self.unresolved_references()? {
            let candidates = self.find_by_name(&reference.symbol_name, None)?;
            if let Some(symbol) = pick_candidate(&candidates, &reference.referencing_file, false) {
                self.resolve_reference(&reference.id, symbol.id())?;
                resolved += 1;
            }
        }

        for edge in self.all_call_edges()? {
            if edge.callee_symbol_id.is_some() {
                continue;
            }
            let referencing_file = self
                .get_symbol(&edge.caller_symbol_id)?
                .map(|s| s.location().file_path.clone())
                .unwrap_or_default();
            let candidates = self.find_by_name(&edge.callee_name, None)?;
            if let Some(symbol) = pick_candidate(&candidates, &referencing_file, true) {
                self.resolve_call_edge_callee(&edge.id, symbol.id())?;
                resolved += 1;
            }
        }

        for rel in self.all_type_relationships()? {
            if rel.target_symbol_id.is_some() {
                continue;
            }
            let referencing_file = self
                .get_symbol(&rel.source_symbol_id)?
                .map(|s| s.location().file_path.clone())
                .unwrap_or_default();
            let candidates = self.find_by_name(&rel.target_name, Some(SymbolKind::Class))?;
            if let Some(symbol) = pick_candidate(&candidates, &referencing_file, false) {
                self.resolve_type_relationship_target(&rel.id, symbol.id())?;
                resolved += 1;
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        FileRecord, FunctionKind, FunctionModifiers, FunctionSignature, ParseResult, ParseStatus,
        Location, ReferenceKind, SymbolReference,
    };

    fn function(id: &str, name: &str, file: &str, exported: bool) -> Symbol {
        Symbol::Function(FunctionSignature {
            id: id.to_string(),
            name: name.to_string(),
            fully_qualified_name: name.to_string(),
            location: Location { file_path: file.to_string(), start_line: 1, end_line: 2 },
            is_exported: exported,
            documentation: None,
            kind: FunctionKind::Function,
            parameters: Vec::new(),
            return_type: None,
            modifiers: FunctionModifiers::default(),
            parent_class: None,
            parent_function: None,
            nesting_depth: 0,
            local_name: name.to_string(),
            decorators: Vec::new(),
            signature: format!("function {name}()"),
        })
    }

    #[test]
    fn resolves_reference_preferring_same_file_symbol() {
        let db = SymbolDatabase::open_in_memory().unwrap();
        for file in ["a.ts", "b.ts"] {
            db.save_file(
                &FileRecord {
                    absolute_path: format!("/repo/{file}"),
                    relative_path: file.to_string(),
                    language: "typescript".to_string(),
                    checksum: "x".to_string(),
                    line_count: 2,
                    parse_status: ParseStatus::Complete,
                    parse_warnings: Vec::new(),
                    summary: String::new(),
                },
                "",
                &ParseResult::default(),
            )
            .unwrap();
        }
        db.insert_symbol(&function("fn-a", "helper", "a.ts", false)).unwrap();
        db.insert_symbol(&function("fn-b", "helper", "b.ts", true)).unwrap();
        db.insert_reference(&SymbolReference {
            id: "ref-1".to_string(),
            symbol_id: None,
            symbol_name: "helper".to_string(),
            referencing_file: "a.ts".to_string(),
            referencing_symbol_id: None,
            referencing_symbol_name: None,
            line: 5,
            column: 0,
            context: "helper()".to_string(),
            reference_kind: ReferenceKind::Call,
        })
        .unwrap();

        let resolved = db.resolve_unresolved().unwrap();
        assert_eq!(resolved, 1);
        let refs = db.references_to_symbol("fn-a").unwrap();
        assert_eq!(refs.len(), 1);
    }
}
