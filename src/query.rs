//! Query API facade (§6.3): the language-neutral tool surface every other
//! consumer (a CLI, an editor plugin, an agent) calls into. Each operation
//! returns a plain struct — no exceptions cross this boundary per §7; a
//! symbol that can't be found comes back as `None`/an empty `Vec`, never a
//! thrown error.

use crate::config::IndexConfig;
use crate::database::SymbolDatabase;
use crate::error::Result;
use crate::extractors::registry::ParserRegistry;
use crate::markov::{self, MarkovQueryOptions, MarkovQueryResult};
use crate::model::{CallGraphEdge, FileRecord, ImportInfo, Symbol, SymbolKind, TypeRelationship};
use crate::sync::{SyncEngine, SyncOptions, SyncSummary};
use crate::utils::text::edit_distance;
use std::collections::HashSet;
use std::sync::Arc;

pub struct QueryApi {
    db: SymbolDatabase,
    config: IndexConfig,
    registry: Arc<ParserRegistry>,
    sync_engine: SyncEngine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSymbol {
    pub symbol: Symbol,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceDirection {
    Callers,
    Callees,
    Both,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceLevel {
    pub depth: u32,
    pub edges: Vec<CallGraphEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTraceMode {
    Hierarchy,
    Implementations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTraceDirection {
    Up,
    Down,
    Both,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDependencies {
    pub file_path: String,
    pub imports: Vec<ImportInfo>,
    pub importers: Vec<String>,
    pub cycle: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedContext {
    pub symbol: Option<Symbol>,
    pub type_relationships: Vec<TypeRelationship>,
    pub callees: Vec<CallGraphEdge>,
}

impl QueryApi {
    pub fn open(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let db = SymbolDatabase::open(&config.database_path)?;
        Ok(Self { db, config, registry: Arc::new(ParserRegistry::new()), sync_engine: SyncEngine::new() })
    }

    pub fn database(&self) -> &SymbolDatabase {
        &self.db
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn list_files(&self, directory: Option<&str>, language: Option<&str>, limit: usize, offset: usize) -> Result<Vec<FileRecord>> {
        let mut files = self.db.list_files()?;
        if let Some(directory) = directory {
            files.retain(|f| f.relative_path.starts_with(directory));
        }
        if let Some(language) = language {
            files.retain(|f| f.language == language);
        }
        Ok(files.into_iter().skip(offset).take(limit.max(1)).collect())
    }

    pub fn list_functions(&self, file_path: &str, include_private: bool) -> Result<Vec<Symbol>> {
        let mut symbols = self.db.symbols_in_file(file_path)?;
        if !include_private {
            symbols.retain(|s| !is_private_by_convention(s));
        }
        Ok(symbols)
    }

    pub fn get_function(&self, file_path: &str, function_name: &str) -> Result<Option<Symbol>> {
        Ok(self
            .db
            .symbols_in_file(file_path)?
            .into_iter()
            .find(|s| s.kind() == SymbolKind::Function && s.name() == function_name))
    }

    pub fn get_class(&self, file_path: &str, class_name: &str) -> Result<Option<(Symbol, Vec<Symbol>)>> {
        let Some(class) = self
            .db
            .symbols_in_file(file_path)?
            .into_iter()
            .find(|s| s.kind() == SymbolKind::Class && s.name() == class_name)
        else {
            return Ok(None);
        };
        let methods = self.db.methods_of_class(class.fully_qualified_name())?;
        Ok(Some((class, methods)))
    }

    /// §4.10 ranked name search: exact, case-insensitive exact, prefix,
    /// substring, then edit-distance approximate, each tier with its own
    /// scoring prior.
    pub fn search_symbols(&self, query: &str, kind: Option<SymbolKind>, limit: usize) -> Result<Vec<ScoredSymbol>> {
        let mut by_id: std::collections::HashMap<String, ScoredSymbol> = std::collections::HashMap::new();

        for symbol in self.db.find_by_name(query, kind)? {
            let score = if symbol.name() == query { 1.0 } else { 0.95 };
            upsert(&mut by_id, symbol, score);
        }

        let lowered = query.to_lowercase();
        for symbol in self.db.search_symbols_fts(query, limit * 4)? {
            if kind.is_some_and(|k| symbol.kind() != k) {
                continue;
            }
            let name_lower = symbol.name().to_lowercase();
            let score = if name_lower == lowered {
                0.95
            } else if name_lower.starts_with(&lowered) {
                0.8
            } else if name_lower.contains(&lowered) {
                0.6
            } else {
                continue;
            };
            upsert(&mut by_id, symbol, score);
        }

        if query.chars().count() >= 4 {
            for (id, name) in self.db.all_symbol_names()? {
                if by_id.contains_key(&id) {
                    continue;
                }
                let distance = edit_distance(&lowered, &name.to_lowercase());
                if distance <= 2 {
                    if let Some(symbol) = self.db.get_symbol(&id)? {
                        if kind.is_some_and(|k| symbol.kind() != k) {
                            continue;
                        }
                        upsert(&mut by_id, symbol, 0.5 - 0.1 * distance as f64);
                    }
                }
            }
        }

        let mut results: Vec<ScoredSymbol> = by_id.into_values().collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit.max(1));
        Ok(results)
    }

    pub fn find_references(&self, symbol_name: &str, file_path: Option<&str>, limit: usize) -> Result<Vec<crate::model::SymbolReference>> {
        let candidates = self.db.find_by_name(symbol_name, None)?;
        let mut references = Vec::new();
        for candidate in candidates {
            references.extend(self.db.references_to_symbol(candidate.id())?);
        }
        if let Some(file_path) = file_path {
            references.retain(|r| r.referencing_file == file_path);
        }
        references.truncate(limit.max(1));
        Ok(references)
    }

    pub fn trace_calls(&self, function_name: &str, direction: TraceDirection, depth: u32) -> Result<Vec<TraceLevel>> {
        let depth = depth.clamp(1, 3);
        let mut levels = Vec::new();
        let mut frontier: HashSet<String> = self
            .db
            .find_by_name(function_name, Some(SymbolKind::Function))?
            .into_iter()
            .map(|s| s.id().to_string())
            .collect();

        for level in 1..=depth {
            let mut edges = Vec::new();
            let mut next_frontier = HashSet::new();
            for symbol_id in &frontier {
                if matches!(direction, TraceDirection::Callers | TraceDirection::Both) {
                    for edge in self.db.edges_to_callee(symbol_id)? {
                        next_frontier.insert(edge.caller_symbol_id.clone());
                        edges.push(edge);
                    }
                }
                if matches!(direction, TraceDirection::Callees | TraceDirection::Both) {
                    for edge in self.db.edges_from_caller(symbol_id)? {
                        if let Some(callee) = &edge.callee_symbol_id {
                            next_frontier.insert(callee.clone());
                        }
                        edges.push(edge);
                    }
                }
            }
            if edges.is_empty() {
                break;
            }
            levels.push(TraceLevel { depth: level, edges });
            frontier = next_frontier;
        }
        Ok(levels)
    }

    pub fn trace_types(&self, class_name: &str, mode: TypeTraceMode, direction: TypeTraceDirection, limit: usize) -> Result<Vec<TypeRelationship>> {
        let sources = self.db.find_by_name(class_name, Some(SymbolKind::Class))?;
        let mut relationships = Vec::new();
        for source in &sources {
            match (mode, direction) {
                (TypeTraceMode::Hierarchy, TypeTraceDirection::Up) => relationships.extend(self.db.relationships_from(source.id())?),
                (TypeTraceMode::Hierarchy, TypeTraceDirection::Down) | (TypeTraceMode::Implementations, _) => {
                    relationships.extend(self.db.relationships_to(source.id())?)
                }
                (TypeTraceMode::Hierarchy, TypeTraceDirection::Both) => {
                    relationships.extend(self.db.relationships_from(source.id())?);
                    relationships.extend(self.db.relationships_to(source.id())?);
                }
            }
        }
        relationships.truncate(limit.max(1));
        Ok(relationships)
    }

    pub fn get_module_dependencies(&self, file_path: &str, include_reverse: bool) -> Result<ModuleDependencies> {
        let imports = self.db.imports_of_file(file_path)?;
        let importers = if include_reverse {
            self.db.importers_of_source(file_path)?
        } else {
            Vec::new()
        };
        let cycle = importers.iter().find(|i| imports.iter().any(|imp| &imp.source == *i)).map(|i| vec![file_path.to_string(), i.clone()]);
        Ok(ModuleDependencies { file_path: file_path.to_string(), imports, importers, cycle })
    }

    pub fn get_architecture_overview(&self) -> Result<Vec<FileRecord>> {
        self.db.list_files()
    }

    pub fn get_related_context(&self, symbol_name: &str, file_path: Option<&str>) -> Result<RelatedContext> {
        let candidates = self.db.find_by_name(symbol_name, None)?;
        let symbol = match file_path {
            Some(path) => candidates.into_iter().find(|s| s.location().file_path == path),
            None => candidates.into_iter().next(),
        };
        let Some(symbol) = symbol else {
            return Ok(RelatedContext { symbol: None, type_relationships: Vec::new(), callees: Vec::new() });
        };
        let type_relationships = self.db.relationships_from(symbol.id())?;
        let callees = self.db.edges_from_caller(symbol.id())?;
        Ok(RelatedContext { symbol: Some(symbol), type_relationships, callees })
    }

    pub fn suggest_related(&self, symbol_name: &str, file_path: Option<&str>, options: MarkovQueryOptions) -> Result<Option<MarkovQueryResult>> {
        let candidates = self.db.find_by_name(symbol_name, None)?;
        let symbol = match file_path {
            Some(path) => candidates.into_iter().find(|s| s.location().file_path == path),
            None => candidates.into_iter().next(),
        };
        let Some(symbol) = symbol else { return Ok(None) };
        Ok(Some(markov::query_with_fallback(&self.db, symbol.id(), &self.config.markov.chain_weights, &options)?))
    }

    pub async fn sync_index(&self, options: SyncOptions) -> Result<SyncSummary> {
        self.sync_engine.sync(&self.db, &self.config, &self.registry, options).await
    }
}

fn upsert(by_id: &mut std::collections::HashMap<String, ScoredSymbol>, symbol: Symbol, score: f64) {
    by_id
        .entry(symbol.id().to_string())
        .and_modify(|existing| {
            if score > existing.score {
                existing.score = score;
            }
        })
        .or_insert(ScoredSymbol { symbol, score });
}

fn is_private_by_convention(symbol: &Symbol) -> bool {
    match symbol {
        Symbol::Function(f) => f.modifiers.is_private,
        Symbol::Property(p) => p.is_private,
        _ => {
            let name = symbol.name();
            name.starts_with('_') && !name.starts_with("__")
        }
    }
}
