//! Markov chain builders (§4.8). Each chain is recomputed from scratch:
//! accumulate raw weights into a `petgraph::graphmap::DiGraphMap` keyed by
//! interned node indices (the graphmap API wants `Copy` node weights, so
//! symbol/file IDs are interned to `u32` rather than used directly), then
//! normalize each node's outgoing weights into probabilities and persist.

use crate::config::MarkovConfig;
use crate::database::SymbolDatabase;
use crate::error::Result;
use crate::model::RelationshipKind;
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashMap, HashSet};

/// Maps arbitrary string IDs (symbol IDs or file paths, depending on the
/// chain) to dense `u32` indices so they can live in a `DiGraphMap`.
#[derive(Default)]
struct Interner {
    ids: Vec<String>,
    index_of: HashMap<String, u32>,
}

impl Interner {
    fn intern(&mut self, id: &str) -> u32 {
        if let Some(&index) = self.index_of.get(id) {
            return index;
        }
        let index = self.ids.len() as u32;
        self.ids.push(id.to_string());
        self.index_of.insert(id.to_string(), index);
        index
    }

    fn name(&self, index: u32) -> &str {
        &self.ids[index as usize]
    }
}

fn add_weight(graph: &mut DiGraphMap<u32, f64>, from: u32, to: u32, weight: f64) {
    if from == to || weight <= 0.0 {
        return;
    }
    let existing = graph.edge_weight(from, to).copied().unwrap_or(0.0);
    graph.add_edge(from, to, existing + weight);
}

/// Normalizes every node's outgoing weights to sum to 1.0 (§4.8.5) and
/// persists the resulting `chain_type` transitions, replacing whatever was
/// stored before.
fn normalize_and_persist(db: &SymbolDatabase, chain_type: &str, graph: &DiGraphMap<u32, f64>, interner: &Interner) -> Result<()> {
    db.clear_markov_edges(chain_type)?;
    for from in graph.nodes() {
        let row_sum: f64 = graph.edges(from).map(|(_, _, w)| w).sum();
        if row_sum <= 0.0 {
            continue;
        }
        for (_, to, weight) in graph.edges(from) {
            db.insert_markov_edge(chain_type, interner.name(from), interner.name(to), weight / row_sum)?;
        }
    }
    Ok(())
}

/// §4.8.1 — co-callee affinity: callers with fan-out ≥ 2 link their callees
/// to each other, weighted by shared call frequency.
pub fn build_call_flow(db: &SymbolDatabase, config: &MarkovConfig) -> Result<()> {
    let mut by_caller: HashMap<String, Vec<&crate::model::CallGraphEdge>> = HashMap::new();
    let edges = db.all_call_edges()?;
    for edge in &edges {
        if edge.call_count < config.min_call_count {
            continue;
        }
        if edge.callee_symbol_id.is_some() {
            by_caller.entry(edge.caller_symbol_id.clone()).or_default().push(edge);
        }
    }

    let mut interner = Interner::default();
    let mut graph = DiGraphMap::new();

    for callees in by_caller.values() {
        let distinct: HashSet<&str> = callees.iter().filter_map(|e| e.callee_symbol_id.as_deref()).collect();
        if distinct.len() < 2 {
            continue;
        }
        let fanout = distinct.len();
        let fanout_factor = if config.fanout_normalization {
            ((fanout - 1) as f64).sqrt().max(1.0)
        } else {
            1.0
        };

        for a in callees {
            let Some(a_id) = a.callee_symbol_id.as_deref() else { continue };
            for b in callees {
                let Some(b_id) = b.callee_symbol_id.as_deref() else { continue };
                if a_id == b_id {
                    continue;
                }
                let base = if config.geometric_mean {
                    ((1.0 + a.call_count as f64).ln() * (1.0 + b.call_count as f64).ln()).sqrt() / fanout_factor
                } else {
                    (a.call_count.min(b.call_count) as f64) / fanout_factor
                };
                let mut weight = base;
                if b.is_async {
                    weight *= 1.0 + config.async_bonus;
                }
                if b.is_conditional {
                    weight *= 1.0 - config.conditional_penalty;
                }
                let from = interner.intern(a_id);
                let to = interner.intern(b_id);
                graph.add_node(from);
                graph.add_node(to);
                add_weight(&mut graph, from, to, weight);
            }
        }
    }

    normalize_and_persist(db, "call_flow", &graph, &interner)
}

/// §4.8.2 — same-file / same-class affinity, weighted by inverse document
/// frequency so ubiquitous names (`run`, `main`) contribute less than rare
/// ones.
pub fn build_cooccurrence(db: &SymbolDatabase, config: &MarkovConfig) -> Result<()> {
    let brief = db.all_symbols_brief()?;
    let total_docs = db.known_relative_paths()?.len().max(1) as f64;

    let mut doc_frequency: HashMap<&str, HashSet<&str>> = HashMap::new();
    for (_, name, file, _, _) in &brief {
        doc_frequency.entry(name.as_str()).or_default().insert(file.as_str());
    }
    let idf = |name: &str| -> f64 {
        if !config.idf_enabled {
            return 1.0;
        }
        let df = doc_frequency.get(name).map(|s| s.len()).unwrap_or(1).max(1) as f64;
        (total_docs / df).ln().max(0.0)
    };

    let mut by_file: HashMap<&str, Vec<&(String, String, String, Option<String>, Option<String>)>> = HashMap::new();
    for entry in &brief {
        by_file.entry(entry.2.as_str()).or_default().push(entry);
    }

    let mut interner = Interner::default();
    let mut graph = DiGraphMap::new();

    for symbols in by_file.values() {
        for i in 0..symbols.len() {
            for j in 0..symbols.len() {
                if i == j {
                    continue;
                }
                let (id_a, name_a, _, class_a, function_a) = symbols[i];
                let (id_b, name_b, _, class_b, function_b) = symbols[j];
                // §4.8.2's three scope tiers, tightest first: two symbols
                // nested in the same function are more tightly coupled than
                // two methods of the same class, which in turn beat mere
                // same-file membership.
                let scope_weight = if function_a.is_some() && function_a == function_b {
                    config.same_function_weight
                } else if class_a.is_some() && class_a == class_b {
                    config.same_class_weight
                } else {
                    config.same_file_weight
                };
                let weight = scope_weight * (idf(name_a) * idf(name_b)).sqrt();
                let from = interner.intern(id_a);
                let to = interner.intern(id_b);
                graph.add_node(from);
                graph.add_node(to);
                add_weight(&mut graph, from, to, weight);
            }
        }
    }

    normalize_and_persist(db, "cooccurrence", &graph, &interner)
}

/// §4.8.3 — inheritance/mixin affinity, asymmetric: the reverse edge
/// (subtype → supertype's dependents) carries 80% of the forward weight.
pub fn build_type_affinity(db: &SymbolDatabase, config: &MarkovConfig) -> Result<()> {
    let mut interner = Interner::default();
    let mut graph = DiGraphMap::new();

    for rel in db.all_type_relationships()? {
        let Some(target_id) = rel.target_symbol_id else { continue };
        let forward = match rel.relationship_kind {
            RelationshipKind::Extends => config.extends_weight,
            RelationshipKind::Implements => config.implements_weight,
            RelationshipKind::Mixin => config.mixin_weight,
        };
        let from = interner.intern(&rel.source_symbol_id);
        let to = interner.intern(&target_id);
        graph.add_node(from);
        graph.add_node(to);
        add_weight(&mut graph, from, to, forward);
        add_weight(&mut graph, to, from, forward * 0.8);
    }

    normalize_and_persist(db, "type_affinity", &graph, &interner)
}

/// §4.8.4 — files that import the same source cluster together.
pub fn build_import_cluster(db: &SymbolDatabase, config: &MarkovConfig) -> Result<()> {
    let imports = db.all_imports()?;
    let mut importers_by_source: HashMap<&str, HashSet<&str>> = HashMap::new();
    for import in &imports {
        importers_by_source.entry(import.source.as_str()).or_default().insert(import.file_path.as_str());
    }

    let mut shared_count: HashMap<(String, String), u32> = HashMap::new();
    for importers in importers_by_source.values() {
        if importers.len() < 2 {
            continue;
        }
        let mut files: Vec<&str> = importers.iter().copied().collect();
        files.sort_unstable();
        for i in 0..files.len() {
            for j in 0..files.len() {
                if i == j {
                    continue;
                }
                *shared_count.entry((files[i].to_string(), files[j].to_string())).or_insert(0) += 1;
            }
        }
    }

    let mut interner = Interner::default();
    let mut graph = DiGraphMap::new();
    for ((file_a, file_b), count) in shared_count {
        if count < config.min_shared_imports {
            continue;
        }
        let from = interner.intern(&file_a);
        let to = interner.intern(&file_b);
        graph.add_node(from);
        graph.add_node(to);
        add_weight(&mut graph, from, to, count as f64 * config.shared_source_weight);
    }

    normalize_and_persist(db, "import_cluster", &graph, &interner)
}

pub fn rebuild_all(db: &SymbolDatabase, config: &MarkovConfig) -> Result<()> {
    build_call_flow(db, config)?;
    build_cooccurrence(db, config)?;
    build_type_affinity(db, config)?;
    build_import_cluster(db, config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CallGraphEdge, FileRecord, ParseResult, ParseStatus};

    fn seed_file(db: &SymbolDatabase, relative: &str) {
        db.save_file(
            &FileRecord {
                absolute_path: format!("/repo/{relative}"),
                relative_path: relative.to_string(),
                language: "typescript".to_string(),
                checksum: "x".to_string(),
                line_count: 1,
                parse_status: ParseStatus::Complete,
                parse_warnings: Vec::new(),
                summary: String::new(),
            },
            "",
            &ParseResult::default(),
        )
        .unwrap();
    }

    #[test]
    fn call_flow_probabilities_sum_to_one_per_state() {
        let db = SymbolDatabase::open_in_memory().unwrap();
        seed_file(&db, "a.ts");
        db.insert_call_edges(&[
            CallGraphEdge {
                id: "e1".to_string(),
                caller_symbol_id: "caller".to_string(),
                caller_name: "caller".to_string(),
                callee_symbol_id: Some("b".to_string()),
                callee_name: "b".to_string(),
                call_count: 3,
                is_async: false,
                is_conditional: false,
            },
            CallGraphEdge {
                id: "e2".to_string(),
                caller_symbol_id: "caller".to_string(),
                caller_name: "caller".to_string(),
                callee_symbol_id: Some("c".to_string()),
                callee_name: "c".to_string(),
                call_count: 1,
                is_async: true,
                is_conditional: false,
            },
        ])
        .unwrap();

        build_call_flow(&db, &MarkovConfig::default()).unwrap();
        let outgoing = db.outgoing_markov_edges("call_flow", "b").unwrap();
        let sum: f64 = outgoing.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
