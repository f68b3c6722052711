//! Markov Query (§4.9): decayed-probability BFS across the active chains
//! from a starting symbol, with a structural fallback (callers → callees →
//! same-file references) when the chains have nothing to say.

use crate::config::ChainWeights;
use crate::database::SymbolDatabase;
use crate::error::Result;
use crate::model::ReferenceKind;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct MarkovQueryOptions {
    pub chain_types: Vec<String>,
    pub depth: u32,
    pub min_probability: f64,
    pub max_results: usize,
    pub decay_factor: f64,
    pub explain: bool,
}

impl Default for MarkovQueryOptions {
    fn default() -> Self {
        Self {
            chain_types: vec!["call_flow".to_string(), "cooccurrence".to_string()],
            depth: 2,
            min_probability: 0.05,
            max_results: 20,
            decay_factor: 0.7,
            explain: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub symbol_id: String,
    pub score: f64,
    pub path: Vec<String>,
    pub chains_contributed: Vec<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkovQueryResult {
    pub start_symbol: String,
    pub suggestions: Vec<Suggestion>,
    pub chains_used: Vec<String>,
    pub execution_time_ms: u64,
}

struct BestPath {
    probability: f64,
    path: Vec<String>,
}

/// BFS within a single chain, Viterbi-style: only the highest-probability
/// path reaching each state is kept.
fn bfs_chain(db: &SymbolDatabase, chain_type: &str, start: &str, depth: u32, min_probability: f64, decay_factor: f64) -> Result<HashMap<String, BestPath>> {
    let mut visited: HashMap<String, BestPath> = HashMap::new();
    let mut queue: VecDeque<(String, f64, Vec<String>, u32)> = VecDeque::new();
    queue.push_back((start.to_string(), 1.0, vec![start.to_string()], 0));

    while let Some((state, probability, path, hops)) = queue.pop_front() {
        if hops >= depth {
            continue;
        }
        for (next, transition_probability) in db.outgoing_markov_edges(chain_type, &state)? {
            let new_probability = probability * transition_probability * decay_factor;
            if new_probability < min_probability {
                continue;
            }
            let better = visited.get(&next).is_none_or(|best| new_probability > best.probability);
            if !better {
                continue;
            }
            let mut new_path = path.clone();
            new_path.push(next.clone());
            visited.insert(next.clone(), BestPath { probability: new_probability, path: new_path.clone() });
            queue.push_back((next, new_probability, new_path, hops + 1));
        }
    }

    visited.remove(start);
    Ok(visited)
}

/// §4.9: suggests symbols related to `start_symbol_id` by combining the
/// decayed BFS results of each requested chain, weighted and renormalized
/// across the chains that actually have outgoing transitions for the start
/// state.
pub fn query(db: &SymbolDatabase, start_symbol_id: &str, weights: &ChainWeights, options: &MarkovQueryOptions) -> Result<MarkovQueryResult> {
    let started = Instant::now();
    let start_symbol = db
        .get_symbol(start_symbol_id)?
        .map(|s| s.name().to_string())
        .unwrap_or_else(|| start_symbol_id.to_string());

    let mut active_chains = Vec::new();
    for chain_type in &options.chain_types {
        if !db.outgoing_markov_edges(chain_type, start_symbol_id)?.is_empty() {
            active_chains.push(chain_type.clone());
        }
    }

    let total_weight: f64 = active_chains.iter().map(|c| chain_weight(weights, c)).sum();
    let mut combined: HashMap<String, (f64, Vec<String>, Vec<String>)> = HashMap::new();

    for chain_type in &active_chains {
        let renormalized_weight = if total_weight > 0.0 { chain_weight(weights, chain_type) / total_weight } else { 0.0 };
        let reached = bfs_chain(db, chain_type, start_symbol_id, options.depth, options.min_probability, options.decay_factor)?;
        for (state, best) in reached {
            let contribution = best.probability * renormalized_weight;
            let entry = combined.entry(state).or_insert((0.0, best.path.clone(), Vec::new()));
            entry.0 += contribution;
            if best.path.len() < entry.1.len() || (best.path.len() == entry.1.len() && best.probability > entry.0) {
                entry.1 = best.path.clone();
            }
            entry.2.push(chain_type.clone());
        }
    }

    let mut suggestions: Vec<Suggestion> = combined
        .into_iter()
        .map(|(symbol_id, (score, path, chains_contributed))| Suggestion {
            explanation: options.explain.then(|| {
                format!(
                    "path {} via {}",
                    path.join(" -> "),
                    chains_contributed.join(", ")
                )
            }),
            symbol_id,
            score,
            path,
            chains_contributed,
        })
        .collect();
    suggestions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    suggestions.truncate(options.max_results);

    Ok(MarkovQueryResult {
        start_symbol,
        suggestions,
        chains_used: active_chains,
        execution_time_ms: started.elapsed().as_millis() as u64,
    })
}

fn chain_weight(weights: &ChainWeights, chain_type: &str) -> f64 {
    match chain_type {
        "call_flow" => weights.call_flow,
        "cooccurrence" => weights.cooccurrence,
        "type_affinity" => weights.type_affinity,
        "import_cluster" => weights.import_cluster,
        _ => 0.0,
    }
}

/// §4.9 `queryWithFallback`: if the chains yield nothing, synthesize
/// substitutes from direct structural relationships, in priority order,
/// stopping once `max_results` is reached.
pub fn query_with_fallback(db: &SymbolDatabase, start_symbol_id: &str, weights: &ChainWeights, options: &MarkovQueryOptions) -> Result<MarkovQueryResult> {
    let mut result = query(db, start_symbol_id, weights, options)?;
    if !result.suggestions.is_empty() {
        return Ok(result);
    }

    let start_name = result.start_symbol.clone();
    let mut fallback = Vec::new();

    for edge in db.edges_to_callee(start_symbol_id)? {
        fallback.push(Suggestion {
            symbol_id: edge.caller_symbol_id,
            score: 0.8,
            path: vec![start_name.clone(), edge.caller_name],
            chains_contributed: vec!["fallback:callers".to_string()],
            explanation: None,
        });
        if fallback.len() >= options.max_results {
            break;
        }
    }

    if fallback.len() < options.max_results {
        for edge in db.edges_from_caller(start_symbol_id)? {
            let Some(callee_id) = edge.callee_symbol_id else { continue };
            fallback.push(Suggestion {
                symbol_id: callee_id,
                score: 0.7,
                path: vec![start_name.clone(), edge.callee_name],
                chains_contributed: vec!["fallback:callees".to_string()],
                explanation: None,
            });
            if fallback.len() >= options.max_results {
                break;
            }
        }
    }

    if fallback.len() < options.max_results {
        if let Some(symbol) = db.get_symbol(start_symbol_id)? {
            let mut seen = std::collections::HashSet::new();
            for reference in db.references_to_symbol(start_symbol_id)? {
                if reference.reference_kind == ReferenceKind::Import {
                    continue;
                }
                if reference.referencing_file != symbol.location().file_path {
                    continue;
                }
                let Some(referencing_symbol_id) = reference.referencing_symbol_id else { continue };
                if !seen.insert(referencing_symbol_id.clone()) {
                    continue;
                }
                fallback.push(Suggestion {
                    symbol_id: referencing_symbol_id,
                    score: 0.5,
                    path: vec![start_name.clone(), reference.referencing_symbol_name.unwrap_or_default()],
                    chains_contributed: vec!["fallback:same_file".to_string()],
                    explanation: None,
                });
                if fallback.len() >= options.max_results {
                    break;
                }
            }
        }
    }

    result.suggestions = fallback;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_ranks_callers_above_callees_above_same_file() {
        let scores = [0.8, 0.7, 0.5];
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
