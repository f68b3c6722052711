//! Markov-based related-symbol suggestions (§4.8, §4.9). Four independent
//! transition graphs built from the structural data already in the store
//! (call edges, symbol co-occurrence, type relationships, shared imports),
//! queried with a decayed-probability BFS for "what's related to X".

pub mod builder;
pub mod query;

pub use builder::rebuild_all;
pub use query::{query, query_with_fallback, MarkovQueryOptions, MarkovQueryResult, Suggestion};

pub const CHAIN_TYPES: [&str; 4] = ["call_flow", "cooccurrence", "type_affinity", "import_cluster"];
