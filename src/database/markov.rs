//! Persisted Markov transition edges (§4.8). The builder in `crate::markov`
//! computes the four normalized chains in memory with `petgraph` and calls
//! here once per rebuild to persist them for the query layer (§4.9), which
//! reads them back without needing the whole graph resident.

use super::SymbolDatabase;
use crate::error::Result;
use rusqlite::params;

impl SymbolDatabase {
    pub fn clear_markov_edges(&self, chain_type: &str) -> Result<()> {
        self.conn.execute("DELETE FROM markov_edges WHERE chain_type = ?1", params![chain_type])?;
        Ok(())
    }

    pub fn insert_markov_edge(&self, chain_type: &str, from: &str, to: &str, probability: f64) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO markov_edges (chain_type, from_symbol_id, to_symbol_id, probability) VALUES (?1, ?2, ?3, ?4)",
            params![chain_type, from, to, probability],
        )?;
        Ok(())
    }

    pub fn outgoing_markov_edges(&self, chain_type: &str, from: &str) -> Result<Vec<(String, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT to_symbol_id, probability FROM markov_edges WHERE chain_type = ?1 AND from_symbol_id = ?2 ORDER BY probability DESC",
        )?;
        let rows = stmt.query_map(params![chain_type, from], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
