//! `CallGraphEdge` storage, used by `trace_calls` (§6.3) and as the raw
//! material for the call_flow Markov chain (§4.8.1).

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::CallGraphEdge;
use rusqlite::params;

impl SymbolDatabase {
    pub fn insert_call_edge(&self, edge: &CallGraphEdge) -> Result<()> {
        self.conn.execute(
            "INSERT INTO call_edges (id, caller_symbol_id, caller_name, callee_symbol_id, callee_name, call_count, is_async, is_conditional)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET call_count = call_count + excluded.call_count",
            params![
                edge.id,
                edge.caller_symbol_id,
                edge.caller_name,
                edge.callee_symbol_id,
                edge.callee_name,
                edge.call_count,
                edge.is_async as i32,
                edge.is_conditional as i32,
            ],
        )?;
        Ok(())
    }

    pub fn insert_call_edges(&self, edges: &[CallGraphEdge]) -> Result<()> {
        for edge in edges {
            self.insert_call_edge(edge)?;
        }
        Ok(())
    }

    pub fn resolve_call_edge_callee(&self, id: &str, callee_symbol_id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE call_edges SET callee_symbol_id = ?1 WHERE id = ?2",
            params![callee_symbol_id, id],
        )?;
        Ok(())
    }

    pub fn edges_from_caller(&self, caller_symbol_id: &str) -> Result<Vec<CallGraphEdge>> {
        self.select_call_edges("WHERE caller_symbol_id = ?1", params![caller_symbol_id])
    }

    pub fn edges_to_callee(&self, callee_symbol_id: &str) -> Result<Vec<CallGraphEdge>> {
        self.select_call_edges("WHERE callee_symbol_id = ?1", params![callee_symbol_id])
    }

    pub fn all_call_edges(&self) -> Result<Vec<CallGraphEdge>> {
        self.select_call_edges("", [])
    }

    fn select_call_edges(&self, where_clause: &str, params: impl rusqlite::Params) -> Result<Vec<CallGraphEdge>> {
        let sql = format!(
            "SELECT id, caller_symbol_id, caller_name, callee_symbol_id, callee_name, call_count, is_async, is_conditional
             FROM call_edges {where_clause}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(CallGraphEdge {
                id: row.get(0)?,
                caller_symbol_id: row.get(1)?,
                caller_name: row.get(2)?,
                callee_symbol_id: row.get(3)?,
                callee_name: row.get(4)?,
                call_count: row.get(5)?,
                is_async: row.get::<_, i32>(6)? != 0,
                is_conditional: row.get::<_, i32>(7)? != 0,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
