//! Symbol storage and lookup, grounded in the teacher's flat `symbols`
//! table + JSON metadata blob pattern (`src/database/schema.rs`'s
//! `symbols.metadata TEXT` column), generalized to store the full
//! serialized `Symbol` union as the payload and project the columns the
//! query layer filters/sorts on (kind, name, fqn, file, export flag,
//! parent) out to their own indexed columns.

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::{Symbol, SymbolKind};
use rusqlite::params;

impl SymbolDatabase {
    pub fn insert_symbol(&self, symbol: &Symbol) -> Result<()> {
        let payload = serde_json::to_string(symbol)?;
        let (parent_class, parent_function) = match symbol {
            Symbol::Function(f) => (f.parent_class.clone(), f.parent_function.clone()),
            Symbol::Property(p) => (p.parent_class.clone(), None),
            _ => (None, None),
        };
        self.conn.execute(
            "INSERT OR REPLACE INTO symbols
                (id, kind, name, fully_qualified_name, file_path, start_line, end_line, is_exported, parent_class, parent_function, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                symbol.id(),
                symbol.kind().as_str(),
                symbol.name(),
                symbol.fully_qualified_name(),
                symbol.location().file_path,
                symbol.location().start_line,
                symbol.location().end_line,
                symbol.is_exported() as i32,
                parent_class,
                parent_function,
                payload,
            ],
        )?;
        Ok(())
    }

    pub fn insert_symbols(&self, symbols: &[Symbol]) -> Result<()> {
        for symbol in symbols {
            self.insert_symbol(symbol)?;
        }
        Ok(())
    }

    pub fn get_symbol(&self, id: &str) -> Result<Option<Symbol>> {
        let payload: Option<String> = self
            .conn
            .query_row("SELECT payload FROM symbols WHERE id = ?1", params![id], |row| row.get(0))
            .ok();
        Ok(match payload {
            Some(p) => Some(serde_json::from_str(&p)?),
            None => None,
        })
    }

    pub fn find_by_name(&self, name: &str, kind: Option<SymbolKind>) -> Result<Vec<Symbol>> {
        let mut stmt = match kind {
            Some(_) => self.conn.prepare("SELECT payload FROM symbols WHERE name = ?1 AND kind = ?2")?,
            None => self.conn.prepare("SELECT payload FROM symbols WHERE name = ?1")?,
        };
        let rows = if let Some(kind) = kind {
            stmt.query_map(params![name, kind.as_str()], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![name], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        rows.iter().map(|p| serde_json::from_str(p).map_err(Into::into)).collect()
    }

    pub fn find_by_fully_qualified_name(&self, fqn: &str) -> Result<Option<Symbol>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM symbols WHERE fully_qualified_name = ?1 LIMIT 1",
                params![fqn],
                |row| row.get(0),
            )
            .ok();
        Ok(match payload {
            Some(p) => Some(serde_json::from_str(&p)?),
            None => None,
        })
    }

    pub fn symbols_in_file(&self, relative_path: &str) -> Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare("SELECT payload FROM symbols WHERE file_path = ?1 ORDER BY start_line")?;
        let rows: Vec<String> = stmt
            .query_map(params![relative_path], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.iter().map(|p| serde_json::from_str(p).map_err(Into::into)).collect()
    }

    pub fn list_by_kind(&self, kind: SymbolKind) -> Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare("SELECT payload FROM symbols WHERE kind = ?1 ORDER BY fully_qualified_name")?;
        let rows: Vec<String> = stmt
            .query_map(params![kind.as_str()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.iter().map(|p| serde_json::from_str(p).map_err(Into::into)).collect()
    }

    pub fn methods_of_class(&self, class_fqn: &str) -> Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare("SELECT payload FROM symbols WHERE parent_class = ?1 ORDER BY start_line")?;
        let rows: Vec<String> = stmt
            .query_map(params![class_fqn], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.iter().map(|p| serde_json::from_str(p).map_err(Into::into)).collect()
    }

    /// §4.10 exact/prefix tier, backed by the `symbols_fts` index.
    pub fn search_symbols_fts(&self, query: &str, limit: usize) -> Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare(
            "SELECT symbols.payload FROM symbols_fts
             JOIN symbols ON symbols.rowid = symbols_fts.rowid
             WHERE symbols_fts MATCH ?1
             ORDER BY rank
             LIMIT ?2",
        )?;
        let rows: Vec<String> = stmt
            .query_map(params![format!("{query}*"), limit as i64], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.iter().map(|p| serde_json::from_str(p).map_err(Into::into)).collect()
    }

    /// Fallback scan used by the edit-distance tier (§4.10) when FTS finds
    /// nothing — candidate names are cheap to pull back and score in Rust.
    pub fn all_symbol_names(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM symbols")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// `(id, name, file_path, parent_class, parent_function)` for every
    /// symbol — the raw material the `cooccurrence` Markov chain builder
    /// (§4.8.2) groups by file and scores by document frequency, without
    /// paying to deserialize every symbol's full payload.
    pub fn all_symbols_brief(&self) -> Result<Vec<(String, String, String, Option<String>, Option<String>)>> {
        let mut stmt = self.conn.prepare("SELECT id, name, file_path, parent_class, parent_function FROM symbols")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
