//! `SymbolReference` storage (§3) and the cross-file resolver's update path.

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::{ReferenceKind, SymbolReference};
use rusqlite::params;

impl SymbolDatabase {
    pub fn insert_reference(&self, reference: &SymbolReference) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO symbol_references
                (id, symbol_id, symbol_name, referencing_file, referencing_symbol_id, referencing_symbol_name, line, column, context, reference_kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                reference.id,
                reference.symbol_id,
                reference.symbol_name,
                reference.referencing_file,
                reference.referencing_symbol_id,
                reference.referencing_symbol_name,
                reference.line,
                reference.column,
                reference.context,
                reference.reference_kind.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_references(&self, references: &[SymbolReference]) -> Result<()> {
        for r in references {
            self.insert_reference(r)?;
        }
        Ok(())
    }

    /// §4.4 resolver pass: references are written with `symbol_id = NULL`
    /// by the extractor and patched in once the owning symbol is known.
    pub fn unresolved_references(&self) -> Result<Vec<SymbolReference>> {
        self.select_references(
            "SELECT id, symbol_id, symbol_name, referencing_file, referencing_symbol_id, referencing_symbol_name, line, column, context, reference_kind
             FROM symbol_references WHERE symbol_id IS NULL",
            [],
        )
    }

    pub fn resolve_reference(&self, reference_id: &str, symbol_id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE symbol_references SET symbol_id = ?1 WHERE id = ?2",
            params![symbol_id, reference_id],
        )?;
        Ok(())
    }

    pub fn references_to_symbol(&self, symbol_id: &str) -> Result<Vec<SymbolReference>> {
        self.select_references(
            "SELECT id, symbol_id, symbol_name, referencing_file, referencing_symbol_id, referencing_symbol_name, line, column, context, reference_kind
             FROM symbol_references WHERE symbol_id = ?1",
            params![symbol_id],
        )
    }

    fn select_references(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<SymbolReference>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            let kind: String = row.get(9)?;
            Ok(SymbolReference {
                id: row.get(0)?,
                symbol_id: row.get(1)?,
                symbol_name: row.get(2)?,
                referencing_file: row.get(3)?,
                referencing_symbol_id: row.get(4)?,
                referencing_symbol_name: row.get(5)?,
                line: row.get(6)?,
                column: row.get(7)?,
                context: row.get(8)?,
                reference_kind: ReferenceKind::parse(&kind).unwrap_or(ReferenceKind::Read),
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
