//! File record CRUD, ported from the teacher's `store_file_info` /
//! bulk-insert pattern in `src/database/files.rs`.

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::{FileRecord, ParseStatus};
use rusqlite::params;

impl SymbolDatabase {
    pub fn upsert_file(&self, record: &FileRecord, content: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO files
                (absolute_path, relative_path, language, checksum, line_count, parse_status, parse_warnings, summary, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(absolute_path) DO UPDATE SET
                relative_path = excluded.relative_path,
                language = excluded.language,
                checksum = excluded.checksum,
                line_count = excluded.line_count,
                parse_status = excluded.parse_status,
                parse_warnings = excluded.parse_warnings,
                summary = excluded.summary,
                content = excluded.content",
            params![
                record.absolute_path,
                record.relative_path,
                record.language,
                record.checksum,
                record.line_count,
                record.parse_status.as_str(),
                serde_json::to_string(&record.parse_warnings).unwrap_or_else(|_| "[]".to_string()),
                record.summary,
                content,
            ],
        )?;
        Ok(())
    }

    /// Delete a file and everything derived from it (symbols, references,
    /// call edges, type relationships, imports, exports) — part of "save the
    /// whole file transactionally" (§3) rather than trying to diff
    /// symbol-by-symbol.
    pub fn delete_file(&self, relative_path: &str) -> Result<()> {
        let symbol_ids: Vec<String> = {
            let mut stmt = self.conn.prepare("SELECT id FROM symbols WHERE file_path = ?1")?;
            stmt.query_map(params![relative_path], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        for id in &symbol_ids {
            self.conn.execute("DELETE FROM call_edges WHERE caller_symbol_id = ?1", params![id])?;
            self.conn
                .execute("DELETE FROM type_relationships WHERE source_symbol_id = ?1", params![id])?;
        }
        self.conn.execute("DELETE FROM files WHERE relative_path = ?1", params![relative_path])?;
        self.conn.execute(
            "DELETE FROM symbols WHERE file_path = ?1",
            params![relative_path],
        )?;
        self.conn.execute(
            "DELETE FROM symbol_references WHERE referencing_file = ?1",
            params![relative_path],
        )?;
        self.conn.execute("DELETE FROM imports WHERE file_path = ?1", params![relative_path])?;
        self.conn.execute("DELETE FROM exports WHERE file_path = ?1", params![relative_path])?;
        Ok(())
    }

    pub fn file_checksum(&self, relative_path: &str) -> Result<Option<String>> {
        let checksum = self
            .conn
            .query_row(
                "SELECT checksum FROM files WHERE relative_path = ?1",
                params![relative_path],
                |row| row.get(0),
            )
            .ok();
        Ok(checksum)
    }

    pub fn list_files(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT absolute_path, relative_path, language, checksum, line_count, parse_status, parse_warnings, summary
             FROM files ORDER BY relative_path",
        )?;
        let rows = stmt.query_map([], |row| {
            let parse_status: String = row.get(5)?;
            let warnings: String = row.get(6)?;
            Ok(FileRecord {
                absolute_path: row.get(0)?,
                relative_path: row.get(1)?,
                language: row.get(2)?,
                checksum: row.get(3)?,
                line_count: row.get(4)?,
                parse_status: ParseStatus::parse(&parse_status).unwrap_or(ParseStatus::Failed),
                parse_warnings: serde_json::from_str(&warnings).unwrap_or_default(),
                summary: row.get(7)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn known_relative_paths(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT relative_path FROM files")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
