//! `ImportInfo`/`ExportInfo` storage, backing `get_module_dependencies`
//! (§6.3) and the import_cluster Markov chain (§4.8.4).

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::{ExportInfo, ImportInfo};
use rusqlite::params;

impl SymbolDatabase {
    pub fn insert_import(&self, import: &ImportInfo) -> Result<()> {
        self.conn.execute(
            "INSERT INTO imports (file_path, source, specifiers, is_type_only, line) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                import.file_path,
                import.source,
                serde_json::to_string(&import.specifiers)?,
                import.is_type_only as i32,
                import.line,
            ],
        )?;
        Ok(())
    }

    pub fn insert_imports(&self, imports: &[ImportInfo]) -> Result<()> {
        for import in imports {
            self.insert_import(import)?;
        }
        Ok(())
    }

    pub fn insert_export(&self, export: &ExportInfo) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exports (file_path, name, line, is_reexport, reexport_source) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![export.file_path, export.name, export.line, export.is_reexport as i32, export.reexport_source],
        )?;
        Ok(())
    }

    pub fn insert_exports(&self, exports: &[ExportInfo]) -> Result<()> {
        for export in exports {
            self.insert_export(export)?;
        }
        Ok(())
    }

    pub fn imports_of_file(&self, file_path: &str) -> Result<Vec<ImportInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source, specifiers, is_type_only, line FROM imports WHERE file_path = ?1")?;
        let rows = stmt.query_map(params![file_path], |row| {
            let specifiers: String = row.get(1)?;
            Ok(ImportInfo {
                source: row.get(0)?,
                specifiers: serde_json::from_str(&specifiers).unwrap_or_default(),
                is_type_only: row.get::<_, i32>(2)? != 0,
                file_path: file_path.to_string(),
                line: row.get(3)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn importers_of_source(&self, source: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT DISTINCT file_path FROM imports WHERE source = ?1")?;
        let rows = stmt.query_map(params![source], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn all_imports(&self) -> Result<Vec<ImportInfo>> {
        let mut stmt = self.conn.prepare("SELECT file_path, source, specifiers, is_type_only, line FROM imports")?;
        let rows = stmt.query_map([], |row| {
            let specifiers: String = row.get(2)?;
            Ok(ImportInfo {
                file_path: row.get(0)?,
                source: row.get(1)?,
                specifiers: serde_json::from_str(&specifiers).unwrap_or_default(),
                is_type_only: row.get::<_, i32>(3)? != 0,
                line: row.get(4)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
