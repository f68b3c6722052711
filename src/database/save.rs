//! `saveFile` (§4.4): the one transactional write every indexed file goes
//! through — delete whatever was previously derived from the file, then
//! insert the new `FileRecord` and all of its child rows, as a single SQL
//! transaction so a reader never observes a half-updated file.

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::{FileRecord, ParseResult};

impl SymbolDatabase {
    pub fn save_file(&self, record: &FileRecord, content: &str, parse: &ParseResult) -> Result<()> {
        let tx = self.transaction()?;
        self.delete_file(&record.relative_path)?;
        self.upsert_file(record, content)?;
        self.insert_symbols(&parse.symbols)?;
        self.insert_references(&parse.references)?;
        self.insert_call_edges(&parse.call_edges)?;
        self.insert_type_relationships(&parse.type_relationships)?;
        self.insert_imports(&parse.imports)?;
        self.insert_exports(&parse.exports)?;
        tx.commit()?;
        Ok(())
    }

    pub fn remove_file(&self, relative_path: &str) -> Result<()> {
        self.delete_file(relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParseStatus;

    #[test]
    fn save_file_replaces_prior_symbols_atomically() {
        let db = SymbolDatabase::open_in_memory().unwrap();
        let record = FileRecord {
            absolute_path: "/repo/a.ts".to_string(),
            relative_path: "a.ts".to_string(),
            language: "typescript".to_string(),
            checksum: "v1".to_string(),
            line_count: 3,
            parse_status: ParseStatus::Complete,
            parse_warnings: Vec::new(),
            summary: String::new(),
        };
        db.save_file(&record, "export function f() {}", &ParseResult::default()).unwrap();
        assert_eq!(db.known_relative_paths().unwrap(), vec!["a.ts".to_string()]);

        let record_v2 = FileRecord { checksum: "v2".to_string(), ..record };
        db.save_file(&record_v2, "export function g() {}", &ParseResult::default()).unwrap();
        assert_eq!(db.file_checksum("a.ts").unwrap().as_deref(), Some("v2"));
    }
}
