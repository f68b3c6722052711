//! Table and FTS5 index creation, ported from the teacher's
//! `create_*_table`/`create_*_fts_table`/`create_*_fts_triggers` layout in
//! `src/database/schema.rs`, narrowed to the tables §3/§4.4 need.

use super::SymbolDatabase;
use crate::error::Result;
use tracing::debug;

impl SymbolDatabase {
    pub(super) fn initialize_schema(&mut self) -> Result<()> {
        debug!("creating database schema");

        self.create_files_table()?;
        self.create_files_fts_table()?;
        self.create_files_fts_triggers()?;

        self.create_symbols_table()?;
        self.create_symbols_fts_table()?;
        self.create_symbols_fts_triggers()?;

        self.create_references_table()?;
        self.create_call_edges_table()?;
        self.create_type_relationships_table()?;
        self.create_imports_table()?;
        self.create_exports_table()?;
        self.create_markov_tables()?;

        debug!("database schema created");
        Ok(())
    }

    fn create_files_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS files (
                absolute_path TEXT PRIMARY KEY,
                relative_path TEXT NOT NULL UNIQUE,
                language TEXT NOT NULL,
                checksum TEXT NOT NULL,
                line_count INTEGER NOT NULL,
                parse_status TEXT NOT NULL,
                parse_warnings TEXT NOT NULL DEFAULT '[]',
                summary TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_files_language ON files(language)",
            [],
        )?;
        Ok(())
    }

    fn create_files_fts_table(&self) -> Result<()> {
        self.conn.execute(
            r#"CREATE VIRTUAL TABLE IF NOT EXISTS files_fts USING fts5(
                relative_path,
                content,
                tokenize = "unicode61 separators '_::->.'",
                content = 'files',
                content_rowid = 'rowid'
            )"#,
            [],
        )?;
        Ok(())
    }

    fn create_files_fts_triggers(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TRIGGER IF NOT EXISTS files_ai AFTER INSERT ON files BEGIN
                INSERT INTO files_fts(rowid, relative_path, content)
                VALUES (new.rowid, new.relative_path, new.content);
            END",
            [],
        )?;
        self.conn.execute(
            "CREATE TRIGGER IF NOT EXISTS files_ad AFTER DELETE ON files BEGIN
                INSERT INTO files_fts(files_fts, rowid, relative_path, content)
                VALUES ('delete', old.rowid, old.relative_path, old.content);
            END",
            [],
        )?;
        self.conn.execute(
            "CREATE TRIGGER IF NOT EXISTS files_au AFTER UPDATE ON files BEGIN
                INSERT INTO files_fts(files_fts, rowid, relative_path, content)
                VALUES ('delete', old.rowid, old.relative_path, old.content);
                INSERT INTO files_fts(rowid, relative_path, content)
                VALUES (new.rowid, new.relative_path, new.content);
            END",
            [],
        )?;
        Ok(())
    }

    fn create_symbols_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS symbols (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                fully_qualified_name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                start_line INTEGER NOT NULL,
                end_line INTEGER NOT NULL,
                is_exported INTEGER NOT NULL,
                parent_class TEXT,
                parent_function TEXT,
                payload TEXT NOT NULL,
                FOREIGN KEY(file_path) REFERENCES files(relative_path) ON DELETE CASCADE
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_path)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_symbols_fqn ON symbols(fully_qualified_name)",
            [],
        )?;
        Ok(())
    }

    fn create_symbols_fts_table(&self) -> Result<()> {
        self.conn.execute(
            r#"CREATE VIRTUAL TABLE IF NOT EXISTS symbols_fts USING fts5(
                name,
                fully_qualified_name,
                tokenize = "unicode61 separators '_::->.'",
                content = 'symbols',
                content_rowid = 'rowid'
            )"#,
            [],
        )?;
        Ok(())
    }

    fn create_symbols_fts_triggers(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TRIGGER IF NOT EXISTS symbols_ai AFTER INSERT ON symbols BEGIN
                INSERT INTO symbols_fts(rowid, name, fully_qualified_name)
                VALUES (new.rowid, new.name, new.fully_qualified_name);
            END",
            [],
        )?;
        self.conn.execute(
            "CREATE TRIGGER IF NOT EXISTS symbols_ad AFTER DELETE ON symbols BEGIN
                INSERT INTO symbols_fts(symbols_fts, rowid, name, fully_qualified_name)
                VALUES ('delete', old.rowid, old.name, old.fully_qualified_name);
            END",
            [],
        )?;
        self.conn.execute(
            "CREATE TRIGGER IF NOT EXISTS symbols_au AFTER UPDATE ON symbols BEGIN
                INSERT INTO symbols_fts(symbols_fts, rowid, name, fully_qualified_name)
                VALUES ('delete', old.rowid, old.name, old.fully_qualified_name);
                INSERT INTO symbols_fts(rowid, name, fully_qualified_name)
                VALUES (new.rowid, new.name, new.fully_qualified_name);
            END",
            [],
        )?;
        Ok(())
    }

    fn create_references_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS symbol_references (
                id TEXT PRIMARY KEY,
                symbol_id TEXT,
                symbol_name TEXT NOT NULL,
                referencing_file TEXT NOT NULL,
                referencing_symbol_id TEXT,
                referencing_symbol_name TEXT,
                line INTEGER NOT NULL,
                column INTEGER NOT NULL,
                context TEXT NOT NULL,
                reference_kind TEXT NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_references_symbol ON symbol_references(symbol_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_references_name ON symbol_references(symbol_name)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_references_file ON symbol_references(referencing_file)",
            [],
        )?;
        Ok(())
    }

    fn create_call_edges_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS call_edges (
                id TEXT PRIMARY KEY,
                caller_symbol_id TEXT NOT NULL,
                caller_name TEXT NOT NULL,
                callee_symbol_id TEXT,
                callee_name TEXT NOT NULL,
                call_count INTEGER NOT NULL,
                is_async INTEGER NOT NULL,
                is_conditional INTEGER NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_call_edges_caller ON call_edges(caller_symbol_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_call_edges_callee ON call_edges(callee_symbol_id)",
            [],
        )?;
        Ok(())
    }

    fn create_type_relationships_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS type_relationships (
                id TEXT PRIMARY KEY,
                source_symbol_id TEXT NOT NULL,
                source_name TEXT NOT NULL,
                target_symbol_id TEXT,
                target_name TEXT NOT NULL,
                relationship_kind TEXT NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_type_rel_source ON type_relationships(source_symbol_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_type_rel_target ON type_relationships(target_symbol_id)",
            [],
        )?;
        Ok(())
    }

    fn create_imports_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS imports (
                file_path TEXT NOT NULL,
                source TEXT NOT NULL,
                specifiers TEXT NOT NULL,
                is_type_only INTEGER NOT NULL,
                line INTEGER NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_imports_file ON imports(file_path)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_imports_source ON imports(source)",
            [],
        )?;
        Ok(())
    }

    fn create_exports_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS exports (
                file_path TEXT NOT NULL,
                name TEXT NOT NULL,
                line INTEGER NOT NULL,
                is_reexport INTEGER NOT NULL,
                reexport_source TEXT
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_exports_file ON exports(file_path)",
            [],
        )?;
        Ok(())
    }

    fn create_markov_tables(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS markov_edges (
                chain_type TEXT NOT NULL,
                from_symbol_id TEXT NOT NULL,
                to_symbol_id TEXT NOT NULL,
                probability REAL NOT NULL,
                PRIMARY KEY (chain_type, from_symbol_id, to_symbol_id)
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_markov_from ON markov_edges(chain_type, from_symbol_id)",
            [],
        )?;
        Ok(())
    }
}
