//! Schema version tracking, ported from the teacher's sequential
//! `apply_migration(version)` layout in `src/database/migrations.rs`.

use super::SymbolDatabase;
use crate::error::Result;
use rusqlite::params;
use tracing::info;

/// Bump when a new migration is added below.
pub const LATEST_SCHEMA_VERSION: i32 = 1;

impl SymbolDatabase {
    pub(super) fn run_migrations(&mut self) -> Result<()> {
        self.create_schema_version_table()?;
        let current = self.schema_version()?;

        if current >= LATEST_SCHEMA_VERSION {
            return Ok(());
        }

        for version in (current + 1)..=LATEST_SCHEMA_VERSION {
            info!("applying migration to schema version {version}");
            self.apply_migration(version)?;
            self.record_migration(version)?;
        }
        Ok(())
    }

    fn create_schema_version_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL,
                description TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn schema_version(&self) -> Result<i32> {
        let version: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap_or(None);
        Ok(version.unwrap_or(0))
    }

    fn apply_migration(&mut self, version: i32) -> Result<()> {
        match version {
            1 => {
                // Baseline schema lives entirely in `schema.rs`; nothing
                // further to apply for version 1.
                Ok(())
            }
            other => unreachable!("no migration defined for schema version {other}"),
        }
    }

    fn record_migration(&self, version: i32) -> Result<()> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.conn.execute(
            "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
            params![version, now, format!("migration {version}")],
        )?;
        Ok(())
    }
}
