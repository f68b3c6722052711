//! Sync Engine (§4.6). Wraps the indexer with the targeted-vs-full
//! distinction and the optional Markov rebuild trigger, and guarantees no
//! two syncs run concurrently against the same store — the same "one writer
//! at a time" discipline §5 asks for, implemented with a `tokio::sync::Mutex`
//! guard rather than a boolean flag, so a caller who tries to sync while one
//! is in flight waits for its turn instead of racing or erroring out.

use crate::config::IndexConfig;
use crate::database::SymbolDatabase;
use crate::error::Result;
use crate::extractors::registry::ParserRegistry;
use crate::indexer::{self, IndexSummary};
use crate::markov;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone)]
pub struct SyncOptions {
    /// Specific paths to sync. `None` means a full directory sync.
    pub files: Option<Vec<String>>,
    pub rebuild_chains: bool,
    /// Checked between files (§4.6): cancelling stops the sync at the next
    /// file boundary instead of mid-file.
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSummary {
    pub reindexed: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub duration_ms: u64,
    pub chain_ids: Vec<String>,
}

/// Owns the serialization lock for one store. One `SyncEngine` should be
/// shared (e.g. behind an `Arc`) by every caller that can trigger a sync
/// against the same database.
pub struct SyncEngine {
    lock: tokio::sync::Mutex<()>,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngine {
    pub fn new() -> Self {
        Self { lock: tokio::sync::Mutex::new(()) }
    }

    pub async fn sync(
        &self,
        db: &SymbolDatabase,
        config: &IndexConfig,
        registry: &Arc<ParserRegistry>,
        options: SyncOptions,
    ) -> Result<SyncSummary> {
        // §4.6/§5: syncs are totally ordered against one store, so a second
        // caller waits its turn here instead of failing fast.
        let _guard = self.lock.lock().await;

        let started = Instant::now();
        let (reindexed, removed, unchanged) = match &options.files {
            Some(files) => self.sync_targeted(db, config, registry, files, options.cancel.as_ref()).await?,
            None => self.sync_full(db, config, registry, options.cancel.as_ref()).await?,
        };

        let chain_ids = if options.rebuild_chains {
            markov::rebuild_all(db, &config.markov)?;
            markov::CHAIN_TYPES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        Ok(SyncSummary {
            reindexed,
            removed,
            unchanged,
            duration_ms: started.elapsed().as_millis() as u64,
            chain_ids,
        })
    }

    async fn sync_targeted(
        &self,
        db: &SymbolDatabase,
        config: &IndexConfig,
        registry: &Arc<ParserRegistry>,
        files: &[String],
        cancel: Option<&CancellationToken>,
    ) -> Result<(usize, usize, usize)> {
        let mut reindexed = 0;
        let mut removed = 0;
        let mut unchanged = 0;
        for file in files {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                break;
            }
            let given = Path::new(file);
            let absolute = if given.is_absolute() { given.to_path_buf() } else { config.root_directory.join(given) };
            if !absolute.exists() {
                let Some(relative) = crate::utils::paths::to_relative_unix_style(&absolute, &config.root_directory)
                else {
                    continue;
                };
                db.remove_file(&relative)?;
                removed += 1;
                continue;
            }
            match indexer::index_file(db, config, registry, &absolute).await? {
                Ok(true) => reindexed += 1,
                Ok(false) => unchanged += 1,
                Err(_) => unchanged += 1,
            }
        }
        Ok((reindexed, removed, unchanged))
    }

    async fn sync_full(
        &self,
        db: &SymbolDatabase,
        config: &IndexConfig,
        registry: &Arc<ParserRegistry>,
        cancel: Option<&CancellationToken>,
    ) -> Result<(usize, usize, usize)> {
        let before: std::collections::HashSet<String> = db.known_relative_paths()?.into_iter().collect();
        let summary: IndexSummary = indexer::index_directory(db, config, registry, None, cancel).await?;
        let after: std::collections::HashSet<String> = db.known_relative_paths()?.into_iter().collect();
        let removed = before.difference(&after).count();
        Ok((summary.indexed_files, removed, summary.skipped_files))
    }
}
