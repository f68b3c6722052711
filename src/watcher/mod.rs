//! Filesystem watcher (§4.7). Wraps `notify::RecommendedWatcher`, the same
//! crate the teacher uses in its own `src/watcher/mod.rs`, but replaces the
//! teacher's immediate dispatch (queue the event, `tokio::spawn` a handler
//! right away) with genuine per-path debouncing: each filtered event bumps a
//! generation counter for its path and schedules a delayed emit that only
//! fires if nothing newer arrived for that path in the meantime.

pub mod filtering;

use crate::config::IndexConfig;
use crate::extractors::registry::ParserRegistry;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// A single debounced, filtered filesystem change ready for the Sync Engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub path: PathBuf,
    pub change_type: FileChangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeType {
    Created,
    Modified,
    Removed,
}

/// Per-path debounce bookkeeping: the current generation (bumped on every
/// filtered event for that path) plus the sleeping task's handle, so `stop`
/// can abort it outright instead of waiting for it to time out and no-op.
struct DebounceSlot {
    generation: u64,
    handle: tokio::task::JoinHandle<()>,
}

/// Owns the live `notify` watch, the dispatch task, and the per-path
/// debounce state. Dropping this value stops the `notify` watch (the
/// underlying `RecommendedWatcher` is dropped along with it) but leaves any
/// in-flight debounce timers running until they fire and silently fail to
/// send on the now-closed channel; call `stop` to cancel them outright.
pub struct DebouncedWatcher {
    _inner: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<FileChangeEvent>,
    dispatch: tokio::task::JoinHandle<()>,
    slots: Arc<Mutex<HashMap<PathBuf, DebounceSlot>>>,
}

impl DebouncedWatcher {
    /// Starts watching `config.root_directory` recursively. Events for paths
    /// that fail `filtering::should_index_file` are dropped before the
    /// debounce timer is even scheduled.
    pub fn start(config: &IndexConfig) -> notify::Result<Self> {
        let registry = Arc::new(ParserRegistry::new());
        let exclude = filtering::build_exclude_set(&config.exclude)
            .unwrap_or_else(|_| filtering::build_exclude_set(&[]).expect("empty glob set builds"));
        let exclude = Arc::new(exclude);
        let debounce = Duration::from_millis(config.debounce_ms);

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<(PathBuf, FileChangeType)>();
        let (debounced_tx, receiver) = mpsc::unbounded_channel::<FileChangeEvent>();

        let mut inner: RecommendedWatcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "watch error");
                    return;
                }
            };
            let change_type = match event.kind {
                EventKind::Create(_) => FileChangeType::Created,
                EventKind::Modify(_) => FileChangeType::Modified,
                EventKind::Remove(_) => FileChangeType::Removed,
                _ => return,
            };
            for path in event.paths {
                let _ = raw_tx.send((path, change_type));
            }
        })?;
        inner.watch(&config.root_directory, RecursiveMode::Recursive)?;

        let slots: Arc<Mutex<HashMap<PathBuf, DebounceSlot>>> = Arc::new(Mutex::new(HashMap::new()));
        let dispatch_slots = slots.clone();
        let dispatch = tokio::spawn(async move {
            while let Some((path, change_type)) = raw_rx.recv().await {
                if !filtering::should_index_file(&path, &registry, &exclude) {
                    continue;
                }
                let generation = {
                    let mut slots = dispatch_slots.lock().unwrap();
                    slots.get(&path).map(|s| s.generation + 1).unwrap_or(1)
                };
                let timer_slots = dispatch_slots.clone();
                let debounced_tx = debounced_tx.clone();
                let timer_path = path.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(debounce).await;
                    let still_current = {
                        let slots = timer_slots.lock().unwrap();
                        slots.get(&timer_path).map(|s| s.generation) == Some(generation)
                    };
                    if still_current {
                        let _ = debounced_tx.send(FileChangeEvent { path: timer_path, change_type });
                    }
                });
                dispatch_slots.lock().unwrap().insert(path, DebounceSlot { generation, handle });
            }
        });

        Ok(Self { _inner: inner, receiver, dispatch, slots })
    }

    /// Receives the next debounced, filtered change. Returns `None` once the
    /// watch has been dropped and the channel drains.
    pub async fn recv(&mut self) -> Option<FileChangeEvent> {
        self.receiver.recv().await
    }

    /// §4.7: cancels all pending debounce timers and the dispatch task.
    /// Unlike plain `drop` (which only tears down the `notify` watch), this
    /// guarantees no queued timer fires after it returns.
    pub fn stop(&mut self) {
        self.dispatch.abort();
        let mut slots = self.slots.lock().unwrap();
        for (_, slot) in slots.drain() {
            slot.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_types_are_distinguishable() {
        assert_ne!(FileChangeType::Created, FileChangeType::Removed);
    }
}
