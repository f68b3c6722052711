//! Indexer Orchestrator (§4.5). Walks a directory tree, parses changed
//! files, and writes them through `SymbolDatabase::save_file`. Walking uses
//! `ignore::WalkBuilder` the way the teacher walks its own workspace tree.
//! Checksum comparison is read up front in one query so the bounded-
//! concurrency read+parse phase never needs to touch the database; writes
//! are then applied sequentially, since a single `rusqlite::Connection`
//! handle is not meant to be driven from multiple threads at once.

use crate::config::IndexConfig;
use crate::database::SymbolDatabase;
use crate::extractors::registry::ParserRegistry;
use crate::model::{FileRecord, ParseResult, ParseStatus};
use crate::utils::{
    hashing::checksum,
    paths::{resolve_module_source, to_relative_unix_style},
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSummary {
    pub total_files: usize,
    pub indexed_files: usize,
    pub skipped_files: usize,
    pub errors: Vec<(String, String)>,
    pub duration_ms: u64,
}

struct Candidate {
    absolute: PathBuf,
    relative: String,
}

/// Outcome of the concurrent read+parse phase for one candidate, applied to
/// the store sequentially afterwards.
enum ParsedFile {
    Unchanged,
    TooLarge { relative: String, absolute: String, digest: String, size: u64 },
    Parsed { relative: String, absolute: String, digest: String, language: &'static str, content: String, result: ParseResult },
    Failed { relative: String, message: String },
}

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap())
}

fn collect_candidates(root: &Path, config: &IndexConfig) -> Vec<Candidate> {
    let include = build_globset(&config.include);
    let exclude = build_globset(&config.exclude);
    let mut out = Vec::new();
    let walker = WalkBuilder::new(root).hidden(false).git_ignore(true).build();
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let absolute = entry.path().to_path_buf();
        let Some(relative) = to_relative_unix_style(&absolute, root) else {
            continue;
        };
        if exclude.is_match(&relative) {
            continue;
        }
        if !config.include.is_empty() && !include.is_match(&relative) {
            continue;
        }
        out.push(Candidate { absolute, relative });
    }
    out
}

fn parse_with_registry(registry: &ParserRegistry, path: &Path, content: &str) -> Option<(&'static str, ParseResult)> {
    let (language, outcome) = if let Some(parser) = registry.for_path(path) {
        (parser.language(), parser.parse(&path.to_string_lossy(), content))
    } else if let Some(parser) = registry.for_config_path(path) {
        (parser.language(), parser.parse(&path.to_string_lossy(), content))
    } else {
        return None;
    };
    Some(match outcome {
        Ok(result) => (language, result),
        Err(err) => (language, ParseResult { errors: vec![err.to_string()], ..Default::default() }),
    })
}

async fn read_and_parse(
    registry: Arc<ParserRegistry>,
    config: Arc<IndexConfig>,
    known_checksums: Arc<HashMap<String, String>>,
    candidate: Candidate,
) -> ParsedFile {
    let content = match tokio::fs::read(&candidate.absolute).await {
        Ok(content) => content,
        Err(err) => {
            return ParsedFile::Failed {
                relative: candidate.relative,
                message: format!("io error: {err}"),
            }
        }
    };

    let digest = checksum(&content);
    if known_checksums.get(&candidate.relative) == Some(&digest) {
        return ParsedFile::Unchanged;
    }

    if config.max_file_size > 0 && content.len() as u64 > config.max_file_size {
        return ParsedFile::TooLarge {
            relative: candidate.relative,
            absolute: candidate.absolute.to_string_lossy().into_owned(),
            digest,
            size: content.len() as u64,
        };
    }

    let text = match String::from_utf8(content) {
        Ok(text) => text,
        Err(_) => {
            return ParsedFile::Failed {
                relative: candidate.relative,
                message: "not valid UTF-8".to_string(),
            }
        }
    };

    match parse_with_registry(&registry, &candidate.absolute, &text) {
        Some((language, result)) => ParsedFile::Parsed {
            relative: candidate.relative,
            absolute: candidate.absolute.to_string_lossy().into_owned(),
            digest,
            language,
            content: text,
            result,
        },
        None => ParsedFile::Unchanged,
    }
}

/// Rewrites relative import specifiers (`./b`) into workspace-relative paths
/// (`src/b.ts`) by resolving them against the importing file on disk, so
/// `importers_of_source` and the import_cluster chain can match them back to
/// indexed files. Bare specifiers (package imports) are left untouched.
fn resolve_relative_imports(result: &mut ParseResult, absolute: &Path, root: &Path) {
    for import in &mut result.imports {
        if let Some(resolved) = resolve_module_source(absolute, &import.source, root) {
            import.source = resolved;
        }
    }
}

fn apply(db: &SymbolDatabase, parsed: ParsedFile, root: &Path) -> Result<bool, (String, String)> {
    match parsed {
        ParsedFile::Unchanged => Ok(false),
        ParsedFile::Failed { relative, message } => Err((relative, message)),
        ParsedFile::TooLarge { relative, absolute, digest, size } => {
            let record = FileRecord {
                absolute_path: absolute,
                relative_path: relative.clone(),
                language: "unknown".to_string(),
                checksum: digest,
                line_count: 0,
                parse_status: ParseStatus::Partial,
                parse_warnings: vec![format!("file exceeds configured size limit ({size} bytes)")],
                summary: String::new(),
            };
            db.save_file(&record, "", &ParseResult::default())
                .map(|_| true)
                .map_err(|e| (relative, e.to_string()))
        }
        ParsedFile::Parsed { relative, absolute, digest, language, content, mut result } => {
            resolve_relative_imports(&mut result, Path::new(&absolute), root);
            let mut warnings = result.warnings.clone();
            warnings.extend(result.errors.clone());
            let record = FileRecord {
                absolute_path: absolute,
                relative_path: relative.clone(),
                language: language.to_string(),
                checksum: digest,
                line_count: result.line_count,
                parse_status: result.parse_status(),
                parse_warnings: warnings,
                summary: String::new(),
            };
            db.save_file(&record, &content, &result)
                .map(|_| true)
                .map_err(|e| (relative, e.to_string()))
        }
    }
}

/// §4.5: walks `path.unwrap_or(config.root_directory)`, indexing changed
/// files and, for a full walk (`path` is `None`), deleting stored files that
/// no longer exist on disk. `cancel`, when set, is checked between files
/// (§4.6's file-boundary cancellation) so a running walk stops applying
/// further results once cancelled, without leaving a partially-written file.
pub async fn index_directory(
    db: &SymbolDatabase,
    config: &IndexConfig,
    registry: &Arc<ParserRegistry>,
    path: Option<&Path>,
    cancel: Option<&CancellationToken>,
) -> crate::error::Result<IndexSummary> {
    let started = Instant::now();
    let walk_root = path.unwrap_or(&config.root_directory).to_path_buf();
    let is_full = path.is_none();

    let candidates = collect_candidates(&walk_root, config);
    let total_files = candidates.len();
    let seen: HashSet<String> = candidates.iter().map(|c| c.relative.clone()).collect();

    let known_checksums: HashMap<String, String> = db
        .list_files()?
        .into_iter()
        .map(|record| (record.relative_path, record.checksum))
        .collect();
    let known_checksums = Arc::new(known_checksums);
    let registry = registry.clone();
    let config_arc = Arc::new(config.clone());
    let semaphore = Arc::new(Semaphore::new(config.walker_concurrency.max(1)));

    let mut handles = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let semaphore = semaphore.clone();
        let registry = registry.clone();
        let config_arc = config_arc.clone();
        let known_checksums = known_checksums.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            read_and_parse(registry, config_arc, known_checksums, candidate).await
        }));
    }

    let mut indexed_files = 0;
    let mut skipped_files = 0;
    let mut errors = Vec::new();
    let mut cancelled = false;
    for handle in handles {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            cancelled = true;
            break;
        }
        match handle.await {
            Ok(parsed) => match apply(db, parsed, &walk_root) {
                Ok(true) => indexed_files += 1,
                Ok(false) => skipped_files += 1,
                Err(e) => errors.push(e),
            },
            Err(join_err) => errors.push(("<task>".to_string(), join_err.to_string())),
        }
    }

    if is_full && !cancelled {
        for stored in db.known_relative_paths()? {
            if !seen.contains(&stored) {
                db.remove_file(&stored)?;
            }
        }
    }

    db.resolve_unresolved()?;

    Ok(IndexSummary {
        total_files,
        indexed_files,
        skipped_files,
        errors,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Targeted single-file reindex for the Sync Engine (§4.6) and the watcher
/// (§4.7): same hash-compare-then-parse logic as the full walk, without the
/// vanished-file cleanup pass.
pub async fn index_file(
    db: &SymbolDatabase,
    config: &IndexConfig,
    registry: &Arc<ParserRegistry>,
    absolute_path: &Path,
) -> crate::error::Result<Result<bool, String>> {
    let Some(relative) = to_relative_unix_style(absolute_path, &config.root_directory) else {
        return Ok(Ok(false));
    };
    let known_checksum = db.file_checksum(&relative)?;
    let known_checksums = Arc::new(match known_checksum {
        Some(digest) => HashMap::from([(relative.clone(), digest)]),
        None => HashMap::new(),
    });
    let candidate = Candidate {
        absolute: absolute_path.to_path_buf(),
        relative,
    };
    let parsed = read_and_parse(registry.clone(), Arc::new(config.clone()), known_checksums, candidate).await;
    let outcome = apply(db, parsed, &config.root_directory).map_err(|(_, message)| message);
    if let Ok(true) = outcome {
        db.resolve_unresolved()?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImportInfo;

    #[test]
    fn resolve_relative_imports_rewrites_specifier_to_workspace_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/b.ts"), "export const x = 1;").unwrap();

        let mut result = ParseResult {
            imports: vec![ImportInfo {
                source: "./b".to_string(),
                specifiers: Vec::new(),
                is_type_only: false,
                file_path: "src/a.ts".to_string(),
                line: 1,
            }],
            ..Default::default()
        };

        resolve_relative_imports(&mut result, &dir.path().join("src/a.ts"), dir.path());
        assert_eq!(result.imports[0].source, "src/b.ts");
    }

    #[test]
    fn resolve_relative_imports_leaves_package_specifiers_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = ParseResult {
            imports: vec![ImportInfo {
                source: "react".to_string(),
                specifiers: Vec::new(),
                is_type_only: false,
                file_path: "src/a.ts".to_string(),
                line: 1,
            }],
            ..Default::default()
        };

        resolve_relative_imports(&mut result, &dir.path().join("src/a.ts"), dir.path());
        assert_eq!(result.imports[0].source, "react");
    }
}
