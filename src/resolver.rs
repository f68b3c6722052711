//! Path Resolver (§4.3). Turns a user-supplied path fragment into an
//! indexed file, never throwing: every outcome is a `Resolution` variant
//! the caller pattern-matches on, mirroring the Failure-as-data discipline
//! the teacher already uses for its own tool-surface errors (§7).

use crate::database::SymbolDatabase;
use crate::utils::paths::normalize;
use crate::utils::text::edit_distance;
use std::path::Path;

const MAX_FUZZY_SUGGESTIONS: usize = 5;
const MAX_FUZZY_EDIT_DISTANCE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub resolved_path: String,
    pub relative_path: String,
    pub auto_resolved: bool,
    pub original_input: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailureKind {
    NotFound,
    Ambiguous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    pub kind: ResolutionFailureKind,
    pub searched_directory: Option<String>,
    pub available_paths: Vec<String>,
    pub suggestions: Vec<String>,
}

pub type Resolution = Result<ResolvedPath, ResolutionFailure>;

/// Resolves `input` against the set of files currently indexed under
/// `root`. Never returns an `Err` from the crate's own error type — an
/// unresolved path is a `Resolution::Err(ResolutionFailure)`, per §4.3/§7.
pub fn resolve(db: &SymbolDatabase, root: &Path, input: &str) -> crate::error::Result<Resolution> {
    let known = db.known_relative_paths()?;
    let normalized = normalize(input);

    // 1 & 2: exact match, absolute or root-relative.
    let as_path = Path::new(input);
    if as_path.is_absolute() {
        if let Some(relative) = crate::utils::paths::to_relative_unix_style(as_path, root) {
            if known.iter().any(|p| p == &relative) {
                return Ok(Ok(exact(root, &relative)));
            }
        }
    }
    if known.iter().any(|p| p == &normalized) {
        return Ok(Ok(exact(root, &normalized)));
    }

    // 3: path-suffix match.
    let suffix_matches: Vec<&String> = known
        .iter()
        .filter(|p| *p == &normalized || p.ends_with(&format!("/{normalized}")))
        .collect();
    match suffix_matches.len() {
        1 => {
            let relative = suffix_matches[0].clone();
            return Ok(Ok(ResolvedPath {
                resolved_path: crate::utils::paths::to_absolute(root, &relative)
                    .to_string_lossy()
                    .into_owned(),
                relative_path: relative,
                auto_resolved: true,
                original_input: Some(input.to_string()),
            }));
        }
        n if n > 1 => {
            return Ok(Err(ResolutionFailure {
                kind: ResolutionFailureKind::Ambiguous,
                searched_directory: None,
                available_paths: Vec::new(),
                suggestions: suffix_matches.into_iter().cloned().collect(),
            }));
        }
        _ => {}
    }

    // 4: approximate suggestions — nearest existing ancestor directory's
    // files, plus fuzzy matches by edit distance.
    let searched_directory = nearest_existing_ancestor(&known, &normalized);
    let mut available_paths: Vec<String> = match &searched_directory {
        Some(dir) => known
            .iter()
            .filter(|p| parent_of(p) == Some(dir.as_str()))
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    available_paths.sort();

    let query_name = normalized.rsplit('/').next().unwrap_or(&normalized);
    let mut scored: Vec<(usize, &String)> = known
        .iter()
        .filter_map(|p| {
            let candidate_name = p.rsplit('/').next().unwrap_or(p);
            let distance = edit_distance(query_name, candidate_name);
            (distance <= MAX_FUZZY_EDIT_DISTANCE).then_some((distance, p))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    let suggestions: Vec<String> = scored
        .into_iter()
        .take(MAX_FUZZY_SUGGESTIONS)
        .map(|(_, p)| p.clone())
        .collect();

    Ok(Err(ResolutionFailure {
        kind: ResolutionFailureKind::NotFound,
        searched_directory,
        available_paths,
        suggestions,
    }))
}

fn exact(root: &Path, relative: &str) -> ResolvedPath {
    ResolvedPath {
        resolved_path: crate::utils::paths::to_absolute(root, relative)
            .to_string_lossy()
            .into_owned(),
        relative_path: relative.to_string(),
        auto_resolved: false,
        original_input: None,
    }
}

fn parent_of(relative_path: &str) -> Option<&str> {
    relative_path.rsplit_once('/').map(|(dir, _)| dir)
}

/// Walks the candidate path's ancestor directories (closest first) and
/// returns the first one that actually contains at least one indexed file.
fn nearest_existing_ancestor(known: &[String], normalized: &str) -> Option<String> {
    let mut dir = parent_of(normalized);
    while let Some(candidate) = dir {
        if known.iter().any(|p| parent_of(p) == Some(candidate)) {
            return Some(candidate.to_string());
        }
        dir = parent_of(candidate);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileRecord, ParseStatus};
    use std::path::PathBuf;

    fn seed(db: &SymbolDatabase, relative: &str) {
        db.upsert_file(
            &FileRecord {
                absolute_path: format!("/repo/{relative}"),
                relative_path: relative.to_string(),
                language: "typescript".to_string(),
                checksum: "abc".to_string(),
                line_count: 1,
                parse_status: ParseStatus::Complete,
                parse_warnings: Vec::new(),
                summary: String::new(),
            },
            "",
        )
        .unwrap();
    }

    #[test]
    fn resolves_unique_suffix_match() {
        let db = SymbolDatabase::open_in_memory().unwrap();
        seed(&db, "src/utils/text.rs");
        let result = resolve(&db, &PathBuf::from("/repo"), "utils/text.rs").unwrap();
        let resolved = result.unwrap();
        assert!(resolved.auto_resolved);
        assert_eq!(resolved.relative_path, "src/utils/text.rs");
    }

    #[test]
    fn reports_ambiguous_suffix_matches() {
        let db = SymbolDatabase::open_in_memory().unwrap();
        seed(&db, "a/mod.rs");
        seed(&db, "b/mod.rs");
        let result = resolve(&db, &PathBuf::from("/repo"), "mod.rs").unwrap();
        let failure = result.unwrap_err();
        assert_eq!(failure.kind, ResolutionFailureKind::Ambiguous);
        assert_eq!(failure.suggestions.len(), 2);
    }

    #[test]
    fn suggests_fuzzy_matches_when_not_found() {
        let db = SymbolDatabase::open_in_memory().unwrap();
        seed(&db, "src/resolver.rs");
        let result = resolve(&db, &PathBuf::from("/repo"), "resolvr.rs").unwrap();
        let failure = result.unwrap_err();
        assert_eq!(failure.kind, ResolutionFailureKind::NotFound);
        assert!(failure.suggestions.contains(&"src/resolver.rs".to_string()));
    }
}
