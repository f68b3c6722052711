//! File filtering for the watcher, narrowed from the teacher's
//! `build_supported_extensions`/`build_ignore_patterns`/`should_index_file`
//! trio in `src/watcher/filtering.rs` to the extensions and config
//! basenames this crate's extractors actually handle.

use crate::extractors::{config_lang, registry::ParserRegistry};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// §4.7: a changed path is worth indexing if it's a source file the
/// registry has a parser for, or an allowlisted config file, and isn't
/// excluded.
pub fn should_index_file(path: &Path, registry: &ParserRegistry, exclude: &GlobSet) -> bool {
    let path_str = path.to_string_lossy();
    if exclude.is_match(path_str.as_ref()) {
        return false;
    }
    if registry.for_path(path).is_some() {
        return true;
    }
    registry.for_config_path(path).is_some() || config_lang::recognize(&path_str).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn excludes_node_modules() {
        let exclude = build_exclude_set(&["**/node_modules/**".to_string()]).unwrap();
        assert!(exclude.is_match("project/node_modules/lib/index.js"));
        assert!(!exclude.is_match("project/src/index.js"));
    }

    #[test]
    fn accepts_typescript_and_recognized_config() {
        let registry = ParserRegistry::new();
        let exclude = build_exclude_set(&[]).unwrap();
        assert!(should_index_file(&PathBuf::from("src/app.ts"), &registry, &exclude));
        assert!(should_index_file(&PathBuf::from("package.json"), &registry, &exclude));
        assert!(!should_index_file(&PathBuf::from("README.md"), &registry, &exclude));
    }
}
