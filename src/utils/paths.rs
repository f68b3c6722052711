//! Path normalization shared by the indexer and the path resolver (§4.3).
//!
//! The teacher stores symbols under relative, Unix-style paths and converts
//! absolute watcher paths with a `to_relative_unix_style` helper
//! (`src/watcher/handlers.rs`); this module generalizes that into the
//! normalization contract §4.3 requires to be "language-agnostic".

use std::path::{Component, Path, PathBuf};

/// Strip surrounding whitespace, normalize `\` to `/`, collapse `//`,
/// resolve `.` and `..` segments, and strip a leading `./`.
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    let slashed = trimmed.replace('\\', "/");
    let mut out: Vec<&str> = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

/// Convert an absolute filesystem path into a `/`-separated path relative to
/// `root`, or `None` if `path` does not live under `root`.
pub fn to_relative_unix_style(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

pub fn to_absolute(root: &Path, relative: &str) -> PathBuf {
    root.join(relative.replace('/', std::path::MAIN_SEPARATOR_STR))
}

/// Extensions tried, in order, when a relative import specifier names a
/// directory or omits its extension (`./calc` -> `./calc.ts`, `./calc/index.py`).
const MODULE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "mjs", "py"];

/// Resolves a relative import specifier (`./calc`, `../lib/calc.py`) against
/// the importing file's directory into a workspace-relative path, trying it
/// as given, with each of [`MODULE_EXTENSIONS`] appended, and as an `index`
/// file inside it. Returns `None` for bare specifiers (package imports,
/// §4.8.4's "external" sources) or when nothing on disk matches.
pub fn resolve_module_source(importer_absolute: &Path, source: &str, root: &Path) -> Option<String> {
    if !(source.starts_with('.') || source.starts_with('/')) {
        return None;
    }
    let base = if source.starts_with('/') {
        root.join(source.trim_start_matches('/'))
    } else {
        importer_absolute.parent()?.join(source)
    };

    let mut candidates = vec![base.clone()];
    for ext in MODULE_EXTENSIONS {
        candidates.push(base.with_extension(ext));
    }
    for ext in MODULE_EXTENSIONS {
        candidates.push(base.join(format!("index.{ext}")));
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .and_then(|candidate| to_relative_unix_style(&candidate, root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_dotdot() {
        assert_eq!(normalize("./src//utils\\paths.rs"), "src/utils/paths.rs");
        assert_eq!(normalize("src/foo/../bar.rs"), "src/bar.rs");
        assert_eq!(normalize("  src/bar.rs  "), "src/bar.rs");
    }

    #[test]
    fn relative_unix_style_roundtrips() {
        let root = Path::new("/repo");
        let abs = Path::new("/repo/src/lib.rs");
        assert_eq!(to_relative_unix_style(abs, root).as_deref(), Some("src/lib.rs"));
        assert_eq!(to_absolute(root, "src/lib.rs"), abs);
    }

    #[test]
    fn relative_unix_style_rejects_paths_outside_root() {
        let root = Path::new("/repo");
        let abs = Path::new("/other/src/lib.rs");
        assert_eq!(to_relative_unix_style(abs, root), None);
    }

    #[test]
    fn resolve_module_source_ignores_bare_specifiers() {
        let dir = tempfile::tempdir().unwrap();
        let importer = dir.path().join("src/a.ts");
        assert_eq!(resolve_module_source(&importer, "react", dir.path()), None);
    }

    #[test]
    fn resolve_module_source_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/b.ts"), "export const x = 1;").unwrap();
        let importer = dir.path().join("src/a.ts");
        assert_eq!(
            resolve_module_source(&importer, "./b", dir.path()).as_deref(),
            Some("src/b.ts")
        );
    }

    #[test]
    fn resolve_module_source_finds_index_file_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/lib")).unwrap();
        std::fs::write(dir.path().join("src/lib/index.ts"), "export const x = 1;").unwrap();
        let importer = dir.path().join("src/a.ts");
        assert_eq!(
            resolve_module_source(&importer, "./lib", dir.path()).as_deref(),
            Some("src/lib/index.ts")
        );
    }
}
