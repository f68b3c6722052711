//! Parser Registry (§4.2): maps a file extension to the `LanguageParser`
//! that handles it, case-insensitively, built once at startup.

use super::{
    config_lang::{self, ConfigExtractor},
    javascript::JavaScriptExtractor,
    python::PythonExtractor,
    typescript::TypeScriptExtractor,
    LanguageParser,
};
use std::collections::HashMap;
use std::path::Path;

pub struct ParserRegistry {
    by_extension: HashMap<&'static str, Box<dyn LanguageParser + Send + Sync>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        let mut by_extension: HashMap<&'static str, Box<dyn LanguageParser + Send + Sync>> = HashMap::new();
        by_extension.insert("ts", Box::new(TypeScriptExtractor::new(false)));
        by_extension.insert("tsx", Box::new(TypeScriptExtractor::new(true)));
        by_extension.insert("mts", Box::new(TypeScriptExtractor::new(false)));
        by_extension.insert("js", Box::new(JavaScriptExtractor::new(false)));
        by_extension.insert("jsx", Box::new(JavaScriptExtractor::new(true)));
        by_extension.insert("mjs", Box::new(JavaScriptExtractor::new(false)));
        by_extension.insert("cjs", Box::new(JavaScriptExtractor::new(false)));
        by_extension.insert("py", Box::new(PythonExtractor::new()));
        by_extension.insert("pyi", Box::new(PythonExtractor::new()));
        Self { by_extension }
    }

    pub fn for_path(&self, path: &Path) -> Option<&(dyn LanguageParser + Send + Sync)> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(ext.as_str()).map(|b| b.as_ref())
    }

    /// §4.1.5 dispatch: only allowlisted config basenames get a parser; any
    /// other `.json`/`.yaml`/`.toml` file is left for `for_path` to ignore.
    pub fn for_config_path(&self, path: &Path) -> Option<Box<dyn LanguageParser + Send + Sync>> {
        let path_str = path.to_string_lossy();
        config_lang::recognize(&path_str)?;
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "json" => Box::new(ConfigExtractor::json()),
            "yaml" | "yml" => Box::new(ConfigExtractor::yaml()),
            "toml" => Box::new(ConfigExtractor::toml()),
            _ => return None,
        })
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.by_extension.keys().copied().collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_typescript_extension_case_insensitively() {
        let registry = ParserRegistry::new();
        assert!(registry.for_path(Path::new("src/App.TSX")).is_some());
        assert!(registry.for_path(Path::new("src/app.rb")).is_none());
    }
}
