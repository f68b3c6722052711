//! Configuration surface (§6.2) plus the ambient Markov/watcher knobs added
//! in SPEC_FULL.md §A.3. Loaded from a TOML file the way the teacher loads
//! its own settings (`toml` dependency, plain `Deserialize` structs — no
//! `figment` layering, that's `bartolli-codanna`'s choice, not the
//! teacher's).

use crate::error::{CodeIndexError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkovConfig {
    // call_flow (§4.8.1)
    pub async_bonus: f64,
    pub conditional_penalty: f64,
    pub min_call_count: u32,
    pub geometric_mean: bool,
    pub fanout_normalization: bool,

    // cooccurrence (§4.8.2)
    pub same_function_weight: f64,
    pub same_class_weight: f64,
    pub same_file_weight: f64,
    pub idf_enabled: bool,

    // type_affinity (§4.8.3)
    pub extends_weight: f64,
    pub implements_weight: f64,
    pub mixin_weight: f64,
    pub default_type_weight: f64,

    // import_cluster (§4.8.4)
    pub shared_source_weight: f64,
    pub min_shared_imports: u32,

    // query (§4.9)
    pub chain_weights: ChainWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainWeights {
    pub call_flow: f64,
    pub cooccurrence: f64,
    pub type_affinity: f64,
    pub import_cluster: f64,
}

impl Default for ChainWeights {
    fn default() -> Self {
        Self {
            call_flow: 0.4,
            cooccurrence: 0.25,
            type_affinity: 0.2,
            import_cluster: 0.15,
        }
    }
}

impl Default for MarkovConfig {
    fn default() -> Self {
        Self {
            async_bonus: 0.1,
            conditional_penalty: 0.2,
            min_call_count: 1,
            geometric_mean: true,
            fanout_normalization: true,

            same_function_weight: 3.0,
            same_class_weight: 2.0,
            same_file_weight: 1.0,
            idf_enabled: true,

            extends_weight: 1.0,
            implements_weight: 0.9,
            mixin_weight: 0.7,
            default_type_weight: 0.5,

            shared_source_weight: 0.5,
            min_shared_imports: 2,

            chain_weights: ChainWeights::default(),
        }
    }
}

/// §6.2 configuration object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub root_directory: PathBuf,
    pub database_path: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Bytes; 0 disables the cap.
    pub max_file_size: u64,
    pub include_private: bool,
    pub markov: MarkovConfig,
    /// Watcher per-path debounce window, §4.7.
    pub debounce_ms: u64,
    /// Bounded filesystem-walk concurrency, §5.
    pub walker_concurrency: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::from("."),
            database_path: PathBuf::from(".lazyload/index.db"),
            include: Vec::new(),
            exclude: default_excludes(),
            max_file_size: 1024 * 1024,
            include_private: false,
            markov: MarkovConfig::default(),
            debounce_ms: 200,
            walker_concurrency: 12,
        }
    }
}

fn default_excludes() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/.git/**",
        "**/target/**",
        "**/dist/**",
        "**/build/**",
        "**/__pycache__/**",
        "**/.lazyload/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl IndexConfig {
    /// §6.1: "The database file path defaults to `<rootDirectory>/.lazyload/index.db`".
    pub fn for_root(root_directory: impl Into<PathBuf>) -> Self {
        let root_directory = root_directory.into();
        let database_path = root_directory.join(".lazyload").join("index.db");
        Self {
            root_directory,
            database_path,
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CodeIndexError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.root_directory.is_absolute() {
            return Err(CodeIndexError::Config(
                "rootDirectory must be an absolute path".to_string(),
            ));
        }
        if self.walker_concurrency == 0 {
            return Err(CodeIndexError::Config(
                "walkerConcurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_markov_chain_weights_sum_to_one() {
        let w = ChainWeights::default();
        let sum = w.call_flow + w.cooccurrence + w.type_affinity + w.import_cluster;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn for_root_derives_lazyload_db_path() {
        let cfg = IndexConfig::for_root("/home/user/project");
        assert_eq!(
            cfg.database_path,
            PathBuf::from("/home/user/project/.lazyload/index.db")
        );
    }
}
