//! Config-file extractor (§4.1.5): flattens recognized JSON/YAML/TOML
//! project files into dotted-path `ConfigEntrySignature` symbols.
//!
//! The teacher has no config extractor of its own — Julie only parses
//! source code — so this is written fresh, grounded in the same
//! `LanguageParser` contract the source extractors implement and in the
//! teacher's general "small, pure, heavily-tested helper functions" style
//! (`src/utils/fuzzy_replace.rs`, `src/utils/path_relevance.rs`).

use super::{LanguageParser, ParseError};
use crate::model::*;

/// Dotted paths are capped at this depth (§4.1.5).
const MAX_DEPTH: u32 = 5;
/// Arrays longer than this collapse to `Array(n)`.
const MAX_ARRAY_ITEMS: usize = 5;
/// Objects with more keys than this collapse to `Object(n keys)`.
const MAX_OBJECT_KEYS: usize = 3;

/// Basenames (or basename suffixes) recognized as project configuration;
/// everything else named `*.json` is app data, not config, and is skipped.
const RECOGNIZED_JSON: &[(&str, &str)] = &[
    ("package.json", "npm package manifest"),
    ("tsconfig.json", "TypeScript compiler configuration"),
    ("jsconfig.json", "JavaScript language-service configuration"),
    ("composer.json", "Composer package manifest"),
    (".eslintrc.json", "ESLint configuration"),
];

const RECOGNIZED_TOML: &[(&str, &str)] = &[
    ("Cargo.toml", "Rust package manifest"),
    ("pyproject.toml", "Python project manifest"),
];

const RECOGNIZED_YAML: &[(&str, &str)] = &[
    ("docker-compose.yml", "Docker Compose service definitions"),
    ("docker-compose.yaml", "Docker Compose service definitions"),
    (".github/workflows/", "GitHub Actions workflow"),
];

#[derive(Clone, Copy)]
enum Lang {
    Json,
    Yaml,
    Toml,
}

pub struct ConfigExtractor {
    lang: Lang,
}

impl ConfigExtractor {
    pub fn json() -> Self {
        Self { lang: Lang::Json }
    }
    pub fn yaml() -> Self {
        Self { lang: Lang::Yaml }
    }
    pub fn toml() -> Self {
        Self { lang: Lang::Toml }
    }
}

/// Returns the recognized config family description for a path, or `None`
/// if the file is not an allowlisted config file (§4.1.5's rejection rule).
pub fn recognize(path: &str) -> Option<&'static str> {
    let basename = path.rsplit('/').next().unwrap_or(path);
    let table: &[(&str, &str)] = if path.ends_with(".json") {
        RECOGNIZED_JSON
    } else if path.ends_with(".toml") {
        RECOGNIZED_TOML
    } else if path.ends_with(".yaml") || path.ends_with(".yml") {
        RECOGNIZED_YAML
    } else {
        return None;
    };
    if let Some((_, desc)) = table
        .iter()
        .find(|(name, _)| basename == *name || path.ends_with(name.trim_end_matches('/')) || path.contains(name))
    {
        return Some(desc);
    }

    // §4.1.5's generic suffix rule: any `*config.json`/`*rc.json`/
    // `*settings.json` is project configuration even without its own
    // allowlist entry.
    if path.ends_with(".json")
        && (basename.ends_with("config.json") || basename.ends_with("rc.json") || basename.ends_with("settings.json"))
    {
        return Some("generic config/rc/settings JSON file");
    }

    None
}

impl LanguageParser for ConfigExtractor {
    fn language(&self) -> &'static str {
        match self.lang {
            Lang::Json => "json",
            Lang::Yaml => "yaml",
            Lang::Toml => "toml",
        }
    }

    fn parse(&self, file_path: &str, content: &str) -> Result<ParseResult, ParseError> {
        let Some(config_type) = recognize(file_path) else {
            return Ok(ParseResult {
                line_count: content.lines().count() as u32,
                warnings: vec![format!("{file_path} is not a recognized config file; skipping")],
                ..Default::default()
            });
        };

        let format = match self.lang {
            Lang::Json => ConfigFormat::Json,
            Lang::Yaml => ConfigFormat::Yaml,
            Lang::Toml => ConfigFormat::Toml,
        };

        let value: serde_json::Value = match self.lang {
            Lang::Json => serde_json::from_str(content).map_err(|e| ParseError::Other(e.to_string()))?,
            Lang::Yaml => serde_yaml::from_str::<serde_yaml::Value>(content)
                .map_err(|e| ParseError::Other(e.to_string()))
                .and_then(|v| serde_json::to_value(v).map_err(|e| ParseError::Other(e.to_string())))?,
            Lang::Toml => content
                .parse::<toml::Value>()
                .map_err(|e| ParseError::Other(e.to_string()))
                .and_then(|v| serde_json::to_value(toml_to_json(v)).map_err(|e| ParseError::Other(e.to_string())))?,
        };

        let mut symbols = Vec::new();
        flatten(file_path, &value, "", None, 0, format, Some(config_type), &mut symbols);

        Ok(ParseResult {
            symbols,
            line_count: content.lines().count() as u32,
            ..Default::default()
        })
    }
}

fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        toml::Value::Array(items) => serde_json::Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(map) => {
            serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
        }
    }
}

fn value_type(value: &serde_json::Value) -> ConfigValueType {
    match value {
        serde_json::Value::String(_) => ConfigValueType::String,
        serde_json::Value::Number(_) => ConfigValueType::Number,
        serde_json::Value::Bool(_) => ConfigValueType::Boolean,
        serde_json::Value::Null => ConfigValueType::Null,
        serde_json::Value::Array(_) => ConfigValueType::Array,
        serde_json::Value::Object(_) => ConfigValueType::Object,
    }
}

#[allow(clippy::too_many_arguments)]
fn flatten(
    file_path: &str,
    value: &serde_json::Value,
    path: &str,
    parent_path: Option<&str>,
    depth: u32,
    format: ConfigFormat,
    config_type: Option<&'static str>,
    out: &mut Vec<Symbol>,
) {
    if path.is_empty() {
        if let serde_json::Value::Object(map) = value {
            for (key, child) in map {
                flatten(file_path, child, key, None, 1, format, config_type, out);
            }
        }
        return;
    }

    let stringified = match value {
        serde_json::Value::Array(items) if items.len() > MAX_ARRAY_ITEMS => format!("Array({})", items.len()),
        serde_json::Value::Object(map) if map.len() > MAX_OBJECT_KEYS => format!("Object({} keys)", map.len()),
        other => other.to_string(),
    };

    let name = path.rsplit('.').next().unwrap_or(path).to_string();
    let id = crate::id::symbol_id(file_path, path, SymbolKind::ConfigEntry, 0);
    out.push(Symbol::ConfigEntry(ConfigEntrySignature {
        id,
        name,
        fully_qualified_name: path.to_string(),
        location: Location { file_path: file_path.to_string(), start_line: 1, end_line: 1 },
        is_exported: true,
        documentation: None,
        path: path.to_string(),
        value_type: value_type(value),
        stringified_value: stringified,
        raw_value: value.clone(),
        depth,
        parent_path: parent_path.map(|s| s.to_string()),
        format,
        config_type: config_type.map(|s| s.to_string()),
    }));

    if depth >= MAX_DEPTH {
        return;
    }
    match value {
        serde_json::Value::Object(map) if map.len() <= MAX_OBJECT_KEYS => {
            for (key, child) in map {
                let child_path = format!("{path}.{key}");
                flatten(file_path, child, &child_path, Some(path), depth + 1, format, config_type, out);
            }
        }
        serde_json::Value::Array(items) if items.len() <= MAX_ARRAY_ITEMS => {
            for (i, item) in items.iter().enumerate() {
                let child_path = format!("{path}[{i}]");
                flatten(file_path, item, &child_path, Some(path), depth + 1, format, config_type, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_config_json() {
        assert!(recognize("data/fixtures/sample.json").is_none());
        assert_eq!(recognize("package.json"), Some("npm package manifest"));
    }

    #[test]
    fn recognizes_generic_config_suffixes() {
        assert!(recognize("app.config.json").is_some());
        assert!(recognize(".myToolrc.json").is_some());
        assert!(recognize("editor.settings.json").is_some());
    }

    #[test]
    fn flattens_nested_object_with_depth_cap() {
        let extractor = ConfigExtractor::json();
        let content = r#"{"scripts": {"build": "tsc"}}"#;
        let result = extractor.parse("package.json", content).unwrap();
        assert!(result.symbols.iter().any(|s| s.fully_qualified_name() == "scripts.build"));
    }
}
