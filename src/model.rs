//! Core data model shared by the extractors, storage engine, and query layer.
//!
//! Mirrors the teacher's `extractors::base` approach (a small set of shared
//! fields plus per-kind metadata) but expressed as a closed tagged union per
//! symbol kind instead of one flat struct with optional fields, so that
//! kind-specific invariants (parameters only make sense on functions, etc.)
//! are enforced by the type system rather than by convention.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A location within a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// Discriminant for [`Symbol`], stored as-is in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Interface,
    TypeAlias,
    Variable,
    Property,
    ConfigEntry,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::TypeAlias => "type_alias",
            SymbolKind::Variable => "variable",
            SymbolKind::Property => "property",
            SymbolKind::ConfigEntry => "config_entry",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "function" => SymbolKind::Function,
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "type_alias" => SymbolKind::TypeAlias,
            "variable" => SymbolKind::Variable,
            "property" => SymbolKind::Property,
            "config_entry" => SymbolKind::ConfigEntry,
            _ => return None,
        })
    }
}

/// Function/method/constructor/callback kind (§3 FunctionSignature.kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Function,
    Method,
    Constructor,
    Callback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub r#type: Option<String>,
    pub default_value: Option<String>,
    pub is_optional: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionModifiers {
    pub is_async: bool,
    pub is_static: bool,
    pub is_private: bool,
    pub is_protected: bool,
    pub is_abstract: bool,
    pub is_generator: bool,
    pub is_exported: bool,
    pub callback_context: Option<String>,
}

/// A parsed `@param`/`Args:` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocParam {
    pub name: String,
    pub r#type: Option<String>,
    pub description: String,
}

/// §4.1.4 — the result of parsing a JSDoc block or a Python docstring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentationInfo {
    pub description: Option<String>,
    pub params: Vec<DocParam>,
    pub returns: Option<String>,
    pub throws: Vec<String>,
    pub examples: Vec<String>,
    pub tags: Vec<String>,
}

impl DocumentationInfo {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.params.is_empty()
            && self.returns.is_none()
            && self.throws.is_empty()
            && self.examples.is_empty()
            && self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub id: String,
    pub name: String,
    pub fully_qualified_name: String,
    pub location: Location,
    pub is_exported: bool,
    pub documentation: Option<DocumentationInfo>,

    pub kind: FunctionKind,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub modifiers: FunctionModifiers,
    pub parent_class: Option<String>,
    pub parent_function: Option<String>,
    pub nesting_depth: u32,
    pub local_name: String,
    pub decorators: Vec<String>,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySignature {
    pub id: String,
    pub name: String,
    pub fully_qualified_name: String,
    pub location: Location,
    pub is_exported: bool,
    pub documentation: Option<DocumentationInfo>,

    pub type_annotation: Option<String>,
    pub default_value: Option<String>,
    pub parent_class: Option<String>,
    pub is_static: bool,
    pub is_private: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSignature {
    pub id: String,
    pub name: String,
    pub fully_qualified_name: String,
    pub location: Location,
    pub is_exported: bool,
    pub documentation: Option<DocumentationInfo>,

    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
    pub method_count: u32,
    pub property_count: u32,
    pub constructor_signature: Option<String>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSignature {
    pub id: String,
    pub name: String,
    pub fully_qualified_name: String,
    pub location: Location,
    pub is_exported: bool,
    pub documentation: Option<DocumentationInfo>,

    pub extends: Vec<String>,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasSignature {
    pub id: String,
    pub name: String,
    pub fully_qualified_name: String,
    pub location: Location,
    pub is_exported: bool,
    pub documentation: Option<DocumentationInfo>,

    pub aliased_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSignature {
    pub id: String,
    pub name: String,
    pub fully_qualified_name: String,
    pub location: Location,
    pub is_exported: bool,
    pub documentation: Option<DocumentationInfo>,

    pub type_annotation: Option<String>,
    pub initializer: Option<String>,
    pub is_const: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigValueType {
    String,
    Number,
    Boolean,
    Null,
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntrySignature {
    pub id: String,
    pub name: String,
    pub fully_qualified_name: String,
    pub location: Location,
    pub is_exported: bool,
    pub documentation: Option<DocumentationInfo>,

    /// Dotted path, e.g. `scripts.build`.
    pub path: String,
    pub value_type: ConfigValueType,
    pub stringified_value: String,
    pub raw_value: serde_json::Value,
    pub depth: u32,
    pub parent_path: Option<String>,
    pub format: ConfigFormat,
    pub config_type: Option<String>,
}

/// The closed union of all symbol kinds (§3, §9 "closed tagged unions").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    Function(FunctionSignature),
    Class(ClassSignature),
    Interface(InterfaceSignature),
    TypeAlias(TypeAliasSignature),
    Variable(VariableSignature),
    Property(PropertySignature),
    ConfigEntry(ConfigEntrySignature),
}

impl Symbol {
    pub fn id(&self) -> &str {
        match self {
            Symbol::Function(s) => &s.id,
            Symbol::Class(s) => &s.id,
            Symbol::Interface(s) => &s.id,
            Symbol::TypeAlias(s) => &s.id,
            Symbol::Variable(s) => &s.id,
            Symbol::Property(s) => &s.id,
            Symbol::ConfigEntry(s) => &s.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Function(s) => &s.name,
            Symbol::Class(s) => &s.name,
            Symbol::Interface(s) => &s.name,
            Symbol::TypeAlias(s) => &s.name,
            Symbol::Variable(s) => &s.name,
            Symbol::Property(s) => &s.name,
            Symbol::ConfigEntry(s) => &s.name,
        }
    }

    pub fn fully_qualified_name(&self) -> &str {
        match self {
            Symbol::Function(s) => &s.fully_qualified_name,
            Symbol::Class(s) => &s.fully_qualified_name,
            Symbol::Interface(s) => &s.fully_qualified_name,
            Symbol::TypeAlias(s) => &s.fully_qualified_name,
            Symbol::Variable(s) => &s.fully_qualified_name,
            Symbol::Property(s) => &s.fully_qualified_name,
            Symbol::ConfigEntry(s) => &s.fully_qualified_name,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Class(_) => SymbolKind::Class,
            Symbol::Interface(_) => SymbolKind::Interface,
            Symbol::TypeAlias(_) => SymbolKind::TypeAlias,
            Symbol::Variable(_) => SymbolKind::Variable,
            Symbol::Property(_) => SymbolKind::Property,
            Symbol::ConfigEntry(_) => SymbolKind::ConfigEntry,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Symbol::Function(s) => &s.location,
            Symbol::Class(s) => &s.location,
            Symbol::Interface(s) => &s.location,
            Symbol::TypeAlias(s) => &s.location,
            Symbol::Variable(s) => &s.location,
            Symbol::Property(s) => &s.location,
            Symbol::ConfigEntry(s) => &s.location,
        }
    }

    pub fn is_exported(&self) -> bool {
        match self {
            Symbol::Function(s) => s.is_exported,
            Symbol::Class(s) => s.is_exported,
            Symbol::Interface(s) => s.is_exported,
            Symbol::TypeAlias(s) => s.is_exported,
            Symbol::Variable(s) => s.is_exported,
            Symbol::Property(s) => s.is_exported,
            Symbol::ConfigEntry(s) => s.is_exported,
        }
    }

    pub fn documentation(&self) -> Option<&DocumentationInfo> {
        match self {
            Symbol::Function(s) => s.documentation.as_ref(),
            Symbol::Class(s) => s.documentation.as_ref(),
            Symbol::Interface(s) => s.documentation.as_ref(),
            Symbol::TypeAlias(s) => s.documentation.as_ref(),
            Symbol::Variable(s) => s.documentation.as_ref(),
            Symbol::Property(s) => s.documentation.as_ref(),
            Symbol::ConfigEntry(s) => s.documentation.as_ref(),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSignature> {
        match self {
            Symbol::Function(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassSignature> {
        match self {
            Symbol::Class(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Read,
    Write,
    Call,
    Type,
    Import,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Read => "read",
            ReferenceKind::Write => "write",
            ReferenceKind::Call => "call",
            ReferenceKind::Type => "type",
            ReferenceKind::Import => "import",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "read" => ReferenceKind::Read,
            "write" => ReferenceKind::Write,
            "call" => ReferenceKind::Call,
            "type" => ReferenceKind::Type,
            "import" => ReferenceKind::Import,
            _ => return None,
        })
    }
}

/// §3 SymbolReference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolReference {
    pub id: String,
    /// Empty until resolved by the cross-file resolver pass.
    pub symbol_id: Option<String>,
    pub symbol_name: String,
    pub referencing_file: String,
    pub referencing_symbol_id: Option<String>,
    pub referencing_symbol_name: Option<String>,
    pub line: u32,
    pub column: u32,
    pub context: String,
    pub reference_kind: ReferenceKind,
}

/// §3 CallGraphEdge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallGraphEdge {
    pub id: String,
    pub caller_symbol_id: String,
    pub caller_name: String,
    pub callee_symbol_id: Option<String>,
    pub callee_name: String,
    pub call_count: u32,
    pub is_async: bool,
    pub is_conditional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Extends,
    Implements,
    Mixin,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Extends => "extends",
            RelationshipKind::Implements => "implements",
            RelationshipKind::Mixin => "mixin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "extends" => RelationshipKind::Extends,
            "implements" => RelationshipKind::Implements,
            "mixin" => RelationshipKind::Mixin,
            _ => return None,
        })
    }
}

/// §3 TypeRelationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRelationship {
    pub id: String,
    pub source_symbol_id: String,
    pub source_name: String,
    pub target_symbol_id: Option<String>,
    pub target_name: String,
    pub relationship_kind: RelationshipKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
    pub is_default: bool,
    pub is_namespace: bool,
}

/// §3 ImportInfo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportInfo {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
    pub is_type_only: bool,
    pub file_path: String,
    pub line: u32,
}

/// A named re-export from a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub name: String,
    pub file_path: String,
    pub line: u32,
    pub is_reexport: bool,
    pub reexport_source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Complete,
    Partial,
    Failed,
}

impl ParseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStatus::Complete => "complete",
            ParseStatus::Partial => "partial",
            ParseStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "complete" => ParseStatus::Complete,
            "partial" => ParseStatus::Partial,
            "failed" => ParseStatus::Failed,
            _ => return None,
        })
    }
}

/// §3 FileRecord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub absolute_path: String,
    pub relative_path: String,
    pub language: String,
    pub checksum: String,
    pub line_count: u32,
    pub parse_status: ParseStatus,
    pub parse_warnings: Vec<String>,
    pub summary: String,
}

/// The normalized output of a single `parseFile` call (§4.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub symbols: Vec<Symbol>,
    pub references: Vec<SymbolReference>,
    pub call_edges: Vec<CallGraphEdge>,
    pub type_relationships: Vec<TypeRelationship>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub line_count: u32,
}

impl ParseResult {
    pub fn parse_status(&self) -> ParseStatus {
        if !self.errors.is_empty() {
            ParseStatus::Partial
        } else if !self.warnings.is_empty() {
            ParseStatus::Partial
        } else {
            ParseStatus::Complete
        }
    }
}

/// Arbitrary per-symbol metadata bag serialized into the `metadata` JSON
/// column (mirrors the teacher's `symbols.metadata TEXT` blob in
/// `src/database/schema.rs`), used to round-trip kind-specific fields that
/// don't belong in the shared row shape (parameters, extends lists, ...).
pub type Metadata = HashMap<String, serde_json::Value>;
