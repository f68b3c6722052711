//! TypeScript/TSX extractor (§4.1.1, §4.1.2, §4.1.3, §4.1.4).
//!
//! Ported from the teacher's node-kind switch in
//! `src/extractors/typescript.rs` (itself following Miller's extractor
//! layout), generalized to build the closed `Symbol` union instead of the
//! teacher's flat `Symbol` struct, and extended with qualified names,
//! nesting depth, callback-context tagging, and JSDoc parsing per the
//! module's docs.

use super::base::{ExtractorContext, MAX_NESTING_DEPTH};
use super::{LanguageParser, ParseError};
use crate::model::*;
use std::collections::HashSet;
use tree_sitter::Node;

const CALLBACK_CALLEES: &[&str] = &[
    "describe", "it", "test", "before", "beforeEach", "beforeAll", "after", "afterEach", "afterAll",
    "on", "once", "addEventListener",
];

const REFERENCE_STOPLIST: &[&str] = &[
    "console", "Math", "JSON", "Object", "Array", "Promise", "Error", "undefined", "null", "this", "super",
];

pub struct TypeScriptExtractor {
    tsx: bool,
}

impl TypeScriptExtractor {
    pub fn new(tsx: bool) -> Self {
        Self { tsx }
    }

    fn grammar(&self) -> tree_sitter::Language {
        if self.tsx {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }
    }
}

impl LanguageParser for TypeScriptExtractor {
    fn language(&self) -> &'static str {
        if self.tsx { "tsx" } else { "typescript" }
    }

    fn parse(&self, file_path: &str, content: &str) -> Result<ParseResult, ParseError> {
        run(self.language(), self.grammar(), file_path, content)
    }
}

/// Shared driver for the whole ECMAScript-family grammar set (TS/TSX/JS/JSX):
/// the node-kind switch in `visit` covers the union of what TypeScript and
/// JavaScript grammars produce, and field lookups that don't apply to a
/// given grammar (e.g. `return_type` in plain JS) just come back `None`.
pub(super) fn run(language: &'static str, grammar: tree_sitter::Language, file_path: &str, content: &str) -> Result<ParseResult, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&grammar).map_err(|e| ParseError::Other(e.to_string()))?;
    let tree = parser
        .parse(content, None)
        .ok_or_else(|| ParseError::SyntaxTreeUnavailable(file_path.to_string()))?;

    let mut ctx = ExtractorContext::new(language, file_path, content);
    let mut result = ParseResult {
        line_count: content.lines().count() as u32,
        ..Default::default()
    };

    visit(&mut ctx, tree.root_node(), &mut result, false);
    result.symbols = ctx.symbols;
    aggregate_call_edges(&mut result.call_edges);
    Ok(result)
}

fn is_exported_ancestor(node: &Node) -> bool {
    node.parent().map(|p| p.kind() == "export_statement").unwrap_or(false)
}

fn visit(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult, exported_hint: bool) {
    let exported = exported_hint || is_exported_ancestor(&node);

    match node.kind() {
        "class_declaration" | "abstract_class_declaration" => {
            extract_class(ctx, node, result, exported);
            return;
        }
        "interface_declaration" => {
            extract_interface(ctx, node, result, exported);
        }
        "type_alias_declaration" => {
            extract_type_alias(ctx, node, result, exported);
        }
        "function_declaration" | "generator_function_declaration" => {
            extract_function(ctx, node, result, exported, FunctionKind::Function, None);
            return;
        }
        "lexical_declaration" | "variable_declaration" => {
            extract_variable_declaration(ctx, node, result, exported);
            return;
        }
        "import_statement" => {
            extract_import(ctx, node, result);
        }
        "export_statement" => {
            extract_export(ctx, node, result);
        }
        "call_expression" => {
            extract_call(ctx, node, result);
        }
        "identifier" | "type_identifier" => {
            extract_identifier_reference(ctx, node, result);
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(ctx, child, result, false);
    }
}

fn doc_for(ctx: &ExtractorContext, node: &Node) -> Option<DocumentationInfo> {
    let raw = ctx.leading_comment(node)?;
    if !raw.contains("/**") {
        return None;
    }
    Some(parse_jsdoc(&raw))
}

fn parse_jsdoc(raw: &str) -> DocumentationInfo {
    let mut doc = DocumentationInfo::default();
    let mut description_lines = Vec::new();
    for line in raw.lines() {
        let line = line.trim_start_matches(['*', '/']).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("@param") {
            let rest = rest.trim();
            let (name, description) = rest.split_once(' ').unwrap_or((rest, ""));
            doc.params.push(DocParam {
                name: name.trim_start_matches(['{', '}']).to_string(),
                r#type: None,
                description: description.to_string(),
            });
        } else if let Some(rest) = line.strip_prefix("@returns").or_else(|| line.strip_prefix("@return")) {
            doc.returns = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("@throws") {
            doc.throws.push(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("@example") {
            doc.examples.push(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix('@') {
            doc.tags.push(rest.trim().to_string());
        } else {
            description_lines.push(line.to_string());
        }
    }
    if !description_lines.is_empty() {
        doc.description = Some(description_lines.join(" "));
    }
    doc
}

fn extract_parameters(ctx: &ExtractorContext, node: &Node) -> Vec<Parameter> {
    let Some(params_node) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params_node.walk();
    for child in params_node.children(&mut cursor) {
        match child.kind() {
            "required_parameter" | "optional_parameter" | "identifier" => {
                let name_node = child.child_by_field_name("pattern").unwrap_or(child);
                let name = ctx.node_text(&name_node);
                if name.is_empty() || name == "(" || name == ")" || name == "," {
                    continue;
                }
                out.push(Parameter {
                    name,
                    r#type: ctx.field_text(&child, "type").map(|t| t.trim_start_matches(':').trim().to_string()),
                    default_value: child.child_by_field_name("value").map(|v| ctx.node_text(&v)),
                    is_optional: child.kind() == "optional_parameter",
                    is_rest: false,
                });
            }
            "rest_pattern" => {
                out.push(Parameter {
                    name: ctx.node_text(&child).trim_start_matches("...").to_string(),
                    r#type: None,
                    default_value: None,
                    is_optional: false,
                    is_rest: true,
                });
            }
            _ => {}
        }
    }
    out
}

fn callback_context(ctx: &ExtractorContext, node: &Node) -> Option<String> {
    let parent = node.parent()?;
    if parent.kind() != "arguments" {
        return None;
    }
    let call = parent.parent()?;
    let callee = call.child_by_field_name("function")?;
    let callee_text = ctx.node_text(&callee);
    let leaf = callee_text.rsplit('.').next().unwrap_or(&callee_text);
    if CALLBACK_CALLEES.contains(&leaf) {
        Some(leaf.to_string())
    } else {
        None
    }
}

fn extract_function(
    ctx: &mut ExtractorContext,
    node: Node,
    result: &mut ParseResult,
    exported: bool,
    kind: FunctionKind,
    override_name: Option<String>,
) {
    let name = override_name
        .or_else(|| ctx.field_text(&node, "name"))
        .unwrap_or_else(|| "<anonymous>".to_string());

    let nested = ctx.nesting_depth() > 0;
    if nested && (ctx.nesting_depth() > MAX_NESTING_DEPTH || !ctx.is_significant_nested_function(&node, 3)) {
        ctx.push_parent(name, true);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            visit(ctx, child, result, false);
        }
        ctx.pop_parent();
        return;
    }

    let qualified = ctx.qualified_name(&name);
    let location = ctx.location(&node);
    let is_async = node.children(&mut node.walk()).any(|c| c.kind() == "async");
    let is_generator = node.kind().contains("generator") || ctx.node_text(&node).contains("function*");
    let parameters = extract_parameters(ctx, &node);
    let return_type = ctx.field_text(&node, "return_type").map(|t| t.trim_start_matches(':').trim().to_string());
    let modifiers = FunctionModifiers {
        is_async,
        is_static: false,
        is_private: false,
        is_protected: false,
        is_abstract: false,
        is_generator,
        is_exported: exported,
        callback_context: callback_context(ctx, &node),
    };

    let id = ctx.generate_id(&qualified, SymbolKind::Function, location.start_line);
    let symbol = Symbol::Function(FunctionSignature {
        id,
        name: name.clone(),
        fully_qualified_name: qualified.clone(),
        location,
        is_exported: exported,
        documentation: doc_for(ctx, &node),
        kind,
        parameters,
        return_type,
        modifiers,
        parent_class: ctx.enclosing_class(),
        parent_function: ctx.enclosing_function(),
        nesting_depth: ctx.nesting_depth(),
        local_name: name.clone(),
        decorators: Vec::new(),
        signature: ctx.node_text(&node).lines().next().unwrap_or_default().to_string(),
    });
    ctx.register(symbol);

    ctx.push_parent(name, true);
    if let Some(params_node) = node.child_by_field_name("parameters") {
        let mut cursor = params_node.walk();
        for child in params_node.children(&mut cursor) {
            visit(ctx, child, result, false);
        }
    }
    if let Some(return_type) = node.child_by_field_name("return_type") {
        visit(ctx, return_type, result, false);
    }
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            visit(ctx, child, result, false);
        }
    }
    ctx.pop_parent();
}

fn extract_class(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult, exported: bool) {
    let name = ctx.field_text(&node, "name").unwrap_or_else(|| "<anonymous>".to_string());
    let qualified = ctx.qualified_name(&name);
    let location = ctx.location(&node);

    let mut extends = None;
    let mut implements = Vec::new();
    if let Some(heritage) = node.child_by_field_name("heritage") {
        let mut cursor = heritage.walk();
        for clause in heritage.children(&mut cursor) {
            let text = ctx.node_text(&clause);
            if clause.kind() == "class_heritage" || text.starts_with("extends") {
                if let Some(rest) = text.strip_prefix("extends") {
                    extends = Some(rest.trim().to_string());
                }
            } else if text.starts_with("implements") {
                if let Some(rest) = text.strip_prefix("implements") {
                    implements = rest.split(',').map(|s| s.trim().to_string()).collect();
                }
            }
        }
    }
    let is_abstract = node.kind() == "abstract_class_declaration";

    let id = ctx.generate_id(&qualified, SymbolKind::Class, location.start_line);
    if let Some(base) = &extends {
        push_type_relationship(result, &id, &name, &heritage_name(base), RelationshipKind::Extends);
    }
    for implemented in &implements {
        push_type_relationship(result, &id, &name, &heritage_name(implemented), RelationshipKind::Implements);
    }
    ctx.push_parent(name.clone(), false);

    let mut methods = Vec::new();
    let mut properties = Vec::new();
    let mut constructor_signature = None;

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "method_definition" | "method_signature" => {
                    let m_name = ctx.field_text(&member, "name").unwrap_or_default();
                    if m_name == "constructor" {
                        constructor_signature = Some(ctx.node_text(&member).lines().next().unwrap_or_default().to_string());
                        extract_function(ctx, member, result, false, FunctionKind::Constructor, Some(m_name.clone()));
                    } else {
                        extract_function(ctx, member, result, false, FunctionKind::Method, None);
                    }
                    methods.push(m_name);
                }
                "public_field_definition" | "property_definition" | "property_signature" => {
                    let p_name = ctx.field_text(&member, "name").unwrap_or_default();
                    extract_property(ctx, member, result, &p_name);
                    properties.push(p_name);
                }
                _ => {
                    visit(ctx, member, result, false);
                }
            }
        }
    }
    ctx.pop_parent();

    let method_count = methods.len() as u32;
    let property_count = properties.len() as u32;
    let symbol = Symbol::Class(ClassSignature {
        id,
        name,
        fully_qualified_name: qualified,
        location,
        is_exported: exported,
        documentation: doc_for(ctx, &node),
        extends,
        implements,
        methods,
        properties,
        method_count,
        property_count,
        constructor_signature,
        is_abstract,
    });
    ctx.register(symbol);
}

/// Strips generic arguments (`Base<T>` → `Base`) from a heritage clause so
/// the relationship target matches the plain class/interface name.
fn heritage_name(text: &str) -> String {
    text.split('<').next().unwrap_or(text).trim().to_string()
}

fn push_type_relationship(result: &mut ParseResult, source_id: &str, source_name: &str, target_name: &str, kind: RelationshipKind) {
    if target_name.is_empty() {
        return;
    }
    result.type_relationships.push(TypeRelationship {
        id: crate::id::type_relationship_id(source_id, target_name, kind.as_str()),
        source_symbol_id: source_id.to_string(),
        source_name: source_name.to_string(),
        target_symbol_id: None,
        target_name: target_name.to_string(),
        relationship_kind: kind,
    });
}

fn extract_property(ctx: &mut ExtractorContext, node: Node, _result: &mut ParseResult, name: &str) {
    let qualified = ctx.qualified_name(name);
    let location = ctx.location(&node);
    let is_static = node.children(&mut node.walk()).any(|c| c.kind() == "static");
    let is_private = name.starts_with('#') || node.children(&mut node.walk()).any(|c| c.kind() == "private");
    let id = ctx.generate_id(&qualified, SymbolKind::Property, location.start_line);
    let symbol = Symbol::Property(PropertySignature {
        id,
        name: name.to_string(),
        fully_qualified_name: qualified,
        location,
        is_exported: false,
        documentation: doc_for(ctx, &node),
        type_annotation: ctx.field_text(&node, "type").map(|t| t.trim_start_matches(':').trim().to_string()),
        default_value: node.child_by_field_name("value").map(|v| ctx.node_text(&v)),
        parent_class: ctx.enclosing_class(),
        is_static,
        is_private,
    });
    ctx.register(symbol);
}

fn extract_interface(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult, exported: bool) {
    let name = ctx.field_text(&node, "name").unwrap_or_else(|| "<anonymous>".to_string());
    let qualified = ctx.qualified_name(&name);
    let location = ctx.location(&node);

    let mut extends = Vec::new();
    if let Some(heritage) = node.child_by_field_name("extends") {
        let text = ctx.node_text(&heritage);
        let text = text.strip_prefix("extends").unwrap_or(&text).trim();
        extends.extend(text.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
    }

    let mut methods = Vec::new();
    let mut properties = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "method_signature" => {
                    if let Some(n) = ctx.field_text(&member, "name") {
                        methods.push(n);
                    }
                }
                "property_signature" => {
                    if let Some(n) = ctx.field_text(&member, "name") {
                        properties.push(n);
                    }
                }
                _ => {}
            }
        }
    }

    let id = ctx.generate_id(&qualified, SymbolKind::Interface, location.start_line);
    for base in &extends {
        push_type_relationship(result, &id, &name, &heritage_name(base), RelationshipKind::Extends);
    }
    let symbol = Symbol::Interface(InterfaceSignature {
        id,
        name,
        fully_qualified_name: qualified,
        location,
        is_exported: exported,
        documentation: doc_for(ctx, &node),
        extends,
        methods,
        properties,
    });
    ctx.register(symbol);
}

fn extract_type_alias(ctx: &mut ExtractorContext, node: Node, _result: &mut ParseResult, exported: bool) {
    let name = ctx.field_text(&node, "name").unwrap_or_else(|| "<anonymous>".to_string());
    let qualified = ctx.qualified_name(&name);
    let location = ctx.location(&node);
    let aliased_type = ctx.field_text(&node, "value").unwrap_or_default();

    let id = ctx.generate_id(&qualified, SymbolKind::TypeAlias, location.start_line);
    let symbol = Symbol::TypeAlias(TypeAliasSignature {
        id,
        name,
        fully_qualified_name: qualified,
        location,
        is_exported: exported,
        documentation: doc_for(ctx, &node),
        aliased_type,
    });
    ctx.register(symbol);
}

fn extract_variable_declaration(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult, exported: bool) {
    let is_const = ctx.node_text(&node).trim_start().starts_with("const");
    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else { continue };
        let name = ctx.node_text(&name_node);

        if let Some(value) = declarator.child_by_field_name("value") {
            if matches!(value.kind(), "arrow_function" | "function_expression" | "generator_function") {
                extract_function(ctx, value, result, exported, FunctionKind::Function, Some(name));
                continue;
            }
        }

        let qualified = ctx.qualified_name(&name);
        let location = ctx.location(&declarator);
        let id = ctx.generate_id(&qualified, SymbolKind::Variable, location.start_line);
        let symbol = Symbol::Variable(VariableSignature {
            id,
            name,
            fully_qualified_name: qualified,
            location,
            is_exported: exported,
            documentation: doc_for(ctx, &declarator),
            type_annotation: ctx.field_text(&declarator, "type").map(|t| t.trim_start_matches(':').trim().to_string()),
            initializer: declarator.child_by_field_name("value").map(|v| ctx.node_text(&v)),
            is_const,
        });
        ctx.register(symbol);

        if let Some(type_node) = declarator.child_by_field_name("type") {
            visit(ctx, type_node, result, false);
        }
        if let Some(value) = declarator.child_by_field_name("value") {
            visit(ctx, value, result, false);
        }
    }
}

fn extract_import(ctx: &ExtractorContext, node: Node, result: &mut ParseResult) {
    let Some(source_node) = node.child_by_field_name("source") else { return };
    let source = ctx.node_text(&source_node).trim_matches(['"', '\'', '`']).to_string();
    let is_type_only = ctx.node_text(&node).trim_start().starts_with("import type");
    let mut specifiers = Vec::new();

    if let Some(clause) = node.child_by_field_name("import_clause") {
        let mut cursor = clause.walk();
        for child in clause.children(&mut cursor) {
            match child.kind() {
                "identifier" => specifiers.push(ImportSpecifier {
                    name: ctx.node_text(&child),
                    alias: None,
                    is_default: true,
                    is_namespace: false,
                }),
                "namespace_import" => specifiers.push(ImportSpecifier {
                    name: ctx.node_text(&child),
                    alias: None,
                    is_default: false,
                    is_namespace: true,
                }),
                "named_imports" => {
                    let mut inner = child.walk();
                    for spec in child.children(&mut inner) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let name = ctx.field_text(&spec, "name").unwrap_or_else(|| ctx.node_text(&spec));
                        let alias = ctx.field_text(&spec, "alias");
                        specifiers.push(ImportSpecifier { name, alias, is_default: false, is_namespace: false });
                    }
                }
                _ => {}
            }
        }
    }

    result.imports.push(ImportInfo {
        source,
        specifiers,
        is_type_only,
        file_path: ctx.file_path.clone(),
        line: node.start_position().row as u32 + 1,
    });
}

fn extract_export(ctx: &ExtractorContext, node: Node, result: &mut ParseResult) {
    if let Some(source_node) = node.child_by_field_name("source") {
        let source = ctx.node_text(&source_node).trim_matches(['"', '\'', '`']).to_string();
        result.exports.push(ExportInfo {
            name: "*".to_string(),
            file_path: ctx.file_path.clone(),
            line: node.start_position().row as u32 + 1,
            is_reexport: true,
            reexport_source: Some(source),
        });
        return;
    }
    if let Some(decl) = node.child_by_field_name("declaration") {
        if let Some(name) = ctx.field_text(&decl, "name") {
            result.exports.push(ExportInfo {
                name,
                file_path: ctx.file_path.clone(),
                line: node.start_position().row as u32 + 1,
                is_reexport: false,
                reexport_source: None,
            });
        }
    }
}

fn extract_call(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult) {
    let Some(callee) = node.child_by_field_name("function") else { return };
    let callee_name = ctx.node_text(&callee);
    let leaf_name = callee_name.rsplit('.').next().unwrap_or(&callee_name).to_string();
    if REFERENCE_STOPLIST.contains(&leaf_name.as_str()) {
        return;
    }

    let is_async = node
        .parent()
        .map(|p| p.kind() == "await_expression")
        .unwrap_or(false);
    let is_conditional = has_conditional_ancestor(node);
    let pos = node.start_position();

    let reference_id = crate::id::reference_id(&ctx.file_path, &leaf_name, pos.row as u32 + 1, pos.column as u32);
    result.references.push(SymbolReference {
        id: reference_id,
        symbol_id: None,
        symbol_name: leaf_name.clone(),
        referencing_file: ctx.file_path.clone(),
        referencing_symbol_id: ctx.enclosing_function().map(|n| ctx.qualified_name(&n)),
        referencing_symbol_name: ctx.enclosing_function(),
        line: pos.row as u32 + 1,
        column: pos.column as u32,
        context: crate::utils::text::context_snippet(&ctx.content, node.start_byte(), 40),
        reference_kind: ReferenceKind::Call,
    });

    let caller_name = ctx.enclosing_function().unwrap_or_else(|| "<module>".to_string());
    let caller_qualified = ctx.qualified_name(&caller_name);
    let caller_id = if ctx.enclosing_function().is_some() {
        ctx.symbol_map.values().find(|s| s.fully_qualified_name() == caller_qualified).map(|s| s.id().to_string())
    } else {
        None
    };
    if let Some(caller_id) = caller_id {
        result.call_edges.push(CallGraphEdge {
            id: crate::id::call_edge_id(&caller_id, &leaf_name),
            caller_symbol_id: caller_id,
            caller_name,
            callee_symbol_id: None,
            callee_name: leaf_name,
            call_count: 1,
            is_async,
            is_conditional,
        });
    }
}

/// §4.1.3: classifies a non-definition identifier occurrence into the
/// `read`/`write`/`type`/`import` kinds spec.md:102 defines. `call`
/// references are emitted separately by `extract_call`.
fn classify_reference_kind(node: &Node) -> ReferenceKind {
    if node.kind() == "type_identifier" {
        return ReferenceKind::Type;
    }
    if is_inside_import_statement(node) {
        return ReferenceKind::Import;
    }
    if let Some(parent) = node.parent() {
        if parent.kind() == "assignment_expression" && parent.child_by_field_name("left").is_some_and(|n| n.id() == node.id()) {
            return ReferenceKind::Write;
        }
    }
    ReferenceKind::Read
}

fn is_inside_import_statement(node: &Node) -> bool {
    let mut cursor = node.parent();
    while let Some(n) = cursor {
        if n.kind() == "import_statement" {
            return true;
        }
        cursor = n.parent();
    }
    false
}

/// True when `node` names a declaration site (the function/class/variable/
/// parameter being *defined*) rather than a use. Import bindings aren't
/// definitions here; they get an `import`-kind reference instead.
fn is_definition_identifier(node: &Node) -> bool {
    let Some(parent) = node.parent() else { return false };
    let is_name_field = |kind: &str| {
        parent.kind() == kind && parent.child_by_field_name("name").is_some_and(|n| n.id() == node.id())
    };
    if is_name_field("function_declaration")
        || is_name_field("generator_function_declaration")
        || is_name_field("method_definition")
        || is_name_field("method_signature")
        || is_name_field("class_declaration")
        || is_name_field("abstract_class_declaration")
        || is_name_field("interface_declaration")
        || is_name_field("type_alias_declaration")
        || is_name_field("variable_declarator")
        || is_name_field("public_field_definition")
        || is_name_field("property_definition")
        || is_name_field("property_signature")
    {
        return true;
    }
    match parent.kind() {
        "required_parameter" | "optional_parameter" => {
            parent.child_by_field_name("pattern").is_some_and(|n| n.id() == node.id())
        }
        "formal_parameters" => true,
        _ => false,
    }
}

/// §4.1.3: every identifier in a non-definition position gets a
/// `SymbolReference` — this is the generic counterpart to `extract_call`,
/// which already covers callee positions.
fn extract_identifier_reference(ctx: &ExtractorContext, node: Node, result: &mut ParseResult) {
    let name = ctx.node_text(&node);
    if name.len() < 2 || REFERENCE_STOPLIST.contains(&name.as_str()) {
        return;
    }
    if node.kind() == "identifier" && is_definition_identifier(&node) {
        return;
    }
    if let Some(parent) = node.parent() {
        if parent.kind() == "call_expression" && parent.child_by_field_name("function").is_some_and(|n| n.id() == node.id()) {
            return;
        }
    }

    let kind = classify_reference_kind(&node);
    let pos = node.start_position();
    let reference_id = crate::id::reference_id(&ctx.file_path, &name, pos.row as u32 + 1, pos.column as u32);
    result.references.push(SymbolReference {
        id: reference_id,
        symbol_id: None,
        symbol_name: name,
        referencing_file: ctx.file_path.clone(),
        referencing_symbol_id: ctx.enclosing_function().map(|n| ctx.qualified_name(&n)),
        referencing_symbol_name: ctx.enclosing_function(),
        line: pos.row as u32 + 1,
        column: pos.column as u32,
        context: crate::utils::text::context_snippet(&ctx.content, node.start_byte(), 40),
        reference_kind: kind,
    });
}

fn has_conditional_ancestor(node: Node) -> bool {
    let mut cursor = node.parent();
    let mut depth = 0;
    while let Some(n) = cursor {
        if matches!(n.kind(), "if_statement" | "ternary_expression" | "switch_case") {
            return true;
        }
        if matches!(n.kind(), "function_declaration" | "method_definition" | "arrow_function") {
            return false;
        }
        cursor = n.parent();
        depth += 1;
        if depth > 64 {
            break;
        }
    }
    false
}

#[allow(dead_code)]
fn unique(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

/// Collapse repeated calls from the same caller to the same callee name into
/// a single edge with an incremented `call_count`, per §3 CallGraphEdge.
pub(super) fn aggregate_call_edges(edges: &mut Vec<CallGraphEdge>) {
    let mut merged: Vec<CallGraphEdge> = Vec::new();
    for edge in edges.drain(..) {
        if let Some(existing) = merged
            .iter_mut()
            .find(|e| e.caller_symbol_id == edge.caller_symbol_id && e.callee_name == edge.callee_name)
        {
            existing.call_count += 1;
            existing.is_async = existing.is_async || edge.is_async;
            existing.is_conditional = existing.is_conditional && edge.is_conditional;
        } else {
            merged.push(edge);
        }
    }
    *edges = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_extends_emits_a_type_relationship() {
        let extractor = TypeScriptExtractor::new(false);
        let result = extractor
            .parse("shapes.ts", "export class Shape {}\nexport class Circle extends Shape {}\n")
            .unwrap();
        let rel = result
            .type_relationships
            .iter()
            .find(|r| r.source_name == "Circle")
            .expect("extends relationship recorded for Circle");
        assert_eq!(rel.relationship_kind, RelationshipKind::Extends);
        assert_eq!(rel.target_name, "Shape");
        assert!(rel.target_symbol_id.is_none());
    }

    #[test]
    fn interface_extends_multiple_bases() {
        let extractor = TypeScriptExtractor::new(false);
        let result = extractor
            .parse("io.ts", "export interface Readable {}\nexport interface Writable {}\nexport interface ReadWrite extends Readable, Writable {}\n")
            .unwrap();
        let targets: Vec<&str> = result
            .type_relationships
            .iter()
            .filter(|r| r.source_name == "ReadWrite")
            .map(|r| r.target_name.as_str())
            .collect();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&"Readable"));
        assert!(targets.contains(&"Writable"));
    }
}
