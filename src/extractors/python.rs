//! Python extractor (§4.1.1-§4.1.4).
//!
//! Ported from the teacher's `traverse_tree` switch in
//! `src/extractors/python.rs`, rebuilt against the closed `Symbol` union and
//! extended with Google/NumPy-style docstring parsing, the single-underscore
//! privacy heuristic, and mixin detection for classes with more than one
//! base (§4.1.2/§4.1.3).

use super::base::{ExtractorContext, MAX_NESTING_DEPTH};
use super::{LanguageParser, ParseError};
use crate::model::*;
use tree_sitter::Node;

const REFERENCE_STOPLIST: &[&str] = &["print", "len", "str", "int", "float", "bool", "dict", "list", "self", "super"];

pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for PythonExtractor {
    fn language(&self) -> &'static str {
        "python"
    }

    fn parse(&self, file_path: &str, content: &str) -> Result<ParseResult, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::Other(e.to_string()))?;
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ParseError::SyntaxTreeUnavailable(file_path.to_string()))?;

        let mut ctx = ExtractorContext::new("python", file_path, content);
        let mut result = ParseResult {
            line_count: content.lines().count() as u32,
            ..Default::default()
        };

        visit(&mut ctx, tree.root_node(), &mut result);
        result.symbols = ctx.symbols;
        super::typescript::aggregate_call_edges(&mut result.call_edges);
        Ok(result)
    }
}

fn is_private(name: &str) -> bool {
    name.starts_with('_') && !name.starts_with("__")
}

fn visit(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult) {
    match node.kind() {
        "class_definition" => {
            extract_class(ctx, node, result);
            return;
        }
        "function_definition" => {
            extract_function(ctx, node, result, FunctionKind::Function);
            return;
        }
        "assignment" => {
            extract_assignment(ctx, node, result);
        }
        "import_statement" | "import_from_statement" => {
            extract_import(ctx, node, result);
        }
        "call" => {
            extract_call(ctx, node, result);
        }
        "identifier" => {
            extract_identifier_reference(ctx, node, result);
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(ctx, child, result);
    }
}

fn parse_docstring(raw: &str) -> DocumentationInfo {
    let mut doc = DocumentationInfo::default();
    let mut lines = raw.lines().map(str::trim);
    let mut description_lines = Vec::new();
    let mut section: Option<&str> = None;

    for line in lines.by_ref() {
        let header = line.trim_end_matches(':');
        if matches!(header, "Args" | "Parameters") {
            section = Some("params");
            continue;
        } else if matches!(header, "Returns" | "Yields") {
            section = Some("returns");
            continue;
        } else if matches!(header, "Raises" | "Throws") {
            section = Some("throws");
            continue;
        } else if matches!(header, "Examples" | "Example") {
            section = Some("examples");
            continue;
        }
        if line.is_empty() {
            continue;
        }
        match section {
            Some("params") => {
                if let Some((name, description)) = line.split_once(':') {
                    let (name, r#type) = match name.trim().split_once('(') {
                        Some((n, t)) => (n.trim().to_string(), Some(t.trim_end_matches(')').to_string())),
                        None => (name.trim().to_string(), None),
                    };
                    doc.params.push(DocParam { name, r#type, description: description.trim().to_string() });
                }
            }
            Some("returns") => doc.returns = Some(line.to_string()),
            Some("throws") => doc.throws.push(line.to_string()),
            Some("examples") => doc.examples.push(line.to_string()),
            _ => description_lines.push(line.to_string()),
        }
    }
    if !description_lines.is_empty() {
        doc.description = Some(description_lines.join(" "));
    }
    doc
}

fn doc_for_body(ctx: &ExtractorContext, node: &Node) -> Option<DocumentationInfo> {
    let body = node.child_by_field_name("body")?;
    let raw = ctx.leading_docstring(&body)?;
    Some(parse_docstring(&raw))
}

fn extract_parameters(ctx: &ExtractorContext, node: &Node) -> Vec<Parameter> {
    let Some(params_node) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params_node.walk();
    for child in params_node.children(&mut cursor) {
        match child.kind() {
            "identifier" => out.push(Parameter {
                name: ctx.node_text(&child),
                r#type: None,
                default_value: None,
                is_optional: false,
                is_rest: false,
            }),
            "typed_parameter" => {
                let name = child.child(0).map(|n| ctx.node_text(&n)).unwrap_or_default();
                out.push(Parameter {
                    name,
                    r#type: ctx.field_text(&child, "type"),
                    default_value: None,
                    is_optional: false,
                    is_rest: false,
                });
            }
            "default_parameter" | "typed_default_parameter" => {
                let name = ctx.field_text(&child, "name").unwrap_or_default();
                out.push(Parameter {
                    name,
                    r#type: ctx.field_text(&child, "type"),
                    default_value: ctx.field_text(&child, "value"),
                    is_optional: true,
                    is_rest: false,
                });
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => out.push(Parameter {
                name: ctx.node_text(&child).trim_start_matches(['*']).to_string(),
                r#type: None,
                default_value: None,
                is_optional: false,
                is_rest: true,
            }),
            _ => {}
        }
    }
    out.retain(|p| p.name != "self" && p.name != "cls");
    out
}

fn extract_function(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult, mut kind: FunctionKind) {
    let name = ctx.field_text(&node, "name").unwrap_or_else(|| "<lambda>".to_string());

    if ctx.nesting_depth() > 0 && (ctx.nesting_depth() > MAX_NESTING_DEPTH || !ctx.is_significant_nested_function(&node, 3)) {
        ctx.push_parent(name, true);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            visit(ctx, child, result);
        }
        ctx.pop_parent();
        return;
    }

    if name == "__init__" && ctx.enclosing_class().is_some() {
        kind = FunctionKind::Constructor;
    } else if ctx.enclosing_class().is_some() && kind == FunctionKind::Function {
        kind = FunctionKind::Method;
    }

    let qualified = ctx.qualified_name(&name);
    let location = ctx.location(&node);
    let is_async = node
        .parent()
        .map(|p| p.kind() == "async_function_definition" || ctx.node_text(&p).trim_start().starts_with("async"))
        .unwrap_or(false)
        || ctx.node_text(&node).trim_start().starts_with("async");
    let body_text = node.child_by_field_name("body").map(|b| ctx.node_text(&b)).unwrap_or_default();
    let is_generator = body_text.contains("yield");

    let decorators = leading_decorators(ctx, &node);
    let is_static = decorators.iter().any(|d| d == "staticmethod");
    let is_abstract = decorators.iter().any(|d| d == "abstractmethod");

    let parameters = extract_parameters(ctx, &node);
    let return_type = ctx.field_text(&node, "return_type");

    let modifiers = FunctionModifiers {
        is_async,
        is_static,
        is_private: is_private(&name),
        is_protected: false,
        is_abstract,
        is_generator,
        is_exported: !is_private(&name),
        callback_context: None,
    };

    let id = ctx.generate_id(&qualified, SymbolKind::Function, location.start_line);
    let symbol = Symbol::Function(FunctionSignature {
        id,
        name: name.clone(),
        fully_qualified_name: qualified.clone(),
        location,
        is_exported: modifiers.is_exported,
        documentation: doc_for_body(ctx, &node),
        kind,
        parameters,
        return_type,
        modifiers,
        parent_class: ctx.enclosing_class(),
        parent_function: ctx.enclosing_function(),
        nesting_depth: ctx.nesting_depth(),
        local_name: name.clone(),
        decorators,
        signature: ctx.node_text(&node).lines().next().unwrap_or_default().to_string(),
    });
    ctx.register(symbol);

    ctx.push_parent(name, true);
    if let Some(params_node) = node.child_by_field_name("parameters") {
        let mut cursor = params_node.walk();
        for child in params_node.children(&mut cursor) {
            visit(ctx, child, result);
        }
    }
    if let Some(return_type) = node.child_by_field_name("return_type") {
        visit(ctx, return_type, result);
    }
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            visit(ctx, child, result);
        }
    }
    ctx.pop_parent();
}

fn leading_decorators(ctx: &ExtractorContext, node: &Node) -> Vec<String> {
    let Some(parent) = node.parent() else { return Vec::new() };
    if parent.kind() != "decorated_definition" {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cursor = parent.walk();
    for child in parent.children(&mut cursor) {
        if child.kind() == "decorator" {
            let text = ctx.node_text(&child);
            out.push(text.trim_start_matches('@').split('(').next().unwrap_or("").trim().to_string());
        }
    }
    out
}

fn extract_class(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult) {
    let name = ctx.field_text(&node, "name").unwrap_or_else(|| "<anonymous>".to_string());
    let qualified = ctx.qualified_name(&name);
    let location = ctx.location(&node);

    let mut bases = Vec::new();
    if let Some(args) = node.child_by_field_name("superclasses") {
        let mut cursor = args.walk();
        for child in args.children(&mut cursor) {
            if matches!(child.kind(), "identifier" | "attribute") {
                bases.push(ctx.node_text(&child));
            }
        }
    }
    let extends = bases.first().cloned();
    let implements: Vec<String> = bases.iter().skip(1).cloned().collect();
    let is_abstract = bases.iter().any(|b| b == "ABC" || b.ends_with(".ABC") || b == "ABCMeta" || b.ends_with(".ABCMeta"));

    let id = ctx.generate_id(&qualified, SymbolKind::Class, location.start_line);
    if let Some(base) = &extends {
        push_type_relationship(result, &id, &name, base, RelationshipKind::Extends);
    }
    for mixin in &implements {
        push_type_relationship(result, &id, &name, mixin, RelationshipKind::Mixin);
    }
    ctx.push_parent(name.clone(), false);

    let mut methods = Vec::new();
    let mut properties = Vec::new();
    let mut constructor_signature = None;

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            let target = if member.kind() == "decorated_definition" {
                member.child_by_field_name("definition").unwrap_or(member)
            } else {
                member
            };
            match target.kind() {
                "function_definition" => {
                    let m_name = ctx.field_text(&target, "name").unwrap_or_default();
                    if m_name == "__init__" {
                        constructor_signature = Some(ctx.node_text(&target).lines().next().unwrap_or_default().to_string());
                    }
                    extract_function(ctx, target, result, FunctionKind::Method);
                    methods.push(m_name);
                }
                "expression_statement" => {
                    if let Some(assign) = target.child(0) {
                        if assign.kind() == "assignment" {
                            if let Some(name_node) = assign.child_by_field_name("left") {
                                properties.push(ctx.node_text(&name_node));
                            }
                        }
                    }
                }
                _ => visit(ctx, member, result),
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
        is_exported: true,
        documentation: doc_for_body(ctx, &node),
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

fn extract_assignment(ctx: &mut ExtractorContext, node: Node, _result: &mut ParseResult) {
    // Only module-level assignments become `VariableSignature`s; nested-function
    // locals and class-body attributes are excluded (the former are noise, the
    // latter belong to `ClassSignature.properties` instead).
    if ctx.nesting_depth() > 0 || ctx.enclosing_class().is_some() {
        return;
    }
    let Some(left) = node.child_by_field_name("left") else { return };
    if left.kind() != "identifier" {
        return;
    }
    let name = ctx.node_text(&left);
    let qualified = ctx.qualified_name(&name);
    let location = ctx.location(&node);
    let id = ctx.generate_id(&qualified, SymbolKind::Variable, location.start_line);
    let symbol = Symbol::Variable(VariableSignature {
        id,
        name: name.clone(),
        fully_qualified_name: qualified,
        location,
        is_exported: !is_private(&name),
        documentation: None,
        type_annotation: ctx.field_text(&node, "type"),
        initializer: node.child_by_field_name("right").map(|v| ctx.node_text(&v)),
        is_const: name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_numeric()),
    });
    ctx.register(symbol);
}

fn extract_import(ctx: &ExtractorContext, node: Node, result: &mut ParseResult) {
    let line = node.start_position().row as u32 + 1;
    if node.kind() == "import_from_statement" {
        let source = ctx.field_text(&node, "module_name").unwrap_or_default();
        let mut specifiers = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "dotted_name" && ctx.node_text(&child) != source {
                specifiers.push(ImportSpecifier { name: ctx.node_text(&child), alias: None, is_default: false, is_namespace: false });
            } else if child.kind() == "aliased_import" {
                let name = child.child_by_field_name("name").map(|n| ctx.node_text(&n)).unwrap_or_default();
                let alias = child.child_by_field_name("alias").map(|n| ctx.node_text(&n));
                specifiers.push(ImportSpecifier { name, alias, is_default: false, is_namespace: false });
            }
        }
        result.imports.push(ImportInfo { source, specifiers, is_type_only: false, file_path: ctx.file_path.clone(), line });
    } else {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "dotted_name" | "aliased_import") {
                let source = ctx.node_text(&child);
                result.imports.push(ImportInfo {
                    source,
                    specifiers: Vec::new(),
                    is_type_only: false,
                    file_path: ctx.file_path.clone(),
                    line,
                });
            }
        }
    }
}

fn extract_call(ctx: &mut ExtractorContext, node: Node, result: &mut ParseResult) {
    let Some(function) = node.child_by_field_name("function") else { return };
    let callee_text = ctx.node_text(&function);
    let leaf_name = callee_text.rsplit('.').next().unwrap_or(&callee_text).to_string();
    if REFERENCE_STOPLIST.contains(&leaf_name.as_str()) {
        return;
    }

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

    if let Some(caller_name) = ctx.enclosing_function() {
        let caller_qualified = ctx.qualified_name(&caller_name);
        if let Some(caller_id) = ctx.symbol_map.values().find(|s| s.fully_qualified_name() == caller_qualified).map(|s| s.id().to_string()) {
            result.call_edges.push(CallGraphEdge {
                id: crate::id::call_edge_id(&caller_id, &leaf_name),
                caller_symbol_id: caller_id,
                caller_name,
                callee_symbol_id: None,
                callee_name: leaf_name,
                call_count: 1,
                is_async: false,
                is_conditional: has_conditional_ancestor(node),
            });
        }
    }
}

/// §4.1.3: classifies a non-definition identifier occurrence into the
/// `read`/`write`/`type`/`import` kinds spec.md:102 defines. `call`
/// references are emitted separately by `extract_call`.
fn classify_reference_kind(node: &Node) -> ReferenceKind {
    if is_inside_import_statement(node) {
        return ReferenceKind::Import;
    }
    if is_inside_type_annotation(node) {
        return ReferenceKind::Type;
    }
    if let Some(parent) = node.parent() {
        if parent.kind() == "assignment" && parent.child_by_field_name("left").is_some_and(|n| n.id() == node.id()) {
            return ReferenceKind::Write;
        }
    }
    ReferenceKind::Read
}

fn is_inside_import_statement(node: &Node) -> bool {
    let mut cursor = node.parent();
    while let Some(n) = cursor {
        if matches!(n.kind(), "import_statement" | "import_from_statement") {
            return true;
        }
        cursor = n.parent();
    }
    false
}

/// Walks ancestors looking for a `type`/`return_type` field edge, so nested
/// annotations like `List[int]` classify both `List` and `int` as `type`.
fn is_inside_type_annotation(node: &Node) -> bool {
    let mut current = *node;
    while let Some(parent) = current.parent() {
        if parent.child_by_field_name("type").is_some_and(|t| t.id() == current.id())
            || parent.child_by_field_name("return_type").is_some_and(|t| t.id() == current.id())
        {
            return true;
        }
        current = parent;
    }
    false
}

/// True when `node` names a declaration site (a function/class name or a
/// parameter binding) rather than a use. Assignment targets are not
/// definitions here — they get a `write`-kind reference instead.
fn is_definition_identifier(node: &Node) -> bool {
    let Some(parent) = node.parent() else { return false };
    let is_name_field = |kind: &str| {
        parent.kind() == kind && parent.child_by_field_name("name").is_some_and(|n| n.id() == node.id())
    };
    if is_name_field("function_definition") || is_name_field("class_definition") {
        return true;
    }
    match parent.kind() {
        "parameters" | "list_splat_pattern" | "dictionary_splat_pattern" => true,
        "typed_parameter" => parent.child(0).is_some_and(|n| n.id() == node.id()),
        "default_parameter" | "typed_default_parameter" => {
            parent.child_by_field_name("name").is_some_and(|n| n.id() == node.id())
        }
        _ => false,
    }
}

/// §4.1.3: every identifier in a non-definition position gets a
/// `SymbolReference` — the generic counterpart to `extract_call`, which
/// already covers callee positions.
fn extract_identifier_reference(ctx: &ExtractorContext, node: Node, result: &mut ParseResult) {
    let name = ctx.node_text(&node);
    if name.len() < 2 || REFERENCE_STOPLIST.contains(&name.as_str()) {
        return;
    }
    if is_definition_identifier(&node) {
        return;
    }
    if let Some(parent) = node.parent() {
        if parent.kind() == "call" && parent.child_by_field_name("function").is_some_and(|n| n.id() == node.id()) {
            return;
        }
        if parent.kind() == "attribute" && parent.child_by_field_name("attribute").is_some_and(|n| n.id() == node.id()) {
            if let Some(grandparent) = parent.parent() {
                if grandparent.kind() == "call" && grandparent.child_by_field_name("function").is_some_and(|n| n.id() == parent.id()) {
                    return;
                }
            }
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
        if matches!(n.kind(), "if_statement" | "conditional_expression") {
            return true;
        }
        if n.kind() == "function_definition" {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_bases_emit_extends_and_mixin_relationships() {
        let extractor = PythonExtractor::new();
        let result = extractor
            .parse(
                "shapes.py",
                "class Base:\n    pass\n\nclass Mixable:\n    pass\n\nclass Shape(Base, Mixable):\n    pass\n",
            )
            .unwrap();
        let extends = result
            .type_relationships
            .iter()
            .find(|r| r.source_name == "Shape" && r.relationship_kind == RelationshipKind::Extends)
            .expect("extends relationship for Shape");
        assert_eq!(extends.target_name, "Base");

        let mixin = result
            .type_relationships
            .iter()
            .find(|r| r.source_name == "Shape" && r.relationship_kind == RelationshipKind::Mixin)
            .expect("mixin relationship for Shape");
        assert_eq!(mixin.target_name, "Mixable");
    }

    #[test]
    fn abc_base_marks_class_abstract() {
        let extractor = PythonExtractor::new();
        let result = extractor.parse("iface.py", "from abc import ABC\nclass Base(ABC):\n    pass\n").unwrap();
        let class = result
            .symbols
            .iter()
            .find_map(|s| match s {
                Symbol::Class(c) if c.name == "Base" => Some(c),
                _ => None,
            })
            .expect("Base class extracted");
        assert!(class.is_abstract);
    }
}
