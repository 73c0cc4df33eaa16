//! TypeScript front-end using tree-sitter
//!
//! Lowers type annotations into the engine's type-expression arena and
//! extracts the declarations the engine judges: type aliases (including
//! static-of exemption aliases), interfaces, and variable declarations
//! that construct runtime validators.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::ast::{
    Declaration, Member, NodeId, ParsedFile, Span, TupleElement, TypeExprArena, TypeExprKind,
    ValidatorCall,
};
use crate::engine::validators::is_validator_builder;
use crate::parsers::ParseError;

/// Type-level marker extracting a validator's inferred static type
const STATIC_MARKER: &str = "Static";

/// Wrapper allowed once around the static-of marker
const READONLY_WRAPPER: &str = "Readonly";

const PRIMITIVE_NAMES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "null",
    "undefined",
    "void",
    "symbol",
    "bigint",
];

const SHORT_CIRCUIT_NAMES: &[&str] = &["never", "unknown", "any"];

/// Parse a TypeScript/TSX file into the engine's input model.
pub fn parse(path: &Path) -> Result<ParsedFile, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("ts");
    parse_source(&source, ext).ok_or_else(|| ParseError::Parse(path.to_path_buf()))
}

/// Parse source text directly. Returns `None` when the grammar cannot
/// be loaded or the parser produces no tree.
pub fn parse_source(source: &str, ext: &str) -> Option<ParsedFile> {
    let mut parser = Parser::new();
    let language: Language = match ext {
        "tsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
        _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    };
    parser.set_language(&language).ok()?;

    let tree = parser.parse(source, None)?;
    let root = tree.root_node();
    let bytes = source.as_bytes();

    let mut file = ParsedFile::default();
    collect_declarations(root, bytes, &mut file);
    Some(file)
}

fn span_of(node: Node) -> Span {
    Span::new(
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

fn text_of(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().to_string()
}

/// Walk top-level statements (unwrapping `export`) and collect the
/// declarations the engine judges, in source order.
fn collect_declarations(root: Node, source: &[u8], file: &mut ParsedFile) {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let node = if child.kind() == "export_statement" {
            match child.child_by_field_name("declaration") {
                Some(declaration) => declaration,
                None => continue,
            }
        } else {
            child
        };

        match node.kind() {
            "type_alias_declaration" => {
                if let Some(declaration) = lower_type_alias(node, source, &mut file.arena) {
                    file.declarations.push(declaration);
                }
            }
            "interface_declaration" => {
                if let Some(declaration) = lower_interface(node, source, &mut file.arena) {
                    file.declarations.push(declaration);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut declarators = node.walk();
                for declarator in node.named_children(&mut declarators) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(declaration) = lower_validator_declarator(declarator, source) {
                        file.declarations.push(declaration);
                    }
                }
            }
            _ => {}
        }
    }
}

fn lower_type_alias(node: Node, source: &[u8], arena: &mut TypeExprArena) -> Option<Declaration> {
    let name = text_of(node.child_by_field_name("name")?, source);
    let value = node.child_by_field_name("value")?;
    let static_of = static_of_target(value, source);
    // the alias body is only lowered when the engine will score it
    let ty = if static_of.is_some() {
        arena.alloc(TypeExprKind::Other, span_of(value))
    } else {
        lower_type(value, source, arena)
    };
    Some(Declaration::TypeAlias {
        name,
        ty,
        static_of,
        span: span_of(node),
    })
}

fn lower_interface(node: Node, source: &[u8], arena: &mut TypeExprArena) -> Option<Declaration> {
    let name = text_of(node.child_by_field_name("name")?, source);
    let body = node.child_by_field_name("body")?;

    let mut extends_count = 0;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "extends_type_clause" {
            extends_count += child.named_child_count();
        }
    }

    let members = lower_members(body, source, arena);
    let ty = arena.alloc(
        TypeExprKind::Interface {
            extends_count,
            members,
        },
        span_of(node),
    );
    Some(Declaration::Interface {
        name,
        ty,
        span: span_of(node),
    })
}

/// Detect `const isFoo = strictInterface({...})` style declarations.
/// The callee is matched structurally against the known builder names;
/// no type-checking is involved.
fn lower_validator_declarator(declarator: Node, source: &[u8]) -> Option<Declaration> {
    let name_node = declarator.child_by_field_name("name")?;
    if name_node.kind() != "identifier" {
        return None;
    }
    let value = declarator.child_by_field_name("value")?;
    let call = validator_call(value, source)?;
    Some(Declaration::ValidatorConstruction {
        name: text_of(name_node, source),
        call,
        has_type_annotation: declarator.child_by_field_name("type").is_some(),
        span: span_of(declarator),
    })
}

/// Extract the outermost validator-construction call, if any.
fn validator_call(value: Node, source: &[u8]) -> Option<ValidatorCall> {
    if value.kind() != "call_expression" {
        return None;
    }
    let callee_node = value.child_by_field_name("function")?;
    let callee = match callee_node.kind() {
        "identifier" => text_of(callee_node, source),
        // `t.interface(...)` counts by its trailing property name
        "member_expression" => text_of(callee_node.child_by_field_name("property")?, source),
        _ => return None,
    };
    if !is_validator_builder(&callee) {
        return None;
    }

    let arguments = value.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let named: Vec<Node> = arguments.named_children(&mut cursor).collect();
    let property_count = named
        .first()
        .filter(|n| n.kind() == "object")
        .map(|n| n.named_child_count())
        .unwrap_or(0);

    Some(ValidatorCall {
        callee,
        argument_count: named.len(),
        property_count,
    })
}

/// Match `Static<typeof name>`, optionally wrapped once in
/// `Readonly<...>`, and return the referenced validator name.
fn static_of_target(value: Node, source: &[u8]) -> Option<String> {
    let mut node = value;
    if let Some((name, args)) = generic_parts(node, source) {
        if name == READONLY_WRAPPER && args.len() == 1 {
            node = args[0];
        }
    }
    let (name, args) = generic_parts(node, source)?;
    if name != STATIC_MARKER || args.len() != 1 {
        return None;
    }
    let query = args[0];
    if query.kind() != "type_query" {
        return None;
    }
    let target = query.named_child(0)?;
    if target.kind() != "identifier" {
        return None;
    }
    Some(text_of(target, source))
}

fn generic_parts<'t>(node: Node<'t>, source: &[u8]) -> Option<(String, Vec<Node<'t>>)> {
    if node.kind() != "generic_type" {
        return None;
    }
    let name = text_of(node.child_by_field_name("name")?, source);
    let arguments = node.child_by_field_name("type_arguments")?;
    let mut cursor = arguments.walk();
    let args = arguments.named_children(&mut cursor).collect();
    Some((name, args))
}

/// Lower the members of an interface body or object type.
fn lower_members(body: Node, source: &[u8], arena: &mut TypeExprArena) -> Vec<Member> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "property_signature" => {
                let name = member
                    .child_by_field_name("name")
                    .map(|n| text_of(n, source))
                    .unwrap_or_default();
                let ty = member
                    .child_by_field_name("type")
                    .and_then(|a| annotated_type(a))
                    .map(|t| lower_type(t, source, arena));
                members.push(Member { name, ty });
            }
            "method_signature" | "call_signature" | "construct_signature" => {
                let name = member
                    .child_by_field_name("name")
                    .map(|n| text_of(n, source))
                    .unwrap_or_else(|| "()".to_string());
                let ty = lower_callable(member, source, arena);
                members.push(Member { name, ty: Some(ty) });
            }
            "index_signature" => {
                let ty = member
                    .child_by_field_name("type")
                    .and_then(|a| annotated_type(a))
                    .map(|t| lower_type(t, source, arena));
                members.push(Member {
                    name: "[index]".to_string(),
                    ty,
                });
            }
            _ => {}
        }
    }
    members
}

/// The type inside a `: T` annotation node.
fn annotated_type(annotation: Node) -> Option<Node> {
    annotation.named_child(0)
}

/// Lower a function type, method signature, or call signature.
fn lower_callable(node: Node, source: &[u8], arena: &mut TypeExprArena) -> NodeId {
    let mut params = Vec::new();
    if let Some(parameters) = node.child_by_field_name("parameters") {
        let mut cursor = parameters.walk();
        for parameter in parameters.named_children(&mut cursor) {
            if let Some(ty) = parameter
                .child_by_field_name("type")
                .and_then(|a| annotated_type(a))
            {
                params.push(lower_type(ty, source, arena));
            }
        }
    }
    let ret = node
        .child_by_field_name("return_type")
        .and_then(|r| {
            if r.kind() == "type_annotation" {
                annotated_type(r)
            } else {
                Some(r)
            }
        })
        .map(|t| lower_type(t, source, arena));
    arena.alloc(TypeExprKind::Function { params, ret }, span_of(node))
}

/// Recursively lower a type expression into the arena. Anything the
/// front-end does not recognize becomes [`TypeExprKind::Other`].
fn lower_type(node: Node, source: &[u8], arena: &mut TypeExprArena) -> NodeId {
    let span = span_of(node);
    match node.kind() {
        "predefined_type" | "type_identifier" => {
            let text = text_of(node, source);
            if SHORT_CIRCUIT_NAMES.contains(&text.as_str()) {
                arena.alloc(TypeExprKind::ShortCircuit, span)
            } else if PRIMITIVE_NAMES.contains(&text.as_str()) {
                arena.alloc(TypeExprKind::Primitive, span)
            } else if node.kind() == "type_identifier" {
                arena.alloc(TypeExprKind::Reference { args: vec![] }, span)
            } else {
                arena.alloc(TypeExprKind::Other, span)
            }
        }
        "literal_type" => {
            let primitive = node
                .named_child(0)
                .map(|inner| matches!(inner.kind(), "null" | "undefined"))
                .unwrap_or(false);
            if primitive {
                arena.alloc(TypeExprKind::Primitive, span)
            } else {
                arena.alloc(TypeExprKind::Other, span)
            }
        }
        "generic_type" => {
            let args = match node.child_by_field_name("type_arguments") {
                Some(arguments) => {
                    let mut cursor = arguments.walk();
                    let children: Vec<Node> = arguments.named_children(&mut cursor).collect();
                    children
                        .into_iter()
                        .map(|arg| lower_type(arg, source, arena))
                        .collect()
                }
                None => vec![],
            };
            arena.alloc(TypeExprKind::Reference { args }, span)
        }
        "union_type" => {
            let mut branch_nodes = Vec::new();
            flatten_binary(node, "union_type", &mut branch_nodes);
            let branches = branch_nodes
                .into_iter()
                .map(|branch| lower_type(branch, source, arena))
                .collect();
            arena.alloc(TypeExprKind::Union { branches }, span)
        }
        "intersection_type" => {
            let mut branch_nodes = Vec::new();
            flatten_binary(node, "intersection_type", &mut branch_nodes);
            let branches = branch_nodes
                .into_iter()
                .map(|branch| lower_type(branch, source, arena))
                .collect();
            arena.alloc(TypeExprKind::Intersection { branches }, span)
        }
        "array_type" => {
            let element = match node.named_child(0) {
                Some(inner) => lower_type(inner, source, arena),
                None => arena.alloc(TypeExprKind::Other, span),
            };
            arena.alloc(TypeExprKind::Array { element }, span)
        }
        "tuple_type" => {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            let elements = children
                .into_iter()
                .map(|child| {
                    let (inner, optional, rest) = match child.kind() {
                        "optional_type" => (child.named_child(0), true, false),
                        "rest_type" => (child.named_child(0), false, true),
                        _ => (Some(child), false, false),
                    };
                    let ty = match inner {
                        Some(inner) => lower_type(inner, source, arena),
                        None => arena.alloc(TypeExprKind::Other, span),
                    };
                    TupleElement { ty, optional, rest }
                })
                .collect();
            arena.alloc(TypeExprKind::Tuple { elements }, span)
        }
        "object_type" => lower_object_type(node, source, arena),
        "conditional_type" => {
            let mut limb = |field: &str| -> NodeId {
                match node.child_by_field_name(field) {
                    Some(child) => lower_type(child, source, arena),
                    None => arena.alloc(TypeExprKind::Other, span),
                }
            };
            let check = limb("left");
            let extends = limb("right");
            let true_branch = limb("consequence");
            let false_branch = limb("alternative");
            arena.alloc(
                TypeExprKind::Conditional {
                    check,
                    extends,
                    true_branch,
                    false_branch,
                },
                span,
            )
        }
        "function_type" => lower_callable(node, source, arena),
        "parenthesized_type" | "readonly_type" => match node.named_child(0) {
            Some(inner) => lower_type(inner, source, arena),
            None => arena.alloc(TypeExprKind::Other, span),
        },
        _ => arena.alloc(TypeExprKind::Other, span),
    }
}

/// Object types are either mapped types (an index signature carrying a
/// `K in T` clause) or plain literals with members.
fn lower_object_type(node: Node, source: &[u8], arena: &mut TypeExprArena) -> NodeId {
    let span = span_of(node);
    let mut cursor = node.walk();
    for member in node.named_children(&mut cursor) {
        if member.kind() != "index_signature" {
            continue;
        }
        let mut inner = member.walk();
        let clause = member
            .named_children(&mut inner)
            .find(|c| c.kind() == "mapped_type_clause");
        if let Some(clause) = clause {
            let constraint = clause
                .child_by_field_name("type")
                .map(|t| lower_type(t, source, arena));
            let value = member
                .child_by_field_name("type")
                .and_then(|a| annotated_type(a))
                .map(|t| lower_type(t, source, arena));
            return arena.alloc(TypeExprKind::Mapped { constraint, value }, span);
        }
    }

    let members = lower_members(node, source, arena);
    arena.alloc(TypeExprKind::TypeLiteral { members }, span)
}

/// Collect the leaves of a left-nested binary type chain (`A | B | C`).
fn flatten_binary<'t>(node: Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        if child.kind() == kind {
            flatten_binary(child, kind, out);
        } else {
            out.push(child);
        }
    }
}
