//! Resolves a TypeScript type-annotation syntax node into a [`TypeRef`] —
//! the last step before C5 ever sees a type.
//!
//! This is deliberately not a type checker: it pattern-matches the
//! grammar's type-node shapes and resolves nominal references through
//! import aliases, which is exactly the "declaration-level structural
//! lookup" §4.1 promises. Unrecognized shapes fall back to
//! [`TypeRef::any`] rather than failing the whole compilation.

use std::collections::HashMap;

use oastatic_core::{PrimitiveKind, TypeRef, UtilityKind};
use tree_sitter::Node;

use crate::source::SourceFile;

/// Utility type names the resolver expands directly into [`TypeRef::Utility`].
fn utility_kind(name: &str) -> Option<UtilityKind> {
    match name {
        "Partial" => Some(UtilityKind::Partial),
        "Required" => Some(UtilityKind::Required),
        "Pick" => Some(UtilityKind::Pick),
        "Omit" => Some(UtilityKind::Omit),
        "Record" => Some(UtilityKind::Record),
        _ => None,
    }
}

/// Resolves a type-annotation node (the node inside a `type_annotation`,
/// i.e. after the leading `:`) into a [`TypeRef`].
///
/// `type_params` names the enclosing generic class/method's own type
/// parameters (`<T, K>`) — a bare identifier matching one of these is a
/// [`TypeRef::TypeParam`] rather than a (missing) nominal reference.
#[must_use]
pub fn resolve_type(node: Node<'_>, file: &SourceFile, aliases: &HashMap<String, String>, type_params: &[String]) -> TypeRef {
    match node.kind() {
        "predefined_type" => resolve_predefined(file.node_text(node)),
        "literal_type" => resolve_literal(node, file),
        "type_identifier" | "nested_type_identifier" => {
            resolve_named(node, file, aliases, type_params, Vec::new())
        }
        "generic_type" => resolve_generic(node, file, aliases, type_params),
        "array_type" => {
            let Some(element) = node.named_child(0) else {
                return TypeRef::any();
            };
            TypeRef::Array(Box::new(resolve_type(element, file, aliases, type_params)))
        }
        "tuple_type" => {
            let mut cursor = node.walk();
            let elements = node
                .named_children(&mut cursor)
                .map(|child| resolve_type(child, file, aliases, type_params))
                .collect();
            TypeRef::Tuple(elements)
        }
        "union_type" => {
            let mut cursor = node.walk();
            let members: Vec<TypeRef> = node
                .named_children(&mut cursor)
                .map(|child| resolve_type(child, file, aliases, type_params))
                .collect();
            TypeRef::Union(members)
        }
        "intersection_type" => {
            let mut cursor = node.walk();
            let parts = node
                .named_children(&mut cursor)
                .map(|child| resolve_type(child, file, aliases, type_params))
                .collect();
            TypeRef::Intersection(parts)
        }
        "object_type" => resolve_object(node, file, aliases, type_params),
        "parenthesized_type" => node
            .named_child(0)
            .map_or(TypeRef::any(), |inner| resolve_type(inner, file, aliases, type_params)),
        _ => TypeRef::any(),
    }
}

fn resolve_predefined(text: &str) -> TypeRef {
    match text {
        "string" => TypeRef::Primitive(PrimitiveKind::String),
        "number" => TypeRef::Primitive(PrimitiveKind::Number),
        "boolean" => TypeRef::Primitive(PrimitiveKind::Boolean),
        "null" => TypeRef::Primitive(PrimitiveKind::Null),
        "undefined" | "void" => TypeRef::Primitive(PrimitiveKind::Void),
        "any" => TypeRef::Primitive(PrimitiveKind::Any),
        "unknown" => TypeRef::Primitive(PrimitiveKind::Unknown),
        _ => TypeRef::any(),
    }
}

fn resolve_literal(node: Node<'_>, file: &SourceFile) -> TypeRef {
    let Some(inner) = node.named_child(0) else {
        return TypeRef::any();
    };
    let text = file.node_text(inner);
    let value = match inner.kind() {
        "string" => serde_json::Value::String(text.trim_matches(['\'', '"', '`']).to_string()),
        "number" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => serde_json::Value::Null,
    };
    TypeRef::Literal(value)
}

fn resolve_named(
    node: Node<'_>,
    file: &SourceFile,
    aliases: &HashMap<String, String>,
    type_params: &[String],
    type_args: Vec<TypeRef>,
) -> TypeRef {
    let local_name = file.node_text(node);
    let canonical = crate::source::resolve_alias(local_name, aliases);
    if type_params.iter().any(|p| p == canonical) {
        return TypeRef::TypeParam(canonical.to_string());
    }
    TypeRef::Named {
        qualified_id: canonical.to_string(),
        type_args,
    }
}

fn resolve_generic(node: Node<'_>, file: &SourceFile, aliases: &HashMap<String, String>, type_params: &[String]) -> TypeRef {
    let Some(name_node) = node.child_by_field_name("name") else {
        return TypeRef::any();
    };
    let local_name = file.node_text(name_node);
    let canonical = crate::source::resolve_alias(local_name, aliases).to_string();

    let args: Vec<TypeRef> = node
        .child_by_field_name("type_arguments")
        .map(|type_args| {
            let mut cursor = type_args.walk();
            type_args
                .named_children(&mut cursor)
                .map(|arg| resolve_type(arg, file, aliases, type_params))
                .collect()
        })
        .unwrap_or_default();

    if canonical == "Array" && args.len() == 1 {
        return TypeRef::Array(Box::new(args.into_iter().next().unwrap()));
    }
    if let Some(kind) = utility_kind(&canonical) {
        return TypeRef::Utility { kind, args };
    }

    TypeRef::Named {
        qualified_id: canonical,
        type_args: args,
    }
}

fn resolve_object(node: Node<'_>, file: &SourceFile, aliases: &HashMap<String, String>, type_params: &[String]) -> TypeRef {
    let mut properties = Vec::new();
    let mut additional = None;
    let mut cursor = node.walk();
    for member in node.named_children(&mut cursor) {
        match member.kind() {
            "property_signature" => {
                let Some(name_node) = member.child_by_field_name("name") else {
                    continue;
                };
                let optional = member
                    .child_by_field_name("optional")
                    .is_some()
                    || file.node_text(member).contains('?');
                let member_type = member
                    .child_by_field_name("type")
                    .and_then(|ann| ann.named_child(0))
                    .map_or(TypeRef::any(), |t| resolve_type(t, file, aliases, type_params));
                properties.push(oastatic_core::typeref::ObjectProperty {
                    name: file.node_text(name_node).to_string(),
                    type_ref: member_type,
                    optional,
                });
            }
            "index_signature" => {
                if let Some(value_ann) = member.child_by_field_name("type") {
                    if let Some(value_node) = value_ann.named_child(0) {
                        additional = Some(Box::new(resolve_type(value_node, file, aliases, type_params)));
                    }
                }
            }
            _ => {}
        }
    }
    TypeRef::Object { properties, additional }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_typescript;

    fn type_node_of<'a>(file: &'a SourceFile) -> Node<'a> {
        fn find<'a>(node: Node<'a>) -> Option<Node<'a>> {
            if node.kind() == "type_annotation" {
                return node.named_child(0);
            }
            let mut c = node.walk();
            for child in node.children(&mut c) {
                if let Some(found) = find(child) {
                    return Some(found);
                }
            }
            None
        }
        find(file.tree.root_node()).expect("a type annotation")
    }

    fn file_with(text: &str) -> SourceFile {
        SourceFile {
            path: "t.ts".to_string(),
            text: text.to_string(),
            tree: parse_typescript(text),
            imports: std::collections::HashMap::new(),
        }
    }

    #[test]
    fn resolves_array_of_named_type() {
        let file = file_with("let x: UserDto[];");
        let node = type_node_of(&file);
        let resolved = resolve_type(node, &file, &HashMap::new(), &[]);
        assert_eq!(
            resolved,
            TypeRef::Array(Box::new(TypeRef::Named {
                qualified_id: "UserDto".to_string(),
                type_args: vec![],
            }))
        );
    }

    #[test]
    fn resolves_generic_utility_type() {
        let file = file_with("let x: Partial<UserDto>;");
        let node = type_node_of(&file);
        let resolved = resolve_type(node, &file, &HashMap::new(), &[]);
        assert_eq!(
            resolved,
            TypeRef::Utility {
                kind: UtilityKind::Partial,
                args: vec![TypeRef::Named {
                    qualified_id: "UserDto".to_string(),
                    type_args: vec![],
                }],
            }
        );
    }

    #[test]
    fn resolves_union_of_string_literals() {
        let file = file_with("let x: 'pending' | 'shipped' | 'delivered';");
        let node = type_node_of(&file);
        let resolved = resolve_type(node, &file, &HashMap::new(), &[]);
        match resolved {
            TypeRef::Union(members) => assert_eq!(members.len(), 3),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn resolves_type_param_against_enclosing_generics() {
        let file = file_with("let x: T;");
        let node = type_node_of(&file);
        let resolved = resolve_type(node, &file, &HashMap::new(), &["T".to_string()]);
        assert_eq!(resolved, TypeRef::TypeParam("T".to_string()));
    }

    #[test]
    fn named_type_resolves_through_import_alias() {
        let file = file_with("let x: Renamed;");
        let node = type_node_of(&file);
        let mut aliases = HashMap::new();
        aliases.insert("Renamed".to_string(), "UserDto".to_string());
        let resolved = resolve_type(node, &file, &aliases, &[]);
        assert_eq!(
            resolved,
            TypeRef::Named {
                qualified_id: "UserDto".to_string(),
                type_args: vec![],
            }
        );
    }
}
