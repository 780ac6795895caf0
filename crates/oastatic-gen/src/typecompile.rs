//! The type compiler (C5): turns a resolved [`TypeRef`] into a [`Schema`],
//! registering named types into the [`SchemaRegistry`] and memoizing by
//! canonical type id to break cycles.

use std::collections::HashMap;

use oastatic_core::{
    typeref::{ObjectProperty, UtilityKind},
    AdditionalProperties, PrimitiveKind, Schema, SchemaRegistry, SchemaType, TypeRef,
};

use crate::constraints;
use crate::source::{read_child_annotations, DeclKind, SourceProject};
use crate::typesyntax::resolve_type;

/// Compiles `type_ref` into a schema, registering any named type it
/// resolves to (directly or through substitution) into `registry`.
pub fn compile(type_ref: &TypeRef, project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    match type_ref {
        TypeRef::Primitive(kind) => compile_primitive(*kind),
        TypeRef::Literal(value) => compile_literal(value),
        TypeRef::Array(element) => Schema {
            schema_type: Some(SchemaType::single("array")),
            items: Some(Box::new(compile(element, project, registry))),
            ..Schema::default()
        },
        TypeRef::Tuple(elements) => {
            let prefix_items: Vec<Schema> = elements.iter().map(|e| compile(e, project, registry)).collect();
            Schema {
                schema_type: Some(SchemaType::single("array")),
                min_items: Some(prefix_items.len() as u64),
                max_items: Some(prefix_items.len() as u64),
                prefix_items,
                ..Schema::default()
            }
        }
        TypeRef::Union(members) => compile_union(members, project, registry),
        TypeRef::Intersection(parts) => Schema {
            all_of: parts.iter().map(|p| compile(p, project, registry)).collect(),
            ..Schema::default()
        },
        TypeRef::Object { properties, additional } => compile_object(properties, additional.as_deref(), project, registry),
        TypeRef::TypeParam(_) => Schema::permissive(),
        TypeRef::Mapped { source } => compile(source, project, registry),
        TypeRef::Utility { kind, args } => compile_utility(*kind, args, project, registry),
        TypeRef::Named { qualified_id, type_args } => compile_named(qualified_id, type_args, project, registry),
    }
}

fn compile_primitive(kind: PrimitiveKind) -> Schema {
    match kind {
        PrimitiveKind::String => Schema::of_type("string"),
        PrimitiveKind::Number => Schema::of_type("number"),
        PrimitiveKind::Integer => Schema::of_type("integer"),
        PrimitiveKind::Boolean => Schema::of_type("boolean"),
        PrimitiveKind::Null => Schema::of_type("null"),
        PrimitiveKind::Any | PrimitiveKind::Unknown | PrimitiveKind::Void => Schema::permissive(),
    }
}

fn compile_literal(value: &serde_json::Value) -> Schema {
    let base = match value {
        serde_json::Value::String(_) => "string",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::Bool(_) => "boolean",
        _ => return Schema::permissive(),
    };
    Schema {
        schema_type: Some(SchemaType::single(base)),
        const_value: Some(value.clone()),
        ..Schema::default()
    }
}

/// `true` for the type members that represent "this may also be null":
/// a bare [`PrimitiveKind::Null`] or the `null` literal.
fn is_null_member(member: &TypeRef) -> bool {
    matches!(member, TypeRef::Primitive(PrimitiveKind::Null)) || matches!(member, TypeRef::Literal(serde_json::Value::Null))
}

fn compile_union(members: &[TypeRef], project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    let nullable = members.iter().any(is_null_member);
    let remaining: Vec<&TypeRef> = members.iter().filter(|m| !is_null_member(m)).collect();

    if remaining.is_empty() {
        return Schema::permissive();
    }

    if remaining.len() == 1 {
        let mut schema = compile(remaining[0], project, registry);
        if nullable {
            schema.nullable = Some(true);
        }
        return schema;
    }

    let all_literals = remaining.iter().all(|m| matches!(m, TypeRef::Literal(_)));
    if all_literals {
        let values: Vec<serde_json::Value> = remaining
            .iter()
            .filter_map(|m| match m {
                TypeRef::Literal(v) => Some(v.clone()),
                _ => None,
            })
            .collect();
        let base = match values.first() {
            Some(serde_json::Value::String(_)) => "string",
            Some(serde_json::Value::Number(_)) => "number",
            Some(serde_json::Value::Bool(_)) => "boolean",
            _ => "string",
        };
        return Schema {
            schema_type: Some(SchemaType::single(base)),
            enum_values: values,
            nullable: nullable.then_some(true),
            ..Schema::default()
        };
    }

    let any_of = remaining.iter().map(|m| compile(m, project, registry)).collect();
    Schema {
        any_of,
        nullable: nullable.then_some(true),
        ..Schema::default()
    }
}

fn compile_object(properties: &[ObjectProperty], additional: Option<&TypeRef>, project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    let mut compiled = indexmap::IndexMap::new();
    let mut required = Vec::new();
    for property in properties {
        let schema = compile(&property.type_ref, project, registry);
        if !property.optional {
            required.push(property.name.clone());
        }
        compiled.insert(property.name.clone(), schema);
    }
    Schema {
        schema_type: Some(SchemaType::single("object")),
        properties: compiled,
        required,
        additional_properties: Some(match additional {
            Some(value_type) => AdditionalProperties::Schema(Box::new(compile(value_type, project, registry))),
            None => AdditionalProperties::Bool(false),
        }),
        ..Schema::default()
    }
}

/// Uppercases the first character of `segment`, leaving the rest untouched
/// — good enough to turn a property name into a PascalCase name fragment
/// without pulling in a casing crate for one call site.
fn pascal_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Compiles `type_ref` the same way [`compile`] does, except an anonymous
/// object type is synthesized into a named schema under `hint` instead of
/// being inlined (§4.5 structural-to-named rewriting). `hint` is a PascalCase
/// name derived from the enclosing named type and the property path that led
/// here, so nested anonymous objects each get their own distinct name.
fn compile_structural(type_ref: &TypeRef, hint: &str, project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    match type_ref {
        TypeRef::Object { properties, additional } => compile_named_object(hint, properties, additional.as_deref(), project, registry),
        TypeRef::Array(element) => Schema {
            schema_type: Some(SchemaType::single("array")),
            items: Some(Box::new(compile_structural(element, hint, project, registry))),
            ..Schema::default()
        },
        other => compile(other, project, registry),
    }
}

/// Registers an anonymous object type under `hint`, returning a `$ref` to
/// it instead of the inline body — the named counterpart to
/// [`compile_object`]. Memoizes the same insert-placeholder-then-finalize
/// way [`compile_named`] does, in case the hinted name recurs.
fn compile_named_object(hint: &str, properties: &[ObjectProperty], additional: Option<&TypeRef>, project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    let name = hint.to_string();
    if registry.contains(&name) {
        return Schema::reference(&name);
    }
    registry.insert(name.clone(), Schema::default());
    let schema = compile_object_with_hint(&name, properties, additional, project, registry);
    registry.insert(name.clone(), schema);
    Schema::reference(&name)
}

/// Like [`compile_object`], but each property value is compiled via
/// [`compile_structural`] under a nested hint (`{hint}{PropertyName}`), so an
/// anonymous object nested arbitrarily deep still gets its own named schema.
fn compile_object_with_hint(hint: &str, properties: &[ObjectProperty], additional: Option<&TypeRef>, project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    let mut compiled = indexmap::IndexMap::new();
    let mut required = Vec::new();
    for property in properties {
        let nested_hint = format!("{hint}{}", pascal_case(&property.name));
        let schema = compile_structural(&property.type_ref, &nested_hint, project, registry);
        if !property.optional {
            required.push(property.name.clone());
        }
        compiled.insert(property.name.clone(), schema);
    }
    Schema {
        schema_type: Some(SchemaType::single("object")),
        properties: compiled,
        required,
        additional_properties: Some(match additional {
            Some(value_type) => AdditionalProperties::Schema(Box::new(compile_structural(value_type, &format!("{hint}Value"), project, registry))),
            None => AdditionalProperties::Bool(false),
        }),
        ..Schema::default()
    }
}

fn compile_utility(kind: UtilityKind, args: &[TypeRef], project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    match kind {
        UtilityKind::Record => {
            let default_value_type = TypeRef::any();
            let value_type = args.get(1).unwrap_or(&default_value_type);
            Schema {
                schema_type: Some(SchemaType::single("object")),
                additional_properties: Some(AdditionalProperties::Schema(Box::new(compile(value_type, project, registry)))),
                ..Schema::default()
            }
        }
        UtilityKind::Partial | UtilityKind::Required => {
            let Some(TypeRef::Named { qualified_id, type_args }) = args.first() else {
                return Schema::permissive();
            };
            let mut schema = compile_named(qualified_id, type_args, project, registry);
            if schema.ref_.is_some() {
                // Expanding a named class's properties with altered
                // optionality needs the object body, not a $ref to the
                // unmodified original — re-resolve inline.
                schema = resolve_class_object(qualified_id, type_args, project, registry).unwrap_or(schema);
            }
            if matches!(kind, UtilityKind::Partial) {
                schema.required.clear();
            } else {
                schema.required = schema.properties.keys().cloned().collect();
            }
            schema
        }
        UtilityKind::Pick | UtilityKind::Omit => {
            let Some(TypeRef::Named { qualified_id, type_args }) = args.first() else {
                return Schema::permissive();
            };
            let keys = literal_string_keys(args.get(1));
            let mut schema = resolve_class_object(qualified_id, type_args, project, registry).unwrap_or(Schema::permissive());
            schema.properties.retain(|k, _| keys.contains(k) != matches!(kind, UtilityKind::Omit));
            schema.required.retain(|k| schema.properties.contains_key(k));
            schema
        }
    }
}

fn literal_string_keys(type_ref: Option<&TypeRef>) -> Vec<String> {
    match type_ref {
        Some(TypeRef::Literal(serde_json::Value::String(s))) => vec![s.clone()],
        Some(TypeRef::Union(members)) => members
            .iter()
            .filter_map(|m| match m {
                TypeRef::Literal(serde_json::Value::String(s)) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Canonical schema-name rendering for a type argument, used to build
/// unencoded generic instantiation names (`PaginatedResponse<UserDto>`).
fn render_type_arg(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Named { qualified_id, type_args } if type_args.is_empty() => crate::source::class_display_name(qualified_id).to_string(),
        TypeRef::Named { qualified_id, type_args } => {
            let name = crate::source::class_display_name(qualified_id);
            format!("{name}<{}>", type_args.iter().map(render_type_arg).collect::<Vec<_>>().join(","))
        }
        TypeRef::Primitive(PrimitiveKind::String) => "string".to_string(),
        TypeRef::Primitive(PrimitiveKind::Number) => "number".to_string(),
        TypeRef::Primitive(PrimitiveKind::Integer) => "integer".to_string(),
        TypeRef::Primitive(PrimitiveKind::Boolean) => "boolean".to_string(),
        TypeRef::Array(inner) => format!("{}[]", render_type_arg(inner)),
        _ => "unknown".to_string(),
    }
}

const BUILTIN_ALIASES: &[(&str, &str)] = &[("Date", "date-time")];

fn compile_named(qualified_id: &str, type_args: &[TypeRef], project: &SourceProject, registry: &mut SchemaRegistry) -> Schema {
    if let Some((_, format)) = BUILTIN_ALIASES.iter().find(|(name, _)| *name == qualified_id) {
        return Schema {
            schema_type: Some(SchemaType::single("string")),
            format: Some((*format).to_string()),
            ..Schema::default()
        };
    }

    let display_name = crate::source::class_display_name(qualified_id);
    let canonical_name = if type_args.is_empty() {
        display_name.to_string()
    } else {
        format!("{display_name}<{}>", type_args.iter().map(render_type_arg).collect::<Vec<_>>().join(","))
    };

    if registry.contains(&canonical_name) {
        return Schema::reference(&canonical_name);
    }

    let Some((file, decl_ref)) = project.declaration(qualified_id) else {
        // Unresolvable nominal reference: most likely an unsubstituted
        // generic parameter or a type this pipeline doesn't track
        // (third-party ambient type). Treated permissively rather than
        // failing the whole compilation (§4.1 scope).
        return Schema::permissive();
    };

    match decl_ref.kind {
        DeclKind::Enum => {
            registry.insert(canonical_name.clone(), Schema::default());
            let schema = compile_enum(qualified_id, project).unwrap_or(Schema::permissive());
            registry.insert(canonical_name.clone(), schema);
            Schema::reference(&canonical_name)
        }
        DeclKind::TypeAlias => {
            let Some(node) = project.declaration_node(decl_ref) else {
                return Schema::permissive();
            };
            let Some(value_node) = node.child_by_field_name("value") else {
                return Schema::permissive();
            };
            let aliases = crate::source::local_import_aliases(file);
            let aliased_type = resolve_type(value_node, file, &aliases, &[]);
            registry.insert(canonical_name.clone(), Schema::default());
            let schema = compile(&aliased_type, project, registry);
            registry.insert(canonical_name.clone(), schema);
            Schema::reference(&canonical_name)
        }
        DeclKind::Class | DeclKind::Interface => {
            registry.insert(canonical_name.clone(), Schema::default());
            let schema = compile_class_body(qualified_id, type_args, project, registry).unwrap_or(Schema::permissive());
            registry.insert(canonical_name.clone(), schema);
            Schema::reference(&canonical_name)
        }
    }
}

/// Like [`compile_named`], but returns the object schema body directly
/// instead of a `$ref` — used by `Partial`/`Required`/`Pick`/`Omit`, which
/// need to mutate the expanded shape rather than point at the unmodified
/// original, and by the pipeline driver's inline query-DTO expansion
/// (§4.4, §8 scenario 4), which needs each property individually rather
/// than the whole object.
pub(crate) fn resolve_class_object(qualified_id: &str, type_args: &[TypeRef], project: &SourceProject, registry: &mut SchemaRegistry) -> Option<Schema> {
    compile_class_body(qualified_id, type_args, project, registry)
}

fn compile_class_body(qualified_id: &str, type_args: &[TypeRef], project: &SourceProject, registry: &mut SchemaRegistry) -> Option<Schema> {
    let (file, decl_ref) = project.declaration(qualified_id)?;
    let node = project.declaration_node(decl_ref)?;

    let own_type_params: Vec<String> = node
        .child_by_field_name("type_parameters")
        .map(|tp| {
            let mut cursor = tp.walk();
            tp.named_children(&mut cursor)
                .filter(|c| c.kind() == "type_parameter")
                .filter_map(|c| c.child_by_field_name("name"))
                .map(|n| file.node_text(n).to_string())
                .collect()
        })
        .unwrap_or_default();
    let substitution: HashMap<String, TypeRef> = own_type_params.iter().cloned().zip(type_args.iter().cloned()).collect();
    let aliases = crate::source::local_import_aliases(file);

    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let mut compiled = indexmap::IndexMap::new();
    let mut required = Vec::new();

    let members: Vec<_> = body
        .named_children(&mut cursor)
        .filter(|m| matches!(m.kind(), "public_field_definition" | "property_signature"))
        .collect();

    // §4.6 simplifies to one rule for every property rather than the
    // two-branch (validation-annotations-present vs. not) form: a property
    // is required unless it carries an optional marker, `@IsOptional`, or a
    // `| undefined` union member.
    let member_data: Vec<_> = members
        .iter()
        .map(|member| read_child_annotations(*member, file).into_iter().chain(collect_preceding_decorators(*member, file)).collect::<Vec<_>>())
        .collect();

    for (member, annotations) in members.iter().zip(member_data.iter()) {
        let Some(name_node) = member.child_by_field_name("name") else {
            continue;
        };
        let property_name = file.node_text(name_node).to_string();
        let optional_marker = member.child_by_field_name("optional").is_some() || file.node_text(*member).contains('?');
        let declared_type = member
            .child_by_field_name("type")
            .and_then(|ann| ann.named_child(0))
            .map_or(TypeRef::any(), |t| resolve_type(t, file, &aliases, &own_type_params));
        let substituted = substitute(&declared_type, &substitution);

        let hint = format!("{}{}", crate::source::class_display_name(qualified_id), pascal_case(&property_name));
        let mut schema = compile_structural(&substituted, &hint, project, registry);
        constraints::merge_constraints(&mut schema, annotations, file, project);

        let forced_optional = constraints::is_optional(annotations);
        let union_has_undefined = matches!(&substituted, TypeRef::Union(ms) if ms.iter().any(TypeRef::is_void));
        let is_required = !(optional_marker || forced_optional || union_has_undefined);
        if is_required {
            required.push(property_name.clone());
        }

        compiled.insert(property_name, schema);
    }

    Some(Schema {
        schema_type: Some(SchemaType::single("object")),
        properties: compiled,
        required,
        additional_properties: Some(AdditionalProperties::Bool(false)),
        ..Schema::default()
    })
}

/// Property decorators in a class body are preceding siblings of the
/// property, same as top-level declarations — `read_child_annotations`
/// alone (child-decorators, the parameter shape) won't find them, so this
/// collects both shapes defensively.
fn collect_preceding_decorators<'a>(member: tree_sitter::Node<'a>, file: &'a crate::source::SourceFile) -> Vec<crate::source::Annotation<'a>> {
    file.annotations_of(member)
}

fn substitute(type_ref: &TypeRef, substitution: &HashMap<String, TypeRef>) -> TypeRef {
    match type_ref {
        TypeRef::TypeParam(name) => substitution.get(name).cloned().unwrap_or_else(|| type_ref.clone()),
        TypeRef::Array(inner) => TypeRef::Array(Box::new(substitute(inner, substitution))),
        TypeRef::Tuple(items) => TypeRef::Tuple(items.iter().map(|t| substitute(t, substitution)).collect()),
        TypeRef::Union(members) => TypeRef::Union(members.iter().map(|t| substitute(t, substitution)).collect()),
        TypeRef::Intersection(parts) => TypeRef::Intersection(parts.iter().map(|t| substitute(t, substitution)).collect()),
        TypeRef::Named { qualified_id, type_args } => TypeRef::Named {
            qualified_id: qualified_id.clone(),
            type_args: type_args.iter().map(|t| substitute(t, substitution)).collect(),
        },
        TypeRef::Object { properties, additional } => TypeRef::Object {
            properties: properties
                .iter()
                .map(|p| ObjectProperty {
                    name: p.name.clone(),
                    type_ref: substitute(&p.type_ref, substitution),
                    optional: p.optional,
                })
                .collect(),
            additional: additional.as_ref().map(|a| Box::new(substitute(a, substitution))),
        },
        other => other.clone(),
    }
}

fn compile_enum(qualified_id: &str, project: &SourceProject) -> Option<Schema> {
    let (file, decl_ref) = project.declaration(qualified_id)?;
    let node = project.declaration_node(decl_ref)?;
    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let mut values = Vec::new();
    let mut is_numeric = true;
    let mut next_ordinal: i64 = 0;

    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "property_identifier" => {
                values.push(serde_json::Value::Number(next_ordinal.into()));
                next_ordinal += 1;
            }
            "enum_assignment" => {
                let Some(value_node) = member.child_by_field_name("value") else {
                    continue;
                };
                let text = file.node_text(value_node);
                match value_node.kind() {
                    "string" => {
                        is_numeric = false;
                        values.push(serde_json::Value::String(text.trim_matches(['\'', '"', '`']).to_string()));
                    }
                    "number" => {
                        let parsed: i64 = text.parse().unwrap_or(next_ordinal);
                        values.push(serde_json::Value::Number(parsed.into()));
                        next_ordinal = parsed + 1;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Some(Schema {
        schema_type: Some(SchemaType::single(if is_numeric { "integer" } else { "string" })),
        enum_values: values,
        ..Schema::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::loader::{load, LoadOptions};
    use std::path::PathBuf;

    fn temp_project(id: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("oastatic-typecompile-test-{id}-{}", std::process::id()));
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("tsconfig.json"), "{}").unwrap();
        root
    }

    #[test]
    fn union_of_string_literals_collapses_to_enum() {
        let root = temp_project("union-literals");
        std::fs::write(
            root.join("src/order.dto.ts"),
            "export class OrderDto {\n  status: 'pending' | 'shipped' | 'delivered';\n}\n",
        )
        .unwrap();

        let project = load(&LoadOptions {
            project_root: root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/order.dto.ts")],
            extra_globs: vec![],
        })
        .unwrap();

        let mut registry = SchemaRegistry::new();
        let schema = compile_named("OrderDto", &[], &project, &mut registry);
        assert_eq!(schema, Schema::reference("OrderDto"));

        let registered = registry.get("OrderDto").unwrap();
        let status_schema = registered.properties.get("status").unwrap();
        assert_eq!(status_schema.schema_type, Some(SchemaType::single("string")));
        assert_eq!(status_schema.enum_values.len(), 3);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn generic_instantiation_gets_unencoded_bracket_name() {
        let root = temp_project("generic");
        std::fs::write(
            root.join("src/paginated.ts"),
            "export class PaginatedResponse<T> {\n  items: T[];\n  total: number;\n}\n",
        )
        .unwrap();
        std::fs::write(root.join("src/user.dto.ts"), "export class UserDto {\n  id: string;\n}\n").unwrap();

        let project = load(&LoadOptions {
            project_root: root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/paginated.ts")],
            extra_globs: vec!["src/*.dto.ts".to_string()],
        })
        .unwrap();

        let mut registry = SchemaRegistry::new();
        let type_ref = TypeRef::Named {
            qualified_id: "PaginatedResponse".to_string(),
            type_args: vec![TypeRef::Named {
                qualified_id: "UserDto".to_string(),
                type_args: vec![],
            }],
        };
        let schema = compile(&type_ref, &project, &mut registry);
        assert_eq!(schema.ref_target(), Some("PaginatedResponse<UserDto>"));
        assert!(registry.contains("PaginatedResponse<UserDto>"));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn cyclic_type_memoizes_via_placeholder() {
        let root = temp_project("cycle");
        std::fs::write(
            root.join("src/tree.ts"),
            "export class TreeNode {\n  children: TreeNode[];\n}\n",
        )
        .unwrap();

        let project = load(&LoadOptions {
            project_root: root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/tree.ts")],
            extra_globs: vec![],
        })
        .unwrap();

        let mut registry = SchemaRegistry::new();
        let schema = compile_named("TreeNode", &[], &project, &mut registry);
        assert_eq!(schema, Schema::reference("TreeNode"));
        let registered = registry.get("TreeNode").unwrap();
        let children_schema = registered.properties.get("children").unwrap();
        assert_eq!(children_schema.items.as_ref().unwrap().ref_target(), Some("TreeNode"));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn anonymous_object_property_is_registered_as_a_named_schema() {
        let root = temp_project("anon-object");
        std::fs::write(
            root.join("src/select.dto.ts"),
            "export class SelectRuleDto {\n  select: { label: string };\n}\n",
        )
        .unwrap();

        let project = load(&LoadOptions {
            project_root: root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/select.dto.ts")],
            extra_globs: vec![],
        })
        .unwrap();

        let mut registry = SchemaRegistry::new();
        let schema = compile_named("SelectRuleDto", &[], &project, &mut registry);
        assert_eq!(schema, Schema::reference("SelectRuleDto"));

        let rule = registry.get("SelectRuleDto").unwrap();
        let select_schema = rule.properties.get("select").unwrap();
        assert_eq!(select_schema.ref_target(), Some("SelectRuleDtoSelect"));

        let nested = registry.get("SelectRuleDtoSelect").unwrap();
        let label_schema = nested.properties.get("label").unwrap();
        assert_eq!(label_schema.schema_type, Some(SchemaType::single("string")));

        std::fs::remove_dir_all(&root).ok();
    }
}
