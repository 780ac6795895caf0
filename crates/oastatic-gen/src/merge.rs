//! The schema registry & merger (C9): assembles `components.schemas` from
//! the set of schemas actually reachable from `paths`, then collapses pure
//! alias entries.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use oastatic_core::{AdditionalProperties, OpenApiDocument, Schema, SchemaRegistry};

/// Assembles `document.components.schemas` from `registry` by reference
/// closure over `document.paths`, normalizes schema shape, and collapses
/// pure-alias entries (§4.9).
pub fn merge(document: &mut OpenApiDocument, registry: &SchemaRegistry) {
    let mut schemas = close_over_references(document, registry);
    for schema in schemas.values_mut() {
        normalize(schema);
    }
    collapse_aliases(document, &mut schemas);
    document.components.schemas = schemas;
}

fn close_over_references(document: &OpenApiDocument, registry: &SchemaRegistry) -> BTreeMap<String, Schema> {
    let mut work: VecDeque<String> = VecDeque::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut resolved: BTreeMap<String, Schema> = BTreeMap::new();

    for operation in document.paths.values().flat_map(|path_item| path_item.values()) {
        for parameter in &operation.parameters {
            collect_refs(&parameter.schema, &mut work, &mut seen);
        }
        if let Some(body) = &operation.request_body {
            for media in body.content.values() {
                collect_refs(&media.schema, &mut work, &mut seen);
            }
        }
        for response in operation.responses.values() {
            if let Some(content) = &response.content {
                for media in content.values() {
                    collect_refs(&media.schema, &mut work, &mut seen);
                }
            }
        }
    }

    while let Some(name) = work.pop_front() {
        if resolved.contains_key(&name) {
            continue;
        }
        let Some(schema) = registry.get(&name) else {
            continue;
        };
        let schema = schema.clone();
        collect_refs(&schema, &mut work, &mut seen);
        resolved.insert(name, schema);
    }

    resolved
}

fn collect_refs(schema: &Schema, work: &mut VecDeque<String>, seen: &mut HashSet<String>) {
    if let Some(target) = schema.ref_target() {
        if seen.insert(target.to_string()) {
            work.push_back(target.to_string());
        }
    }
    if let Some(items) = &schema.items {
        collect_refs(items, work, seen);
    }
    for prefix_item in &schema.prefix_items {
        collect_refs(prefix_item, work, seen);
    }
    for property in schema.properties.values() {
        collect_refs(property, work, seen);
    }
    for variant in schema.one_of.iter().chain(&schema.any_of).chain(&schema.all_of) {
        collect_refs(variant, work, seen);
    }
    if let Some(AdditionalProperties::Schema(inner)) = &schema.additional_properties {
        collect_refs(inner, work, seen);
    }
}

/// Rewrites legacy `#/definitions/...` refs to `#/components/schemas/...`
/// and defaults `additionalProperties` to `false` on any object schema that
/// declares `properties` but never set it explicitly (§4.9 step 3).
fn normalize(schema: &mut Schema) {
    if let Some(ref_) = &schema.ref_ {
        if let Some(name) = ref_.strip_prefix("#/definitions/") {
            schema.ref_ = Some(format!("#/components/schemas/{name}"));
        }
    }
    if !schema.properties.is_empty() && schema.additional_properties.is_none() {
        schema.additional_properties = Some(AdditionalProperties::Bool(false));
    }
    if let Some(items) = &mut schema.items {
        normalize(items);
    }
    for prefix_item in &mut schema.prefix_items {
        normalize(prefix_item);
    }
    for property in schema.properties.values_mut() {
        normalize(property);
    }
    for variant in schema.one_of.iter_mut().chain(schema.any_of.iter_mut()).chain(schema.all_of.iter_mut()) {
        normalize(variant);
    }
    if let Some(AdditionalProperties::Schema(inner)) = &mut schema.additional_properties {
        normalize(inner);
    }
}

/// Follows every alias chain to its terminal non-alias target, rewrites
/// every `$ref` in the document and in `schemas` to point at that target,
/// then deletes the now-unreferenced alias entries. A cycle (every member
/// a pure alias of the next, looping back) is left untouched rather than
/// collapsed, since it has no terminal target.
fn collapse_aliases(document: &mut OpenApiDocument, schemas: &mut BTreeMap<String, Schema>) {
    let mut terminal: HashMap<String, String> = HashMap::new();
    for name in schemas.keys() {
        if let Some(target) = resolve_terminal(name, schemas) {
            if target != *name {
                terminal.insert(name.clone(), target);
            }
        }
    }

    if terminal.is_empty() {
        return;
    }

    for operation in document.paths.values_mut().flat_map(|path_item| path_item.values_mut()) {
        for parameter in &mut operation.parameters {
            rewrite_refs(&mut parameter.schema, &terminal);
        }
        if let Some(body) = &mut operation.request_body {
            for media in body.content.values_mut() {
                rewrite_refs(&mut media.schema, &terminal);
            }
        }
        for response in operation.responses.values_mut() {
            if let Some(content) = &mut response.content {
                for media in content.values_mut() {
                    rewrite_refs(&mut media.schema, &terminal);
                }
            }
        }
    }
    for schema in schemas.values_mut() {
        rewrite_refs(schema, &terminal);
    }
    for alias_name in terminal.keys() {
        schemas.remove(alias_name);
    }
}

/// Follows `name`'s alias chain, returning the first non-alias target.
/// `None` if `name` isn't registered or the chain cycles back on itself.
fn resolve_terminal(name: &str, schemas: &BTreeMap<String, Schema>) -> Option<String> {
    let mut current = name.to_string();
    let mut visited = HashSet::new();
    visited.insert(current.clone());
    loop {
        let schema = schemas.get(&current)?;
        if !schema.is_pure_alias() {
            return Some(current);
        }
        let next = schema.ref_target()?.to_string();
        if !visited.insert(next.clone()) {
            return None;
        }
        current = next;
    }
}

fn rewrite_refs(schema: &mut Schema, terminal: &HashMap<String, String>) {
    if let Some(target) = schema.ref_target() {
        if let Some(resolved) = terminal.get(target) {
            schema.ref_ = Some(format!("#/components/schemas/{resolved}"));
        }
    }
    if let Some(items) = &mut schema.items {
        rewrite_refs(items, terminal);
    }
    for prefix_item in &mut schema.prefix_items {
        rewrite_refs(prefix_item, terminal);
    }
    for property in schema.properties.values_mut() {
        rewrite_refs(property, terminal);
    }
    for variant in schema.one_of.iter_mut().chain(schema.any_of.iter_mut()).chain(schema.all_of.iter_mut()) {
        rewrite_refs(variant, terminal);
    }
    if let Some(AdditionalProperties::Schema(inner)) = &mut schema.additional_properties {
        rewrite_refs(inner, terminal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use oastatic_core::{Components, Info, Operation, OperationParameter, ParamLocation, ResponseEntry, SchemaType};

    fn document_with(parameter_schema: Schema) -> OpenApiDocument {
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            ResponseEntry {
                description: "OK".to_string(),
                content: None,
            },
        );
        let operation = Operation {
            operation_id: "list".to_string(),
            parameters: vec![OperationParameter {
                name: "filter".to_string(),
                location: ParamLocation::Query,
                required: false,
                description: None,
                schema: parameter_schema,
            }],
            responses,
            ..Operation::default()
        };
        let mut path_item = IndexMap::new();
        path_item.insert("get".to_string(), operation);
        let mut paths = IndexMap::new();
        paths.insert("/users".to_string(), path_item);

        OpenApiDocument {
            openapi: "3.0.3".to_string(),
            info: Info {
                title: "t".to_string(),
                version: "1".to_string(),
                description: None,
            },
            servers: vec![],
            tags: vec![],
            paths,
            components: Components::default(),
            security: None,
        }
    }

    #[test]
    fn only_reachable_schemas_survive_closure() {
        let mut registry = SchemaRegistry::new();
        registry.insert("UserDto", Schema::of_type("object"));
        registry.insert("Unused", Schema::of_type("object"));

        let mut document = document_with(Schema::reference("UserDto"));
        merge(&mut document, &registry);

        assert!(document.components.schemas.contains_key("UserDto"));
        assert!(!document.components.schemas.contains_key("Unused"));
    }

    #[test]
    fn nested_refs_are_pulled_in_transitively() {
        let mut registry = SchemaRegistry::new();
        let mut outer = Schema::of_type("object");
        outer.properties.insert("inner".to_string(), Schema::reference("Inner"));
        registry.insert("Outer", outer);
        registry.insert("Inner", Schema::of_type("string"));

        let mut document = document_with(Schema::reference("Outer"));
        merge(&mut document, &registry);

        assert!(document.components.schemas.contains_key("Outer"));
        assert!(document.components.schemas.contains_key("Inner"));
    }

    #[test]
    fn pure_alias_is_collapsed_to_its_terminal_target() {
        let mut registry = SchemaRegistry::new();
        registry.insert("Alias", Schema::reference("Real"));
        registry.insert("Real", Schema::of_type("object"));

        let mut document = document_with(Schema::reference("Alias"));
        merge(&mut document, &registry);

        assert!(!document.components.schemas.contains_key("Alias"));
        assert!(document.components.schemas.contains_key("Real"));
        let rewritten = &document.paths["/users"]["get"].parameters[0].schema;
        assert_eq!(rewritten.ref_target(), Some("Real"));
    }

    #[test]
    fn object_with_properties_defaults_additional_properties_false() {
        let mut registry = SchemaRegistry::new();
        let mut object = Schema::of_type("object");
        object.properties.insert("id".to_string(), Schema::of_type("string"));
        registry.insert("UserDto", object);

        let mut document = document_with(Schema::reference("UserDto"));
        merge(&mut document, &registry);

        let merged = &document.components.schemas["UserDto"];
        assert_eq!(merged.additional_properties, Some(AdditionalProperties::Bool(false)));
        assert_eq!(merged.schema_type, Some(SchemaType::single("object")));
    }
}
