//! The spec validator (C11): walks the final document for `$ref`s that
//! don't resolve against `components.schemas`, categorizing what's missing.

use oastatic_core::{AdditionalProperties, OpenApiDocument, Schema};

const PRIMITIVE_LIKE_NAMES: &[&str] = &["string", "number", "integer", "boolean", "null", "any", "unknown", "object", "array"];

/// Why a referenced schema name was not found in `components.schemas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokenRefReason {
    /// The name is a primitive type name — a type leak from C5.
    PrimitiveLeak,
    /// The name contains `|`, indicating an unexpanded union.
    UnexpandedUnion,
    /// The name ends in `QueryParams`/`PathParams`/`Params` — missing DTO
    /// coverage.
    MissingParamsDto,
    /// No heuristic matched; a generic missing-schema finding.
    Missing,
}

/// One unresolved `$ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenRef {
    /// The missing schema name (the `$ref`'s target, without the
    /// `#/components/schemas/` prefix).
    pub missing: String,
    /// Why it's categorized this way.
    pub reason: BrokenRefReason,
}

/// Walks `document` for every `$ref` prefixed `#/components/schemas/` and
/// reports those whose target is absent from `components.schemas`, skipping
/// names in `allow_missing_schemas` entirely (§4.11, §9 decided open
/// question 1).
#[must_use]
pub fn validate(document: &OpenApiDocument, allow_missing_schemas: &[String]) -> Vec<BrokenRef> {
    let mut missing_names = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for schema in document.components.schemas.values() {
        collect_refs(schema, &mut missing_names, &mut seen);
    }
    for path_item in document.paths.values() {
        for operation in path_item.values() {
            for parameter in &operation.parameters {
                collect_refs(&parameter.schema, &mut missing_names, &mut seen);
            }
            if let Some(body) = &operation.request_body {
                for media in body.content.values() {
                    collect_refs(&media.schema, &mut missing_names, &mut seen);
                }
            }
            for response in operation.responses.values() {
                if let Some(content) = &response.content {
                    for media in content.values() {
                        collect_refs(&media.schema, &mut missing_names, &mut seen);
                    }
                }
            }
        }
    }

    missing_names
        .into_iter()
        .filter(|name| !document.components.schemas.contains_key(name))
        .filter(|name| !allow_missing_schemas.iter().any(|allowed| allowed == name))
        .map(|missing| {
            let reason = categorize(&missing);
            BrokenRef { missing, reason }
        })
        .collect()
}

fn categorize(name: &str) -> BrokenRefReason {
    if PRIMITIVE_LIKE_NAMES.contains(&name) {
        BrokenRefReason::PrimitiveLeak
    } else if name.contains('|') {
        BrokenRefReason::UnexpandedUnion
    } else if name.ends_with("QueryParams") || name.ends_with("PathParams") || name.ends_with("Params") {
        BrokenRefReason::MissingParamsDto
    } else {
        BrokenRefReason::Missing
    }
}

fn collect_refs(schema: &Schema, out: &mut Vec<String>, seen: &mut std::collections::HashSet<String>) {
    if let Some(target) = schema.ref_target() {
        if seen.insert(target.to_string()) {
            out.push(target.to_string());
        }
    }
    if let Some(items) = &schema.items {
        collect_refs(items, out, seen);
    }
    for prefix_item in &schema.prefix_items {
        collect_refs(prefix_item, out, seen);
    }
    for property in schema.properties.values() {
        collect_refs(property, out, seen);
    }
    for variant in schema.one_of.iter().chain(&schema.any_of).chain(&schema.all_of) {
        collect_refs(variant, out, seen);
    }
    if let Some(AdditionalProperties::Schema(inner)) = &schema.additional_properties {
        collect_refs(inner, out, seen);
    }
}
