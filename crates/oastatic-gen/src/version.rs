//! The version transformer (C10): rewrites the in-memory document between
//! the 3.0.3 `nullable` encoding and the 3.1+ `type` array encoding.
//!
//! Only the `openapi` field and these shape rewrites change; everything
//! else the earlier stages produced passes through untouched.

use oastatic_core::{OpenApiDocument, Schema, SchemaType};

use crate::config::OpenApiVersionConfig;

/// Rewrites `document` in place for `target`, setting `document.openapi` and
/// applying the nullable-encoding rewrite (§4.10) if `target` requires it.
pub fn transform(document: &mut OpenApiDocument, target: OpenApiVersionConfig) {
    document.openapi = target.as_str().to_string();
    if !target.uses_type_arrays() {
        return;
    }

    for schema in document.components.schemas.values_mut() {
        rewrite_nullable(schema);
    }
    for path_item in document.paths.values_mut() {
        for operation in path_item.values_mut() {
            for parameter in &mut operation.parameters {
                rewrite_nullable(&mut parameter.schema);
            }
            if let Some(body) = &mut operation.request_body {
                for media in body.content.values_mut() {
                    rewrite_nullable(&mut media.schema);
                }
            }
            for response in operation.responses.values_mut() {
                if let Some(content) = &mut response.content {
                    for media in content.values_mut() {
                        rewrite_nullable(&mut media.schema);
                    }
                }
            }
        }
    }
}

/// Recursively replaces `{type: "X", nullable: true}` with
/// `{type: ["X", "null"]}`, through every nested schema position.
fn rewrite_nullable(schema: &mut Schema) {
    if schema.nullable.take() == Some(true) {
        if let Some(SchemaType::Single(name)) = schema.schema_type.take() {
            schema.schema_type = Some(SchemaType::Multiple(vec![name, "null".to_string()]));
        }
    }

    if let Some(items) = &mut schema.items {
        rewrite_nullable(items);
    }
    for prefix_item in &mut schema.prefix_items {
        rewrite_nullable(prefix_item);
    }
    for property in schema.properties.values_mut() {
        rewrite_nullable(property);
    }
    for variant in schema.one_of.iter_mut().chain(schema.any_of.iter_mut()).chain(schema.all_of.iter_mut()) {
        rewrite_nullable(variant);
    }
    if let Some(oastatic_core::AdditionalProperties::Schema(inner)) = &mut schema.additional_properties {
        rewrite_nullable(inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use oastatic_core::{Components, Info, Operation, OperationParameter, ParamLocation, ResponseEntry};

    fn document_with(schema: Schema) -> OpenApiDocument {
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
                schema,
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
    fn v3_0_3_leaves_nullable_untouched() {
        let mut schema = Schema::of_type("string");
        schema.nullable = Some(true);
        let mut document = document_with(schema);
        transform(&mut document, OpenApiVersionConfig::V3_0_3);
        assert_eq!(document.openapi, "3.0.3");
        let rewritten = &document.paths["/users"]["get"].parameters[0].schema;
        assert_eq!(rewritten.nullable, Some(true));
    }

    #[test]
    fn v3_1_0_rewrites_nullable_into_type_array() {
        let mut schema = Schema::of_type("string");
        schema.nullable = Some(true);
        let mut document = document_with(schema);
        transform(&mut document, OpenApiVersionConfig::V3_1_0);
        assert_eq!(document.openapi, "3.1.0");
        let rewritten = &document.paths["/users"]["get"].parameters[0].schema;
        assert_eq!(rewritten.nullable, None);
        assert_eq!(rewritten.schema_type, Some(SchemaType::Multiple(vec!["string".to_string(), "null".to_string()])));
    }

    #[test]
    fn nested_nullable_in_properties_is_rewritten() {
        let mut inner = Schema::of_type("string");
        inner.nullable = Some(true);
        let mut object = Schema::of_type("object");
        object.properties.insert("note".to_string(), inner);

        let mut document = document_with(object);
        transform(&mut document, OpenApiVersionConfig::V3_2_0);

        let rewritten = &document.paths["/users"]["get"].parameters[0].schema;
        let note = &rewritten.properties["note"];
        assert_eq!(note.schema_type, Some(SchemaType::Multiple(vec!["string".to_string(), "null".to_string()])));
    }
}
