//! The controller/method extractor (C4): turns each controller class into
//! routes, bound parameters, and response shapes.

use oastatic_core::{
    ControllerDecl, HttpVerb, MethodDecl, Parameter, ParameterKind, ResponseDecl, SecurityReq,
};
use tree_sitter::Node;

use crate::source::{local_import_aliases, read_child_annotations, Annotation, SourceFile, SourceProject};
use crate::typesyntax::resolve_type;

const HTTP_VERB_ANNOTATIONS: &[(&str, HttpVerb)] = &[
    ("Get", HttpVerb::Get),
    ("Post", HttpVerb::Post),
    ("Put", HttpVerb::Put),
    ("Patch", HttpVerb::Patch),
    ("Delete", HttpVerb::Delete),
    ("Head", HttpVerb::Head),
    ("Options", HttpVerb::Options),
    ("All", HttpVerb::All),
];

const SECURITY_ANNOTATIONS: &[&str] = &[
    "ApiBearerAuth",
    "ApiBasicAuth",
    "ApiCookieAuth",
    "ApiSecurity",
    "ApiOAuth2",
];

/// Extracts a [`ControllerDecl`] for each distinct controller class id
/// reachable from the module graph.
#[must_use]
pub fn extract_controllers(class_ids: &[String], project: &SourceProject) -> Vec<ControllerDecl> {
    class_ids
        .iter()
        .filter_map(|class_id| extract_controller(class_id, project))
        .collect()
}

fn extract_controller(class_id: &str, project: &SourceProject) -> Option<ControllerDecl> {
    let (file, decl_ref) = project.declaration(class_id)?;
    let node = project.declaration_node(decl_ref)?;
    let annotations = file.annotations_of(node);
    let controller_annotation = annotations.iter().find(|a| a.name == "Controller")?;

    let route_prefix = normalize_path_segment(
        controller_annotation
            .first_string_arg(file)
            .unwrap_or_default()
            .as_str(),
    );
    let tags = annotations
        .iter()
        .find(|a| a.name == "ApiTags")
        .and_then(|a| a.first_array_literal(file))
        .unwrap_or_else(|| vec![default_tag(crate::source::class_display_name(class_id))]);

    let aliases = local_import_aliases(file);
    let security_requirements = security_reqs_from_annotations(&annotations, file);

    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let methods = body
        .named_children(&mut cursor)
        .filter(|m| m.kind() == "method_definition")
        .filter_map(|m| extract_method(m, file, &aliases))
        .collect();

    Some(ControllerDecl {
        class_id: class_id.to_string(),
        name: crate::source::class_display_name(class_id).to_string(),
        route_prefix,
        tags,
        security_requirements,
        methods,
    })
}

fn default_tag(class_name: &str) -> String {
    class_name
        .strip_suffix("Controller")
        .unwrap_or(class_name)
        .to_string()
}

fn extract_method(node: Node<'_>, file: &SourceFile, aliases: &std::collections::HashMap<String, String>) -> Option<MethodDecl> {
    let annotations = file.annotations_of(node);
    let (verb_annotation_name, http_verb) = HTTP_VERB_ANNOTATIONS
        .iter()
        .find_map(|(name, verb)| annotations.iter().find(|a| &a.name == name).map(|a| (a.name.clone(), *verb)))?;
    let verb_annotation = annotations.iter().find(|a| a.name == verb_annotation_name)?;

    let path_segment = normalize_path_segment(&verb_annotation.first_string_arg(file).unwrap_or_default());
    let name_node = node.child_by_field_name("name")?;
    let method_name = file.node_text(name_node).to_string();

    let parameters_node = node.child_by_field_name("parameters")?;
    let mut param_cursor = parameters_node.walk();
    let parameters: Vec<Parameter> = parameters_node
        .named_children(&mut param_cursor)
        .filter_map(|p| extract_parameter(p, file, aliases))
        .flatten()
        .collect();

    let declared_return = node
        .child_by_field_name("return_type")
        .and_then(|ann| ann.named_child(0))
        .map_or(oastatic_core::TypeRef::any(), |t| resolve_type(t, file, aliases, &[]))
        .unwrap_promise();

    let responses = annotations
        .iter()
        .filter(|a| a.name == "ApiResponse")
        .filter_map(|a| extract_response_decl(a, file, aliases))
        .collect();

    let annotation_names: Vec<String> = annotations.iter().map(|a| a.name.clone()).collect();
    let security_overrides = {
        let reqs = security_reqs_from_annotations(&annotations, file);
        if reqs.is_empty() {
            None
        } else {
            Some(reqs)
        }
    };

    let description = annotations
        .iter()
        .find(|a| a.name == "ApiOperation")
        .and_then(|a| a.first_object_literal(file))
        .and_then(|v| v.get("description").and_then(|d| d.as_str()).map(str::to_string));
    let summary = annotations
        .iter()
        .find(|a| a.name == "ApiOperation")
        .and_then(|a| a.first_object_literal(file))
        .and_then(|v| v.get("summary").and_then(|d| d.as_str()).map(str::to_string));

    let operation_id = annotations
        .iter()
        .find(|a| a.name == "ApiOperation")
        .and_then(|a| a.first_object_literal(file))
        .and_then(|v| v.get("operationId").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("{method_name}"));

    Some(MethodDecl {
        name: method_name,
        http_verb,
        path_segment,
        parameters,
        return_type: declared_return,
        responses,
        annotation_names,
        security_overrides,
        description,
        summary,
        operation_id,
    })
}

/// One formal parameter may expand into zero (unannotated), one (normal
/// binding), or many (inline DTO expansion, handled later by C5 — here we
/// just mark `inline: true` and let the type compiler do the expansion)
/// bound [`Parameter`]s.
fn extract_parameter(
    node: Node<'_>,
    file: &SourceFile,
    aliases: &std::collections::HashMap<String, String>,
) -> Option<Vec<Parameter>> {
    let annotations = read_child_annotations(node, file);
    let (kind, source_annotation) = PARAM_SOURCE_ANNOTATIONS
        .iter()
        .find_map(|(ann_name, kind)| annotations.iter().find(|a| &a.name == ann_name).map(|a| (*kind, a)))?;

    let pattern = node.child_by_field_name("pattern")?;
    let param_name = file.node_text(pattern).to_string();
    let explicit_name = source_annotation.first_string_arg(file);

    let declared_type = node
        .child_by_field_name("type")
        .and_then(|ann| ann.named_child(0))
        .map_or(oastatic_core::TypeRef::any(), |t| resolve_type(t, file, aliases, &[]));

    let optional_marker = node.kind() == "optional_parameter";
    let is_optional_annotated = annotations.iter().any(|a| a.name == "IsOptional");
    let union_with_undefined = matches!(&declared_type, oastatic_core::TypeRef::Union(members) if members.iter().any(|m| m.is_void()));
    let required_override = source_annotation
        .first_object_literal(file)
        .and_then(|v| v.get("required").and_then(|r| r.as_bool()));

    let mut required = !(optional_marker || is_optional_annotated || union_with_undefined);
    if let Some(override_value) = required_override {
        required = override_value;
    }

    let inline = explicit_name.is_none() && matches!(kind, ParameterKind::Query | ParameterKind::Path) && matches!(declared_type, oastatic_core::TypeRef::Named { .. });

    let description = source_annotation
        .first_object_literal(file)
        .and_then(|v| v.get("description").and_then(|d| d.as_str()).map(str::to_string));

    Some(vec![Parameter {
        kind,
        name: explicit_name.unwrap_or(param_name),
        type_ref: declared_type,
        required,
        description,
        inline,
    }])
}

const PARAM_SOURCE_ANNOTATIONS: &[(&str, ParameterKind)] = &[
    ("Param", ParameterKind::Path),
    ("Query", ParameterKind::Query),
    ("Body", ParameterKind::Body),
    ("Headers", ParameterKind::Header),
    ("Cookies", ParameterKind::Cookie),
];

fn extract_response_decl(
    annotation: &Annotation<'_>,
    file: &SourceFile,
    aliases: &std::collections::HashMap<String, String>,
) -> Option<ResponseDecl> {
    let obj = annotation.first_object_literal(file)?;
    let status = obj.get("status").and_then(serde_json::Value::as_u64).unwrap_or(200) as u16;
    let description = obj.get("description").and_then(|d| d.as_str()).map(str::to_string);
    let type_ref = annotation.args.and_then(|args| {
        let mut cursor = args.walk();
        let result = args.children(&mut cursor).find_map(|c| {
            if c.kind() != "object" {
                return None;
            }
            let mut pair_cursor = c.walk();
            let result = c.children(&mut pair_cursor).find_map(|pair| {
                if pair.kind() != "pair" {
                    return None;
                }
                let key = pair.child_by_field_name("key")?;
                if file.node_text(key).trim_matches(['\'', '"']) != "type" {
                    return None;
                }
                let value = pair.child_by_field_name("value")?;
                Some(resolve_type(value, file, aliases, &[]))
            });
            result
        });
        result
    });

    Some(ResponseDecl {
        status,
        type_ref,
        description,
    })
}

fn security_reqs_from_annotations(annotations: &[Annotation<'_>], file: &SourceFile) -> Vec<SecurityReq> {
    annotations
        .iter()
        .filter(|a| SECURITY_ANNOTATIONS.contains(&a.name.as_str()))
        .map(|a| {
            if a.name == "ApiOAuth2" {
                let scopes = a.first_array_literal(file).unwrap_or_default();
                let scheme = a
                    .args
                    .and_then(|args| {
                        let mut cursor = args.walk();
                        let result = args
                            .children(&mut cursor)
                            .filter(|c| matches!(c.kind(), "string" | "template_string"))
                            .nth(0)
                            .map(|n| file.node_text(n).trim_matches(['\'', '"', '`']).to_string());
                        result
                    })
                    .unwrap_or_else(|| "oauth2".to_string());
                SecurityReq { scheme, scopes }
            } else {
                let scheme = a.first_string_arg(file).unwrap_or_else(|| default_scheme_name(&a.name));
                SecurityReq { scheme, scopes: Vec::new() }
            }
        })
        .collect()
}

fn default_scheme_name(annotation_name: &str) -> String {
    match annotation_name {
        "ApiBearerAuth" => "bearer".to_string(),
        "ApiBasicAuth" => "basic".to_string(),
        "ApiCookieAuth" => "cookie".to_string(),
        other => other.to_string(),
    }
}

/// Joins a controller prefix and method path segment into a normalized
/// route template: leading slash, no trailing slash, collapsed slashes.
#[must_use]
pub fn join_path(controller_prefix: &str, method_path: &str) -> String {
    let joined = format!("{controller_prefix}/{method_path}");
    let mut collapsed = String::with_capacity(joined.len());
    let mut last_was_slash = false;
    for c in joined.chars() {
        if c == '/' {
            if last_was_slash {
                continue;
            }
            last_was_slash = true;
        } else {
            last_was_slash = false;
        }
        collapsed.push(c);
    }
    let trimmed = collapsed.trim_end_matches('/');
    let with_leading = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    if with_leading.is_empty() {
        "/".to_string()
    } else {
        with_leading
    }
}

fn normalize_path_segment(segment: &str) -> String {
    segment.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_collapses_slashes_and_trims_trailing() {
        assert_eq!(join_path("/users/", "/:id/"), "/users/:id");
        assert_eq!(join_path("users", ""), "/users");
        assert_eq!(join_path("", ""), "/");
    }

    #[test]
    fn default_tag_strips_controller_suffix() {
        assert_eq!(default_tag("UsersController"), "Users");
        assert_eq!(default_tag("Orders"), "Orders");
    }
}
