//! The filter pipeline (C8): predicates over [`MethodDecl`] that decide
//! whether an operation reaches the emitted document.

use oastatic_core::MethodDecl;
use regex::Regex;

use crate::config::OptionsConfig;
use crate::error::Result;
use crate::extract::join_path;

/// `true` if `method`, reached under `controller_prefix`, survives every
/// configured filter. Filters compose with AND (§4.8); an empty exclude set
/// and no path filter is the identity (everything passes).
pub fn keep(method: &MethodDecl, controller_prefix: &str, options: &OptionsConfig) -> Result<bool> {
    if excluded_by_annotation(method, &options.exclude_decorators) {
        return Ok(false);
    }
    if let Some(pattern) = &options.path_filter {
        let regex = Regex::new(pattern)?;
        let path = join_path(controller_prefix, &method.path_segment);
        if !regex.is_match(&path) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn excluded_by_annotation(method: &MethodDecl, exclude_decorators: &[String]) -> bool {
    method
        .annotation_names
        .iter()
        .any(|name| exclude_decorators.iter().any(|excluded| excluded == name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oastatic_core::HttpVerb;

    fn method_with(annotation_names: Vec<String>, path_segment: &str) -> MethodDecl {
        MethodDecl {
            name: "list".to_string(),
            http_verb: HttpVerb::Get,
            path_segment: path_segment.to_string(),
            parameters: Vec::new(),
            return_type: oastatic_core::TypeRef::any(),
            responses: Vec::new(),
            annotation_names,
            security_overrides: None,
            description: None,
            summary: None,
            operation_id: "list".to_string(),
        }
    }

    #[test]
    fn excluded_annotation_drops_the_method() {
        let options = OptionsConfig {
            exclude_decorators: vec!["ApiExcludeEndpoint".to_string()],
            ..default_options()
        };
        let method = method_with(vec!["Get".to_string(), "ApiExcludeEndpoint".to_string()], "");
        assert!(!keep(&method, "users", &options).unwrap());
    }

    #[test]
    fn path_filter_only_includes_matching_paths() {
        let options = OptionsConfig {
            path_filter: Some("^/v1/".to_string()),
            ..default_options()
        };
        let internal = method_with(vec!["Get".to_string()], "health");
        let versioned = method_with(vec!["Get".to_string()], "health");
        assert!(!keep(&internal, "internal", &options).unwrap());
        assert!(keep(&versioned, "v1/users", &options).unwrap());
    }

    #[test]
    fn no_filters_keeps_everything() {
        let options = default_options();
        let method = method_with(vec!["Get".to_string()], "");
        assert!(keep(&method, "users", &options).unwrap());
    }

    fn default_options() -> OptionsConfig {
        OptionsConfig {
            base_path: String::new(),
            exclude_decorators: Vec::new(),
            path_filter: None,
            extract_validation: true,
            query: crate::config::QueryOptions::default(),
            allow_missing_schemas: Vec::new(),
        }
    }
}
