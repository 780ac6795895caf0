//! The security extractor (C7): resolves the effective per-operation
//! `security` requirement set from controller/method annotations plus the
//! configured global requirement.

use oastatic_core::{ControllerDecl, MethodDecl, SecurityReq, SecurityRequirement};

use crate::config::SecurityReqConfig;

/// The effective `security` array for one operation, or `None` when neither
/// the operation, its controller, nor the global config declares anything
/// (§4.7 rule 5).
#[must_use]
pub fn effective_security(
    controller: &ControllerDecl,
    method: &MethodDecl,
    global: &[SecurityReqConfig],
) -> Option<Vec<SecurityRequirement>> {
    let own_reqs: &[SecurityReq] = method
        .security_overrides
        .as_deref()
        .unwrap_or(&controller.security_requirements);

    if own_reqs.is_empty() && global.is_empty() {
        return None;
    }

    let own_requirement = merge_and(own_reqs);

    if global.is_empty() {
        return Some(vec![own_requirement]);
    }

    if own_reqs.is_empty() {
        return Some(global.iter().map(global_requirement).collect());
    }

    // Cross-product: each global OR alternative ANDed with the operation's
    // own requirement (§4.7 rule 4).
    Some(
        global
            .iter()
            .map(|g| {
                let mut combined = global_requirement(g);
                combined.extend(own_requirement.clone());
                combined
            })
            .collect(),
    )
}

/// ANDs every requirement in `reqs` into a single requirement object —
/// multiple schemes declared at the same layer merge rather than producing
/// separate OR alternatives (§4.7 rule 3).
fn merge_and(reqs: &[SecurityReq]) -> SecurityRequirement {
    let mut merged = SecurityRequirement::new();
    for req in reqs {
        merged.insert(req.scheme.clone(), req.scopes.clone());
    }
    merged
}

fn global_requirement(config: &SecurityReqConfig) -> SecurityRequirement {
    let mut requirement = SecurityRequirement::new();
    requirement.insert(config.scheme.clone(), config.scopes.clone());
    requirement
}

#[cfg(test)]
mod tests {
    use super::*;
    use oastatic_core::HttpVerb;

    fn controller_with(security_requirements: Vec<SecurityReq>) -> ControllerDecl {
        ControllerDecl {
            class_id: "UsersController".to_string(),
            name: "UsersController".to_string(),
            route_prefix: "users".to_string(),
            tags: vec!["Users".to_string()],
            security_requirements,
            methods: Vec::new(),
        }
    }

    fn method_with(security_overrides: Option<Vec<SecurityReq>>) -> MethodDecl {
        MethodDecl {
            name: "list".to_string(),
            http_verb: HttpVerb::Get,
            path_segment: String::new(),
            parameters: Vec::new(),
            return_type: oastatic_core::TypeRef::any(),
            responses: Vec::new(),
            annotation_names: Vec::new(),
            security_overrides,
            description: None,
            summary: None,
            operation_id: "list".to_string(),
        }
    }

    #[test]
    fn no_security_anywhere_emits_none() {
        let controller = controller_with(vec![]);
        let method = method_with(None);
        assert_eq!(effective_security(&controller, &method, &[]), None);
    }

    #[test]
    fn method_override_replaces_controller_requirements() {
        let controller = controller_with(vec![SecurityReq {
            scheme: "apiKey".to_string(),
            scopes: vec![],
        }]);
        let method = method_with(Some(vec![SecurityReq {
            scheme: "bearer".to_string(),
            scopes: vec![],
        }]));
        let security = effective_security(&controller, &method, &[]).unwrap();
        assert_eq!(security.len(), 1);
        assert!(security[0].contains_key("bearer"));
        assert!(!security[0].contains_key("apiKey"));
    }

    #[test]
    fn multiple_schemes_at_same_layer_and_into_one_object() {
        let controller = controller_with(vec![]);
        let method = method_with(Some(vec![
            SecurityReq {
                scheme: "bearer".to_string(),
                scopes: vec![],
            },
            SecurityReq {
                scheme: "apiKey".to_string(),
                scopes: vec![],
            },
        ]));
        let security = effective_security(&controller, &method, &[]).unwrap();
        assert_eq!(security.len(), 1);
        assert_eq!(security[0].len(), 2);
    }

    #[test]
    fn global_requirement_cross_products_with_operation_requirement() {
        let controller = controller_with(vec![]);
        let method = method_with(Some(vec![SecurityReq {
            scheme: "bearer".to_string(),
            scopes: vec![],
        }]));
        let global = vec![
            SecurityReqConfig {
                scheme: "apiKey".to_string(),
                scopes: vec![],
            },
            SecurityReqConfig {
                scheme: "basicAuth".to_string(),
                scopes: vec![],
            },
        ];
        let security = effective_security(&controller, &method, &global).unwrap();
        assert_eq!(security.len(), 2);
        assert!(security.iter().all(|req| req.contains_key("bearer")));
        assert!(security[0].contains_key("apiKey") || security[0].contains_key("basicAuth"));
    }

    #[test]
    fn global_only_with_no_operation_requirement_is_passed_through() {
        let controller = controller_with(vec![]);
        let method = method_with(None);
        let global = vec![SecurityReqConfig {
            scheme: "apiKey".to_string(),
            scopes: vec![],
        }];
        let security = effective_security(&controller, &method, &global).unwrap();
        assert_eq!(security, vec![global_requirement(&global[0])]);
    }
}
