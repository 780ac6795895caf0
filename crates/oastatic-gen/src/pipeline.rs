//! The pipeline driver (C12): runs load → walk → extract → compile →
//! filter → security → merge → transform → validate in a fixed order,
//! aggregating non-fatal [`Diagnostic`]s alongside the result.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use oastatic_core::{
    Components, Diagnostic, HttpVerb, Info, MediaType, OpenApiDocument, Operation,
    OperationParameter, ParamLocation, Parameter, ParameterKind, RequestBody, ResponseEntry,
    Schema, SchemaRegistry, SecurityRequirement, SecurityScheme, ServerEntry, Tag, TypeRef,
};

use crate::config::{OptionsConfig, ProjectConfig, QueryStyle, SecuritySchemeConfig};
use crate::error::{Error, Result};
use crate::source::loader::{load, LoadOptions};
use crate::source::SourceProject;
use crate::{extract, filter, merge, security, typecompile, validate, version, walk};

/// The result of a successful generation run: the emitted document plus
/// every non-fatal finding collected along the way (§3 `Diagnostic`).
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    /// The fully-resolved, version-transformed document.
    pub document: OpenApiDocument,
    /// Non-fatal findings from C3 (unresolved module imports) and C11
    /// (broken references).
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the full pipeline for `config`, resolving relative paths under
/// `project_root`.
pub fn generate(config: &ProjectConfig, project_root: &Path) -> Result<GenerateOutcome> {
    let span = tracing::info_span!("generate");
    let _enter = span.enter();

    let project = load_project(config, project_root)?;
    tracing::info!(files = project.files.len(), "loaded source project");

    let mut diagnostics = Vec::new();
    let controllers = discover_controllers(config, &project, &mut diagnostics)?;
    tracing::info!(controllers = controllers.len(), "extracted controllers");

    let mut registry = SchemaRegistry::new();
    let mut document = build_document(&controllers, config, &project, &mut registry)?;
    tracing::info!(operations = document.paths.len(), "built operations");

    merge::merge(&mut document, &registry);
    version::transform(&mut document, config.openapi.version);

    for broken in validate::validate(&document, &config.options.allow_missing_schemas) {
        diagnostics.push(Diagnostic::warning(
            "missing-schema",
            format!("unresolved $ref to `{}` ({:?})", broken.missing, broken.reason),
        ));
    }
    tracing::info!(diagnostics = diagnostics.len(), "generation complete");

    Ok(GenerateOutcome { document, diagnostics })
}

fn load_project(config: &ProjectConfig, project_root: &Path) -> Result<SourceProject> {
    let span = tracing::info_span!("load");
    let _enter = span.enter();
    load(&LoadOptions {
        project_root: project_root.to_path_buf(),
        tsconfig: PathBuf::from(&config.files.tsconfig),
        entrypoints: config.files.entry.iter().map(PathBuf::from).collect(),
        extra_globs: config.files.dto_glob.clone(),
    })
}

/// Walks the module graph from every configured entry and extracts a
/// [`oastatic_core::ControllerDecl`] for each distinct controller class
/// reached, in entry/module/source order, de-duplicated by class identity.
fn discover_controllers(
    config: &ProjectConfig,
    project: &SourceProject,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<oastatic_core::ControllerDecl>> {
    let span = tracing::info_span!("walk");
    let _enter = span.enter();

    let mut controller_ids = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for entry in &config.files.entry {
        let Some(root_class) = find_root_module_class(project, entry) else {
            return Err(Error::EntryClassNotFound {
                path: entry.clone(),
                class_name: "<@Module class>".to_string(),
            });
        };
        let (modules, module_diagnostics) = walk::walk(&root_class, project);
        diagnostics.extend(module_diagnostics);
        for module in &modules {
            for controller_id in &module.controllers {
                if seen.insert(controller_id.clone()) {
                    controller_ids.push(controller_id.clone());
                }
            }
        }
    }

    Ok(extract::extract_controllers(&controller_ids, project))
}

/// Finds the single top-level class declared in `entry_path` that carries
/// an `@Module` annotation — the root of that entry's module graph.
fn find_root_module_class(project: &SourceProject, entry_path: &str) -> Option<String> {
    let normalized = entry_path.trim_start_matches("./");
    project
        .declaration_names()
        .map(str::to_string)
        .find(|name| {
            let Some((file, decl_ref)) = project.declaration(name) else {
                return false;
            };
            if file.path != normalized {
                return false;
            }
            let Some(node) = project.declaration_node(decl_ref) else {
                return false;
            };
            file.annotations_of(node).iter().any(|a| a.name == "Module")
        })
}

fn build_document(
    controllers: &[oastatic_core::ControllerDecl],
    config: &ProjectConfig,
    project: &SourceProject,
    registry: &mut SchemaRegistry,
) -> Result<OpenApiDocument> {
    let mut paths = IndexMap::new();
    let mut derived_tags: Vec<String> = Vec::new();

    for controller in controllers {
        for name in &controller.tags {
            if !derived_tags.contains(name) {
                derived_tags.push(name.clone());
            }
        }

        for method in &controller.methods {
            if !filter::keep(method, &controller.route_prefix, &config.options)? {
                continue;
            }

            let route = extract::join_path(&config.options.base_path, &extract::join_path(&controller.route_prefix, &method.path_segment));
            let path_template = convert_path_params(&route);

            let operation = build_operation(controller, method, project, registry, &config.options, &config.openapi.security.global)?;

            let path_item = paths.entry(path_template).or_insert_with(IndexMap::new);
            path_item.insert(method.http_verb.as_str().to_string(), operation);
        }
    }

    let info = build_info(config);
    let servers = config
        .openapi
        .servers
        .iter()
        .map(|s| ServerEntry {
            url: s.url.clone(),
            description: s.description.clone(),
        })
        .collect();
    let tags = build_tags(config, &derived_tags);
    let security_schemes = build_security_schemes(&config.openapi.security.schemes);
    let top_level_security = if config.openapi.security.global.is_empty() {
        None
    } else {
        Some(
            config
                .openapi
                .security
                .global
                .iter()
                .map(|g| {
                    let mut req = SecurityRequirement::new();
                    req.insert(g.scheme.clone(), g.scopes.clone());
                    req
                })
                .collect(),
        )
    };

    Ok(OpenApiDocument {
        openapi: config.openapi.version.as_str().to_string(),
        info,
        servers,
        tags,
        paths,
        components: Components {
            schemas: std::collections::BTreeMap::new(),
            security_schemes,
        },
        security: top_level_security,
    })
}

fn build_info(config: &ProjectConfig) -> Info {
    Info {
        title: config.openapi.info.title.clone().unwrap_or_else(|| "API".to_string()),
        version: config.openapi.info.version.clone().unwrap_or_else(|| "0.1.0".to_string()),
        description: config.openapi.info.description.clone(),
    }
}

fn build_tags(config: &ProjectConfig, derived: &[String]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = config
        .openapi
        .tags
        .iter()
        .map(|t| Tag {
            name: t.name.clone(),
            description: t.description.clone(),
        })
        .collect();
    for name in derived {
        if !tags.iter().any(|t| &t.name == name) {
            tags.push(Tag {
                name: name.clone(),
                description: None,
            });
        }
    }
    tags
}

fn build_security_schemes(schemes: &[SecuritySchemeConfig]) -> IndexMap<String, SecurityScheme> {
    schemes
        .iter()
        .map(|s| {
            let scheme = match s.scheme_type.as_str() {
                "apiKey" => SecurityScheme::ApiKey {
                    name: s.param_name.clone().unwrap_or_default(),
                    location: parse_param_location(s.location.as_deref().unwrap_or("header")),
                    description: s.description.clone(),
                },
                "oauth2" => SecurityScheme::OAuth2 {
                    description: s.description.clone(),
                },
                _ => SecurityScheme::Http {
                    scheme: s.scheme.clone().unwrap_or_else(|| "bearer".to_string()),
                    bearer_format: None,
                    description: s.description.clone(),
                },
            };
            (s.name.clone(), scheme)
        })
        .collect()
}

fn parse_param_location(value: &str) -> ParamLocation {
    match value {
        "query" => ParamLocation::Query,
        "cookie" => ParamLocation::Cookie,
        _ => ParamLocation::Header,
    }
}

/// Rewrites framework-native `:name` path segments to OpenAPI `{name}`
/// form (§4.4, §6).
fn convert_path_params(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn build_operation(
    controller: &oastatic_core::ControllerDecl,
    method: &oastatic_core::MethodDecl,
    project: &SourceProject,
    registry: &mut SchemaRegistry,
    options: &OptionsConfig,
    global_security: &[crate::config::SecurityReqConfig],
) -> Result<Operation> {
    let body_params: Vec<&Parameter> = method.parameters.iter().filter(|p| p.kind == ParameterKind::Body).collect();
    if body_params.len() > 1 {
        return Err(Error::InvalidHandler {
            controller: controller.name.clone(),
            method: method.name.clone(),
            reason: "multiple @Body parameters".to_string(),
        });
    }

    let mut parameters = Vec::new();
    for param in method.parameters.iter().filter(|p| p.kind != ParameterKind::Body) {
        parameters.extend(build_parameters(param, project, registry, options));
    }

    let request_body = body_params.first().map(|param| {
        let schema = typecompile::compile(&param.type_ref, project, registry);
        let mut content = IndexMap::new();
        content.insert("application/json".to_string(), MediaType { schema });
        RequestBody {
            required: param.required,
            content,
        }
    });

    let responses = build_responses(method, project, registry);
    let security = security::effective_security(controller, method, global_security);

    let operation_id = if method.operation_id == method.name {
        format!("{}_{}", controller.name, method.name)
    } else {
        method.operation_id.clone()
    };

    Ok(Operation {
        operation_id,
        tags: controller.tags.clone(),
        summary: method.summary.clone(),
        description: method.description.clone(),
        parameters,
        request_body,
        responses,
        security,
    })
}

fn build_parameters(
    param: &Parameter,
    project: &SourceProject,
    registry: &mut SchemaRegistry,
    options: &OptionsConfig,
) -> Vec<OperationParameter> {
    let location = match param.kind {
        ParameterKind::Path => ParamLocation::Path,
        ParameterKind::Query => ParamLocation::Query,
        ParameterKind::Header => ParamLocation::Header,
        ParameterKind::Cookie => ParamLocation::Cookie,
        ParameterKind::Body => unreachable!("body parameters are handled separately"),
    };

    let wants_ref = param.kind == ParameterKind::Query && options.query.style == QueryStyle::Ref;
    if param.inline && !wants_ref {
        if let TypeRef::Named { qualified_id, type_args } = &param.type_ref {
            if let Some(object) = typecompile::resolve_class_object(qualified_id, type_args, project, registry) {
                return object
                    .properties
                    .iter()
                    .map(|(name, schema)| OperationParameter {
                        name: name.clone(),
                        location,
                        required: object.required.contains(name),
                        description: schema.description.clone(),
                        schema: schema.clone(),
                    })
                    .collect();
            }
        }
    }

    let schema = typecompile::compile(&param.type_ref, project, registry);
    vec![OperationParameter {
        name: param.name.clone(),
        location,
        required: param.required,
        description: param.description.clone(),
        schema,
    }]
}

fn build_responses(
    method: &oastatic_core::MethodDecl,
    project: &SourceProject,
    registry: &mut SchemaRegistry,
) -> IndexMap<String, ResponseEntry> {
    let mut responses = IndexMap::new();

    if method.responses.is_empty() {
        let status = if method.http_verb == HttpVerb::Delete && method.return_type.is_void() {
            204
        } else {
            method.http_verb.default_status()
        };
        let content = response_content(&method.return_type, project, registry);
        responses.insert(
            status.to_string(),
            ResponseEntry {
                description: default_status_description(status).to_string(),
                content,
            },
        );
        return responses;
    }

    for decl in &method.responses {
        let content = decl.type_ref.as_ref().map(|type_ref| {
            let schema = typecompile::compile(type_ref, project, registry);
            let mut content = IndexMap::new();
            content.insert("application/json".to_string(), MediaType { schema });
            content
        });
        responses.insert(
            decl.status.to_string(),
            ResponseEntry {
                description: decl.description.clone().unwrap_or_else(|| default_status_description(decl.status).to_string()),
                content,
            },
        );
    }
    responses
}

fn response_content(
    return_type: &TypeRef,
    project: &SourceProject,
    registry: &mut SchemaRegistry,
) -> Option<IndexMap<String, MediaType>> {
    if return_type.is_void() {
        return None;
    }
    let schema = if return_type.is_permissive() {
        Schema::permissive()
    } else {
        typecompile::compile(return_type, project, registry)
    };
    let mut content = IndexMap::new();
    content.insert("application/json".to_string(), MediaType { schema });
    Some(content)
}

fn default_status_description(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Response",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_path_params_rewrites_colon_segments() {
        assert_eq!(convert_path_params("/users/:id/posts/:postId"), "/users/{id}/posts/{postId}");
        assert_eq!(convert_path_params("/users"), "/users");
    }

    struct TempProject {
        root: PathBuf,
    }

    impl TempProject {
        fn new(id: &str) -> Self {
            let root = std::env::temp_dir().join(format!("oastatic-pipeline-test-{id}-{}", std::process::id()));
            std::fs::create_dir_all(root.join("src")).unwrap();
            std::fs::write(root.join("tsconfig.json"), "{}").unwrap();
            Self { root }
        }

        fn write(&self, relative: &str, contents: &str) -> &Self {
            let path = self.root.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
            self
        }
    }

    impl Drop for TempProject {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    fn minimal_config(entry: &str) -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.files.entry = vec![entry.to_string()];
        config.files.tsconfig = "tsconfig.json".to_string();
        config
    }

    #[test]
    fn generates_a_document_for_a_minimal_controller() {
        let project = TempProject::new("minimal");
        project.write(
            "src/app.module.ts",
            "@Module({ controllers: [UsersController] })\nexport class AppModule {}\n",
        );
        project.write(
            "src/users.controller.ts",
            "@Controller('users')\nexport class UsersController {\n\
             @Get(':id')\nfindOne(@Param('id') id: string): string { return ''; }\n}\n",
        );

        let outcome = generate(&minimal_config("src/app.module.ts"), &project.root).unwrap();
        assert_eq!(outcome.document.openapi, "3.0.3");
        assert!(outcome.document.paths.contains_key("/users/{id}"));
        let operation = &outcome.document.paths["/users/{id}"]["get"];
        assert_eq!(operation.parameters[0].name, "id");
        assert!(operation.responses.contains_key("200"));
    }

    #[test]
    fn excluded_endpoint_does_not_appear_in_paths() {
        let project = TempProject::new("excluded");
        project.write(
            "src/app.module.ts",
            "@Module({ controllers: [UsersController] })\nexport class AppModule {}\n",
        );
        project.write(
            "src/users.controller.ts",
            "@Controller('users')\nexport class UsersController {\n\
             @Get('internal')\n@ApiExcludeEndpoint()\nfindInternal(): void {}\n}\n",
        );

        let outcome = generate(&minimal_config("src/app.module.ts"), &project.root).unwrap();
        assert!(outcome.document.paths.is_empty() || !outcome.document.paths.contains_key("/users/internal"));
    }

    #[test]
    fn missing_root_module_is_an_error() {
        let project = TempProject::new("missing-module");
        project.write("src/app.module.ts", "export class NotAModule {}\n");

        let result = generate(&minimal_config("src/app.module.ts"), &project.root);
        assert!(matches!(result, Err(Error::EntryClassNotFound { .. })));
    }
}
