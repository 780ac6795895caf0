//! The annotation-derived declaration tree produced by C3/C4: modules,
//! controllers, methods, and their parameters.

use crate::typeref::TypeRef;

/// The identifier used to resolve a class declaration. When produced by the
/// source loader's symbol table it is a `file#ClassName` qualified id, unique
/// per declaration even when two files declare the same class name; built
/// directly (tests, fixtures constructed without a loaded project) it may
/// instead be a bare class name. Used as the identity for module-graph cycle
/// detection and controller de-duplication (§9: "deduplicate by class
/// identity, not by name").
pub type ClassId = String;

/// A class annotated as a module (`@Module`).
///
/// `imports` holds the [`ClassId`] of each imported module rather than a
/// nested [`ModuleDecl`]: the module graph can contain cycles (forward
/// references), and a borrowed-tree representation would have to express
/// that with indirection anyway. The walker resolves ids against the set it
/// has already visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    /// This module's class identity.
    pub class_id: ClassId,
    /// Controllers declared directly in this module's `controllers` array,
    /// in source order.
    pub controllers: Vec<ClassId>,
    /// Imported modules, in source order, already resolved through
    /// identifiers, property access, and `forwardRef(() => X)` wrappers.
    pub imports: Vec<ClassId>,
}

/// A class annotated as a controller (`@Controller`).
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerDecl {
    /// Class identity.
    pub class_id: ClassId,
    /// Class name as written in source.
    pub name: String,
    /// Normalized route prefix: leading slash, no trailing slash, or `/`.
    pub route_prefix: String,
    /// Resolved `@ApiTags` arguments, or the class name with a trailing
    /// `Controller` segment removed.
    pub tags: Vec<String>,
    /// Controller-level security annotations (§4.7).
    pub security_requirements: Vec<SecurityReq>,
    /// HTTP handler methods, in source order.
    pub methods: Vec<MethodDecl>,
}

/// The HTTP verb a handler method responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `ALL` — matches any verb at this path.
    All,
}

impl HttpVerb {
    /// The lowercase OpenAPI operation key (`"get"`, `"post"`, …).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
            Self::All => "all",
        }
    }

    /// The default success status code when no `@ApiResponse` overrides it
    /// (§4.4): `201` for `POST`, `200` for everything else. `DELETE`
    /// returning `void` is special-cased to `204` by the caller, since that
    /// depends on the return type, not the verb alone.
    #[must_use]
    pub fn default_status(self) -> u16 {
        if matches!(self, Self::Post) {
            201
        } else {
            200
        }
    }
}

/// An HTTP handler method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Method name as written in source.
    pub name: String,
    /// Resolved HTTP verb.
    pub http_verb: HttpVerb,
    /// Normalized path segment (may be empty for the controller's bare
    /// prefix).
    pub path_segment: String,
    /// Bound parameters, in declaration order.
    pub parameters: Vec<Parameter>,
    /// Declared or annotated return type.
    pub return_type: TypeRef,
    /// Explicit `@ApiResponse` entries, keyed by status code. Entries here
    /// take precedence over the inferred response (§4.4).
    pub responses: Vec<ResponseDecl>,
    /// Every annotation name attached to this method (used by C8's
    /// exclude-by-annotation filter).
    pub annotation_names: Vec<String>,
    /// Method-level security annotations; when non-empty, they replace the
    /// controller's for this operation (§4.7).
    pub security_overrides: Option<Vec<SecurityReq>>,
    /// Free-text description, if any documentation annotation supplied one.
    pub description: Option<String>,
    /// Short summary, if any documentation annotation supplied one.
    pub summary: Option<String>,
    /// Defaults to `"{Controller}_{method}"` when not explicitly set by an
    /// `operationId`-bearing annotation.
    pub operation_id: String,
}

/// Where a bound parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// `@Param`
    Path,
    /// `@Query`
    Query,
    /// `@Body`
    Body,
    /// `@Headers`
    Header,
    /// `@Cookies`
    Cookie,
}

/// A single bound handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Binding source.
    pub kind: ParameterKind,
    /// Parameter name. For `inline`-expanded DTO parameters this is the
    /// DTO's own property name, not the handler argument name.
    pub name: String,
    /// Resolved type.
    pub type_ref: TypeRef,
    /// Whether the parameter is required (§4.4 precedence rules).
    pub required: bool,
    /// Free-text description from a documentation annotation.
    pub description: Option<String>,
    /// `true` when a nominal DTO type bound via `@Query`/`@Param` without an
    /// explicit name should have its properties expanded into individual
    /// parameters rather than referenced as one (§4.4, §8 scenario 4).
    pub inline: bool,
}

/// An explicit `@ApiResponse`-declared response for one status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDecl {
    /// HTTP status code.
    pub status: u16,
    /// Declared response body type, if any (absent ⇒ no `content`).
    pub type_ref: Option<TypeRef>,
    /// Free-text description.
    pub description: Option<String>,
}

/// One security requirement: a named scheme plus its required scopes
/// (empty for non-OAuth2 schemes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityReq {
    /// The security scheme name (matches a `components.securitySchemes`
    /// key).
    pub scheme: String,
    /// Required OAuth2 scopes, empty for other scheme types.
    pub scopes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_verb_default_status_is_201_for_post_else_200() {
        assert_eq!(HttpVerb::Post.default_status(), 201);
        assert_eq!(HttpVerb::Get.default_status(), 200);
        assert_eq!(HttpVerb::Delete.default_status(), 200);
    }

    #[test]
    fn http_verb_as_str_matches_openapi_operation_keys() {
        assert_eq!(HttpVerb::Get.as_str(), "get");
        assert_eq!(HttpVerb::Patch.as_str(), "patch");
    }
}
