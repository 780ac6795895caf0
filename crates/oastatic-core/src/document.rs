//! The emitted OpenAPI document tree (§3 `OpenApiDocument`).
//!
//! Assembled by C4–C7 from the declaration tree, then mutated in place by
//! C9 (merge), C10 (version transform), and inspected read-only by C11
//! (validate) before C14 serializes it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// The document root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// `"3.0.3"`, `"3.1.0"`, or `"3.2.0"`.
    pub openapi: String,
    /// `info`.
    pub info: Info,
    /// `servers`. Always present, may be empty (§6).
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    /// `tags`. Always present, may be empty (§6).
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// `paths`, in source-traversal order (§5): controllers in module
    /// order, methods in source order within a controller.
    pub paths: IndexMap<String, PathItem>,
    /// `components`.
    pub components: Components,
    /// Top-level `security`, present only when a global requirement or at
    /// least one operation-level requirement exists (§4.7 rule 5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// `info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// `title`.
    pub title: String,
    /// `version`.
    pub version: String,
    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of `servers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEntry {
    /// `url`.
    pub url: String,
    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of top-level `tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// `name`.
    pub name: String,
    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The operations available at one path template.
pub type PathItem = IndexMap<String, Operation>;

/// One operation (a verb under a path).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Operation {
    /// `operationId`.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// `tags`.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    /// `summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `parameters`.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<OperationParameter>,
    /// `requestBody`.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// `responses`, keyed by status code string, in insertion order.
    pub responses: IndexMap<String, ResponseEntry>,
    /// `security` — overrides the document-level default for this
    /// operation when present (including an explicit empty array for
    /// public endpoints, §4.7 rule 5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// Where an [`OperationParameter`] is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// `in: path`
    Path,
    /// `in: query`
    Query,
    /// `in: header`
    Header,
    /// `in: cookie`
    Cookie,
}

/// One entry of an operation's `parameters` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationParameter {
    /// `name`.
    pub name: String,
    /// `in`.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// `required`.
    pub required: bool,
    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `schema`.
    pub schema: Schema,
}

/// `requestBody`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// `required`.
    #[serde(default = "default_true")]
    pub required: bool,
    /// `content`, keyed by media type (always `application/json` for body
    /// DTOs in this pipeline, §4.4).
    pub content: IndexMap<String, MediaType>,
}

/// `{schema}` under a `content` media-type entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// `schema`.
    pub schema: Schema,
}

/// One entry of an operation's `responses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEntry {
    /// `description`.
    pub description: String,
    /// `content` — absent for `void` returns (§4.4, §8 scenario 5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// `components`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Components {
    /// `components.schemas`, serialized in sorted key order (§5).
    pub schemas: std::collections::BTreeMap<String, Schema>,
    /// `components.securitySchemes`.
    #[serde(
        rename = "securitySchemes",
        skip_serializing_if = "IndexMap::is_empty",
        default
    )]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// One entry of `components.securitySchemes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SecurityScheme {
    /// `type: http`.
    Http {
        /// `scheme` (`"bearer"`, `"basic"`).
        scheme: String,
        /// `bearerFormat`.
        #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
        /// `description`.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// `type: apiKey`.
    ApiKey {
        /// `name` — the header/query/cookie parameter name carrying the key.
        name: String,
        /// `in`.
        #[serde(rename = "in")]
        location: ParamLocation,
        /// `description`.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// `type: oauth2`. Flow details are out of scope for this pipeline;
    /// only the scheme's presence and name matter for security composition
    /// (§4.7).
    #[serde(rename = "oauth2")]
    OAuth2 {
        /// `description`.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// One alternative of a `security` array: AND of schemes within the object,
/// OR across array entries (§4.7, §9 glossary "Effective security").
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

fn default_true() -> bool {
    true
}
