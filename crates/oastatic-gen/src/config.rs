//! The configuration contract (§6, C13).
//!
//! Every section implements [`Default`] and is `#[serde(default)]`, so a
//! minimal config naming only `files.entry` is valid; everything else falls
//! back to the documented default.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// A loaded project configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Where to write the emitted document. `None` means stdout.
    pub output: Option<String>,
    /// Emission format.
    pub format: OutputFormatConfig,
    /// Source file discovery.
    pub files: FilesConfig,
    /// OpenAPI document shaping.
    pub openapi: OpenApiConfig,
    /// Analysis behavior toggles.
    pub options: OptionsConfig,
}

/// `format`.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    /// `"json"` (default).
    #[default]
    Json,
    /// `"yaml"`.
    Yaml,
}

/// `files.*`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FilesConfig {
    /// One or more entry module files.
    pub entry: Vec<String>,
    /// Path to the TS-compiler-style project configuration.
    pub tsconfig: String,
    /// Extra globs eagerly added so DTOs outside the module graph still
    /// resolve (§4.1).
    #[serde(rename = "dtoGlob")]
    pub dto_glob: Vec<String>,
}

/// `openapi.*`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenApiConfig {
    /// Target OpenAPI version. Defaults to `"3.0.3"`.
    pub version: OpenApiVersionConfig,
    /// Overrides merged into the emitted `info` object.
    pub info: InfoOverrides,
    /// Passthrough `servers` entries.
    pub servers: Vec<ServerConfig>,
    /// Passthrough top-level `tags` entries, merged with tags derived from
    /// controllers.
    pub tags: Vec<TagConfig>,
    /// Security scheme declarations and global requirements.
    pub security: SecurityConfig,
}

/// The target OpenAPI minor version (§6).
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum OpenApiVersionConfig {
    /// `"3.0.3"`.
    #[serde(rename = "3.0.3")]
    V3_0_3,
    /// `"3.1.0"`.
    #[serde(rename = "3.1.0")]
    V3_1_0,
    /// `"3.2.0"`.
    #[serde(rename = "3.2.0")]
    V3_2_0,
}

impl Default for OpenApiVersionConfig {
    fn default() -> Self {
        Self::V3_0_3
    }
}

impl OpenApiVersionConfig {
    /// The literal `openapi` field value for this version.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V3_0_3 => "3.0.3",
            Self::V3_1_0 => "3.1.0",
            Self::V3_2_0 => "3.2.0",
        }
    }

    /// `true` for 3.1+, where `nullable` is replaced by a `type` array
    /// (§4.10).
    #[must_use]
    pub fn uses_type_arrays(self) -> bool {
        !matches!(self, Self::V3_0_3)
    }
}

/// `openapi.info` passthrough overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct InfoOverrides {
    /// `info.title`.
    pub title: Option<String>,
    /// `info.version`.
    pub version: Option<String>,
    /// `info.description`.
    pub description: Option<String>,
}

/// One `openapi.servers` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// `url`.
    pub url: String,
    /// `description`.
    #[serde(default)]
    pub description: Option<String>,
}

/// One `openapi.tags` passthrough entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TagConfig {
    /// `name`.
    pub name: String,
    /// `description`.
    #[serde(default)]
    pub description: Option<String>,
}

/// `openapi.security.*`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Declared security schemes, keyed by name.
    pub schemes: Vec<SecuritySchemeConfig>,
    /// Global security requirements composed with per-operation ones
    /// (§4.7 rule 4).
    pub global: Vec<SecurityReqConfig>,
}

/// One declared security scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct SecuritySchemeConfig {
    /// The scheme's name, as referenced from `SecurityReqConfig::scheme`.
    pub name: String,
    /// `"http"`, `"apiKey"`, or `"oauth2"`.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// For `http`: `"bearer"` or `"basic"`.
    #[serde(default)]
    pub scheme: Option<String>,
    /// For `apiKey`: the carrying parameter name.
    #[serde(default)]
    pub param_name: Option<String>,
    /// For `apiKey`: `"header"`, `"query"`, or `"cookie"`.
    #[serde(default)]
    pub location: Option<String>,
    /// `description`.
    #[serde(default)]
    pub description: Option<String>,
}

/// One global security requirement.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityReqConfig {
    /// Scheme name (matches a [`SecuritySchemeConfig::name`]).
    pub scheme: String,
    /// Required OAuth2 scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// `options.*`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Prefix prepended to every path.
    pub base_path: String,
    /// Annotation names whose presence excludes a method from the document
    /// (C8). Defaults include the framework's own "exclude from docs"
    /// annotation.
    pub exclude_decorators: Vec<String>,
    /// A regex; only paths matching are included (C8).
    pub path_filter: Option<String>,
    /// Whether to fold validation annotations into schemas (C6).
    pub extract_validation: bool,
    /// Query DTO expansion style.
    pub query: QueryOptions,
    /// Schema names C11 must not flag as broken even when absent from
    /// `components.schemas` (§9 decided open question 1).
    pub allow_missing_schemas: Vec<String>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            exclude_decorators: vec!["ApiExcludeEndpoint".to_string()],
            path_filter: None,
            extract_validation: true,
            query: QueryOptions::default(),
            allow_missing_schemas: vec!["Error".to_string(), "ErrorResponse".to_string()],
        }
    }
}

/// `options.query.*`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// `"inline"` (default, §8 scenario 4) or `"ref"`.
    pub style: QueryStyle,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            style: QueryStyle::Inline,
        }
    }
}

/// How a nominal DTO bound via `@Query` without an explicit name is
/// represented (§4.4, §8 scenario 4).
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryStyle {
    /// Expand each DTO property into its own query parameter.
    #[default]
    Inline,
    /// Emit a single parameter whose schema is a `$ref` to the DTO.
    Ref,
}

impl ProjectConfig {
    /// Loads and parses a project config from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_yaml_ng::from_str(&text)?;
        Ok(config)
    }
}
