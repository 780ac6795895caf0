//! Document emission (C14, ambient): pure serialization of an already
//! frozen [`OpenApiDocument`]. Never transforms shape — that's C10's job.

use oastatic_core::OpenApiDocument;

use crate::config::OutputFormatConfig;
use crate::error::Result;

/// Output encoding for [`emit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON, stable key order.
    Json,
    /// YAML.
    Yaml,
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(config: OutputFormatConfig) -> Self {
        match config {
            OutputFormatConfig::Json => Self::Json,
            OutputFormatConfig::Yaml => Self::Yaml,
        }
    }
}

/// Serializes `document` to `format`.
pub fn emit(document: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(document)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use oastatic_core::{Components, Info};

    fn empty_document() -> OpenApiDocument {
        OpenApiDocument {
            openapi: "3.0.3".to_string(),
            info: Info {
                title: "t".to_string(),
                version: "1".to_string(),
                description: None,
            },
            servers: vec![],
            tags: vec![],
            paths: IndexMap::new(),
            components: Components::default(),
            security: None,
        }
    }

    #[test]
    fn json_output_is_pretty_printed_and_parses_back() {
        let rendered = emit(&empty_document(), OutputFormat::Json).unwrap();
        assert!(rendered.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["openapi"], "3.0.3");
    }

    #[test]
    fn yaml_output_parses_back() {
        let rendered = emit(&empty_document(), OutputFormat::Yaml).unwrap();
        let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&rendered).unwrap();
        assert_eq!(parsed["openapi"].as_str(), Some("3.0.3"));
    }
}
