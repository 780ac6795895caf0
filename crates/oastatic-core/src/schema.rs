//! The emitted JSON Schema node ([`Schema`]), OpenAPI-flavored.
//!
//! This is the output side of the type compiler (C5): every [`TypeRef`](crate::TypeRef)
//! is eventually compiled into one of these, either inline or registered
//! under a name in the [`SchemaRegistry`](crate::SchemaRegistry).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `type` field of a schema: a single JSON Schema type name in 3.0.3, or
/// an array including `"null"` in 3.1.0/3.2.0 (§4.10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// A single type name (`"string"`, `"object"`, …).
    Single(String),
    /// Multiple type names, used post-3.1 in place of `nullable: true`.
    Multiple(Vec<String>),
}

impl SchemaType {
    /// Builds a [`SchemaType::Single`] from a string-like value.
    pub fn single(name: impl Into<String>) -> Self {
        Self::Single(name.into())
    }

    /// The base type name, ignoring any `"null"` member of a type array.
    #[must_use]
    pub fn base(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name),
            Self::Multiple(names) => names.iter().find(|n| n.as_str() != "null").map(String::as_str),
        }
    }

    /// `true` if this type already includes `"null"` as a member.
    #[must_use]
    pub fn includes_null(&self) -> bool {
        matches!(self, Self::Multiple(names) if names.iter().any(|n| n == "null"))
    }
}

/// The value of `additionalProperties`: either a boolean toggle or a schema
/// constraining the values of any extra properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `additionalProperties: true|false`.
    Bool(bool),
    /// `additionalProperties: <schema>` (e.g. `Record<K, V>`, §4.5).
    Schema(Box<Schema>),
}

/// An OpenAPI-flavored JSON Schema node.
///
/// Fields are optional/empty-skipped on serialization so that a minimal
/// schema (e.g. `{"$ref": "..."}`) round-trips without acquiring stray
/// keys — this is what makes the alias-schema invariant in §4.9 checkable
/// by looking at which fields are `Some`/non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// `$ref` — mutually exclusive with every other field in well-formed
    /// output, though the registry briefly allows `$ref` + `description`
    /// during alias construction (§4.9).
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,

    /// `type`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// `format` (`date-time`, `uuid`, `email`, …).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// `nullable` — OpenAPI 3.0.3 only; absent in 3.1+ output (§4.10).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// `enum`.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enum_values: Vec<Value>,

    /// `const` — used for discriminant literals (§4.5).
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    /// `properties`, preserving declaration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub properties: IndexMap<String, Schema>,

    /// `required`.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,

    /// `items` — the element schema of an array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// `prefixItems` — positional tuple element schemas.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub prefix_items: Vec<Schema>,

    /// `minItems`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    /// `maxItems`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    /// `oneOf`.
    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty", default)]
    pub one_of: Vec<Schema>,

    /// `anyOf` — used for undiscriminated unions of objects (§4.5, §9).
    #[serde(rename = "anyOf", skip_serializing_if = "Vec::is_empty", default)]
    pub any_of: Vec<Schema>,

    /// `allOf` — used for intersections.
    #[serde(rename = "allOf", skip_serializing_if = "Vec::is_empty", default)]
    pub all_of: Vec<Schema>,

    /// `additionalProperties`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    /// `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `default`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// `example`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// `minLength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// `maxLength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// `pattern`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// `minimum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// `maximum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// `exclusiveMinimum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,

    /// `exclusiveMaximum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,

    /// `writeOnly` — annotated onto secret-shaped request fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    /// `readOnly` — annotated onto server-assigned response fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

impl Schema {
    /// Builds a bare `{"$ref": "#/components/schemas/<name>"}` schema.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self {
            ref_: Some(format!("#/components/schemas/{name}")),
            ..Self::default()
        }
    }

    /// Builds a schema with just a `type`.
    #[must_use]
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            schema_type: Some(SchemaType::single(type_name)),
            ..Self::default()
        }
    }

    /// The empty schema `{}`, used for `any`/`unknown` (§4.5).
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }

    /// An entry is a pure alias if its only populated fields are `$ref` and
    /// optionally `description` (§4.9, §8 invariant).
    #[must_use]
    pub fn is_pure_alias(&self) -> bool {
        self.ref_.is_some() && *self == self.alias_shape()
    }

    fn alias_shape(&self) -> Self {
        Self {
            ref_: self.ref_.clone(),
            description: self.description.clone(),
            ..Self::default()
        }
    }

    /// The target name of a `$ref` of the form
    /// `#/components/schemas/<name>`, if this schema has one.
    #[must_use]
    pub fn ref_target(&self) -> Option<&str> {
        self.ref_
            .as_deref()
            .and_then(|r| r.strip_prefix("#/components/schemas/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_alias_detected_with_and_without_description() {
        let bare = Schema::reference("UserDto");
        assert!(bare.is_pure_alias());

        let described = Schema {
            description: Some("alias of UserDto".to_string()),
            ..Schema::reference("UserDto")
        };
        assert!(described.is_pure_alias());

        let not_alias = Schema {
            nullable: Some(true),
            ..Schema::reference("UserDto")
        };
        assert!(!not_alias.is_pure_alias());
    }

    #[test]
    fn ref_target_strips_components_prefix() {
        let schema = Schema::reference("PaginatedResponse<UserDto>");
        assert_eq!(schema.ref_target(), Some("PaginatedResponse<UserDto>"));
    }

    #[test]
    fn schema_type_base_ignores_null_member() {
        let ty = SchemaType::Multiple(vec!["string".to_string(), "null".to_string()]);
        assert_eq!(ty.base(), Some("string"));
        assert!(ty.includes_null());
    }

    #[test]
    fn enum_schema_round_trips_without_stray_keys() {
        let schema = Schema {
            schema_type: Some(SchemaType::single("string")),
            enum_values: vec![
                Value::String("pending".to_string()),
                Value::String("shipped".to_string()),
                Value::String("delivered".to_string()),
            ],
            ..Schema::default()
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "string",
                "enum": ["pending", "shipped", "delivered"],
            })
        );
    }
}
