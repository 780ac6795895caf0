//! Shared data model for the `oastatic` static OpenAPI generation pipeline.
//!
//! This crate has no analysis logic of its own. It defines the intermediate
//! representation that the discovery and compilation stages in
//! `oastatic-gen` produce and consume: the annotation-derived declaration
//! tree ([`decl`]), the type-system intermediate form ([`typeref`]), the
//! emitted JSON Schema node ([`schema`]), the name-keyed registry of emitted
//! schemas ([`registry`]), the OpenAPI document tree ([`document`]), and the
//! non-fatal diagnostic side channel ([`diagnostic`]) threaded alongside a
//! generation result.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod decl;
pub mod diagnostic;
pub mod document;
pub mod registry;
pub mod schema;
pub mod typeref;

pub use decl::{
    ControllerDecl, HttpVerb, MethodDecl, ModuleDecl, Parameter, ParameterKind, ResponseDecl,
    SecurityReq,
};
pub use diagnostic::{Diagnostic, Severity};
pub use document::{
    Components, Info, MediaType, OpenApiDocument, Operation, OperationParameter, ParamLocation,
    PathItem, RequestBody, ResponseEntry, SecurityRequirement, SecurityScheme, ServerEntry, Tag,
};
pub use registry::{SchemaName, SchemaRegistry};
pub use schema::{AdditionalProperties, Schema, SchemaType};
pub use typeref::{PrimitiveKind, TypeRef, UtilityKind};
