//! Static OpenAPI 3.x generation for decorator-based HTTP frameworks.
//!
//! Given a [`config::ProjectConfig`] pointing at a source tree, an entry
//! module, and a target OpenAPI version, [`pipeline::generate`] analyzes the
//! source without executing it and returns a fully-resolved
//! [`oastatic_core::OpenApiDocument`] plus any non-fatal
//! [`oastatic_core::Diagnostic`]s collected along the way.
//!
//! The pipeline is a fixed sequence of independently testable stages:
//!
//! 1. [`source`] — parse the project and build a queryable, symbol-resolved
//!    syntax tree (C1), and read annotations uniformly off any declaration
//!    (C2).
//! 2. [`walk`] — follow the `@Module` graph from the entry module to collect
//!    every reachable controller (C3).
//! 3. [`extract`] — turn each controller into routes, parameters, and
//!    response shapes (C4).
//! 4. [`typecompile`] — compile resolved types into JSON Schema (C5),
//!    folding in [`constraints`] (C6).
//! 5. [`security`] and [`filter`] — compute effective per-operation security
//!    (C7) and drop excluded operations (C8).
//! 6. [`merge`] — assemble `components.schemas` by reference closure and
//!    alias collapse (C9).
//! 7. [`version`] — rewrite the document for the target OpenAPI minor
//!    version (C10).
//! 8. [`validate`] — check for broken references before emission (C11).
//!
//! [`pipeline`] is the driver that runs all of the above in order (C12).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod constraints;
pub mod emit;
pub mod error;
pub mod extract;
pub mod filter;
pub mod merge;
pub mod pipeline;
pub mod security;
pub mod source;
pub mod typecompile;
mod typesyntax;
pub mod validate;
pub mod version;
pub mod walk;

pub use config::ProjectConfig;
pub use emit::{emit, OutputFormat};
pub use error::{Error, Result};
pub use pipeline::{generate, GenerateOutcome};
