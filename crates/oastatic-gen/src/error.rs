//! Typed error taxonomy (§7).
//!
//! Every fallible pipeline stage returns one of these variants rather than
//! panicking. Non-fatal findings go through
//! [`oastatic_core::Diagnostic`] instead — see [`crate::pipeline`].

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal pipeline error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Reading a source file or config file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A config file failed to parse as YAML, or a document failed to
    /// serialize to YAML (C14).
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A document failed to serialize to JSON (C14).
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A DTO glob pattern in `files.dtoGlob` was malformed.
    #[error(transparent)]
    Glob(#[from] glob::PatternError),

    /// `options.pathFilter` was not a valid regular expression.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// `files.tsconfig` was missing or could not be read (C1
    /// `ProjectInitError`).
    #[error("project config at {path} is missing or invalid: {reason}")]
    ProjectInit {
        /// Path to the tsconfig-like file that failed to load.
        path: String,
        /// Human-readable cause.
        reason: String,
    },

    /// An entry file named in `files.entry` does not exist (C1
    /// `EntryNotFoundError::fileNotFound`).
    #[error("entry file not found: {path}")]
    EntryFileNotFound {
        /// The missing path.
        path: String,
    },

    /// An entry file was found but does not declare the expected root
    /// module class (C1 `EntryNotFoundError::classNotFound`).
    #[error("entry module class `{class_name}` not found in {path}")]
    EntryClassNotFound {
        /// The file that was searched.
        path: String,
        /// The class name that was expected.
        class_name: String,
    },

    /// A handler declared more than one `@Body` parameter, or another
    /// structurally invalid annotation combination (C4 analysis error).
    #[error("invalid handler `{method}` on `{controller}`: {reason}")]
    InvalidHandler {
        /// Controller class name.
        controller: String,
        /// Method name.
        method: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An annotation argument that must resolve to a literal value could
    /// not be resolved (C4/C6 analysis error).
    #[error("could not resolve required annotation argument: {annotation} on {context}")]
    UnresolvableAnnotationArg {
        /// The annotation name.
        annotation: String,
        /// Where it was attached (e.g. `"UserDto.email"`).
        context: String,
    },

    /// Spec validation (C11) found broken references and
    /// `fail_on_broken_refs` was set.
    #[error("{0} broken schema reference(s) found")]
    BrokenReferences(usize),
}
