//! The non-fatal diagnostic side channel (§3, §7) carried alongside a
//! successful pipeline result, separate from the fatal-error `Result`.

/// How serious a [`Diagnostic`] is. Neither variant is fatal — a fatal
/// condition is always a typed error, never a diagnostic (§7, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth surfacing to a human, but the pipeline produced a usable
    /// result despite it (e.g. an unresolvable module import was skipped).
    Warning,
    /// Informational: a decision was made on the caller's behalf and is
    /// worth recording (e.g. the "annotation wins" required-flag override,
    /// §9).
    Info,
}

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Stable short identifier, e.g. `"unresolved-module-import"`,
    /// `"missing-schema"`, `"required-override"`. Intended to be matched on
    /// by CI tooling, not just read by humans.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Source file the finding relates to, if known.
    pub file: Option<String>,
}

impl Diagnostic {
    /// Builds a [`Severity::Warning`] diagnostic.
    #[must_use]
    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            file: None,
        }
    }

    /// Builds a [`Severity::Info`] diagnostic.
    #[must_use]
    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            file: None,
        }
    }

    /// Attaches a source file to this diagnostic.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_expected_severity() {
        let warning = Diagnostic::warning("unresolved-module-import", "skipped Foo");
        assert_eq!(warning.severity, Severity::Warning);

        let info = Diagnostic::info("required-override", "annotation wins");
        assert_eq!(info.severity, Severity::Info);
    }

    #[test]
    fn with_file_attaches_path() {
        let diag = Diagnostic::warning("missing-schema", "x").with_file("src/app.module.ts");
        assert_eq!(diag.file.as_deref(), Some("src/app.module.ts"));
    }
}
