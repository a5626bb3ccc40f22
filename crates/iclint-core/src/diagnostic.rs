//! Diagnostic value types and the rendered text contract.
//!
//! Every problem the linter finds becomes one [`Diagnostic`]. The rendered
//! form is consumed by editor integrations and CI greps, so it is a stable
//! contract:
//!
//! ```text
//! <path>:<line>: ERROR <message>
//! ```

use std::fmt;

use serde::Serialize;

/// How bad a diagnostic is.
///
/// Everything the linter reports today is an error; `Warning` is reserved
/// for future style checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
        }
    }
}

/// One reported issue: file, 1-based line, severity, message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    /// Create an error-level diagnostic.
    pub fn error(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {} {}", self.file, self.line, self.severity, self.message)
    }
}
