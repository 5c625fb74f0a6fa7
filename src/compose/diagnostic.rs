//! Per-metric diagnostics.

use std::fmt;

use serde::Serialize;

use super::error::ComposeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A metric that produced no output, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The metric name.
    pub subject: String,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Diagnostic for a failed metric; skips are warnings, the rest errors.
    pub fn from_compose_error(metric: &str, err: &ComposeError) -> Self {
        match err {
            ComposeError::Unsupported { reason, .. } => Self::warning(metric, reason.to_string()),
            other => Self::error(metric, other.to_string()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.subject, self.message)
    }
}
