//! Structured diagnostic messages with severity and naming context.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A single diagnostic emitted during placement or routing.
///
/// `context` names the module, net, or component the message concerns
/// (e.g. `"adder_1.A"` or `"module inv: mosfet m0"`), so that a warning or
/// fatal error is always traceable to a specific part of the design.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The message describing the issue.
    pub message: String,
    /// The module/net/component name this diagnostic concerns.
    pub context: String,
}

impl Diagnostic {
    /// Creates a new info diagnostic.
    pub fn info(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            context: context.into(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            context: context.into(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            context: context.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.context)
    }
}
