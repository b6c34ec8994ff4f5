//! Common result and error types for the placement-and-routing workspace.

/// The standard result type for fallible internal operations.
///
/// `Ok` contains the result value, which may be a partial or degraded
/// outcome after best-effort recovery (e.g. a router that shipped with
/// residual overlaps). `Err` indicates a fatal structural problem with the
/// input netlist (missing sub-module, dangling reference) that the engine
/// cannot route around.
pub type PnrResult<T> = Result<T, InternalError>;

/// A fatal, non-recoverable error encountered while processing a netlist.
///
/// These correspond to the "fatal structural errors" of the error-handling
/// design: a missing module, an unresolvable MOS terminal, or a dangling
/// dotted reference. The message always names the offending module,
/// component, or net so the caller can report useful context.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct InternalError {
    /// Description of the error, including the offending name.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for InternalError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
