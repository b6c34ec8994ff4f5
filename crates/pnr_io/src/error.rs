//! Error types for netlist loading and document writing.

/// Errors that can occur while reading a netlist document or writing the
/// layout/routes output documents.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// An I/O error occurred while reading or writing a file.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The netlist document could not be parsed as JSON.
    #[error("failed to parse netlist: {0}")]
    Parse(#[from] serde_json::Error),
}
