//! Fatal, structural errors produced while normalizing or routing a netlist.
//!
//! These correspond to the "fatal structural errors" category of the
//! error-handling design: conditions the engine cannot recover from or
//! route around, as opposed to warnings (reported through
//! [`pnr_diagnostics::DiagnosticSink`]) or best-effort outcomes (reported
//! but non-fatal).

/// A fatal error produced by the normalizer or net builder.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum PnrError {
    /// A sub-module instance references a module type with no known definition.
    #[error("sub-module instance `{instance}` has no definition for module `{module}`")]
    MissingSubModule {
        /// The instance name that references the missing module.
        instance: String,
        /// The module type name that could not be found.
        module: String,
    },

    /// A MOS device references a terminal name not present among its owner's components.
    #[error("mosfet `{mos}` in `{owner}` references undefined terminal `{terminal}`")]
    UndefinedMosTerminal {
        /// The sub-module that owns the offending MOS device.
        owner: String,
        /// The MOS device's name.
        mos: String,
        /// The terminal (port) name that could not be resolved.
        terminal: String,
    },

    /// A dotted endpoint does not resolve to an existing child component.
    #[error("endpoint `{endpoint}` in `{owner}` does not resolve to an existing component")]
    DanglingEndpoint {
        /// The sub-module in which the endpoint was referenced.
        owner: String,
        /// The unresolved dotted endpoint string.
        endpoint: String,
    },

    /// Forwarding through a sub-module boundary landed on a non-input/non-power terminal.
    #[error(
        "forwarding endpoint `{endpoint}` in `{owner}` resolves to non-input/non-power \
         terminal `{terminal}` of kind `{kind}`"
    )]
    InvalidForwardingTarget {
        /// The sub-module in which the forwarding was attempted.
        owner: String,
        /// The dotted endpoint being forwarded.
        endpoint: String,
        /// The terminal name the forwarding landed on.
        terminal: String,
        /// The kind of the terminal (expected `input` or `power`).
        kind: String,
    },

    /// The input netlist document could not be interpreted.
    #[error("malformed netlist input: {0}")]
    MalformedInput(String),
}

/// Result type for fallible normalizer/net-builder operations.
pub type PnrResult<T> = Result<T, PnrError>;
