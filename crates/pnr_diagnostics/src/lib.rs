//! Structured diagnostics for the placement-and-routing pipeline.
//!
//! This crate provides [`Diagnostic`] messages with a severity and a free
//! text context (which module/net/component the message concerns), and the
//! thread-safe [`DiagnosticSink`] that accumulates them across a run. There
//! is no source-span concept here — inputs to this engine are already-
//! parsed netlist documents, not source text, so "where" is a name, not a
//! line/column.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;
