//! Shared foundational types used across the placement-and-routing workspace.
//!
//! This crate provides the `Result`/error type used by fallible internal
//! operations and a small integer-point type shared by the placement grid
//! and the routing grid.

#![warn(missing_docs)]

pub mod point;
pub mod result;

pub use point::Point;
pub use result::{InternalError, PnrResult};
