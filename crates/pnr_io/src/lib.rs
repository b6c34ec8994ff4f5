//! Netlist loading and layout/routes document writing (§6's external
//! interfaces), kept separate from `pnr_core` so the core pipeline has no
//! direct filesystem dependency.

pub mod error;
pub mod loader;
pub mod writer;

pub use error::IoError;
pub use loader::{load_netlist, load_netlist_from_str};
pub use writer::{write_layout, write_routes};
