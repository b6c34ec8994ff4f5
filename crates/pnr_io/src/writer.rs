//! Layout/routes document writing.

use crate::error::IoError;
use pnr_core::emit::{LayoutNode, RoutesNode};
use std::path::Path;

/// Serializes `layout` as pretty JSON and writes it to `path`.
pub fn write_layout(layout: &LayoutNode, path: &Path) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(layout)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Serializes `routes` as pretty JSON and writes it to `path`.
pub fn write_routes(routes: &RoutesNode, path: &Path) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(routes)?;
    std::fs::write(path, json)?;
    Ok(())
}
