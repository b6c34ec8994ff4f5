//! The as-parsed netlist document, before hierarchy normalization.
//!
//! This mirrors the external JSON document described in the project's
//! external-interface contract (ports/mosfets/subModules keyed by name
//! within each module) closely enough that `pnr_io` can deserialize
//! straight into these types with `serde_json`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The full netlist document: every module definition, keyed by module name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawNetlist {
    /// All module definitions in the document.
    pub modules: HashMap<String, RawModule>,
}

/// One module's raw, unnormalized definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawModule {
    /// Ports, keyed by name.
    #[serde(default)]
    pub ports: HashMap<String, RawPort>,
    /// MOS devices, keyed by name.
    #[serde(default)]
    pub mosfets: HashMap<String, RawMosfet>,
    /// Sub-module instances, keyed by instance name.
    #[serde(rename = "subModules", default)]
    pub sub_modules: HashMap<String, RawSubModuleInstance>,
}

/// The four port roles in the raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawPortKind {
    /// Externally driven input.
    Input,
    /// Externally observed output.
    Output,
    /// Internal wire alias.
    Wire,
    /// VCC/GND power rail.
    Power,
}

/// A raw port definition, including its pre-resolved driver/sink lists.
///
/// `in`/`out` entries may already be dotted `"instance.endpoint"` strings —
/// the upstream parser resolves cross-module connectivity textually rather
/// than through `subModules.*.parameters`, which is carried here purely for
/// document fidelity and is not consulted during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPort {
    /// The port's role.
    #[serde(rename = "type")]
    pub kind: Option<RawPortKind>,
    /// Names (possibly dotted) of endpoints that drive this port.
    #[serde(rename = "in", default)]
    pub r#in: Vec<String>,
    /// Names (possibly dotted) of endpoints this port drives.
    #[serde(default)]
    pub out: Vec<String>,
}

/// The two MOS device flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawMosKind {
    /// n-type MOS.
    Nmos,
    /// p-type MOS.
    Pmos,
}

/// A raw MOS device definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMosfet {
    /// The device's channel type.
    #[serde(rename = "type")]
    pub kind: RawMosKind,
    /// Drain terminal name.
    pub drain: String,
    /// Source terminal name.
    pub source: String,
    /// Gate terminal name.
    pub gate: String,
}

/// A raw sub-module instantiation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSubModuleInstance {
    /// The instantiated module's type name.
    pub module: String,
    /// Positional parameter list (informational; connectivity is carried
    /// by the referencing ports' own `in`/`out` lists, not by this field).
    #[serde(default)]
    pub parameters: Vec<String>,
}
