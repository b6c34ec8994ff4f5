//! Output document construction: §4.6 of the component design.
//!
//! Two language-neutral, serde-driven trees: a **Layout** document (one
//! node per `SubModule`, carrying its own and its children's absolute
//! geometry) and a **Routes** document (one node per `SubModule`, carrying
//! its nets' absolute pin/segment/via coordinates). Both are built by a
//! single top-down walk that accumulates each level's `(x, y)` offset into
//! the next, so a deeply nested sub-module's coordinates come out already
//! summed against the root frame rather than needing a second pass.

use crate::data::{ComponentKind, ComponentPayload, Segment, SubModule};
use pnr_common::Point;
use pnr_diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single component's or sub-module's placed geometry, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    pub layer: usize,
}

/// One node of the recursive layout tree (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    #[serde(rename = "type")]
    pub module_type: String,
    pub name: String,
    pub layout: NodeLayout,
    pub ports: HashMap<String, NodeLayout>,
    pub mosfets: HashMap<String, NodeLayout>,
    #[serde(rename = "subModules")]
    pub sub_modules: HashMap<String, LayoutNode>,
    #[serde(rename = "inputPorts")]
    pub input_ports: Vec<String>,
    #[serde(rename = "outputPorts")]
    pub output_ports: Vec<String>,
    pub isvcc: bool,
    pub isgnd: bool,
}

/// A single net's routed geometry, in absolute coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNet {
    pub name: String,
    pub pins: Vec<Point>,
    pub segments: Vec<Segment>,
    pub vias: Vec<Point>,
}

/// One node of the recursive routes tree (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesNode {
    pub nets: Vec<RouteNet>,
    #[serde(rename = "subModules")]
    pub sub_modules: HashMap<String, RoutesNode>,
}

/// Builds the layout document rooted at `subm`, treating `subm` itself as
/// sitting at the origin of its own coordinate frame.
pub fn emit_layout(subm: &SubModule) -> LayoutNode {
    build_layout(subm, Point::new(0, 0))
}

/// Builds the routes document rooted at `subm`.
pub fn emit_routes(subm: &SubModule) -> RoutesNode {
    build_routes(subm, Point::new(0, 0))
}

fn build_layout(subm: &SubModule, offset: Point) -> LayoutNode {
    let mut ports = HashMap::new();
    let mut mosfets = HashMap::new();
    let mut sub_modules = HashMap::new();

    for comp in &subm.components {
        let abs = Point::new(offset.x + comp.x, offset.y + comp.y);
        let node_layout = NodeLayout {
            x: abs.x,
            y: abs.y,
            width: comp.width,
            height: comp.height,
            layer: comp.layer,
        };

        match &comp.kind {
            ComponentKind::Input | ComponentKind::Output | ComponentKind::Power | ComponentKind::Wire => {
                ports.insert(comp.name.clone(), node_layout);
            }
            ComponentKind::Nmos | ComponentKind::Pmos => {
                mosfets.insert(comp.name.clone(), node_layout);
            }
            ComponentKind::SubModule(_) => {
                if let ComponentPayload::SubModule(child) = &comp.payload {
                    sub_modules.insert(comp.name.clone(), build_layout(child, abs));
                }
            }
        }
    }

    LayoutNode {
        module_type: subm.module_name.clone(),
        name: subm.name.clone(),
        layout: NodeLayout {
            x: offset.x,
            y: offset.y,
            width: subm.dims.0,
            height: subm.dims.1,
            layer: 0,
        },
        ports,
        mosfets,
        sub_modules,
        input_ports: subm.input_ports.clone(),
        output_ports: subm.output_ports.clone(),
        isvcc: subm.isvcc,
        isgnd: subm.isgnd,
    }
}

fn build_routes(subm: &SubModule, offset: Point) -> RoutesNode {
    let nets = subm
        .nets
        .iter()
        .map(|net| RouteNet {
            name: net.name.clone(),
            pins: net.pins.iter().map(|p| offset + p.pos).collect(),
            segments: net
                .segments
                .iter()
                .map(|s| Segment {
                    start: offset + s.start,
                    end: offset + s.end,
                    layer: s.layer,
                })
                .collect(),
            vias: net.vias.iter().map(|v| offset + *v).collect(),
        })
        .collect();

    let mut sub_modules = HashMap::new();
    for comp in &subm.components {
        if let ComponentPayload::SubModule(child) = &comp.payload {
            let abs = Point::new(offset.x + comp.x, offset.y + comp.y);
            sub_modules.insert(comp.name.clone(), build_routes(child, abs));
        }
    }

    RoutesNode { nets, sub_modules }
}

/// Logs a one-line summary of the emitted documents, matching the
/// "emitter writes files unconditionally" behavior described in the
/// error-handling design — emission itself never fails, so the only thing
/// worth surfacing here is a record that it ran.
pub fn log_summary(layout: &LayoutNode, routes: &RoutesNode, diagnostics: &pnr_diagnostics::DiagnosticSink) {
    diagnostics.emit(Diagnostic::info(
        format!(
            "emitted layout for `{}` ({} direct ports, {} direct mosfets, {} sub-modules) and {} top-level nets",
            layout.name,
            layout.ports.len(),
            layout.mosfets.len(),
            layout.sub_modules.len(),
            routes.nets.len(),
        ),
        layout.name.clone(),
    ));
}
