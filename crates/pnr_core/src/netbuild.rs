//! Grid preparation and net construction: §4.4 of the component design.
//!
//! Runs after placement has given every component (and, for boxed
//! sub-module instances, every child routing grid) a final position.
//! Builds the routing grid's obstacle plane and materializes one [`Net`]
//! per net-bearing component (input/output/power/wire), deriving each
//! net's pins from the already-resolved `net_in_map`/`net_out_map`
//! adjacency the normalizer built.

use crate::config::Config;
use crate::data::{Component, ComponentKind, ComponentPayload, Net, Pin, RoutingGrid, SubModule};
use pnr_common::Point;
use pnr_diagnostics::{Diagnostic, DiagnosticSink};

/// Allocates `subm`'s routing grid at its footprint size, marks primitive
/// and child-instance obstacles, and stores it on `subm`.
pub fn prepare_grid(subm: &mut SubModule, config: &Config) {
    let (width, height) = subm.footprint_dims();
    let mut grid = RoutingGrid::new(width as usize, height as usize, config.max_layer);
    mark_primitive_obstacles(subm, &mut grid);
    project_child_grids(subm, &mut grid);
    subm.routing_grid = Some(grid);
}

fn mark_primitive_obstacles(subm: &SubModule, grid: &mut RoutingGrid) {
    for comp in &subm.components {
        if comp.kind.is_port_like() || matches!(comp.kind, ComponentKind::SubModule(_)) {
            continue;
        }
        let (x0, y0, x1, y1) = comp.bbox();
        for y in y0.max(0)..y1 {
            for x in x0.max(0)..x1 {
                if grid.in_bounds(x, y) {
                    grid.metal_layers[comp.layer].mark(x as usize, y as usize);
                }
            }
        }
    }
}

fn project_child_grids(subm: &SubModule, grid: &mut RoutingGrid) {
    for comp in &subm.components {
        if let ComponentPayload::SubModule(child) = &comp.payload {
            if let Some(child_grid) = &child.routing_grid {
                grid.or_project(child_grid, Point::new(comp.x, comp.y));
            }
        }
    }
}

/// Materializes one [`Net`] per net-bearing component (input/output/power/
/// wire) in `subm`, deriving pins from `net_in_map`/`net_out_map`.
/// Endpoints that don't resolve to a physical pin are skipped with a
/// warning rather than failing the whole build — a dangling adjacency
/// reference is a best-effort, not a fatal, condition here.
pub fn build_nets(subm: &SubModule, diagnostics: &DiagnosticSink) -> Vec<Net> {
    let mut nets = Vec::new();

    let net_bearing: Vec<String> = subm
        .components
        .iter()
        .filter(|c| c.kind.is_port_like())
        .map(|c| c.name.clone())
        .collect();

    for name in net_bearing {
        let mut pins = Vec::new();

        if let Some(comp) = subm.component(&name) {
            if let Some(pin) = self_pin(comp) {
                pins.push(pin);
            }
        }

        if let Some(producers) = subm.net_in_map.get(&name) {
            for endpoint in producers {
                match resolve_endpoint(subm, endpoint, Role::Producer, endpoint) {
                    Some(pin) => pins.push(pin),
                    None => diagnostics.emit(Diagnostic::warning(
                        format!("unresolved driver `{endpoint}`, contribution skipped"),
                        format!("{}.{name}", subm.name),
                    )),
                }
            }
        }

        if let Some(consumers) = subm.net_out_map.get(&name) {
            for endpoint in consumers {
                match resolve_endpoint(subm, endpoint, Role::Consumer, &name) {
                    Some(pin) => pins.push(pin),
                    None => diagnostics.emit(Diagnostic::warning(
                        format!(
                            "net `{name}` in `{}`: unresolved sink `{endpoint}`, contribution skipped",
                            subm.name
                        ),
                        subm.name.clone(),
                    )),
                }
            }
        }

        nets.push(Net::new(name, pins));
    }

    nets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Producer,
    Consumer,
}

#[derive(Debug, Clone, Copy)]
enum MosTerminal {
    /// `(x + w/2, y + 3h/4)`.
    Gate,
    /// `(x + w/4, y + h/2)` — shared by source and drain; the role is
    /// encoded only in the driver/sink relationship, not the geometry.
    SourceDrain,
}

/// Resolves `endpoint` (bare or dotted) to an absolute pin within `subm`'s
/// own local frame, descending through boxed sub-module instances one
/// dotted segment at a time and accumulating each instance's offset.
///
/// `net_name` carries the net identity in whichever frame `endpoint` is
/// currently being resolved at, used only to disambiguate a bare MOS
/// name's gate-vs-source role on the consumer side (the producer role is
/// always the device's drain, since that's the only terminal the
/// normalizer ever lists as driving something else).
fn resolve_endpoint(subm: &SubModule, endpoint: &str, role: Role, net_name: &str) -> Option<Pin> {
    if let Some((inst, rest)) = split_owning_submodule(subm, endpoint) {
        let instance = subm.component(inst)?;
        let child = match &instance.payload {
            ComponentPayload::SubModule(child) => child.as_ref(),
            _ => return None,
        };
        let inner = resolve_endpoint(child, rest, role, rest)?;
        return Some(Pin {
            pos: inner.pos + Point::new(instance.x, instance.y),
            layer: inner.layer,
        });
    }

    let comp = subm.component(endpoint)?;
    match &comp.kind {
        ComponentKind::Wire => None,
        ComponentKind::Nmos | ComponentKind::Pmos => mos_role_pin(comp, role, net_name),
        _ => self_pin(comp),
    }
}

fn mos_role_pin(comp: &Component, role: Role, net_name: &str) -> Option<Pin> {
    let ComponentPayload::Mos { drain, source, gate } = &comp.payload else {
        return None;
    };
    match role {
        Role::Producer => Some(mos_terminal_pin(comp, MosTerminal::SourceDrain)),
        Role::Consumer => {
            if gate == net_name {
                Some(mos_terminal_pin(comp, MosTerminal::Gate))
            } else if source == net_name || drain == net_name {
                // `drain == net_name` is unusual but not impossible: a net
                // both drives and is driven by the same device (e.g. a
                // diode-tied MOS). Source and drain share one pin geometry.
                Some(mos_terminal_pin(comp, MosTerminal::SourceDrain))
            } else {
                None
            }
        }
    }
}

/// Fixes the original's divergent drain-vs-source offsets to the single
/// rule this spec prescribes: gate at `(w/2, 3h/4)`, source/drain at
/// `(w/4, h/2)`.
fn mos_terminal_pin(comp: &Component, terminal: MosTerminal) -> Pin {
    let (x, y) = (comp.x, comp.y);
    let (w, h) = (comp.width as i64, comp.height as i64);
    let pos = match terminal {
        MosTerminal::Gate => Point::new(x + w / 2, y + 3 * h / 4),
        MosTerminal::SourceDrain => Point::new(x + w / 4, y + h / 2),
    };
    Pin { pos, layer: comp.layer }
}

/// `input`/`output`/`power` self-pin: component center, except VCC/GND
/// rails, which use the rail-specific offset preserved verbatim from the
/// original's `h - 1`/`h` asymmetry (see the design notes on this quirk).
fn self_pin(comp: &Component) -> Option<Pin> {
    match comp.kind {
        ComponentKind::Wire => None,
        ComponentKind::Power if comp.name == "VCC" => Some(rail_pin(comp, 1)),
        ComponentKind::Power if comp.name == "GND" => Some(rail_pin(comp, 0)),
        _ => Some(Pin {
            pos: comp.center(),
            layer: comp.layer,
        }),
    }
}

/// `(x + w/4, y + h - trim)` — `trim = 1` for VCC, `trim = 0` for GND.
fn rail_pin(comp: &Component, trim: i64) -> Pin {
    let (w, h) = (comp.width as i64, comp.height as i64);
    Pin {
        pos: Point::new(comp.x + w / 4, comp.y + h - trim),
        layer: comp.layer,
    }
}

/// Splits `endpoint` at the longest-matching boxed sub-module instance
/// name among `subm`'s own direct components, mirroring the normalizer's
/// `find_owning_submodule`.
fn split_owning_submodule<'a>(subm: &SubModule, endpoint: &'a str) -> Option<(&'a str, &'a str)> {
    subm.components
        .iter()
        .filter(|c| matches!(c.kind, ComponentKind::SubModule(_)))
        .map(|c| c.name.as_str())
        .filter(|name| endpoint.len() > name.len() && endpoint.starts_with(name) && endpoint.as_bytes()[name.len()] == b'.')
        .max_by_key(|name| name.len())
        .map(|name| (name, &endpoint[name.len() + 1..]))
}
