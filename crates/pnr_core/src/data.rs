//! Core data model: components, sub-modules, the routing grid, and nets.
//!
//! Components and ports reference each other by name and the netlist is
//! inherently cyclic (a port references the components it appears in; a
//! component references its ports). Rather than introduce shared ownership
//! (`Rc`/`RefCell`) to model that, every [`Component`] in a [`SubModule`] is
//! owned by a single per-`SubModule` arena (`components`, keyed by name via
//! `component_index`); all cross-references are plain `String` names
//! resolved through that index, name-keyed rather than numeric-ID-keyed
//! because endpoints here are frequently dotted cross-hierarchy strings
//! (`"inv1.A"`), not flat numeric IDs.

use pnr_common::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The role a [`Component`] plays in the netlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// An externally driven input port.
    Input,
    /// An externally observed output port.
    Output,
    /// A VCC or GND power port.
    Power,
    /// An internal wire/net alias with no physical footprint.
    Wire,
    /// An n-type MOS transistor.
    Nmos,
    /// A p-type MOS transistor.
    Pmos,
    /// An instance of a named sub-module type.
    SubModule(String),
}

impl ComponentKind {
    /// Returns the table-driven default `(width, height)` for this kind.
    ///
    /// Sub-module dimensions are not in this table — they're computed from
    /// the child's own layout once it's placed, so callers must not rely on
    /// this for `ComponentKind::SubModule`.
    pub fn default_size(&self) -> (u32, u32) {
        match self {
            ComponentKind::Input | ComponentKind::Output | ComponentKind::Power => (2, 2),
            ComponentKind::Wire => (0, 0),
            ComponentKind::Nmos | ComponentKind::Pmos => (6, 4),
            ComponentKind::SubModule(_) => (0, 0),
        }
    }

    /// Returns `true` for `input`/`output`/`power`/`wire` — the kinds that
    /// are never moved or swapped by the annealer and never block
    /// overlap checks against other primitives.
    pub fn is_port_like(&self) -> bool {
        matches!(
            self,
            ComponentKind::Input | ComponentKind::Output | ComponentKind::Power | ComponentKind::Wire
        )
    }

    /// Returns `true` for `wire`/`output` — exempt from overlap rejection
    /// during placement search per the placement-non-overlap invariant.
    pub fn is_overlap_exempt(&self) -> bool {
        matches!(self, ComponentKind::Wire | ComponentKind::Output)
    }
}

/// Role-specific data carried by a [`Component`] beyond its geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComponentPayload {
    /// No extra payload (ports, wires).
    None,
    /// A MOS device's three referenced terminal names.
    Mos {
        /// Drain terminal name.
        drain: String,
        /// Source terminal name.
        source: String,
        /// Gate terminal name.
        gate: String,
    },
    /// A sub-module instance. The component's own `(x, y)` *is* the offset
    /// summed with the child's relative coordinates on emission — there is
    /// no separate offset field here, since `Component` already carries a
    /// position.
    SubModule(Box<SubModule>),
}

/// A placed entity: a port, a wire, a MOS device, or a sub-module instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// The component's name, unique within its owning `SubModule`.
    pub name: String,
    /// The component's kind.
    pub kind: ComponentKind,
    /// Local x-coordinate of the component's bounding box.
    pub x: i64,
    /// Local y-coordinate of the component's bounding box.
    pub y: i64,
    /// The metal layer this component's footprint occupies as an obstacle.
    pub layer: usize,
    /// Bounding box width.
    pub width: u32,
    /// Bounding box height.
    pub height: u32,
    /// Role-specific payload.
    pub payload: ComponentPayload,
}

impl Component {
    /// Creates a new component of the given kind at `(0, 0)`, using the
    /// kind's table-driven default size.
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        let (width, height) = kind.default_size();
        Self {
            name: name.into(),
            kind,
            x: 0,
            y: 0,
            layer: 0,
            width,
            height,
            payload: ComponentPayload::None,
        }
    }

    /// Approximate center point of this component's bounding box, used by
    /// the annealer's wirelength cost.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width as i64 / 2, self.y + self.height as i64 / 2)
    }

    /// Returns `true` if `self` and `other`'s bounding boxes overlap.
    pub fn overlaps(&self, other: &Component) -> bool {
        let (ax0, ay0, ax1, ay1) = self.bbox();
        let (bx0, by0, bx1, by1) = other.bbox();
        ax0 < bx1 && bx0 < ax1 && ay0 < by1 && by0 < ay1
    }

    /// Returns `(min_x, min_y, max_x, max_y)` of this component's bounding box.
    pub fn bbox(&self) -> (i64, i64, i64, i64) {
        (self.x, self.y, self.x + self.width as i64, self.y + self.height as i64)
    }
}

/// A single metal layer's occupancy, with a fixed preferred direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Occupancy matrix, `occupancy[y][x]`.
    occupancy: Vec<Vec<bool>>,
    /// The preferred routing direction (even layers horizontal, odd vertical).
    pub direction: Direction,
}

/// The preferred routing direction of a metal layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Even-indexed layers run horizontally.
    Horizontal,
    /// Odd-indexed layers run vertically.
    Vertical,
}

impl Layer {
    fn new(width: usize, height: usize, index: usize) -> Self {
        Self {
            occupancy: vec![vec![false; width]; height],
            direction: if index % 2 == 0 {
                Direction::Horizontal
            } else {
                Direction::Vertical
            },
        }
    }

    /// Returns whether `(x, y)` is free on this layer.
    pub fn is_free(&self, x: usize, y: usize) -> bool {
        !self.occupancy[y][x]
    }

    /// Marks `(x, y)` as occupied on this layer.
    pub fn mark(&mut self, x: usize, y: usize) {
        self.occupancy[y][x] = true;
    }

    /// Clears `(x, y)` on this layer.
    pub fn clear(&mut self, x: usize, y: usize) {
        self.occupancy[y][x] = false;
    }
}

/// A multi-layer routing grid with a single shared via-occupancy plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingGrid {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Per-layer occupancy, indexed by layer number.
    pub metal_layers: Vec<Layer>,
    /// Shared via occupancy across all layer transitions at a given `(x, y)`.
    via_space: Vec<Vec<bool>>,
}

impl RoutingGrid {
    /// Creates a new, fully-free routing grid.
    pub fn new(width: usize, height: usize, num_layers: usize) -> Self {
        Self {
            width,
            height,
            metal_layers: (0..num_layers).map(|i| Layer::new(width, height, i)).collect(),
            via_space: vec![vec![false; width]; height],
        }
    }

    /// Returns `true` if `(x, y)` is within the grid bounds.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Returns whether the via cell at `(x, y)` is free.
    pub fn is_via_free(&self, x: usize, y: usize) -> bool {
        !self.via_space[y][x]
    }

    /// Marks the via cell at `(x, y)` as occupied.
    pub fn mark_via(&mut self, x: usize, y: usize) {
        self.via_space[y][x] = true;
    }

    /// Clears the via cell at `(x, y)`.
    pub fn clear_via(&mut self, x: usize, y: usize) {
        self.via_space[y][x] = false;
    }

    /// OR-projects `child`'s occupancy (all layers and vias) into `self`,
    /// offset by `offset`. Used before routing a parent so that its router
    /// treats already-placed children's interiors as obstacles.
    pub fn or_project(&mut self, child: &RoutingGrid, offset: Point) {
        for (layer_idx, child_layer) in child.metal_layers.iter().enumerate() {
            if layer_idx >= self.metal_layers.len() {
                break;
            }
            for y in 0..child.height {
                for x in 0..child.width {
                    if !child_layer.is_free(x, y) {
                        let px = offset.x + x as i64;
                        let py = offset.y + y as i64;
                        if self.in_bounds(px, py) {
                            self.metal_layers[layer_idx].mark(px as usize, py as usize);
                        }
                    }
                }
            }
        }
        for y in 0..child.height {
            for x in 0..child.width {
                if child.via_space[y][x] {
                    let px = offset.x + x as i64;
                    let py = offset.y + y as i64;
                    if self.in_bounds(px, py) {
                        self.mark_via(px as usize, py as usize);
                    }
                }
            }
        }
    }
}

/// A typed `(x, y, layer)` anchor derived from a component and its role in a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Grid position, local to the owning `SubModule`.
    pub pos: Point,
    /// The metal layer this pin lives on.
    pub layer: usize,
}

/// An axis-aligned routed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment start point.
    pub start: Point,
    /// Segment end point.
    pub end: Point,
    /// The metal layer this segment lives on.
    pub layer: usize,
}

impl Segment {
    /// Returns `true` if this segment runs horizontally (`start.y == end.y`).
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Returns `true` if this segment runs vertically (`start.x == end.x`).
    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Manhattan length of this segment.
    pub fn length(&self) -> i64 {
        self.start.manhattan(self.end)
    }

    /// Axis-aligned bounding box of this segment: `(min_x, min_y, max_x, max_y)`.
    fn bbox(&self) -> (i64, i64, i64, i64) {
        (
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    /// Returns `true` if `self` and `other` share any grid cell on the same
    /// layer. Touching endpoints count as an overlap — the rip-up pass
    /// needs to catch two nets that land on the same via cell, not just
    /// segments that cross through each other's interior.
    pub fn overlaps(&self, other: &Segment) -> bool {
        if self.layer != other.layer {
            return false;
        }
        let (ax0, ay0, ax1, ay1) = self.bbox();
        let (bx0, by0, bx1, by1) = other.bbox();
        ax0 <= bx1 && bx0 <= ax1 && ay0 <= by1 && by0 <= ay1
    }
}

/// A signal: the set of pins driven together, plus its routed geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// The net's name.
    pub name: String,
    /// All pins on this net, local to the owning `SubModule`.
    pub pins: Vec<Pin>,
    /// Routed segments, empty until the router runs.
    pub segments: Vec<Segment>,
    /// Via locations, empty until the router runs.
    pub vias: Vec<Point>,
}

impl Net {
    /// Creates a new, unrouted net with the given pins.
    pub fn new(name: impl Into<String>, pins: Vec<Pin>) -> Self {
        Self {
            name: name.into(),
            pins,
            segments: Vec::new(),
            vias: Vec::new(),
        }
    }

    /// Total Manhattan length of this net's routed segments.
    pub fn total_length(&self) -> i64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Clears this net's routed geometry, leaving its pins untouched.
    pub fn clear_routing(&mut self) {
        self.segments.clear();
        self.vias.clear();
    }
}

/// A hierarchical container owning its direct primitives and sub-module instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubModule {
    /// Instance name (empty/`"top"` for the root module).
    pub name: String,
    /// The module type name this instance implements.
    pub module_name: String,
    /// Owned arena of all direct components, keyed by name via `component_index`.
    pub components: Vec<Component>,
    /// `component.name -> index into components`, rebuilt after deserialization.
    #[serde(skip)]
    pub component_index: HashMap<String, usize>,
    /// Ordered input port names.
    pub input_ports: Vec<String>,
    /// Ordered output port names.
    pub output_ports: Vec<String>,
    /// Ordered wire port names.
    pub wire_ports: Vec<String>,
    /// Ordered mosfet names.
    pub mosfets: Vec<String>,
    /// Signal-level driver adjacency: `component -> [driving component names]`.
    pub in_map: HashMap<String, Vec<String>>,
    /// Signal-level fanout adjacency: `component -> [driven component names]`.
    pub out_map: HashMap<String, Vec<String>>,
    /// Net-level forward-resolved driver endpoints: `net -> [endpoint names]`.
    pub net_in_map: HashMap<String, Vec<String>>,
    /// Net-level forward-resolved sink endpoints: `net -> [endpoint names]`.
    pub net_out_map: HashMap<String, Vec<String>>,
    /// The routing grid, allocated once placement is final.
    pub routing_grid: Option<RoutingGrid>,
    /// Nets materialized by the net builder after placement.
    pub nets: Vec<Net>,
    /// Whether a VCC power port is present.
    pub isvcc: bool,
    /// Whether a GND power port is present.
    pub isgnd: bool,
    /// The inflated `(width, height)` this sub-module occupies once its own
    /// placement has finished — what the owning `Component` (for a boxed
    /// instance) reports to its parent, and the size the routing grid is
    /// allocated at. `(0, 0)` before placement runs.
    pub dims: (u32, u32),
}

impl SubModule {
    /// Creates a new, empty sub-module node.
    pub fn new(name: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module_name: module_name.into(),
            components: Vec::new(),
            component_index: HashMap::new(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            wire_ports: Vec::new(),
            mosfets: Vec::new(),
            in_map: HashMap::new(),
            out_map: HashMap::new(),
            net_in_map: HashMap::new(),
            net_out_map: HashMap::new(),
            routing_grid: None,
            nets: Vec::new(),
            isvcc: false,
            isgnd: false,
            dims: (0, 0),
        }
    }

    /// Inserts or replaces a component by name, keeping the index in sync.
    pub fn add_component(&mut self, component: Component) {
        if let Some(&idx) = self.component_index.get(&component.name) {
            self.components[idx] = component;
        } else {
            self.component_index
                .insert(component.name.clone(), self.components.len());
            self.components.push(component);
        }
    }

    /// Removes a component by name. Used by the normalizer to drop names
    /// that belong to a sub-module instance's interior.
    pub fn remove_component(&mut self, name: &str) -> Option<Component> {
        let idx = self.component_index.remove(name)?;
        let removed = self.components.remove(idx);
        for v in self.component_index.values_mut() {
            if *v > idx {
                *v -= 1;
            }
        }
        Some(removed)
    }

    /// Looks up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.component_index.get(name).map(|&i| &self.components[i])
    }

    /// Looks up a mutable component by name.
    pub fn component_mut(&mut self, name: &str) -> Option<&mut Component> {
        let idx = *self.component_index.get(name)?;
        Some(&mut self.components[idx])
    }

    /// Rebuilds `component_index` after deserialization or bulk mutation.
    pub fn rebuild_index(&mut self) {
        self.component_index.clear();
        for (i, c) in self.components.iter().enumerate() {
            self.component_index.insert(c.name.clone(), i);
        }
    }

    /// Bounding box of non-port, non-wire primitives (MOS devices and
    /// sub-module instances): `(min_x, min_y, max_x, max_y)`. Returns
    /// `None` if there are no such primitives.
    pub fn primitive_bbox(&self) -> Option<(i64, i64, i64, i64)> {
        let mut bbox: Option<(i64, i64, i64, i64)> = None;
        for c in &self.components {
            if c.kind.is_port_like() {
                continue;
            }
            let (x0, y0, x1, y1) = c.bbox();
            bbox = Some(match bbox {
                None => (x0, y0, x1, y1),
                Some((a, b, cc, d)) => (a.min(x0), b.min(y0), cc.max(x1), d.max(y1)),
            });
        }
        bbox
    }

    /// The smallest `(width, height)` bounding all non-wire components,
    /// i.e. the grid size this sub-module's routing should cover.
    pub fn footprint_dims(&self) -> (u32, u32) {
        let mut max_x = 0i64;
        let mut max_y = 0i64;
        for c in self.components.iter().filter(|c| !matches!(c.kind, ComponentKind::Wire)) {
            max_x = max_x.max(c.x + c.width as i64);
            max_y = max_y.max(c.y + c.height as i64);
        }
        (max_x.max(1) as u32, max_y.max(1) as u32)
    }

    /// Total MOS count, counting through instantiated sub-modules
    /// recursively (used to decide sub-module inlining, see
    /// `Config::min_mos_num`).
    pub fn transitive_mos_count(&self) -> u32 {
        let mut count = self.mosfets.len() as u32;
        for c in &self.components {
            if let ComponentPayload::SubModule(sub) = &c.payload {
                count += sub.transitive_mos_count();
            }
        }
        count
    }
}
