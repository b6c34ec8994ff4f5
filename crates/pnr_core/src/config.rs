//! Explicit, process-wide-free configuration for the place-and-route pipeline.
//!
//! These values live in one `Config` that's threaded explicitly through
//! every stage, rather than as mutable globals the annealer and router
//! would otherwise read directly, the same way the rest of this pipeline
//! threads a `&DiagnosticSink` explicitly instead of reaching for ambient
//! state.

use serde::{Deserialize, Serialize};

/// Tunable parameters for placement and routing, with defaults matching
/// the documented compile-time constants of the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of metal layers usable by this design's router (`MAX_LAYER`).
    pub max_layer: usize,
    /// Upper bound on metal layers the fabric could ever expose (`MAX_METAL_LAYER`).
    pub max_metal_layer: usize,
    /// Sub-module instances whose referenced module has fewer direct MOS
    /// devices than this are inlined into the parent instead of placed as
    /// an opaque box.
    pub min_mos_num: u32,
    /// Geometric cooling rate applied to the annealing temperature each outer iteration.
    pub cooling_rate: f64,
    /// Annealing terminates once the temperature drops below this.
    pub min_temp: f64,
    /// Starting annealing temperature.
    pub init_temp: f64,
    /// Number of inner (move-proposal) iterations per outer temperature step.
    pub sa_steps: u32,
    /// Number of outer annealing iterations to request from the CLI (`CIRCLE`);
    /// the annealer still stops early once `min_temp` is reached.
    pub circle: u32,
    /// Weight applied to the area term as `p -> 1` in the acceptance criterion.
    pub size_weight: f64,
    /// Wirelength weight for driver (`input`/`power`) connections.
    pub in_matter: f64,
    /// Wirelength weight for sink (`output`/`power`) connections.
    pub out_matter: f64,
    /// Cost of a via (layer change) during A* routing.
    pub via_cost: f64,
    /// Heuristic penalty per layer of remaining distance during A*.
    pub layer_cost: f64,
    /// Maximum number of rip-up-and-reroute passes.
    pub max_ripup_passes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_layer: 3,
            max_metal_layer: 10,
            min_mos_num: 20,
            cooling_rate: 0.98,
            min_temp: 1e-5,
            init_temp: 1e5,
            sa_steps: 1000,
            circle: 1000,
            size_weight: 1e6,
            in_matter: 1.5,
            out_matter: 0.1,
            via_cost: 100.0,
            layer_cost: 10000.0,
            max_ripup_passes: 10,
        }
    }
}
