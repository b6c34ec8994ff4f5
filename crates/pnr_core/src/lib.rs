//! Hierarchical transistor-level placement and routing.
//!
//! The pipeline is four stages run depth-first, post-order, over the
//! normalized `SubModule` tree (§5's ordering guarantee: a sub-module
//! *type*'s placement finishes before any sibling instance of that type is
//! used in a parent's cost/obstacle calculations; net building and routing
//! for a sub-module finish after its own children's, since a child's
//! routing grid is projected upward into the parent's):
//!
//! 1. [`normalizer::normalize`] — raw netlist to a resolved `SubModule` tree.
//! 2. [`placement`] — initial packing, then simulated annealing, per sub-module.
//! 3. [`netbuild`] — routing grid allocation and net/pin derivation.
//! 4. [`router`] — MST + A* routing, then rip-up-and-reroute.
//!
//! [`emit`] turns the finished tree into the two output documents.

pub mod cache;
pub mod config;
pub mod data;
pub mod emit;
pub mod error;
pub mod netbuild;
pub mod normalizer;
pub mod placement;
pub mod raw;
pub mod router;

use cache::LayoutedModules;
use config::Config;
use data::{ComponentPayload, SubModule};
use error::PnrResult;
use pnr_diagnostics::{Diagnostic, DiagnosticSink};
use raw::RawNetlist;
use rand::Rng;

/// Runs the full pipeline for `module_name` against `raw`, returning the
/// fully placed, net-built, and routed `SubModule` tree.
///
/// `instance_name` becomes the root node's name (conventionally the module
/// name itself, or `"top"`).
///
/// `on_outer_step` is invoked once per outer annealing iteration, across
/// every sub-module placed, with the annealer's progress fraction in
/// `[0, 1]`; pass a no-op closure when no progress UI is needed.
pub fn place_and_route(
    raw: &RawNetlist,
    module_name: &str,
    instance_name: &str,
    config: &Config,
    diagnostics: &DiagnosticSink,
    rng: &mut impl Rng,
    on_outer_step: &mut dyn FnMut(f64),
) -> PnrResult<SubModule> {
    let mut root = normalizer::normalize(raw, module_name, instance_name, config, diagnostics)?;

    diagnostics.emit(Diagnostic::info(
        format!("normalized `{module_name}`: {} transitive mosfets", root.transitive_mos_count()),
        instance_name.to_string(),
    ));

    let mut cache = LayoutedModules::new();
    layout_recursive(&mut root, config, &mut cache, diagnostics, rng, on_outer_step);

    Ok(root)
}

/// Places, net-builds, and routes `subm`, recursing into boxed sub-module
/// instances first so every child's final `(width, height)` and routing
/// grid are available before `subm`'s own placement and obstacle marking run.
fn layout_recursive(
    subm: &mut SubModule,
    config: &Config,
    cache: &mut LayoutedModules,
    diagnostics: &DiagnosticSink,
    rng: &mut impl Rng,
    on_outer_step: &mut dyn FnMut(f64),
) {
    for comp in subm.components.iter_mut() {
        if let ComponentPayload::SubModule(child) = &mut comp.payload {
            layout_recursive(child, config, cache, diagnostics, rng, on_outer_step);
            comp.width = child.dims.0;
            comp.height = child.dims.1;
        }
    }

    subm.dims = placement::place(subm, config, cache, diagnostics, rng, on_outer_step);

    netbuild::prepare_grid(subm, config);
    subm.nets = netbuild::build_nets(subm, diagnostics);

    router::route(subm, config, diagnostics);
}
