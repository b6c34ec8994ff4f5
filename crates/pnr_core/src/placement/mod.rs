//! Placement: initial three-band packing followed by simulated annealing.

pub mod anneal;
pub mod cost;
pub mod initial;

use crate::cache::LayoutedModules;
use crate::config::Config;
use crate::data::SubModule;
use pnr_diagnostics::DiagnosticSink;
use rand::Rng;

/// Places `subm`'s own direct primitives, reusing a cached layout for this
/// module type if one already exists. Returns the module's final, inflated
/// `(width, height)`.
///
/// Callers are responsible for placing every boxed sub-module instance
/// child first and setting its owning `Component`'s `width`/`height` from
/// the child's returned dimensions — `place` only ever touches `subm`'s own
/// direct primitives, never descends into `ComponentPayload::SubModule`.
///
/// `on_outer_step` is forwarded to [`anneal::anneal`] unless a cached
/// template makes annealing unnecessary for this call, in which case it's
/// never invoked.
pub fn place(
    subm: &mut SubModule,
    config: &Config,
    cache: &mut LayoutedModules,
    diagnostics: &DiagnosticSink,
    rng: &mut impl Rng,
    on_outer_step: &mut dyn FnMut(f64),
) -> (u32, u32) {
    if let Some(template) = cache.get(&subm.module_name) {
        for comp in subm.components.iter_mut() {
            if let Some(t) = template.component(&comp.name) {
                comp.x = t.x;
                comp.y = t.y;
            }
        }
        return template.dims;
    }

    initial::initial_place(subm, config);
    let dims = anneal::anneal(subm, config, diagnostics, rng, on_outer_step);
    subm.dims = dims;
    cache.insert(subm.module_name.clone(), subm.clone());
    dims
}
