//! Simulated annealing placement refinement (§4.3 of the component design).
//!
//! Proposes translations or swaps of non-port primitives and accepts or
//! rejects each with the Metropolis criterion, cooling geometrically from
//! `init_temp` down to `min_temp`. Mirrors the structure of a conventional
//! SA placer — propose, evaluate, accept-or-undo, cool — generalized here
//! to the wirelength+area cost and singularity-guarded acceptance rule.

use crate::config::Config;
use crate::data::{ComponentKind, SubModule};
use crate::placement::cost;
use pnr_diagnostics::{Diagnostic, DiagnosticSink};
use rand::Rng;

/// Runs simulated annealing on `subm`'s own direct primitives, then
/// aligns ports and normalizes the module to the origin. Returns the
/// inflated `(width, height)` of the finished layout.
///
/// `on_outer_step` is invoked once per outer (cooling) iteration with the
/// current progress fraction in `[0, 1]`, so a caller can drive a progress
/// bar without this function depending on one directly.
pub fn anneal(
    subm: &mut SubModule,
    config: &Config,
    diagnostics: &DiagnosticSink,
    rng: &mut impl Rng,
    on_outer_step: &mut dyn FnMut(f64),
) -> (u32, u32) {
    warn_unresolved_adjacency(subm, diagnostics);

    let movable: Vec<String> = subm
        .components
        .iter()
        .filter(|c| !c.kind.is_port_like())
        .map(|c| c.name.clone())
        .collect();

    if movable.len() >= 2 {
        let n = movable.len() as f64;
        let sum_wh: f64 = movable
            .iter()
            .map(|name| {
                let c = subm.component(name).unwrap();
                c.width as f64 * c.height as f64
            })
            .sum();
        let avg_side = (sum_wh / n).sqrt();
        let nmos_width = ComponentKind::Nmos.default_size().0 as f64;
        let step_max0 = (avg_side * (1.0 + n.ln())).max(nmos_width);

        // Sum of every component's width/height, taken once before any move
        // is proposed: the bounding rectangle a translate is clamped to.
        let width_bound: i64 = subm.components.iter().map(|c| c.width as i64).sum();
        let height_bound: i64 = subm.components.iter().map(|c| c.height as i64).sum();

        let t0 = config.init_temp;
        let mut temperature = t0;
        let mut outer_iter = 0u32;

        while temperature >= config.min_temp && outer_iter < config.circle {
            outer_iter += 1;
            let progress = ((temperature / t0).ln() / (config.min_temp / t0).ln()).clamp(0.0, 1.0);
            let step = (progress.powi(2) * step_max0).max(step_max0 / 4.0);

            for _ in 0..config.sa_steps {
                propose_move(subm, config, &movable, progress, step, temperature, width_bound, height_bound, rng);
            }

            on_outer_step(progress);
            temperature *= config.cooling_rate;
        }
    }

    align_ports_and_normalize(subm)
}

fn warn_unresolved_adjacency(subm: &SubModule, diagnostics: &DiagnosticSink) {
    for name in cost::unresolved_adjacency(subm) {
        diagnostics.emit(Diagnostic::warning(
            format!("unresolved driver/sink name `{name}`, contribution skipped"),
            subm.name.clone(),
        ));
    }
}

fn propose_move(
    subm: &mut SubModule,
    config: &Config,
    movable: &[String],
    progress: f64,
    step: f64,
    temperature: f64,
    width_bound: i64,
    height_bound: i64,
    rng: &mut impl Rng,
) {
    let step_i = (step.round() as i64).max(1);

    if rng.gen::<f64>() < 0.5 {
        let name = movable[rng.gen_range(0..movable.len())].clone();
        let (old_x, old_y, width, height) = {
            let c = subm.component(&name).unwrap();
            (c.x, c.y, c.width as i64, c.height as i64)
        };
        let dx = rng.gen_range(-step_i..=step_i);
        let dy = rng.gen_range(-step_i..=step_i);
        let new_x = (old_x + dx).min(width_bound - width).max(0);
        let new_y = (old_y + dy).min(height_bound - height).max(0);

        let before_wl = cost::total_wirelength(config, subm);
        let before_area = cost::area(subm);
        {
            let c = subm.component_mut(&name).unwrap();
            c.x = new_x;
            c.y = new_y;
        }

        let reject = overlaps_others(subm, &name)
            || !accept(config, subm, progress, temperature, before_wl, before_area, rng);
        if reject {
            let c = subm.component_mut(&name).unwrap();
            c.x = old_x;
            c.y = old_y;
        }
    } else {
        if movable.len() < 2 {
            return;
        }
        let i = rng.gen_range(0..movable.len());
        let mut j = rng.gen_range(0..movable.len());
        while j == i {
            j = rng.gen_range(0..movable.len());
        }
        let (name_a, name_b) = (movable[i].clone(), movable[j].clone());
        let (ax, ay) = {
            let c = subm.component(&name_a).unwrap();
            (c.x, c.y)
        };
        let (bx, by) = {
            let c = subm.component(&name_b).unwrap();
            (c.x, c.y)
        };

        let before_wl = cost::total_wirelength(config, subm);
        let before_area = cost::area(subm);
        {
            let ca = subm.component_mut(&name_a).unwrap();
            ca.x = bx;
            ca.y = by;
        }
        {
            let cb = subm.component_mut(&name_b).unwrap();
            cb.x = ax;
            cb.y = ay;
        }

        let reject = overlaps_others(subm, &name_a)
            || overlaps_others(subm, &name_b)
            || !accept(config, subm, progress, temperature, before_wl, before_area, rng);
        if reject {
            let ca = subm.component_mut(&name_a).unwrap();
            ca.x = ax;
            ca.y = ay;
            let cb = subm.component_mut(&name_b).unwrap();
            cb.x = bx;
            cb.y = by;
        }
    }
}

fn overlaps_others(subm: &SubModule, name: &str) -> bool {
    let comp = subm.component(name).unwrap();
    subm.components
        .iter()
        .any(|other| other.name != name && !other.kind.is_overlap_exempt() && comp.overlaps(other))
}

fn accept(
    config: &Config,
    subm: &SubModule,
    progress: f64,
    temperature: f64,
    before_wl: f64,
    before_area: f64,
    rng: &mut impl Rng,
) -> bool {
    let after_wl = cost::total_wirelength(config, subm);
    let after_area = cost::area(subm);

    let inv = if progress > 0.999 { 1000.0 } else { 1.0 / (1.0 - progress) };
    let multiplier = (inv - 1.0).max(0.01);
    let delta = (after_wl - before_wl) + config.size_weight * multiplier * (after_area - before_area);

    if delta < 0.0 {
        true
    } else {
        rng.gen::<f64>() < (-delta / temperature).exp()
    }
}

/// Left-aligns inputs/power to the primitive bounding box's left edge and
/// right-aligns outputs to its right edge, stacking each vertically, then
/// translates the whole module so `(min_x, min_y) = (0, 0)`. Returns the
/// final dimensions inflated by 10%.
fn align_ports_and_normalize(subm: &mut SubModule) -> (u32, u32) {
    if let Some((min_x, min_y, max_x, _max_y)) = subm.primitive_bbox() {
        let mut names: Vec<String> = subm
            .components
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::Input | ComponentKind::Power))
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        let mut y = min_y;
        for name in &names {
            let (w, h) = {
                let c = subm.component(name).unwrap();
                (c.width as i64, c.height as i64)
            };
            let c = subm.component_mut(name).unwrap();
            c.x = min_x - w;
            c.y = y;
            y += h + 1;
        }

        let mut out_names: Vec<String> = subm
            .components
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::Output))
            .map(|c| c.name.clone())
            .collect();
        out_names.sort();
        let mut y = min_y;
        for name in &out_names {
            let h = subm.component(name).unwrap().height as i64;
            let c = subm.component_mut(name).unwrap();
            c.x = max_x;
            c.y = y;
            y += h + 1;
        }
    }

    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    for c in subm.components.iter().filter(|c| !matches!(c.kind, ComponentKind::Wire)) {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
    }
    if min_x == i64::MAX {
        return (1, 1);
    }

    for c in subm.components.iter_mut().filter(|c| !matches!(c.kind, ComponentKind::Wire)) {
        c.x -= min_x;
        c.y -= min_y;
    }

    let mut max_x = 0i64;
    let mut max_y = 0i64;
    for c in subm.components.iter().filter(|c| !matches!(c.kind, ComponentKind::Wire)) {
        max_x = max_x.max(c.x + c.width as i64);
        max_y = max_y.max(c.y + c.height as i64);
    }

    let width = ((max_x as f64) * 1.1).ceil().max(1.0) as u32;
    let height = ((max_y as f64) * 1.1).ceil().max(1.0) as u32;
    (width, height)
}
