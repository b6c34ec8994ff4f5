//! The router: §4.5 of the component design.
//!
//! Per net: an MST over its pins (Prim, costed by A* path length), an A*
//! route per MST edge, then a whole-module rip-up-and-reroute pass over
//! pairwise conflicts. Requires `subm.routing_grid` to already be allocated
//! and obstacle-marked by [`crate::netbuild::prepare_grid`].

pub mod astar;
pub mod mst;
pub mod ripup;

use crate::config::Config;
use crate::data::{Net, RoutingGrid, Segment, SubModule};
use pnr_common::Point;
use pnr_diagnostics::{Diagnostic, DiagnosticSink};
use std::collections::HashSet;

type State = (i64, i64, usize);

/// Routes every net in `subm`. Nets are routed in their existing order
/// (initial pass), each one committed to the grid as it's finished so
/// later nets in the same pass see it as an obstacle; a rip-up-and-reroute
/// pass then resolves pairwise overlaps (§4.5.3).
pub fn route(subm: &mut SubModule, config: &Config, diagnostics: &DiagnosticSink) {
    let mut grid = subm
        .routing_grid
        .take()
        .expect("routing grid must be prepared (see netbuild::prepare_grid) before routing");

    diagnostics.emit(Diagnostic::info(
        format!("routing module `{}`: {} nets", subm.name, subm.nets.len()),
        subm.name.clone(),
    ));

    for net in subm.nets.iter_mut() {
        route_net(&grid, config, net, diagnostics, &subm.name);
        mark_net(&mut grid, net);
    }

    ripup::resolve_conflicts(&mut grid, &mut subm.nets, config, diagnostics, &subm.name);

    subm.routing_grid = Some(grid);
}

/// Routes a single net from scratch against `grid`'s current occupancy:
/// an MST over its pins costed by A* path length, then an A* route per
/// MST edge. Leaves `net.segments`/`net.vias` populated, possibly
/// partially if some MST edges had no path (§4.5.2's failure semantics).
pub(crate) fn route_net(grid: &RoutingGrid, config: &Config, net: &mut Net, diagnostics: &DiagnosticSink, module_name: &str) {
    net.clear_routing();
    if net.pins.len() < 2 {
        return;
    }

    let own_pins: HashSet<Point> = net.pins.iter().map(|p| p.pos).collect();
    let n = net.pins.len();
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let cost = astar::find_path(
                grid,
                config,
                (net.pins[i].pos, net.pins[i].layer),
                (net.pins[j].pos, net.pins[j].layer),
                &own_pins,
            )
            .map(|path| path_cost(&path, config))
            .unwrap_or(f64::INFINITY);
            dist[i][j] = cost;
            dist[j][i] = cost;
        }
    }

    let edges = mst::prim_mst(n, &dist);
    let mut via_set: HashSet<Point> = HashSet::new();

    for (i, j) in edges {
        match astar::find_path(
            grid,
            config,
            (net.pins[i].pos, net.pins[i].layer),
            (net.pins[j].pos, net.pins[j].layer),
            &own_pins,
        ) {
            Some(path) => {
                let (segments, vias) = path_to_geometry(&path);
                net.segments.extend(segments);
                via_set.extend(vias);
            }
            None => diagnostics.emit(Diagnostic::warning(
                format!("net `{}`: no path between pin {i} and pin {j}", net.name),
                module_name.to_string(),
            )),
        }
    }

    net.vias = via_set.into_iter().collect();
}

fn path_cost(path: &[State], config: &Config) -> f64 {
    path.windows(2)
        .map(|w| if w[0].2 == w[1].2 { 1.0 } else { config.via_cost })
        .sum()
}

/// Splits a path into axis-aligned segments (one per contiguous same-layer
/// run) and the via points at every layer transition.
fn path_to_geometry(path: &[State]) -> (Vec<Segment>, Vec<Point>) {
    let mut segments = Vec::new();
    let mut vias = Vec::new();
    let mut run_start = 0;

    for i in 1..path.len() {
        if path[i].2 != path[i - 1].2 {
            push_run(&mut segments, &path[run_start..i]);
            vias.push(Point::new(path[i - 1].0, path[i - 1].1));
            run_start = i;
        }
    }
    push_run(&mut segments, &path[run_start..]);

    (segments, vias)
}

fn push_run(segments: &mut Vec<Segment>, run: &[State]) {
    if run.len() < 2 {
        return;
    }
    let first = run[0];
    let last = *run.last().unwrap();
    segments.push(Segment {
        start: Point::new(first.0, first.1),
        end: Point::new(last.0, last.1),
        layer: first.2,
    });
}

/// Marks `net`'s segments and vias as occupied on `grid`.
pub(crate) fn mark_net(grid: &mut RoutingGrid, net: &Net) {
    for seg in &net.segments {
        for (x, y) in segment_cells(seg) {
            if grid.in_bounds(x, y) {
                grid.metal_layers[seg.layer].mark(x as usize, y as usize);
            }
        }
    }
    for via in &net.vias {
        if grid.in_bounds(via.x, via.y) {
            grid.mark_via(via.x as usize, via.y as usize);
        }
    }
}

/// Clears `net`'s segments and vias from `grid`, the inverse of [`mark_net`].
pub(crate) fn unmark_net(grid: &mut RoutingGrid, net: &Net) {
    for seg in &net.segments {
        for (x, y) in segment_cells(seg) {
            if grid.in_bounds(x, y) {
                grid.metal_layers[seg.layer].clear(x as usize, y as usize);
            }
        }
    }
    for via in &net.vias {
        if grid.in_bounds(via.x, via.y) {
            grid.clear_via(via.x as usize, via.y as usize);
        }
    }
}

fn segment_cells(seg: &Segment) -> Vec<(i64, i64)> {
    if seg.is_horizontal() {
        let (x0, x1) = (seg.start.x.min(seg.end.x), seg.start.x.max(seg.end.x));
        (x0..=x1).map(|x| (x, seg.start.y)).collect()
    } else {
        let (y0, y1) = (seg.start.y.min(seg.end.y), seg.start.y.max(seg.end.y));
        (y0..=y1).map(|y| (seg.start.x, y)).collect()
    }
}
