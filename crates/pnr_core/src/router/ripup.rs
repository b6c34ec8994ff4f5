//! Rip-up-and-reroute: §4.5.3 of the component design.
//!
//! Nets are processed in ascending routed-length order so short, cheap
//! nets settle first and aren't disturbed by later reroutes. A pass with
//! zero conflicts ends the loop; otherwise it runs for up to
//! `config.max_ripup_passes` and logs whatever conflicts remain.

use super::{mark_net, route_net, unmark_net};
use crate::config::Config;
use crate::data::{Net, RoutingGrid};
use pnr_diagnostics::{Diagnostic, DiagnosticSink};

/// Resolves pairwise routing conflicts in `nets` in place.
pub fn resolve_conflicts(
    grid: &mut RoutingGrid,
    nets: &mut [Net],
    config: &Config,
    diagnostics: &DiagnosticSink,
    module_name: &str,
) {
    let mut order: Vec<usize> = (0..nets.len()).collect();
    order.sort_by_key(|&i| nets[i].total_length());

    for pass in 0..config.max_ripup_passes {
        let mut conflicts = 0usize;

        for a in 0..order.len() {
            for b in (a + 1)..order.len() {
                let (i, j) = (order[a], order[b]);
                if !overlap(&nets[i], &nets[j]) {
                    continue;
                }
                conflicts += 1;
                mark_net(grid, &nets[i]);
                unmark_net(grid, &nets[j]);
                route_net(grid, config, &mut nets[j], diagnostics, module_name);
                mark_net(grid, &nets[j]);
            }
        }

        diagnostics.emit(Diagnostic::info(
            format!("rip-up pass {}: {} conflicts resolved", pass + 1, conflicts),
            module_name.to_string(),
        ));

        if conflicts == 0 {
            return;
        }
    }

    let residual = count_conflicts(nets, &order);
    if residual > 0 {
        diagnostics.emit(Diagnostic::warning(
            format!(
                "module `{module_name}`: {residual} routing conflict(s) remain after {} rip-up passes",
                config.max_ripup_passes
            ),
            module_name.to_string(),
        ));
    }
}

fn count_conflicts(nets: &[Net], order: &[usize]) -> usize {
    let mut count = 0;
    for a in 0..order.len() {
        for b in (a + 1)..order.len() {
            if overlap(&nets[order[a]], &nets[order[b]]) {
                count += 1;
            }
        }
    }
    count
}

/// Two nets overlap if any of their segments share a grid cell on the same
/// layer, or any of their vias land on the same point.
pub fn overlap(a: &Net, b: &Net) -> bool {
    for sa in &a.segments {
        for sb in &b.segments {
            if sa.overlaps(sb) {
                return true;
            }
        }
    }
    a.vias.iter().any(|va| b.vias.contains(va))
}
