//! Feasible three-band starting placement (§4.2 of the component design).

use crate::config::Config;
use crate::data::{ComponentKind, SubModule};

/// Row-packs `subm`'s primitives left-to-right in three bands: inputs and
/// power on the left, MOS devices and sub-module instances in the middle,
/// outputs on the right. Wires are parked at the sentinel `(-10000,
/// -10000)` and excluded from every later geometric computation.
pub fn initial_place(subm: &mut SubModule, _config: &Config) {
    let sized_names: Vec<String> = subm
        .components
        .iter()
        .filter(|c| !matches!(c.kind, ComponentKind::Wire))
        .map(|c| c.name.clone())
        .collect();

    if sized_names.is_empty() {
        park_wires(subm);
        return;
    }

    let n = sized_names.len() as f64;
    let avg_width: f64 = sized_names
        .iter()
        .map(|name| subm.component(name).unwrap().width as f64)
        .sum::<f64>()
        / n;
    let max_width = (1.5 * n.sqrt() * avg_width).max(1.0);

    let band_left = sorted_band(subm, |k| matches!(k, ComponentKind::Input | ComponentKind::Power));
    let band_middle = sorted_band(subm, |k| {
        matches!(k, ComponentKind::Nmos | ComponentKind::Pmos | ComponentKind::SubModule(_))
    });
    let band_right = sorted_band(subm, |k| matches!(k, ComponentKind::Output));

    let mut current_x: i64 = 0;
    for band in [&band_left, &band_middle, &band_right] {
        current_x = pack_band(subm, band, current_x, max_width);
    }

    park_wires(subm);
}

fn sorted_band(subm: &SubModule, pred: impl Fn(&ComponentKind) -> bool) -> Vec<String> {
    let mut names: Vec<String> = subm
        .components
        .iter()
        .filter(|c| pred(&c.kind))
        .map(|c| c.name.clone())
        .collect();
    names.sort();
    names
}

fn pack_band(subm: &mut SubModule, band: &[String], band_x: i64, max_width: f64) -> i64 {
    let mut x = band_x;
    let mut y: i64 = 0;
    let mut line_width: i64 = 0;

    for name in band {
        let (w, h) = {
            let c = subm.component(name).unwrap();
            (c.width as i64, c.height as i64)
        };

        loop {
            let candidate = (x, y, x + w, y + h);
            let overlaps = subm.components.iter().any(|other| {
                if other.name == *name || matches!(other.kind, ComponentKind::Wire) {
                    return false;
                }
                let (ox0, oy0, ox1, oy1) = other.bbox();
                candidate.0 < ox1 && ox0 < candidate.2 && candidate.1 < oy1 && oy0 < candidate.3
            });
            if !overlaps {
                break;
            }
            y += h + 1;
            if (y as f64) > max_width {
                y = 0;
                x += line_width.max(1) + 1;
                line_width = 0;
            }
        }

        if let Some(c) = subm.component_mut(name) {
            c.x = x;
            c.y = y;
        }
        line_width = line_width.max(h);
        y += h + 1;
    }

    x + line_width + 1
}

fn park_wires(subm: &mut SubModule) {
    for c in subm.components.iter_mut() {
        if matches!(c.kind, ComponentKind::Wire) {
            c.x = -10000;
            c.y = -10000;
        }
    }
}
