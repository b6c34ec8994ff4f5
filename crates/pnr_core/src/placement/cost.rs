//! Wirelength + area placement cost (§4.3 of the component design).

use crate::config::Config;
use crate::data::{Component, ComponentKind, SubModule};

/// Total wirelength cost across every component in `subm`, weighted by
/// `in_matter`/`out_matter` on input/power drivers and output/power sinks
/// respectively. Unresolved driver/sink names contribute nothing — callers
/// should pre-validate adjacency once and warn, rather than re-warn on
/// every evaluation of this hot-path function.
pub fn total_wirelength(config: &Config, subm: &SubModule) -> f64 {
    subm.components.iter().map(|c| component_wirelength(config, c, subm)).sum()
}

fn component_wirelength(config: &Config, comp: &Component, subm: &SubModule) -> f64 {
    let center = comp.center();
    let mut total = 0.0;

    if let Some(sources) = subm.in_map.get(&comp.name) {
        for source in sources {
            if let Some(driver) = subm.component(source) {
                if matches!(driver.kind, ComponentKind::Input | ComponentKind::Power) {
                    total += config.in_matter * center.euclidean(driver.center());
                }
            }
        }
    }
    if let Some(targets) = subm.out_map.get(&comp.name) {
        for target in targets {
            if let Some(sink) = subm.component(target) {
                if matches!(sink.kind, ComponentKind::Output | ComponentKind::Power) {
                    total += config.out_matter * center.euclidean(sink.center());
                }
            }
        }
    }
    total
}

/// Area of the bounding box over non-port, non-wire primitives.
pub fn area(subm: &SubModule) -> f64 {
    match subm.primitive_bbox() {
        Some((x0, y0, x1, y1)) => ((x1 - x0) as f64) * ((y1 - y0) as f64),
        None => 0.0,
    }
}

/// Returns the names of adjacency references (in `in_map`/`out_map`) that
/// do not resolve to a known component in `subm`. Intended to be called
/// once before annealing starts, so unresolved names can be logged a single
/// time instead of on every cost evaluation.
pub fn unresolved_adjacency(subm: &SubModule) -> Vec<String> {
    let mut missing = Vec::new();
    for (comp_name, sources) in &subm.in_map {
        if subm.component(comp_name).is_none() {
            continue;
        }
        for source in sources {
            if subm.component(source).is_none() {
                missing.push(source.clone());
            }
        }
    }
    for (comp_name, targets) in &subm.out_map {
        if subm.component(comp_name).is_none() {
            continue;
        }
        for target in targets {
            if subm.component(target).is_none() {
                missing.push(target.clone());
            }
        }
    }
    missing.sort();
    missing.dedup();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Component;
    use pnr_common::Point;

    fn make_subm() -> SubModule {
        let mut subm = SubModule::new("top", "top");
        let mut a = Component::new("A", ComponentKind::Input);
        a.x = 0;
        a.y = 0;
        subm.add_component(a);
        let mut m0 = Component::new("m0", ComponentKind::Nmos);
        m0.x = 10;
        m0.y = 0;
        subm.add_component(m0);
        subm.in_map.insert("m0".into(), vec!["A".into()]);
        subm.out_map.insert("A".into(), vec!["m0".into()]);
        subm
    }

    #[test]
    fn wirelength_weights_input_driver() {
        let subm = make_subm();
        let config = Config::default();
        let wl = total_wirelength(&config, &subm);
        let a_center = Point::new(1, 1);
        let m0_center = Point::new(13, 2);
        let expected = config.in_matter * a_center.euclidean(m0_center);
        assert!((wl - expected).abs() < 1e-9);
    }

    #[test]
    fn area_ignores_ports() {
        let subm = make_subm();
        // only m0 counts: bbox is 6x4 at (10,0)
        assert_eq!(area(&subm), 24.0);
    }

    #[test]
    fn unresolved_adjacency_reports_missing_names() {
        let mut subm = make_subm();
        subm.in_map.insert("m0".into(), vec!["A".into(), "ghost".into()]);
        let missing = unresolved_adjacency(&subm);
        assert_eq!(missing, vec!["ghost".to_string()]);
    }
}
