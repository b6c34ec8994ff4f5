//! Hierarchy normalization: §4.1 of the component design.
//!
//! Consumes the raw, as-parsed netlist and produces a [`SubModule`] tree
//! where every node owns only its *direct* primitives, sub-modules below
//! `min_mos_num` transistors are inlined into their parent, and adjacency
//! (`in_map`/`out_map`, `net_in_map`/`net_out_map`) is rebuilt bottom-up.

use crate::config::Config;
use crate::data::{Component, ComponentKind, ComponentPayload, SubModule};
use crate::error::{PnrError, PnrResult};
use crate::raw::{RawMosKind, RawNetlist, RawPortKind};
use pnr_diagnostics::DiagnosticSink;
use std::collections::{HashMap, HashSet};

/// Normalizes `module_name`, instantiated as `instance_name`, into a fully
/// resolved `SubModule` tree.
pub fn normalize(
    raw: &RawNetlist,
    module_name: &str,
    instance_name: &str,
    config: &Config,
    diagnostics: &DiagnosticSink,
) -> PnrResult<SubModule> {
    let raw_module = raw.modules.get(module_name).ok_or_else(|| PnrError::MissingSubModule {
        instance: instance_name.to_string(),
        module: module_name.to_string(),
    })?;

    let mut subm = SubModule::new(instance_name, module_name);
    let mut raw_in: HashMap<String, Vec<String>> = HashMap::new();
    let mut raw_out: HashMap<String, Vec<String>> = HashMap::new();
    let mut submodule_names: Vec<String> = Vec::new();

    for (name, port) in &raw_module.ports {
        let kind = match port.kind {
            Some(RawPortKind::Input) | None => ComponentKind::Input,
            Some(RawPortKind::Output) => ComponentKind::Output,
            Some(RawPortKind::Wire) => ComponentKind::Wire,
            Some(RawPortKind::Power) => ComponentKind::Power,
        };
        if name == "VCC" {
            subm.isvcc = true;
        }
        if name == "GND" {
            subm.isgnd = true;
        }
        match kind {
            ComponentKind::Input => subm.input_ports.push(name.clone()),
            ComponentKind::Output => subm.output_ports.push(name.clone()),
            ComponentKind::Wire => subm.wire_ports.push(name.clone()),
            _ => {}
        }
        subm.add_component(Component::new(name.clone(), kind));
        raw_in.insert(name.clone(), port.r#in.clone());
        raw_out.insert(name.clone(), port.out.clone());
    }

    for (name, mos) in &raw_module.mosfets {
        let kind = match mos.kind {
            RawMosKind::Nmos => ComponentKind::Nmos,
            RawMosKind::Pmos => ComponentKind::Pmos,
        };
        let mut comp = Component::new(name.clone(), kind);
        comp.payload = ComponentPayload::Mos {
            drain: mos.drain.clone(),
            source: mos.source.clone(),
            gate: mos.gate.clone(),
        };
        subm.add_component(comp);
        subm.mosfets.push(name.clone());
        raw_in.insert(name.clone(), vec![mos.gate.clone(), mos.source.clone()]);
        raw_out.insert(name.clone(), vec![mos.drain.clone()]);
    }

    for (inst_name, inst) in &raw_module.sub_modules {
        let child_raw = raw.modules.get(&inst.module).ok_or_else(|| PnrError::MissingSubModule {
            instance: inst_name.clone(),
            module: inst.module.clone(),
        })?;
        let child = normalize(raw, &inst.module, inst_name, config, diagnostics)?;

        // Direct count off the referenced module's own raw definition, not
        // child.transitive_mos_count() through its own boxed children.
        if (child_raw.mosfets.len() as u32) < config.min_mos_num {
            splice_inline(&mut subm, &mut raw_in, &mut raw_out, inst_name, child);
        } else {
            let mut comp = Component::new(inst_name.clone(), ComponentKind::SubModule(inst.module.clone()));
            comp.payload = ComponentPayload::SubModule(Box::new(child));
            subm.add_component(comp);
            submodule_names.push(inst_name.clone());
            raw_in.entry(inst_name.clone()).or_default();
            raw_out.entry(inst_name.clone()).or_default();
        }
    }

    validate_mos_terminals(&subm, &submodule_names)?;

    for (comp_name, sources) in &raw_in {
        for source in sources {
            subm.out_map.entry(source.clone()).or_default().push(comp_name.clone());
        }
    }
    for (comp_name, targets) in &raw_out {
        for target in targets {
            subm.in_map.entry(target.clone()).or_default().push(comp_name.clone());
        }
    }

    build_net_maps(&mut subm, &submodule_names)?;

    Ok(subm)
}

/// Splices an inlined child's fully-normalized components into `subm`,
/// renaming every child component to `"{instance}.{child_name}"`. Parent
/// references to `"{instance}.{port}"` (already dotted in the raw document)
/// resolve against these new names with no further rewriting.
fn splice_inline(
    subm: &mut SubModule,
    raw_in: &mut HashMap<String, Vec<String>>,
    raw_out: &mut HashMap<String, Vec<String>>,
    instance: &str,
    child: SubModule,
) {
    let prefix = |s: &str| format!("{instance}.{s}");

    for mut comp in child.components {
        comp.name = prefix(&comp.name);
        if let ComponentPayload::Mos { drain, source, gate } = &mut comp.payload {
            *drain = prefix(drain);
            *source = prefix(source);
            *gate = prefix(gate);
        }
        subm.add_component(comp);
    }
    for (k, vs) in child.in_map {
        raw_out.entry(prefix(&k)).or_default().extend(vs.iter().map(|v| prefix(v)));
    }
    for (k, vs) in child.out_map {
        raw_in.entry(prefix(&k)).or_default().extend(vs.iter().map(|v| prefix(v)));
    }
}

fn validate_mos_terminals(subm: &SubModule, submodule_names: &[String]) -> PnrResult<()> {
    for comp in &subm.components {
        if let ComponentPayload::Mos { drain, source, gate } = &comp.payload {
            for terminal in [drain, source, gate] {
                if !endpoint_resolves(subm, submodule_names, terminal) {
                    return Err(PnrError::UndefinedMosTerminal {
                        owner: subm.name.clone(),
                        mos: comp.name.clone(),
                        terminal: terminal.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn endpoint_resolves(subm: &SubModule, submodule_names: &[String], endpoint: &str) -> bool {
    if subm.component(endpoint).is_some() {
        return true;
    }
    if let Some((sm, rest)) = find_owning_submodule(endpoint, submodule_names) {
        if let Some(sub) = boxed_submodule(subm, sm) {
            return sub.component(rest).is_some();
        }
    }
    false
}

/// Resolves `endpoint`'s owning boxed sub-module instance by longest
/// matching prefix among `submodule_names`, returning `(instance, rest)`.
/// A longest-prefix match (rather than the first `.`) is required because
/// inlining can leave dotted component names like `"inv1.g0"` where `g0`
/// itself owns a further boxed sub-module instance.
fn find_owning_submodule<'a>(endpoint: &str, submodule_names: &'a [String]) -> Option<(&'a str, &'a str)> {
    submodule_names
        .iter()
        .filter(|name| endpoint.len() > name.len() && endpoint.starts_with(name.as_str()) && endpoint.as_bytes()[name.len()] == b'.')
        .max_by_key(|name| name.len())
        .map(|name| (name.as_str(), &endpoint[name.len() + 1..]))
}

fn boxed_submodule<'a>(subm: &'a SubModule, name: &str) -> Option<&'a SubModule> {
    subm.component(name).and_then(|c| match &c.payload {
        ComponentPayload::SubModule(sub) => Some(sub.as_ref()),
        _ => None,
    })
}

/// Builds `net_in_map`/`net_out_map` by forwarding through boundary
/// sub-module instances one hop, per steps 3-4 of the normalization algorithm.
fn build_net_maps(subm: &mut SubModule, submodule_names: &[String]) -> PnrResult<()> {
    let port_like: Vec<String> = subm
        .components
        .iter()
        .filter(|c| c.kind.is_port_like())
        .map(|c| c.name.clone())
        .collect();

    for comp_name in &port_like {
        if let Some(sources) = subm.in_map.get(comp_name).cloned() {
            let mut resolved: HashSet<String> = HashSet::new();
            for source in &sources {
                if let Some((sm, rest)) = find_owning_submodule(source, submodule_names) {
                    if sm == comp_name || sm == subm.name {
                        continue;
                    }
                    if let Some(sub) = boxed_submodule(subm, sm) {
                        if let Some(ComponentPayload::Mos { drain, .. }) = sub.component(rest).map(|c| &c.payload) {
                            resolved.insert(format!("{sm}.{drain}"));
                            continue;
                        }
                    }
                }
                if source.contains('.') && !endpoint_resolves(subm, submodule_names, source) {
                    return Err(PnrError::DanglingEndpoint {
                        owner: subm.name.clone(),
                        endpoint: source.clone(),
                    });
                }
                resolved.insert(source.clone());
            }
            if !resolved.is_empty() {
                subm.net_in_map.insert(comp_name.clone(), resolved.into_iter().collect());
            }
        }

        if let Some(targets) = subm.out_map.get(comp_name).cloned() {
            let is_rail = comp_name == "VCC" || comp_name == "GND";
            let mut resolved: HashSet<String> = HashSet::new();
            for target in &targets {
                if let Some((sm, rest)) = find_owning_submodule(target, submodule_names) {
                    if sm == comp_name || sm == subm.name {
                        continue;
                    }
                    if let Some(sub) = boxed_submodule(subm, sm) {
                        if let Some(ComponentPayload::Mos { source, gate, .. }) = sub.component(rest).map(|c| &c.payload) {
                            let candidate = pick_forwarding_terminal(sub, source, gate, is_rail);
                            match candidate {
                                Some(terminal) => {
                                    resolved.insert(format!("{sm}.{terminal}"));
                                    continue;
                                }
                                None => {
                                    let kind = sub
                                        .component(source)
                                        .map(|c| format!("{:?}", c.kind))
                                        .unwrap_or_else(|| "unknown".to_string());
                                    return Err(PnrError::InvalidForwardingTarget {
                                        owner: subm.name.clone(),
                                        endpoint: target.clone(),
                                        terminal: source.clone(),
                                        kind,
                                    });
                                }
                            }
                        }
                    }
                }
                if target.contains('.') && !endpoint_resolves(subm, submodule_names, target) {
                    return Err(PnrError::DanglingEndpoint {
                        owner: subm.name.clone(),
                        endpoint: target.clone(),
                    });
                }
                resolved.insert(target.clone());
            }
            if !resolved.is_empty() {
                subm.net_out_map.insert(comp_name.clone(), resolved.into_iter().collect());
            }
        }
    }

    Ok(())
}

fn pick_forwarding_terminal<'a>(sub: &SubModule, source: &'a str, gate: &'a str, is_rail: bool) -> Option<&'a str> {
    let accepts = |name: &str| {
        sub.component(name)
            .map(|c| c.kind == ComponentKind::Input || (is_rail && c.kind == ComponentKind::Power))
            .unwrap_or(false)
    };
    if accepts(source) {
        Some(source)
    } else if accepts(gate) {
        Some(gate)
    } else {
        None
    }
}
