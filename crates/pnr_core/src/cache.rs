//! Write-once memoization of fully placed-and-routed module templates.
//!
//! Two instances of the same module type (e.g. two `inverter` instances in
//! one design) produce byte-identical internal layouts — the placement and
//! routing passes are deterministic functions of the module's own netlist,
//! not of where the instance sits in its parent. `LayoutedModules` caches
//! the finished template by module-type name so the second and later
//! instances are cloned instead of re-placed and re-routed from scratch.

use crate::data::SubModule;
use std::collections::HashMap;

/// Cache of fully placed-and-routed `SubModule` templates, keyed by module-type name.
#[derive(Debug, Default)]
pub struct LayoutedModules {
    templates: HashMap<String, SubModule>,
}

impl LayoutedModules {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Returns the cached template for `module_name`, if any.
    pub fn get(&self, module_name: &str) -> Option<&SubModule> {
        self.templates.get(module_name)
    }

    /// Inserts (or replaces) the finished template for `module_name`.
    pub fn insert(&mut self, module_name: impl Into<String>, template: SubModule) {
        self.templates.insert(module_name.into(), template);
    }

    /// Returns `true` if a template for `module_name` is already cached.
    pub fn contains(&self, module_name: &str) -> bool {
        self.templates.contains_key(module_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SubModule;

    #[test]
    fn empty_cache_misses() {
        let cache = LayoutedModules::new();
        assert!(cache.get("inverter").is_none());
        assert!(!cache.contains("inverter"));
    }

    #[test]
    fn insert_and_hit() {
        let mut cache = LayoutedModules::new();
        cache.insert("inverter", SubModule::new("inv0", "inverter"));
        assert!(cache.contains("inverter"));
        assert_eq!(cache.get("inverter").unwrap().module_name, "inverter");
    }

    #[test]
    fn insert_replaces_existing() {
        let mut cache = LayoutedModules::new();
        cache.insert("inverter", SubModule::new("a", "inverter"));
        cache.insert("inverter", SubModule::new("b", "inverter"));
        assert_eq!(cache.get("inverter").unwrap().name, "b");
    }
}
