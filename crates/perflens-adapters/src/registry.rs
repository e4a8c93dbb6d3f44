//! String-keyed adapter registry.
//!
//! A runtime `--tool` name resolves to a concrete adapter through one
//! static constructor table. No reflection, no plugin loading: adding a
//! tool means adding one row here.

use crate::adapter::ToolAdapter;
use crate::analytical::AnalyticalAdapter;
use crate::external::astra_sim::AstraSimAdapter;
use crate::external::nn_meter::NnMeterAdapter;
use crate::external::timeloop::TimeloopAdapter;
use crate::external::vidur::VidurAdapter;

type AdapterCtor = fn() -> Box<dyn ToolAdapter>;

static REGISTRY: &[(&str, AdapterCtor)] = &[
    ("analytical", || Box::new(AnalyticalAdapter::new())),
    ("timeloop", || Box::new(TimeloopAdapter::new())),
    ("vidur", || Box::new(VidurAdapter::new())),
    ("astra-sim", || Box::new(AstraSimAdapter::new())),
    ("nn-meter", || Box::new(NnMeterAdapter::new())),
];

/// Resolve a tool name to its adapter. `None` for unregistered names.
pub fn get_adapter(name: &str) -> Option<Box<dyn ToolAdapter>> {
    REGISTRY
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, ctor)| ctor())
}

/// All registered tool names, in registry order.
pub fn adapter_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(key, _)| *key).collect()
}

/// Instantiate every registered adapter, in registry order.
pub fn all_adapters() -> Vec<Box<dyn ToolAdapter>> {
    REGISTRY.iter().map(|(_, ctor)| ctor()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_registry_key_matches_adapter_name() {
        for name in adapter_names() {
            let adapter = get_adapter(name).unwrap();
            assert_eq!(adapter.name(), name);
        }
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert!(get_adapter("gem5").is_none());
        assert!(get_adapter("").is_none());
    }

    #[test]
    fn test_all_adapters_covers_registry() {
        assert_eq!(all_adapters().len(), adapter_names().len());
    }
}
