//! Service-registry (`mcpServers`) merge

use serde_json::{Map, Value};

/// Server name to opaque server definition, in insertion order.
pub type ServiceRegistry = Map<String, Value>;

/// Outcome of [`merge_registries`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryMerge {
    pub merged: ServiceRegistry,
    pub warnings: Vec<String>,
}

/// Merge `local` into `upstream`, upstream winning on conflict.
///
/// Local-only entries are kept with a warning each. Entries present on both
/// sides with different values take the upstream value and also warn.
/// Warnings follow the insertion order of `local`.
pub fn merge_registries(upstream: &ServiceRegistry, local: &ServiceRegistry) -> RegistryMerge {
    let mut merged = upstream.clone();
    let mut warnings = Vec::new();

    for (name, value) in local {
        match upstream.get(name) {
            None => {
                merged.insert(name.clone(), value.clone());
                warnings.push(format!(
                    "Preserved local-only service registry entry: {name}"
                ));
            }
            Some(theirs) if theirs != value => {
                warnings.push(format!(
                    "Service registry entry '{name}' conflict - using upstream version"
                ));
            }
            Some(_) => {}
        }
    }

    RegistryMerge { merged, warnings }
}

/// The `mcpServers` object of a manifest, or an empty registry.
pub fn registry_of(manifest: &Value) -> ServiceRegistry {
    manifest
        .get("mcpServers")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
