//! Prefix to handler routing, updated by registration events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::registry::catalog::HandlerCatalog;

/// A change in the set of live handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Process start: register every handler in the catalog.
    Started,
    Added(String),
    Removed(String),
}

/// A resolved prefix: which handler converts the remaining path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingReference {
    pub prefix: String,
    pub handler_name: String,
    /// Path after the prefix segment, without a leading `/`.
    pub path: String,
}

#[derive(Debug, Clone, Default)]
struct RoutingTable {
    /// Stripped prefix -> handler name.
    resolvers: HashMap<String, String>,
    /// Advertised prefixes, sorted.
    supported: Vec<String>,
}

/// Live mapping from URL prefix to handler name.
///
/// Reads load an immutable snapshot and never block. Writers are
/// serialized and publish a complete table, so a prefix never becomes
/// visible before its handler link.
#[derive(Debug, Default)]
pub struct PrefixRegistry {
    table: ArcSwap<RoutingTable>,
    writer: Mutex<()>,
}

impl PrefixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a registration event against the live handlers in `catalog`.
    pub fn apply(&self, event: &RegistryEvent, catalog: &dyn HandlerCatalog) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = RoutingTable::clone(&self.table.load());

        match event {
            RegistryEvent::Started => {
                table.resolvers.clear();
                let mut handlers = catalog.all();
                handlers.sort_by(|a, b| a.name().cmp(b.name()));
                for handler in handlers {
                    bind(&mut table, handler.name(), &handler.prefix());
                }
            }
            RegistryEvent::Added(name) => {
                unbind(&mut table, name);
                match catalog.get(name) {
                    Some(handler) => bind(&mut table, name, &handler.prefix()),
                    None => tracing::error!(handler = %name, "Added prefix handler is not in the catalog"),
                }
            }
            RegistryEvent::Removed(name) => {
                unbind(&mut table, name);
                tracing::debug!(handler = %name, "Unregistered prefix handler");
            }
        }

        let leaving = match event {
            RegistryEvent::Removed(name) => Some(name.as_str()),
            _ => None,
        };
        table.supported = supported_prefixes(catalog, leaving);
        self.table.store(Arc::new(table));
    }

    /// Resolve `prefix` for a request whose remaining path is `path`.
    pub fn resolve(&self, prefix: &str, path: &str) -> Option<MappingReference> {
        let table = self.table.load();
        let handler_name = table.resolvers.get(strip(prefix))?;
        Some(MappingReference {
            prefix: strip(prefix).to_string(),
            handler_name: handler_name.clone(),
            path: path.strip_prefix('/').unwrap_or(path).to_string(),
        })
    }

    /// Name of the handler currently bound to `prefix`.
    pub fn handler_for(&self, prefix: &str) -> Option<String> {
        self.table.load().resolvers.get(strip(prefix)).cloned()
    }

    /// Prefixes advertised after the last event, sorted.
    pub fn supported_prefixes(&self) -> Vec<String> {
        self.table.load().supported.clone()
    }

    /// Number of routed prefixes.
    pub fn len(&self) -> usize {
        self.table.load().resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strip leading and trailing `/` separators.
pub fn strip(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

fn bind(table: &mut RoutingTable, name: &str, prefix: &str) {
    let prefix = strip(prefix);
    if prefix.is_empty() {
        tracing::debug!(handler = %name, "Prefix handler has no prefix, not registering it");
        return;
    }

    if let Some(replaced) = table.resolvers.insert(prefix.to_string(), name.to_string()) {
        if replaced != name {
            tracing::warn!(
                prefix = %prefix,
                handler = %name,
                replaced = %replaced,
                "Prefix already registered, last registration wins"
            );
        }
    }
    tracing::debug!(prefix = %prefix, handler = %name, "Registered prefix handler");
}

fn unbind(table: &mut RoutingTable, name: &str) {
    table.resolvers.retain(|_, bound| bound != name);
}

/// Prefixes of every catalogued handler except `leaving`, which may still be
/// in the catalog while it is being removed.
fn supported_prefixes(catalog: &dyn HandlerCatalog, leaving: Option<&str>) -> Vec<String> {
    let mut prefixes: Vec<String> = catalog
        .all()
        .into_iter()
        .filter(|handler| Some(handler.name()) != leaving)
        .filter_map(|handler| {
            let prefix = handler.prefix();
            let prefix = strip(&prefix);
            if prefix.is_empty() {
                tracing::warn!(handler = %handler.name(), "Prefix handler has an empty prefix and receives no traffic");
                None
            } else {
                Some(prefix.to_string())
            }
        })
        .collect();
    prefixes.sort();
    prefixes.dedup();
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::handler::{MappingHandler, PrefixHandler};
    use crate::mapping::source::MapSource;
    use crate::registry::catalog::HandlerSet;

    fn handler(name: &str, prefix: &str) -> Arc<dyn PrefixHandler> {
        let key = format!("urlmapping.prefixhandlers.{}.prefix", name);
        Arc::new(MappingHandler::builder(name).build(Arc::new(MapSource::new().with(key, prefix))))
    }

    #[test]
    fn test_started_registers_catalog() {
        let catalog = HandlerSet::new();
        catalog.insert(handler("a", "/alpha/"));
        catalog.insert(handler("b", "beta"));
        let registry = PrefixRegistry::new();
        registry.apply(&RegistryEvent::Started, &catalog);

        assert_eq!(registry.supported_prefixes(), vec!["alpha", "beta"]);
        let reference = registry.resolve("alpha", "/some/page").unwrap();
        assert_eq!(reference.handler_name, "a");
        assert_eq!(reference.path, "some/page");
        assert!(registry.resolve("gamma", "x").is_none());
    }

    #[test]
    fn test_add_remove_round_trip() {
        let catalog = HandlerSet::new();
        catalog.insert(handler("a", "alpha"));
        let registry = PrefixRegistry::new();
        registry.apply(&RegistryEvent::Started, &catalog);
        let before = registry.supported_prefixes();

        catalog.insert(handler("b", "beta"));
        registry.apply(&RegistryEvent::Added("b".into()), &catalog);
        assert_eq!(registry.handler_for("beta").as_deref(), Some("b"));

        catalog.remove("b");
        registry.apply(&RegistryEvent::Removed("b".into()), &catalog);
        assert_eq!(registry.supported_prefixes(), before);
        assert!(registry.handler_for("beta").is_none());
    }

    #[test]
    fn test_removed_before_leaving_catalog() {
        let catalog = HandlerSet::new();
        catalog.insert(handler("a", "alpha"));
        catalog.insert(handler("b", "beta"));
        let registry = PrefixRegistry::new();
        registry.apply(&RegistryEvent::Started, &catalog);

        registry.apply(&RegistryEvent::Removed("b".into()), &catalog);
        assert!(registry.resolve("beta", "x").is_none());
        assert_eq!(registry.supported_prefixes(), vec!["alpha"]);
    }

    #[test]
    fn test_blank_prefix_not_registered() {
        let catalog = HandlerSet::new();
        catalog.insert(handler("blank", "/"));
        let registry = PrefixRegistry::new();
        registry.apply(&RegistryEvent::Added("blank".into()), &catalog);

        assert!(registry.is_empty());
        assert!(registry.supported_prefixes().is_empty());
    }

    #[test]
    fn test_last_registration_wins() {
        let catalog = HandlerSet::new();
        catalog.insert(handler("first", "shared"));
        catalog.insert(handler("second", "shared"));
        let registry = PrefixRegistry::new();
        registry.apply(&RegistryEvent::Added("first".into()), &catalog);
        registry.apply(&RegistryEvent::Added("second".into()), &catalog);

        assert_eq!(registry.handler_for("shared").as_deref(), Some("second"));
        assert_eq!(registry.supported_prefixes(), vec!["shared"]);
    }

    #[test]
    fn test_re_adding_a_handler_drops_its_old_prefix() {
        let catalog = HandlerSet::new();
        catalog.insert(handler("a", "old"));
        let registry = PrefixRegistry::new();
        registry.apply(&RegistryEvent::Added("a".into()), &catalog);

        catalog.insert(handler("a", "new"));
        registry.apply(&RegistryEvent::Added("a".into()), &catalog);

        assert!(registry.handler_for("old").is_none());
        assert_eq!(registry.handler_for("new").as_deref(), Some("a"));
    }

    #[test]
    fn test_missing_handler_is_ignored() {
        let registry = PrefixRegistry::new();
        registry.apply(&RegistryEvent::Added("ghost".into()), &HandlerSet::new());
        assert!(registry.is_empty());
    }
}
