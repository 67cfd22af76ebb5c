//! Live prefix handler instances, keyed by name.

use std::sync::Arc;

use dashmap::DashMap;

use crate::mapping::handler::PrefixHandler;

/// A lookup of live handlers by name.
pub trait HandlerCatalog: Send + Sync {
    fn get(&self, name: &str) -> Option<Arc<dyn PrefixHandler>>;

    /// Every live handler, in no particular order.
    fn all(&self) -> Vec<Arc<dyn PrefixHandler>>;
}

/// Concurrent handler catalog.
#[derive(Default, Clone)]
pub struct HandlerSet {
    inner: Arc<DashMap<String, Arc<dyn PrefixHandler>>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `handler` under its own name, returning the one it replaced.
    pub fn insert(&self, handler: Arc<dyn PrefixHandler>) -> Option<Arc<dyn PrefixHandler>> {
        self.inner.insert(handler.name().to_string(), handler)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn PrefixHandler>> {
        self.inner.remove(name).map(|(_, handler)| handler)
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl HandlerCatalog for HandlerSet {
    fn get(&self, name: &str) -> Option<Arc<dyn PrefixHandler>> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    fn all(&self) -> Vec<Arc<dyn PrefixHandler>> {
        self.inner.iter().map(|entry| entry.value().clone()).collect()
    }
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet").field("handlers", &self.names()).finish()
    }
}
