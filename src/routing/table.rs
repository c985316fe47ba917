//! Concurrent registry from `(method, path)` to handler.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::handler::Handler;

type PathMap = HashMap<String, Arc<dyn Handler>>;

/// Two-level map: upper-cased method, then exact path.
///
/// Registration and lookup may run concurrently from any thread. Each
/// insert happens under the write lock, so a lookup sees either the old
/// handler or the new one, never a partial entry. Lookups clone the `Arc`
/// and release the lock before the handler runs.
#[derive(Clone, Default)]
pub struct HandlerTable {
    routes: Arc<RwLock<HashMap<String, PathMap>>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `(method, path)`, replacing any previous one.
    pub fn register(&self, method: &str, path: &str, handler: Arc<dyn Handler>) {
        let method = method.to_ascii_uppercase();

        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = routes
            .entry(method.clone())
            .or_default()
            .insert(path.to_string(), handler)
            .is_some();

        tracing::debug!(method = %method, path = %path, replaced, "Registered handler");
    }

    /// Finds the handler for `(method, path)`.
    ///
    /// The method is matched case-insensitively, the path exactly.
    pub fn lookup(&self, method: &str, path: &str) -> Option<Arc<dyn Handler>> {
        let method = method.to_ascii_uppercase();

        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&method)
            .and_then(|paths| paths.get(path))
            .cloned()
    }

    /// Number of registered `(method, path)` pairs.
    pub fn len(&self) -> usize {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|paths| paths.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTable")
            .field("routes", &self.len())
            .finish()
    }
}
