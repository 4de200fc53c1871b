//! The caller contract and the per-execution service scope.
//!
//! The host implements [`CallerContext`] for whoever issued the command (a
//! chat user, a console session, a test fixture). The framework only ever
//! talks back through [`CallerContext::respond`]; it never owns the
//! transport.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// A message sent back to the caller.
#[derive(Debug, Clone)]
pub enum Response {
    /// Plain text.
    Text(String),
    /// A structured payload the host renders itself.
    Value(Value),
}

impl From<&str> for Response {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Response {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The entity a command is executed on behalf of.
///
/// Provided by the host for every `execute` call. Implementations are shared
/// across the whole pipeline of one invocation, so they must be `Send + Sync`.
#[async_trait]
pub trait CallerContext: Send + Sync {
    /// A stable identifier or display name for the caller.
    fn identity(&self) -> &str;

    /// Delivers a message to the caller.
    async fn respond(&self, response: Response) -> Result<(), String>;
}

/// A type-keyed map of services available to parsers, conditions, and
/// command bodies during one execution.
///
/// One scope handle accompanies each execution and is released when the
/// pipeline terminates. Lookups are by concrete type:
///
/// ```rust,ignore
/// let mut scope = ServiceScope::new();
/// scope.insert(Database::connect());
/// let db = scope.get::<Database>().unwrap();
/// ```
#[derive(Default)]
pub struct ServiceScope {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a service, replacing any previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: T) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(service));
    }

    /// Looks up a service by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|arc| Arc::clone(arc).downcast::<T>().ok())
    }

    /// Returns `true` if no services are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceScope")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_insert_get() {
        let mut scope = ServiceScope::new();
        scope.insert(7usize);
        assert_eq!(*scope.get::<usize>().unwrap(), 7);
        assert!(scope.get::<String>().is_none());
    }

    #[test]
    fn test_scope_replaces_same_type() {
        let mut scope = ServiceScope::new();
        scope.insert("first".to_string());
        scope.insert("second".to_string());
        assert_eq!(*scope.get::<String>().unwrap(), "second");
    }
}
