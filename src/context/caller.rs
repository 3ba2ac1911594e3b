//! The calling execution unit.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::keys::{PropagationKey, PropagationValue};

/// What the dispatcher needs to know about whoever is calling it.
pub trait CallingUnit: Send + Sync {
    /// The caller's local value for `key`, if one is set.
    fn local(&self, key: PropagationKey) -> Option<PropagationValue>;

    /// The caller's own identifying name.
    fn name(&self) -> Option<&str>;

    /// The name of the function that started the caller.
    fn parent_function_name(&self) -> Option<&str>;
}

/// An explicit caller context, built up by whoever owns the task.
///
/// # Example
///
/// ```ignore
/// let caller = CallerContext::new()
///     .with_parent_function("onMessage")
///     .with_local(PropagationKey::RemoteAddress, "10.0.0.7:51234".to_string());
/// ```
#[derive(Clone, Default)]
pub struct CallerContext {
    name: Option<String>,
    parent_function: Option<String>,
    locals: HashMap<PropagationKey, PropagationValue>,
}

impl CallerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent_function(mut self, name: impl Into<String>) -> Self {
        self.parent_function = Some(name.into());
        self
    }

    /// Set a local value. The value stays opaque to the dispatcher.
    pub fn with_local<T: std::any::Any + Send + Sync>(mut self, key: PropagationKey, value: T) -> Self {
        self.locals.insert(key, Arc::new(value));
        self
    }

    /// Set a local value that is already shared.
    pub fn with_shared_local(mut self, key: PropagationKey, value: PropagationValue) -> Self {
        self.locals.insert(key, value);
        self
    }

    pub fn remove_local(&mut self, key: PropagationKey) -> Option<PropagationValue> {
        self.locals.remove(&key)
    }
}

impl CallingUnit for CallerContext {
    fn local(&self, key: PropagationKey) -> Option<PropagationValue> {
        self.locals.get(&key).cloned()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parent_function_name(&self) -> Option<&str> {
        self.parent_function.as_deref()
    }
}

impl fmt::Debug for CallerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.locals.keys().collect();
        keys.sort();
        f.debug_struct("CallerContext")
            .field("name", &self.name)
            .field("parent_function", &self.parent_function)
            .field("locals", &keys)
            .finish()
    }
}
