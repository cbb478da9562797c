//! Handler Registry
//!
//! Collaborators register typed callbacks under a string key. One handler
//! per key: a second registration under the same key is refused.

use indexmap::IndexMap;
use tracing::error;

use crate::common::{DatamodError, DatamodResult};

pub struct HandlerRegistry<H> {
    handlers: IndexMap<String, H>,
}

impl<H> HandlerRegistry<H> {
    pub fn new() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// Register `handler` under `key`
    pub fn register(&mut self, key: impl Into<String>, handler: H) -> DatamodResult<()> {
        let key = key.into();
        if self.handlers.contains_key(&key) {
            error!("Only one handler is allowed per key: '{}'", key);
            return Err(DatamodError::DuplicateHandler(key));
        }
        self.handlers.insert(key, handler);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&H> {
        self.handlers.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut H> {
        self.handlers.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &H)> {
        self.handlers.iter().map(|(k, h)| (k.as_str(), h))
    }

    /// Mutable handlers in registration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut H)> {
        self.handlers.iter_mut().map(|(k, h)| (k.as_str(), h))
    }
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}
