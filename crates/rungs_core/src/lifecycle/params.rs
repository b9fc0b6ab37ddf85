use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Setup parameters handed to a component when it is registered.
///
/// Values are type-erased; read them back with [`Params::get`]. The map is
/// immutable once registered and cheap to clone.
#[derive(Clone, Default)]
pub struct Params {
    values: Arc<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Replaces any previous value under `key`.
    pub fn with<V>(mut self, key: impl Into<String>, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        Arc::make_mut(&mut self.values).insert(key.into(), Arc::new(value));
        self
    }

    /// Typed read. `None` when the key is missing or holds another type.
    pub fn get<V: Any>(&self, key: &str) -> Option<&V> {
        self.values.get(key)?.downcast_ref::<V>()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
