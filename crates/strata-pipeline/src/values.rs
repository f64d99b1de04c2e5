use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// String-keyed heterogeneous map: the currency items trade in. Per-commit
/// dependency values and pre-run facts share the shape; values are opaque
/// until downcast at the consuming end.
#[derive(Clone, Default)]
pub struct ValueMap {
    entries: BTreeMap<String, Arc<dyn Any + Send + Sync>>,
}

/// Per-commit dependency values handed to `Consume`.
pub type DepMap = ValueMap;

/// Pre-run facts shared between items at configure time.
pub type FactMap = ValueMap;

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, key: &str, value: T) {
        self.entries.insert(key.to_string(), Arc::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn extend(&mut self, other: ValueMap) {
        self.entries.extend(other.entries);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ValueMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
