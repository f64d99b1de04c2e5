use std::collections::BTreeMap;
use std::sync::{Mutex, OnceLock};

use crate::item::PipelineItem;
use crate::PipelineError;

pub type ItemFactory = fn() -> Box<dyn PipelineItem>;

/// Maps item names to their constructors. The process-wide instance comes
/// pre-loaded with the built-in items; tests build their own to avoid global
/// coupling.
#[derive(Default)]
pub struct ItemRegistry {
    factories: BTreeMap<String, ItemFactory>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(|| Box::new(crate::items::DaysSinceStart::default()));
        registry
    }

    /// Register a factory under the name of the item it constructs.
    /// Re-registering a name is a no-op, so module initialisers may run more
    /// than once.
    pub fn register(&mut self, factory: ItemFactory) {
        let name = factory().name().to_string();
        self.factories.entry(name).or_insert(factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn PipelineItem>, PipelineError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PipelineError::UnknownItem(name.to_string()))?;
        Ok(factory())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }
}

/// The process-wide registry, initialised on first use.
pub fn global() -> &'static Mutex<ItemRegistry> {
    static GLOBAL: OnceLock<Mutex<ItemRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| Mutex::new(ItemRegistry::with_builtins()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = ItemRegistry::with_builtins();
        assert!(registry.names().contains(&"DaysSinceStart"));
        let item = registry.create("DaysSinceStart").unwrap();
        assert_eq!(item.name(), "DaysSinceStart");
    }

    #[test]
    fn unknown_item_is_an_error() {
        let registry = ItemRegistry::new();
        let err = registry.create("Nope").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownItem(_)));
    }

    #[test]
    fn registration_is_idempotent() {
        let mut registry = ItemRegistry::new();
        registry.register(|| Box::new(crate::items::DaysSinceStart::default()));
        registry.register(|| Box::new(crate::items::DaysSinceStart::default()));
        assert_eq!(registry.names().len(), 1);
    }

    #[test]
    fn global_registry_is_shared() {
        let registry = global().lock().unwrap();
        assert!(registry.names().contains(&"DaysSinceStart"));
    }
}
