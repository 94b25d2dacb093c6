use super::{KeyValueStore, PersistenceError, PersistenceResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process store. Holds nothing across runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a key with raw text, e.g. to simulate legacy or corrupt data.
    pub fn with_value(self, key: &str, value: impl Into<String>) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.into());
        }
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> PersistenceResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> PersistenceResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
