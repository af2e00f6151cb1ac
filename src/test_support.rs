//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::core::store::{KeyValueStore, StoreError};

/// In-memory `KeyValueStore` for tests that must not touch the filesystem.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            values: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Creates a test App with an empty in-memory store and a seeded RNG.
pub fn test_app() -> App {
    test_app_with(MemoryStore::default())
}

pub fn test_app_with(store: MemoryStore) -> App {
    App::new(
        Box::new(store),
        ResolvedConfig::default(),
        StdRng::seed_from_u64(42),
    )
}
