// src/core/storage/store.rs

//! The keyspace the command layer executes against.
//!
//! A real deployment embeds the engine in a host server that owns key
//! lookup, typing and lifecycle; this map is the minimal stand-in the
//! commands (and their tests) run on. A key exists exactly while its set
//! is non-empty; commands delete the key when the last element goes.

use std::collections::HashMap;

use bytes::Bytes;

use crate::core::storage::zset::ExZset;

#[derive(Debug, Default)]
pub struct Store {
    keys: HashMap<Bytes, ExZset>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    pub fn get(&self, key: &[u8]) -> Option<&ExZset> {
        self.keys.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut ExZset> {
        self.keys.get_mut(key)
    }

    /// Returns the set at `key`, creating an empty one with the given arity
    /// if the key is missing.
    pub fn get_or_create(&mut self, key: &Bytes, arity: usize) -> &mut ExZset {
        self.keys
            .entry(key.clone())
            .or_insert_with(|| ExZset::new(arity))
    }

    pub fn insert(&mut self, key: Bytes, value: ExZset) {
        self.keys.insert(key, value);
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<ExZset> {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.keys.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
