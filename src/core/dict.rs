// src/core/dict.rs

//! Chained hash table with incremental rehash.
//!
//! Two bucket arrays: `ht[0]` is active, `ht[1]` is the rehash target.
//! Sizes are powers of two and the bucket index is `hash & (size - 1)`.
//! While a rehash is in progress every stepped operation (find, add,
//! delete, random sampling) migrates a small batch of buckets, new entries
//! go to `ht[1]`, and lookups search both tables.
//!
//! Keys are interned byte strings; the value type is generic so the same
//! table serves the member index of a sorted set, scratch membership sets,
//! and the set-algebra accumulator.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

use bytes::Bytes;
use once_cell::sync::Lazy;
use rand::Rng;
use tracing::debug;

pub const DICT_HT_INITIAL_SIZE: usize = 4;

/// Buckets migrated per stepped operation.
const REHASH_BATCH: usize = 1;

/// Grow is forced past this load factor even when resizing is disabled.
const FORCE_RESIZE_RATIO: usize = 5;

/// Samples drawn by [`Dict::fair_random_key`].
const GETFAIR_NUM_ENTRIES: usize = 5;

/// Shrink when the table is under this percent full.
const MIN_FILL_PERCENT: usize = 10;

/// The process-wide SipHash seed. Initialized once; the only hash used.
static HASH_STATE: Lazy<RandomState> = Lazy::new(RandomState::new);

fn hash_key(key: &[u8]) -> u64 {
    HASH_STATE.hash_one(key)
}

#[derive(Debug)]
struct Entry<V> {
    key: Bytes,
    val: V,
    next: Option<Box<Entry<V>>>,
}

#[derive(Debug)]
struct Table<V> {
    buckets: Vec<Option<Box<Entry<V>>>>,
    used: usize,
}

impl<V> Table<V> {
    fn empty() -> Self {
        Table {
            buckets: Vec::new(),
            used: 0,
        }
    }

    fn with_size(size: usize) -> Self {
        let mut buckets = Vec::with_capacity(size);
        buckets.resize_with(size, || None);
        Table { buckets, used: 0 }
    }

    fn size(&self) -> usize {
        self.buckets.len()
    }

    fn sizemask(&self) -> usize {
        self.buckets.len().wrapping_sub(1)
    }
}

/// The hash index. `rehash_idx` is `None` while no rehash is in progress.
#[derive(Debug)]
pub struct Dict<V> {
    tables: [Table<V>; 2],
    rehash_idx: Option<usize>,
    resize_enabled: bool,
}

impl<V> Default for Dict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Dict<V> {
    pub fn new() -> Self {
        Dict {
            tables: [Table::empty(), Table::empty()],
            rehash_idx: None,
            resize_enabled: true,
        }
    }

    pub fn len(&self) -> usize {
        self.tables[0].used + self.tables[1].used
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bucket count over both tables.
    pub fn slots(&self) -> usize {
        self.tables[0].size() + self.tables[1].size()
    }

    fn is_rehashing(&self) -> bool {
        self.rehash_idx.is_some()
    }

    /// Toggles automatic growth. Past [`FORCE_RESIZE_RATIO`] a grow happens
    /// regardless.
    pub fn set_resize_enabled(&mut self, enabled: bool) {
        self.resize_enabled = enabled;
    }

    /// Migrates up to `n` non-empty buckets from `ht[0]` to `ht[1]`,
    /// visiting at most `10 * n` empty buckets along the way.
    fn rehash(&mut self, n: usize) {
        let Some(mut idx) = self.rehash_idx else {
            return;
        };
        let mut empty_visits = n * 10;
        let mut moved_buckets = 0;

        while moved_buckets < n && self.tables[0].used > 0 {
            if idx >= self.tables[0].size() {
                break;
            }
            if self.tables[0].buckets[idx].is_none() {
                idx += 1;
                empty_visits -= 1;
                if empty_visits == 0 {
                    self.rehash_idx = Some(idx);
                    return;
                }
                continue;
            }

            let mut entry = self.tables[0].buckets[idx].take();
            while let Some(mut e) = entry {
                entry = e.next.take();
                let slot = hash_key(&e.key) as usize & self.tables[1].sizemask();
                e.next = self.tables[1].buckets[slot].take();
                self.tables[1].buckets[slot] = Some(e);
                self.tables[0].used -= 1;
                self.tables[1].used += 1;
            }
            idx += 1;
            moved_buckets += 1;
        }

        if self.tables[0].used == 0 {
            self.tables[0] = std::mem::replace(&mut self.tables[1], Table::empty());
            self.rehash_idx = None;
            debug!(size = self.tables[0].size(), "rehash complete");
        } else {
            self.rehash_idx = Some(idx);
        }
    }

    fn rehash_step(&mut self) {
        self.rehash(REHASH_BATCH);
    }

    /// Pre-sizes the table for at least `size` entries. No-op while a
    /// rehash is running or when the target is not larger than needed.
    pub fn expand(&mut self, size: usize) -> bool {
        if self.is_rehashing() || self.tables[0].used > size {
            return false;
        }
        let realsize = size.max(DICT_HT_INITIAL_SIZE).next_power_of_two();
        if realsize == self.tables[0].size() {
            return false;
        }

        if self.tables[0].size() == 0 {
            // First allocation goes straight into the active table.
            self.tables[0] = Table::with_size(realsize);
        } else {
            self.tables[1] = Table::with_size(realsize);
            self.rehash_idx = Some(0);
            debug!(
                from = self.tables[0].size(),
                to = realsize,
                "incremental rehash started"
            );
        }
        true
    }

    fn expand_if_needed(&mut self) {
        if self.is_rehashing() {
            return;
        }
        if self.tables[0].size() == 0 {
            self.expand(DICT_HT_INITIAL_SIZE);
            return;
        }
        let used = self.tables[0].used;
        let size = self.tables[0].size();
        if used >= size && (self.resize_enabled || used / size > FORCE_RESIZE_RATIO) {
            self.expand(used * 2);
        }
    }

    /// Whether the table is oversized for its population.
    pub fn needs_resize(&self) -> bool {
        let size = self.tables[0].size();
        let used = self.len();
        size > DICT_HT_INITIAL_SIZE && used * 100 / size < MIN_FILL_PERCENT
    }

    /// Shrinks the table to the smallest power of two holding the current
    /// population.
    pub fn resize(&mut self) -> bool {
        if !self.resize_enabled || self.is_rehashing() {
            return false;
        }
        self.expand(self.len())
    }

    fn lookup(&self, key: &[u8]) -> Option<&Entry<V>> {
        if self.len() == 0 {
            return None;
        }
        let hash = hash_key(key) as usize;
        let table_count = if self.is_rehashing() { 2 } else { 1 };
        for table in &self.tables[..table_count] {
            if table.size() == 0 {
                continue;
            }
            let mut entry = table.buckets[hash & table.sizemask()].as_deref();
            while let Some(e) = entry {
                if e.key.as_ref() == key {
                    return Some(e);
                }
                entry = e.next.as_deref();
            }
        }
        None
    }

    /// Lookup without a rehash step, for read-only contexts.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.lookup(key).map(|e| &e.val)
    }

    /// Lookup that also advances an in-progress rehash.
    pub fn find(&mut self, key: &[u8]) -> Option<&V> {
        if self.is_rehashing() {
            self.rehash_step();
        }
        self.lookup(key).map(|e| &e.val)
    }

    pub fn find_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        if self.is_rehashing() {
            self.rehash_step();
        }
        if self.len() == 0 {
            return None;
        }
        let hash = hash_key(key) as usize;
        let table_count = if self.is_rehashing() { 2 } else { 1 };
        for table in self.tables[..table_count].iter_mut() {
            if table.size() == 0 {
                continue;
            }
            let slot = hash & table.sizemask();
            let mut entry = table.buckets[slot].as_deref_mut();
            while let Some(e) = entry {
                if e.key.as_ref() == key {
                    return Some(&mut e.val);
                }
                entry = e.next.as_deref_mut();
            }
        }
        None
    }

    /// Inserts a new key. Returns false when the key already exists.
    /// During a rehash the new entry always lands in `ht[1]`.
    pub fn add(&mut self, key: Bytes, val: V) -> bool {
        if self.is_rehashing() {
            self.rehash_step();
        }
        if self.lookup(&key).is_some() {
            return false;
        }
        self.expand_if_needed();

        let table = if self.is_rehashing() { 1 } else { 0 };
        let slot = hash_key(&key) as usize & self.tables[table].sizemask();
        let entry = Box::new(Entry {
            key,
            val,
            next: self.tables[table].buckets[slot].take(),
        });
        self.tables[table].buckets[slot] = Some(entry);
        self.tables[table].used += 1;
        true
    }

    /// Removes a key, returning its value.
    pub fn delete(&mut self, key: &[u8]) -> Option<V> {
        if self.is_rehashing() {
            self.rehash_step();
        }
        if self.len() == 0 {
            return None;
        }
        let hash = hash_key(key) as usize;
        let table_count = if self.is_rehashing() { 2 } else { 1 };
        for table in self.tables[..table_count].iter_mut() {
            if table.size() == 0 {
                continue;
            }
            let slot = hash & table.sizemask();
            let mut cursor = &mut table.buckets[slot];
            while cursor.as_ref().is_some_and(|e| e.key.as_ref() != key) {
                cursor = &mut cursor.as_mut().unwrap().next;
            }
            if let Some(found) = cursor.take() {
                *cursor = found.next;
                table.used -= 1;
                return Some(found.val);
            }
        }
        None
    }

    /// Iterates every entry; during a rehash both tables are walked.
    pub fn iter(&self) -> DictIter<'_, V> {
        DictIter {
            dict: self,
            table: 0,
            bucket: 0,
            entry: None,
            started: false,
        }
    }
}

impl<V: Clone> Dict<V> {
    /// One entry sampled by picking a bucket uniformly over the total slot
    /// count, then a chain position uniformly. Biased toward short chains
    /// when chains are uneven.
    pub fn random_key(&mut self) -> Option<(Bytes, V)> {
        if self.len() == 0 {
            return None;
        }
        if self.is_rehashing() {
            self.rehash_step();
        }

        let mut rng = rand::thread_rng();
        let entry = loop {
            let candidate = if let Some(rehash_idx) = self.rehash_idx {
                // Buckets below rehash_idx in ht[0] are already drained.
                let slots = self.slots();
                let h = rehash_idx + rng.gen_range(0..slots - rehash_idx);
                if h >= self.tables[0].size() {
                    self.tables[1].buckets[h - self.tables[0].size()].as_deref()
                } else {
                    self.tables[0].buckets[h].as_deref()
                }
            } else {
                let h = rng.gen_range(0..self.tables[0].size());
                self.tables[0].buckets[h].as_deref()
            };
            if let Some(entry) = candidate {
                break entry;
            }
        };

        let mut chain_len = 0;
        let mut walk = Some(entry);
        while let Some(e) = walk {
            chain_len += 1;
            walk = e.next.as_deref();
        }
        let mut pick = rng.gen_range(0..chain_len);
        let mut walk = entry;
        while pick > 0 {
            walk = walk.next.as_deref().expect("chain shorter than counted");
            pick -= 1;
        }
        Some((walk.key.clone(), walk.val.clone()))
    }

    /// Samples a handful of entries via [`Self::random_key`] and returns one
    /// of them, attenuating the bias toward lightly loaded buckets.
    pub fn fair_random_key(&mut self) -> Option<(Bytes, V)> {
        let mut samples = Vec::with_capacity(GETFAIR_NUM_ENTRIES);
        for _ in 0..GETFAIR_NUM_ENTRIES {
            samples.push(self.random_key()?);
        }
        let pick = rand::thread_rng().gen_range(0..samples.len());
        Some(samples.swap_remove(pick))
    }
}

impl<V> Dict<V> {
    /// One step of a cursor-driven traversal.
    ///
    /// The cursor uses reverse-binary iteration: the masked bits are
    /// incremented from the high end, so a grow or shrink between calls
    /// still visits every element at least once and duplicates stay
    /// bounded. A full traversal starts at 0 and ends when 0 comes back.
    pub fn scan(&self, cursor: u64, mut visit: impl FnMut(&Bytes, &V)) -> u64 {
        if self.len() == 0 {
            return 0;
        }
        let mut v = cursor;

        let emit_bucket = |table: &Table<V>, slot: usize, visit: &mut dyn FnMut(&Bytes, &V)| {
            let mut entry = table.buckets[slot].as_deref();
            while let Some(e) = entry {
                visit(&e.key, &e.val);
                entry = e.next.as_deref();
            }
        };

        if !self.is_rehashing() {
            let m0 = self.tables[0].sizemask() as u64;
            emit_bucket(&self.tables[0], (v & m0) as usize, &mut visit);
            v |= !m0;
            v = v.reverse_bits().wrapping_add(1).reverse_bits();
        } else {
            // Iterate the smaller table's bucket, then every bucket of the
            // larger table that expands it.
            let (small, large) = if self.tables[0].size() <= self.tables[1].size() {
                (&self.tables[0], &self.tables[1])
            } else {
                (&self.tables[1], &self.tables[0])
            };
            let m0 = small.sizemask() as u64;
            let m1 = large.sizemask() as u64;
            emit_bucket(small, (v & m0) as usize, &mut visit);
            loop {
                emit_bucket(large, (v & m1) as usize, &mut visit);
                v |= !m1;
                v = v.reverse_bits().wrapping_add(1).reverse_bits();
                if v & (m0 ^ m1) == 0 {
                    break;
                }
            }
        }
        v
    }
}

/// In-order walk over both tables.
pub struct DictIter<'a, V> {
    dict: &'a Dict<V>,
    table: usize,
    bucket: usize,
    entry: Option<&'a Entry<V>>,
    started: bool,
}

impl<'a, V> Iterator for DictIter<'a, V> {
    type Item = (&'a Bytes, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let dict = self.dict;
        if self.started {
            if let Some(e) = self.entry {
                self.entry = e.next.as_deref();
                if let Some(next) = self.entry {
                    return Some((&next.key, &next.val));
                }
            }
            self.bucket += 1;
        } else {
            self.started = true;
        }

        loop {
            let table = &dict.tables[self.table];
            if self.bucket >= table.size() {
                if self.table == 0 && dict.is_rehashing() {
                    self.table = 1;
                    self.bucket = 0;
                    continue;
                }
                self.entry = None;
                return None;
            }
            if let Some(e) = table.buckets[self.bucket].as_deref() {
                self.entry = Some(e);
                return Some((&e.key, &e.val));
            }
            self.bucket += 1;
        }
    }
}
