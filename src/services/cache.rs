//! Content-addressed workbook cache
//!
//! Loading is a pure function of the uploaded bytes, so parsed results are
//! shared behind an `Arc` keyed by a digest of the input. The cache is
//! bounded and evicts the least recently used entry; an access refreshes
//! recency.

use crate::types::DashboardData;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_CAPACITY: usize = 8;

struct CacheEntry {
    last_used: u64,
    data: Arc<DashboardData>,
}

pub struct WorkbookCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<String, CacheEntry>,
}

impl WorkbookCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
        }
    }

    /// Digest of the uploaded bytes, used as the cache key.
    pub fn key_for(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    pub fn get(&mut self, key: &str) -> Option<Arc<DashboardData>> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.data.clone()
        })
    }

    /// Insert a parsed result, evicting the least recently used entry once
    /// the cache is full.
    pub fn insert(&mut self, key: String, data: Arc<DashboardData>) {
        self.tick += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                last_used: self.tick,
                data,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for WorkbookCache {
    fn default() -> Self {
        Self::new()
    }
}
