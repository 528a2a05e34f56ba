//! Workbook loading orchestration
//!
//! `DashboardLoader` ties the pipeline together: content-addressed cache
//! lookup, container parsing, then one extractor pass per recognized sheet.
//! A load either completes as a whole or fails as a whole; finer anomalies
//! degrade to omission or null inside the extractors.

use crate::parsers::{load_workbook, ExtractorRegistry};
use crate::services::WorkbookCache;
use crate::types::{DashboardData, Result};
use std::path::Path;
use std::sync::Arc;

pub struct DashboardLoader {
    registry: ExtractorRegistry,
    cache: WorkbookCache,
}

impl DashboardLoader {
    pub fn new() -> Self {
        Self {
            registry: ExtractorRegistry::new(),
            cache: WorkbookCache::new(),
        }
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            registry: ExtractorRegistry::new(),
            cache: WorkbookCache::with_capacity(capacity),
        }
    }

    /// Load one uploaded workbook. Identical bytes share the cached result.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<Arc<DashboardData>> {
        let key = WorkbookCache::key_for(bytes);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let workbook = load_workbook(bytes)?;
        let mut data = DashboardData::default();
        self.registry.apply(&workbook, &mut data);

        let data = Arc::new(data);
        self.cache.insert(key, data.clone());
        Ok(data)
    }

    pub fn load_path(&mut self, path: &Path) -> Result<Arc<DashboardData>> {
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes)
    }

    pub fn cached_workbooks(&self) -> usize {
        self.cache.len()
    }
}

impl Default for DashboardLoader {
    fn default() -> Self {
        Self::new()
    }
}
