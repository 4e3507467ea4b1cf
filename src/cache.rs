// src/cache.rs
use crate::record::BranchRecord;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

/// Parsed first sheets keyed by source URL, evicted oldest-first.
///
/// Entries are only as fresh as the index that pointed at them, so the
/// query service clears the cache whenever the index is replaced. Each clear
/// starts a new generation; inserts carrying an older generation are dropped.
pub struct SheetCache {
    capacity: usize,
    inner: RwLock<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    sheets: HashMap<String, Arc<Vec<BranchRecord>>>,
    order: VecDeque<String>,
    generation: u64,
}

impl SheetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    pub fn get(&self, url: &str) -> Option<Arc<Vec<BranchRecord>>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.sheets.get(url).cloned()
    }

    /// Current generation; read it before fetching a sheet and pass it to [`SheetCache::insert`].
    pub fn generation(&self) -> u64 {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).generation
    }

    pub fn insert(&self, url: &str, records: Arc<Vec<BranchRecord>>, generation: u64) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.generation != generation {
            log::debug!("[Cache] Dropping {} fetched before the last index swap", url);
            return;
        }
        if inner.sheets.insert(url.to_string(), records).is_some() {
            return;
        }
        inner.order.push_back(url.to_string());
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.sheets.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.sheets.clear();
        inner.order.clear();
        inner.generation += 1;
    }
}
