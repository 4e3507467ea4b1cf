// src/service.rs
use crate::builder::{self, BuildProgress};
use crate::cache::SheetCache;
use crate::constants;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::index::Index;
use crate::record::{BranchRecord, bank_key, ifsc_prefix, normalize_ifsc};
use crate::scrape::SourceLink;
use crate::sheet::read_first_sheet_blocking;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Settings for the query service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listing_url: String,
    pub index_path: PathBuf,
    pub max_download_bytes: u64,
    pub http_timeout: Duration,
    /// Persisted indexes older than this are rebuilt; `None` keeps them forever
    pub index_max_age: Option<Duration>,
    pub cache_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listing_url: constants::DEFAULT_LISTING_URL.to_string(),
            index_path: PathBuf::from(constants::DEFAULT_INDEX_FILE),
            max_download_bytes: constants::MAX_DOWNLOAD_BYTES,
            http_timeout: Duration::from_secs(constants::HTTP_TIMEOUT_SECS),
            index_max_age: None,
            cache_capacity: constants::SHEET_CACHE_CAPACITY,
        }
    }
}

/// Lifecycle of the process-wide index.
#[derive(Clone)]
pub enum IndexState {
    Uninitialized,
    Building,
    Ready(Arc<Index>),
}

impl IndexState {
    pub fn name(&self) -> &'static str {
        match self {
            IndexState::Uninitialized => "uninitialized",
            IndexState::Building => "building",
            IndexState::Ready(_) => "ready",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub state: &'static str,
    pub listing_url: String,
    pub index_path: PathBuf,
    pub banks: usize,
    pub prefixes: usize,
    pub files_indexed: usize,
    pub skipped_files: usize,
    pub built_at: Option<DateTime<Utc>>,
    pub cached_sheets: usize,
}

/// Answers bank and IFSC queries against the index, fetching source sheets on demand.
///
/// The index is loaded from disk or built on first use. Only one load/build
/// runs at a time; concurrent callers wait for it and then share the result.
pub struct QueryService {
    config: ServiceConfig,
    fetcher: Fetcher,
    state: RwLock<IndexState>,
    build_lock: tokio::sync::Mutex<()>,
    cache: SheetCache,
}

impl QueryService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config.max_download_bytes, config.http_timeout)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: ServiceConfig, fetcher: Fetcher) -> Self {
        let cache = SheetCache::new(config.cache_capacity);
        Self {
            config,
            fetcher,
            state: RwLock::new(IndexState::Uninitialized),
            build_lock: tokio::sync::Mutex::new(()),
            cache,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn state(&self) -> IndexState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_state(&self, state: IndexState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// The index if it is ready, without triggering a load.
    pub fn current_index(&self) -> Option<Arc<Index>> {
        match self.state() {
            IndexState::Ready(index) => Some(index),
            _ => None,
        }
    }

    /// The index, loading or building it first if needed.
    pub async fn index(&self) -> Result<Arc<Index>> {
        self.index_with_progress(None).await
    }

    /// [`QueryService::index`], reporting per-file progress if a build is needed.
    pub async fn index_with_progress(&self, progress: Option<BuildProgress<'_>>) -> Result<Arc<Index>> {
        if let Some(index) = self.current_index() {
            return Ok(index);
        }

        let _guard = self.build_lock.lock().await;
        // Another caller may have finished while we waited.
        if let Some(index) = self.current_index() {
            return Ok(index);
        }

        self.set_state(IndexState::Building);
        let building = BuildingGuard(self);
        let index = Arc::new(self.load_or_build(progress).await?);
        self.set_state(IndexState::Ready(Arc::clone(&index)));
        drop(building);
        Ok(index)
    }

    async fn load_or_build(&self, progress: Option<BuildProgress<'_>>) -> Result<Index> {
        let path = &self.config.index_path;
        if let Some(index) = Index::load_fresh(path, self.config.index_max_age) {
            log::info!(
                "[Index] Loaded {} banks from {} (built {})",
                index.banks.len(),
                path.display(),
                index.built_at.to_rfc3339()
            );
            return Ok(index);
        }

        let index =
            builder::build_index_with_progress(&self.fetcher, &self.config.listing_url, progress)
                .await?;
        self.persist(&index);
        Ok(index)
    }

    fn persist(&self, index: &Index) {
        // Serving from memory beats failing the request.
        if let Err(e) = index.save(&self.config.index_path) {
            log::warn!(
                "[Index] Could not persist index to {}: {}",
                self.config.index_path.display(),
                e
            );
        }
    }

    /// Build a fresh index, persist it and swap it in.
    ///
    /// Queries keep using the previous index until the new one is complete.
    pub async fn rebuild(&self) -> Result<Arc<Index>> {
        self.rebuild_with_progress(None).await
    }

    /// [`QueryService::rebuild`] with per-file progress reporting.
    pub async fn rebuild_with_progress(&self, progress: Option<BuildProgress<'_>>) -> Result<Arc<Index>> {
        let _guard = self.build_lock.lock().await;
        if self.current_index().is_none() {
            self.set_state(IndexState::Building);
        }
        let building = BuildingGuard(self);

        let index =
            builder::build_index_with_progress(&self.fetcher, &self.config.listing_url, progress)
                .await?;
        self.persist(&index);
        let index = Arc::new(index);
        self.set_state(IndexState::Ready(Arc::clone(&index)));
        self.cache.clear();
        drop(building);
        Ok(index)
    }

    /// All bank names in index order.
    pub async fn list_banks(&self) -> Result<Vec<String>> {
        Ok(self.index().await?.bank_names())
    }

    /// Every record of the spreadsheet that holds `name`.
    pub async fn rows_for_bank(&self, name: &str) -> Result<Vec<BranchRecord>> {
        if bank_key(name).is_empty() {
            return Err(Error::NotFound("empty bank name".to_string()));
        }

        let index = self.index().await?;
        let entry = index
            .find_bank(name)
            .ok_or_else(|| Error::NotFound(format!("no bank matches '{}'", name.trim())))?;

        let records = self.records_for(&entry.source).await?;
        Ok(records.as_ref().clone())
    }

    /// The record for one exact IFSC code.
    pub async fn row_for_ifsc(&self, code: &str) -> Result<BranchRecord> {
        let code = normalize_ifsc(code);
        if code.chars().count() < constants::IFSC_LEN {
            return Err(Error::InvalidInput(format!(
                "IFSC must be at least {} characters",
                constants::IFSC_LEN
            )));
        }

        let not_found = || Error::NotFound(format!("no branch with IFSC {}", code));
        let prefix = ifsc_prefix(&code).ok_or_else(not_found)?;

        let index = self.index().await?;
        let source = index.source_for_prefix(prefix).ok_or_else(not_found)?;

        let records = self.records_for(source).await?;
        records
            .iter()
            .find(|record| record.ifsc == code)
            .cloned()
            .ok_or_else(not_found)
    }

    /// Fetch and parse a source sheet, going through the cache.
    async fn records_for(&self, source: &SourceLink) -> Result<Arc<Vec<BranchRecord>>> {
        if let Some(records) = self.cache.get(&source.url) {
            log::debug!("[Query] Cache hit for {}", source.url);
            return Ok(records);
        }
        let generation = self.cache.generation();

        let start = Instant::now();
        let bytes = self
            .fetcher
            .fetch(&source.url)
            .await
            .map_err(|e| Error::unavailable(&source.url, e))?;
        let report = read_first_sheet_blocking(bytes)
            .await
            .map_err(|e| Error::unavailable(&source.url, e))?;

        log::debug!(
            "[Query] Loaded {} rows from {} in {:?} ({} skipped)",
            report.records.len(),
            source.url,
            start.elapsed(),
            report.skipped.len()
        );

        let records = Arc::new(report.records);
        self.cache.insert(&source.url, Arc::clone(&records), generation);
        Ok(records)
    }

    pub fn status(&self) -> ServiceStatus {
        let state = self.state();
        let index = match &state {
            IndexState::Ready(index) => Some(Arc::clone(index)),
            _ => None,
        };

        ServiceStatus {
            state: state.name(),
            listing_url: self.config.listing_url.clone(),
            index_path: self.config.index_path.clone(),
            banks: index.as_ref().map(|i| i.banks.len()).unwrap_or(0),
            prefixes: index.as_ref().map(|i| i.prefixes.len()).unwrap_or(0),
            files_indexed: index.as_ref().map(|i| i.files_indexed).unwrap_or(0),
            skipped_files: index.as_ref().map(|i| i.skipped_files.len()).unwrap_or(0),
            built_at: index.as_ref().map(|i| i.built_at),
            cached_sheets: self.cache.len(),
        }
    }
}

/// Returns the state to `Uninitialized` if a build is abandoned midway,
/// whether by error or by the calling future being dropped.
struct BuildingGuard<'a>(&'a QueryService);

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.state.write().unwrap_or_else(|e| e.into_inner());
        if matches!(*state, IndexState::Building) {
            *state = IndexState::Uninitialized;
        }
    }
}
