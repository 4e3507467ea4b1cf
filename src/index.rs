// Bank index: bank name / IFSC prefix -> source spreadsheet, persisted as JSON

use crate::constants;
use crate::error::{Error, Result};
use crate::record::bank_key;
use crate::scrape::SourceLink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Index {
    pub version: u32,
    pub listing_url: String,
    pub built_at: DateTime<Utc>,
    /// Source files that contributed at least one record
    pub files_indexed: usize,
    pub banks: Vec<BankIndexEntry>,
    pub prefixes: BTreeMap<String, SourceLink>,
    #[serde(default)]
    pub skipped_files: Vec<SkippedFile>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BankIndexEntry {
    pub bank: String,
    pub prefixes: BTreeSet<String>,
    pub source: SourceLink,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub url: String,
    pub error: String,
}

impl Index {
    pub fn new(listing_url: impl Into<String>) -> Self {
        Self {
            version: constants::INDEX_FORMAT_VERSION,
            listing_url: listing_url.into(),
            built_at: Utc::now(),
            files_indexed: 0,
            banks: Vec::new(),
            prefixes: BTreeMap::new(),
            skipped_files: Vec::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        sonic_rs::from_slice(&bytes)
            .map_err(|e| Error::Parse(format!("index file {}: {}", path.display(), e)))
    }

    /// Load the persisted index if it exists, parses, matches the current
    /// format version and is younger than `max_age`.
    ///
    /// Anything else yields `None` so the caller rebuilds.
    pub fn load_fresh<P: AsRef<Path>>(path: P, max_age: Option<Duration>) -> Option<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("[Index] No persisted index at {}", path.display());
            return None;
        }

        let index = match Self::load(path) {
            Ok(index) => index,
            Err(e) => {
                log::warn!("[Index] Ignoring unreadable index {}: {}", path.display(), e);
                return None;
            }
        };

        if index.version != constants::INDEX_FORMAT_VERSION {
            log::info!(
                "[Index] Index format {} != {}, rebuilding",
                index.version,
                constants::INDEX_FORMAT_VERSION
            );
            return None;
        }

        if let Some(max_age) = max_age
            && index.age() > max_age
        {
            log::info!(
                "[Index] Persisted index built {} is older than {:?}, rebuilding",
                index.built_at.to_rfc3339(),
                max_age
            );
            return None;
        }

        Some(index)
    }

    /// Save index to disk atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = temp_path_for(path);
        let json = serde_json::to_string_pretty(self)?;

        std::fs::write(&temp_path, json)?;
        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        log::debug!("[Index] Saved {} banks to {}", self.banks.len(), path.display());
        Ok(())
    }

    pub fn age(&self) -> Duration {
        (Utc::now() - self.built_at).to_std().unwrap_or_default()
    }

    /// Record a bank. The first source seen for a name wins; returns whether
    /// the entry was added.
    pub fn insert_bank(&mut self, bank: &str, prefixes: BTreeSet<String>, source: &SourceLink) -> bool {
        if self.find_bank(bank).is_some() {
            return false;
        }
        self.banks.push(BankIndexEntry {
            bank: bank.to_string(),
            prefixes,
            source: source.clone(),
        });
        true
    }

    /// Map an IFSC prefix to its source. First source wins.
    pub fn insert_prefix(&mut self, prefix: &str, source: &SourceLink) -> bool {
        if self.prefixes.contains_key(prefix) {
            return false;
        }
        self.prefixes.insert(prefix.to_string(), source.clone());
        true
    }

    pub fn bank_names(&self) -> Vec<String> {
        self.banks.iter().map(|entry| entry.bank.clone()).collect()
    }

    /// Case-insensitive, whitespace-tolerant exact match on the bank name.
    pub fn find_bank(&self, name: &str) -> Option<&BankIndexEntry> {
        let key = bank_key(name);
        if key.is_empty() {
            return None;
        }
        self.banks.iter().find(|entry| bank_key(&entry.bank) == key)
    }

    pub fn source_for_prefix(&self, prefix: &str) -> Option<&SourceLink> {
        self.prefixes.get(prefix)
    }

    /// Same banks (in order) and the same prefix mappings, ignoring build metadata.
    pub fn is_equivalent(&self, other: &Index) -> bool {
        self.banks == other.banks && self.prefixes == other.prefixes
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| constants::DEFAULT_INDEX_FILE.to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
