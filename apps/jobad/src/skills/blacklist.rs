//! Blacklist Store — proposals a human already turned down.
//!
//! A missing entry means "never rejected". Rejected keys persist sorted; the
//! per-canonical rejected duplicates keep the order they were rejected in.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::storage::{load_json, save_json};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blacklist {
    #[serde(default)]
    pub rejected_keys: BTreeSet<String>,
    #[serde(default)]
    pub rejected_duplicates: BTreeMap<String, Vec<String>>,
}

impl Blacklist {
    pub fn is_empty(&self) -> bool {
        self.rejected_keys.is_empty() && self.rejected_duplicates.values().all(Vec::is_empty)
    }

    pub fn is_key_rejected(&self, canonical: &str) -> bool {
        self.rejected_keys.contains(canonical)
    }

    pub fn is_duplicate_rejected(&self, canonical: &str, duplicate: &str) -> bool {
        self.rejected_duplicates
            .get(canonical)
            .is_some_and(|rejected| rejected.iter().any(|d| d == duplicate))
    }

    /// Returns `true` if the key was not already rejected.
    pub fn reject_key(&mut self, canonical: &str) -> bool {
        self.rejected_keys.insert(canonical.to_string())
    }

    /// Returns `true` if the pair was not already rejected.
    pub fn reject_duplicate(&mut self, canonical: &str, duplicate: &str) -> bool {
        if self.is_duplicate_rejected(canonical, duplicate) {
            return false;
        }
        self.rejected_duplicates
            .entry(canonical.to_string())
            .or_default()
            .push(duplicate.to_string());
        true
    }
}

/// File-backed persistence for a `Blacklist`.
#[derive(Debug, Clone)]
pub struct BlacklistStore {
    path: PathBuf,
}

impl BlacklistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Blacklist, AppError> {
        let blacklist: Blacklist = load_json(&self.path)?;
        info!(
            "Loaded blacklist from {} ({} rejected keys, {} groups with rejected duplicates)",
            self.path.display(),
            blacklist.rejected_keys.len(),
            blacklist.rejected_duplicates.len()
        );
        Ok(blacklist)
    }

    pub fn save(&self, blacklist: &Blacklist) -> Result<(), AppError> {
        save_json(&self.path, blacklist)?;
        info!("💾 Saved blacklist to {}", self.path.display());
        Ok(())
    }
}
