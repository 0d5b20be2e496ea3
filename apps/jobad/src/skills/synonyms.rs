//! Synonym Store — canonical skill name → known synonyms.
//!
//! Keys iterate (and persist) in ascending order; each synonym list keeps insertion
//! order. A synonym must never equal its own canonical name, must never be listed
//! under two canonical names and must never be a canonical name itself. All three
//! rules are checked in `merge_duplicate`; `SynonymStore::load` re-applies them to
//! hand-edited files.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::storage::{load_json, save_json};

/// Trims and lowercases a skill label.
pub fn normalize_skill(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// What `merge_duplicate` did with a `(canonical, duplicate)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Added,
    AlreadyPresent,
    SelfReference,
    /// Refused: the synonym already belongs to another canonical name.
    ClaimedBy(String),
    /// Refused: the synonym is itself a canonical name.
    IsCanonical,
    /// Refused: the canonical name is listed as a synonym of another one.
    CanonicalIsSynonymOf(String),
    /// Refused: one side normalized to an empty string.
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymMap(BTreeMap<String, Vec<String>>);

impl SynonymMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_canonical(&self, canonical: &str) -> bool {
        self.0.contains_key(canonical)
    }

    pub fn synonyms_of(&self, canonical: &str) -> Option<&[String]> {
        self.0.get(canonical).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn canonical_names(&self) -> BTreeSet<String> {
        self.0.keys().cloned().collect()
    }

    /// Every synonym under every canonical name, flattened.
    pub fn all_known_synonyms(&self) -> HashSet<String> {
        self.0.values().flatten().cloned().collect()
    }

    /// The canonical name a synonym is listed under. First match in key order wins.
    pub fn owner_of(&self, synonym: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, synonyms)| synonyms.iter().any(|s| s == synonym))
            .map(|(canonical, _)| canonical.as_str())
    }

    /// Makes `canonical` a key with no synonyms yet. Returns `true` if it was new.
    pub fn ensure_group(&mut self, canonical: &str) -> bool {
        let canonical = normalize_skill(canonical);
        if canonical.is_empty() || self.0.contains_key(&canonical) {
            return false;
        }
        self.0.insert(canonical, Vec::new());
        true
    }

    /// Appends `duplicate` to the list under `canonical`, creating the key if needed.
    /// Merging the same pair twice leaves the map unchanged the second time.
    pub fn merge_duplicate(&mut self, canonical: &str, duplicate: &str) -> MergeOutcome {
        let canonical = normalize_skill(canonical);
        let duplicate = normalize_skill(duplicate);

        if canonical.is_empty() || duplicate.is_empty() {
            return MergeOutcome::Empty;
        }
        if canonical == duplicate {
            return MergeOutcome::SelfReference;
        }
        if self.0.contains_key(&duplicate) {
            return MergeOutcome::IsCanonical;
        }
        if let Some(owner) = self.owner_of(&canonical) {
            return MergeOutcome::CanonicalIsSynonymOf(owner.to_string());
        }
        match self.owner_of(&duplicate) {
            Some(owner) if owner == canonical => return MergeOutcome::AlreadyPresent,
            Some(owner) => return MergeOutcome::ClaimedBy(owner.to_string()),
            None => {}
        }

        self.0.entry(canonical).or_default().push(duplicate);
        MergeOutcome::Added
    }

    /// Rebuilds the map through `ensure_group` and `merge_duplicate`: names are
    /// trimmed and lowercased, keys that normalize alike are combined, and entries
    /// breaking the store rules are dropped. Returns the dropped pairs with the reason.
    pub fn normalized(&self) -> (SynonymMap, Vec<(String, String, MergeOutcome)>) {
        let mut rebuilt = SynonymMap::new();
        for canonical in self.0.keys() {
            rebuilt.ensure_group(canonical);
        }
        let mut dropped = Vec::new();
        for (canonical, synonyms) in &self.0 {
            for synonym in synonyms {
                match rebuilt.merge_duplicate(canonical, synonym) {
                    MergeOutcome::Added | MergeOutcome::AlreadyPresent => {}
                    refused => dropped.push((canonical.clone(), synonym.clone(), refused)),
                }
            }
        }
        (rebuilt, dropped)
    }
}

impl FromIterator<(String, Vec<String>)> for SynonymMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        SynonymMap(iter.into_iter().collect())
    }
}

/// File-backed persistence for a `SynonymMap`.
#[derive(Debug, Clone)]
pub struct SynonymStore {
    path: PathBuf,
}

impl SynonymStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty map, not an error. Hand-edited entries are
    /// normalized; the file itself is only rewritten by the next `save`.
    pub fn load(&self) -> Result<SynonymMap, AppError> {
        let raw: SynonymMap = load_json(&self.path)?;
        let (map, dropped) = raw.normalized();
        for (canonical, synonym, reason) in &dropped {
            warn!(
                "Dropping '{synonym}' under '{canonical}' from {}: {reason:?}",
                self.path.display()
            );
        }
        if map != raw {
            warn!(
                "{} is not in normalized form, using the rebuilt map",
                self.path.display()
            );
        }
        info!(
            "Loaded {} skill groups from {}",
            map.len(),
            self.path.display()
        );
        Ok(map)
    }

    pub fn save(&self, map: &SynonymMap) -> Result<(), AppError> {
        save_json(&self.path, map)?;
        info!("💾 Saved {} skill groups to {}", map.len(), self.path.display());
        Ok(())
    }
}
