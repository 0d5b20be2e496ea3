//! Skill Collector — skills seen in processed ads that no synonym covers yet.

use std::collections::{BTreeSet, HashSet};

use tracing::{info, warn};

use crate::documents::Document;
use crate::errors::AppError;

/// Every `job_skills` entry across `documents`, minus `already_mapped`.
/// Documents without the field are skipped with a warning.
/// The result iterates in ascending order so review sessions are reproducible.
pub fn collect_unmapped<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
    already_mapped: &HashSet<String>,
) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut scanned = 0usize;

    for doc in documents {
        match doc.job_skills() {
            Ok(skills) => {
                scanned += 1;
                seen.extend(skills);
            }
            Err(AppError::MissingField { document, field }) => {
                warn!("🚨 No {field} found in {document}");
            }
            Err(e) => warn!("🚨 Skipping {}: {e}", doc.name),
        }
    }

    let unmapped: BTreeSet<String> = seen
        .into_iter()
        .filter(|skill| !already_mapped.contains(skill))
        .collect();

    info!(
        "Collected {} unmapped skills from {scanned} documents",
        unmapped.len()
    );
    unmapped
}
