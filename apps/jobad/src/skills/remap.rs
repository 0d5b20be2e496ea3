//! Re-applies the current synonym map to documents that were already processed,
//! so groups accepted during curation reach older output files too.

use std::path::Path;

use tracing::{info, warn};

use crate::documents::{list_markdown_files, read_document, write_document};
use crate::errors::AppError;
use crate::skills::mapper::normalize_skills;
use crate::skills::synonyms::SynonymMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemapSummary {
    pub rewritten: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

pub fn remap_documents(dir: &Path, synonyms: &SynonymMap) -> Result<RemapSummary, AppError> {
    let mut summary = RemapSummary::default();

    for path in list_markdown_files(dir)? {
        let mut doc = match read_document(&path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("🚨 Skipping {}: {e}", path.display());
                summary.skipped += 1;
                continue;
            }
        };
        let skills = match doc.job_skills() {
            Ok(skills) => skills,
            Err(e) => {
                warn!("🚨 {e}");
                summary.skipped += 1;
                continue;
            }
        };

        let mapped = normalize_skills(&skills, synonyms);
        if mapped == skills {
            summary.unchanged += 1;
            continue;
        }

        doc.set_job_skills(&mapped);
        let written = write_document(dir, &doc)?;
        info!("💾 Processed and saved: {}", written.display());
        summary.rewritten += 1;
    }

    info!(
        "Remap finished: {} rewritten, {} unchanged, {} skipped",
        summary.rewritten, summary.unchanged, summary.skipped
    );
    Ok(summary)
}
