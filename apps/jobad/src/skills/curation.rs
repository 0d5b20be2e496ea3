//! One vocabulary curation run, end to end.
//!
//! Load stores → collect unmapped skills → ask for groupings → clean → human
//! review → persist. Everything before the review is all-or-nothing: a failure
//! there returns before the first prompt and leaves both stores untouched.

use std::path::Path;

use tracing::info;

use crate::console::Prompter;
use crate::documents::read_documents;
use crate::errors::AppError;
use crate::llm_client::{CompletionService, Usage};
use crate::skills::blacklist::BlacklistStore;
use crate::skills::collector::collect_unmapped;
use crate::skills::merge::{run_review, Decision, MergeEngine, SessionTally};
use crate::skills::proposal::{clean, propose_duplicates};
use crate::skills::synonyms::SynonymStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurationReport {
    pub unmapped: usize,
    pub proposed_groups: usize,
    pub reviewed_groups: usize,
    pub tally: SessionTally,
    pub synonyms_saved: bool,
    pub blacklist_saved: bool,
    pub aborted: bool,
    pub usage: Usage,
    /// What the review did with each proposed group and duplicate, in order.
    pub decisions: Vec<Decision>,
}

pub async fn run_curation(
    synonym_store: &SynonymStore,
    blacklist_store: &BlacklistStore,
    processed_dir: &Path,
    service: &dyn CompletionService,
    prompter: &mut dyn Prompter,
) -> Result<CurationReport, AppError> {
    let synonyms = synonym_store.load()?;
    let blacklist = blacklist_store.load()?;
    let mut report = CurationReport::default();

    let documents = read_documents(processed_dir)?;
    let unmapped = collect_unmapped(&documents, &synonyms.all_known_synonyms());
    report.unmapped = unmapped.len();
    if unmapped.is_empty() {
        info!("No unmapped skills found, nothing to curate");
        return Ok(report);
    }

    let (proposal, usage) = propose_duplicates(service, &unmapped).await?;
    report.proposed_groups = proposal.len();
    report.usage = usage;

    let cleaned = clean(&proposal, &synonyms.canonical_names());
    report.reviewed_groups = cleaned.len();
    if cleaned.is_empty() {
        info!("No changes: every proposed group was empty after cleaning");
        return Ok(report);
    }

    let engine = MergeEngine::new(cleaned, synonyms, blacklist);
    let outcome = run_review(engine, prompter)?;
    report.tally = outcome.tally;
    report.aborted = outcome.aborted;
    report.decisions = outcome.decisions.clone();

    if outcome.aborted {
        return Ok(report);
    }

    if outcome.synonyms_changed() {
        synonym_store.save(&outcome.synonyms)?;
        report.synonyms_saved = true;
        info!(
            "📚 {} new skill groups and {} new synonyms saved",
            outcome.tally.new_groups, outcome.tally.new_duplicates
        );
    } else {
        info!("No changes to the skill mapping");
    }

    if outcome.blacklist_changed() {
        blacklist_store.save(&outcome.blacklist)?;
        report.blacklist_saved = true;
        info!(
            "🚫 {} rejected groups and {} rejected synonyms remembered",
            outcome.tally.rejected_keys, outcome.tally.rejected_duplicates
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::console::ScriptedPrompter;
    use crate::llm_client::{Completion, CompletionRequest, LlmError};

    struct FakeService {
        response: Result<serde_json::Value, ()>,
        calls: AtomicUsize,
    }

    impl FakeService {
        fn returning(value: serde_json::Value) -> Self {
            Self {
                response: Ok(value),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionService for FakeService {
        async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(value) => Ok(Completion {
                    value: value.clone(),
                    usage: Usage::default(),
                }),
                Err(()) => Err(LlmError::EmptyContent),
            }
        }
    }

    struct Fixture {
        _dir: TempDir,
        processed: PathBuf,
        synonyms: SynonymStore,
        blacklist: BlacklistStore,
    }

    impl Fixture {
        fn new(docs: &[(&str, &[&str])]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let processed = dir.path().join("output-files");
            std::fs::create_dir_all(&processed).unwrap();
            for (name, skills) in docs {
                let list = skills
                    .iter()
                    .map(|s| format!("  - {s}\n"))
                    .collect::<String>();
                std::fs::write(
                    processed.join(name),
                    format!("---\njob_skills:\n{list}---\n# ad\n"),
                )
                .unwrap();
            }
            let synonyms = SynonymStore::new(dir.path().join("skills-mapping.json"));
            let blacklist = BlacklistStore::new(dir.path().join("blacklist.json"));
            Self {
                _dir: dir,
                processed,
                synonyms,
                blacklist,
            }
        }

        fn snapshot(&self) -> (Option<Vec<u8>>, Option<Vec<u8>>) {
            (
                std::fs::read(self.synonyms.path()).ok(),
                std::fs::read(self.blacklist.path()).ok(),
            )
        }
    }

    #[tokio::test]
    async fn test_accepted_merge_is_persisted() {
        let fx = Fixture::new(&[("a.md", &["javascript", "js"]), ("b.md", &["rust"])]);
        let service = FakeService::returning(json!({"skills": {"javascript": ["javascript", "js"]}}));
        let mut prompter = ScriptedPrompter::new(&[true, true, true]);

        let report = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut prompter)
            .await
            .unwrap();

        assert_eq!(report.unmapped, 3);
        assert!(report.synonyms_saved);
        assert!(!report.blacklist_saved);
        assert_eq!(
            report.decisions,
            vec![
                Decision::AcceptedGroup {
                    canonical: "javascript".to_string()
                },
                Decision::AcceptedDuplicate {
                    canonical: "javascript".to_string(),
                    duplicate: "js".to_string(),
                },
            ]
        );
        let saved = fx.synonyms.load().unwrap();
        assert_eq!(saved.synonyms_of("javascript").unwrap(), &["js".to_string()][..]);
    }

    #[tokio::test]
    async fn test_abort_leaves_stores_byte_identical() {
        let fx = Fixture::new(&[("a.md", &["javascript", "js"])]);
        std::fs::write(fx.synonyms.path(), "{\n  \"go\": [\n    \"golang\"\n  ]\n}\n").unwrap();
        std::fs::write(fx.blacklist.path(), "{\"rejectedKeys\":[\"testing\"]}").unwrap();
        let before = fx.snapshot();

        let service = FakeService::returning(json!({"skills": {"javascript": ["js"]}}));
        let mut prompter = ScriptedPrompter::new(&[false]);
        let report = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut prompter)
            .await
            .unwrap();

        assert!(report.aborted);
        assert_eq!(fx.snapshot(), before);
    }

    #[tokio::test]
    async fn test_rejections_converge_across_runs() {
        let fx = Fixture::new(&[("a.md", &["javascript", "jquery"])]);
        let proposal = json!({"skills": {"javascript": ["jquery"]}});

        // run 1: accept the group, reject the pair
        let service = FakeService::returning(proposal.clone());
        let mut first = ScriptedPrompter::new(&[true, true, false]);
        let report = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut first)
            .await
            .unwrap();
        assert!(report.synonyms_saved);
        assert!(report.blacklist_saved);

        // run 2: same proposal, only the opening question is asked
        let service = FakeService::returning(proposal);
        let mut second = ScriptedPrompter::new(&[true]);
        let report = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut second)
            .await
            .unwrap();
        assert_eq!(second.asked.len(), 1);
        assert_eq!(report.tally, SessionTally::default());
        assert!(!report.synonyms_saved);
        assert!(!report.blacklist_saved);
    }

    #[tokio::test]
    async fn test_rejections_saved_without_accepted_changes() {
        let fx = Fixture::new(&[("a.md", &["cloud services", "cloud"])]);
        let service = FakeService::returning(json!({"skills": {"cloud services": ["cloud"]}}));
        let mut prompter = ScriptedPrompter::new(&[true, false]);

        let report = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut prompter)
            .await
            .unwrap();

        assert!(!report.synonyms_saved);
        assert!(report.blacklist_saved);
        assert!(!fx.synonyms.path().exists());
        assert!(fx.blacklist.load().unwrap().is_key_rejected("cloud services"));
    }

    #[tokio::test]
    async fn test_service_failure_aborts_before_prompting() {
        let fx = Fixture::new(&[("a.md", &["js"])]);
        let service = FakeService::failing();
        let mut prompter = ScriptedPrompter::new(&[]);

        let err = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut prompter)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ServiceFailure(_)));
        assert!(prompter.asked.is_empty());
        assert_eq!(fx.snapshot(), (None, None));
    }

    #[tokio::test]
    async fn test_malformed_store_aborts_before_service_call() {
        let fx = Fixture::new(&[("a.md", &["js"])]);
        std::fs::write(fx.synonyms.path(), "not json").unwrap();
        let service = FakeService::returning(json!({"skills": {}}));
        let mut prompter = ScriptedPrompter::new(&[]);

        let err = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut prompter)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageUnavailable { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_everything_mapped_skips_service() {
        let fx = Fixture::new(&[("a.md", &["golang"])]);
        std::fs::write(fx.synonyms.path(), r#"{"go": ["golang"]}"#).unwrap();
        let service = FakeService::returning(json!({"skills": {}}));
        let mut prompter = ScriptedPrompter::new(&[]);

        let report = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut prompter)
            .await
            .unwrap();

        assert_eq!(report.unmapped, 0);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(prompter.asked.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cleaned_proposal_asks_nothing() {
        let fx = Fixture::new(&[("a.md", &["agile"])]);
        let service = FakeService::returning(json!({"skills": {"agile": ["agile"]}}));
        let mut prompter = ScriptedPrompter::new(&[]);

        let report = run_curation(&fx.synonyms, &fx.blacklist, &fx.processed, &service, &mut prompter)
            .await
            .unwrap();

        assert_eq!(report.proposed_groups, 1);
        assert_eq!(report.reviewed_groups, 0);
        assert!(prompter.asked.is_empty());
    }
}
