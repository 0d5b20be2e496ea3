//! Duplicate proposals — the completion service's suggested groupings, and the
//! filter that makes them safe to review.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::prompts::with_shared_rules;
use crate::llm_client::{complete_json, CompletionRequest, CompletionService, Usage};
use crate::skills::prompts::{
    find_duplicates_schema, FIND_DUPLICATES_INSTRUCTIONS, FIND_DUPLICATES_NAME,
    FIND_DUPLICATES_TEMPERATURE,
};
use crate::skills::synonyms::normalize_skill;

/// Candidate canonical name → candidate duplicates. Reviewed in key order.
pub type DuplicateProposal = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateSkillsResponse {
    pub skills: DuplicateProposal,
}

pub fn proposal_request(unmapped: &BTreeSet<String>) -> Result<CompletionRequest, AppError> {
    let skills: Vec<&String> = unmapped.iter().collect();
    let input = serde_json::to_string(&skills).map_err(|e| AppError::Internal(e.into()))?;
    Ok(CompletionRequest {
        name: FIND_DUPLICATES_NAME.to_string(),
        instructions: with_shared_rules(FIND_DUPLICATES_INSTRUCTIONS),
        input,
        schema: find_duplicates_schema(),
        strict: false,
        temperature: FIND_DUPLICATES_TEMPERATURE,
    })
}

/// Asks the completion service to group `unmapped`. Any failure, malformed JSON
/// included, is a `ServiceFailure`; nothing is retried at this level.
pub async fn propose_duplicates(
    service: &dyn CompletionService,
    unmapped: &BTreeSet<String>,
) -> Result<(DuplicateProposal, Usage), AppError> {
    let request = proposal_request(unmapped)?;
    info!("⏳ Sending {} skills to the duplicate finder...", unmapped.len());

    let (response, usage): (DuplicateSkillsResponse, Usage) = complete_json(service, &request)
        .await
        .map_err(|e| AppError::ServiceFailure(format!("Duplicate skill proposal failed: {e}")))?;

    info!(
        "📄 Received {} proposed groups ({} prompt / {} completion / {} total tokens)",
        response.skills.len(),
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.total_tokens
    );
    Ok((response.skills, usage))
}

/// Drops, for each group, duplicates equal to the group's own name and duplicates
/// that are already canonical names, then drops groups left empty. Names are
/// normalized first; groups whose names normalize alike are combined.
pub fn clean(
    proposal: &DuplicateProposal,
    existing_canonical_names: &BTreeSet<String>,
) -> DuplicateProposal {
    let mut cleaned = DuplicateProposal::new();

    for (raw_canonical, raw_duplicates) in proposal {
        let canonical = normalize_skill(raw_canonical);
        if canonical.is_empty() {
            continue;
        }

        let mut kept: Vec<String> = cleaned.remove(&canonical).unwrap_or_default();
        for raw in raw_duplicates {
            let duplicate = normalize_skill(raw);
            if duplicate.is_empty() || duplicate == canonical {
                continue;
            }
            if existing_canonical_names.contains(&duplicate) {
                debug!("Dropped '{duplicate}' from '{canonical}': already a canonical name");
                continue;
            }
            if !kept.contains(&duplicate) {
                kept.push(duplicate);
            }
        }

        if !kept.is_empty() {
            cleaned.insert(canonical, kept);
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::llm_client::{Completion, LlmError};

    fn proposal(entries: &[(&str, &[&str])]) -> DuplicateProposal {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_clean_drops_self_and_existing_canonical() {
        let cleaned = clean(&proposal(&[("a", &["a", "b", "x"])]), &names(&["x"]));
        assert_eq!(cleaned, proposal(&[("a", &["b"])]));
    }

    #[test]
    fn test_clean_drops_emptied_groups() {
        let cleaned = clean(
            &proposal(&[("agile methodologies", &["agile methodologies"]), ("tailwind", &["tailwind css"])]),
            &BTreeSet::new(),
        );
        assert_eq!(cleaned, proposal(&[("tailwind", &["tailwind css"])]));
    }

    #[test]
    fn test_clean_normalizes_and_combines() {
        let cleaned = clean(
            &proposal(&[("JavaScript", &["JS", "js"]), ("javascript ", &["Java Script"])]),
            &BTreeSet::new(),
        );
        assert_eq!(cleaned, proposal(&[("javascript", &["js", "java script"])]));
    }

    #[test]
    fn test_clean_keeps_existing_canonical_as_key() {
        let cleaned = clean(&proposal(&[("azure", &["microsoft azure"])]), &names(&["azure"]));
        assert_eq!(cleaned, proposal(&[("azure", &["microsoft azure"])]));
    }

    struct FixedService(Result<serde_json::Value, ()>);

    #[async_trait]
    impl CompletionService for FixedService {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
            assert_eq!(request.name, FIND_DUPLICATES_NAME);
            assert!(!request.strict);
            match &self.0 {
                Ok(value) => Ok(Completion {
                    value: value.clone(),
                    usage: Usage::default(),
                }),
                Err(()) => Err(LlmError::EmptyContent),
            }
        }
    }

    #[test]
    fn test_proposal_request_sends_sorted_json_array() {
        let request = proposal_request(&names(&["rust", "go"])).unwrap();
        assert_eq!(request.input, r#"["go","rust"]"#);
        assert_eq!(request.schema["required"], json!(["skills"]));
    }

    #[tokio::test]
    async fn test_propose_duplicates_parses_skills() {
        let service = FixedService(Ok(json!({"skills": {"javascript": ["javascript", "js"]}})));
        let (proposal, _) = propose_duplicates(&service, &names(&["javascript", "js"]))
            .await
            .unwrap();
        assert_eq!(proposal["javascript"], vec!["javascript", "js"]);
    }

    #[tokio::test]
    async fn test_propose_duplicates_wrong_shape_is_service_failure() {
        let service = FixedService(Ok(json!({"groups": []})));
        let err = propose_duplicates(&service, &names(&["js"])).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceFailure(_)));
    }

    #[tokio::test]
    async fn test_propose_duplicates_service_error_is_service_failure() {
        let service = FixedService(Err(()));
        let err = propose_duplicates(&service, &names(&["js"])).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceFailure(_)));
    }
}
