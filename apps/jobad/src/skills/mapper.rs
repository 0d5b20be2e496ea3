//! Skill Mapper — rewrites raw skills to their canonical names.

use std::collections::HashSet;

use tracing::debug;

use crate::skills::synonyms::{normalize_skill, SynonymMap};

/// Lowercases each skill, swaps known synonyms for their canonical name, and drops
/// repeats while keeping first-occurrence order. When a synonym is (wrongly) listed
/// under two canonical names, the first in key order wins.
pub fn normalize_skills(raw_skills: &[String], synonyms: &SynonymMap) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut mapped = Vec::with_capacity(raw_skills.len());

    for raw in raw_skills {
        let skill = normalize_skill(raw);
        if skill.is_empty() {
            continue;
        }
        let skill = match canonical_for(&skill, synonyms) {
            Some(canonical) => {
                debug!("🧼 Changed skill '{skill}' to '{canonical}'");
                canonical.to_string()
            }
            None => skill,
        };
        if seen.insert(skill.clone()) {
            mapped.push(skill);
        }
    }

    mapped
}

fn canonical_for<'a>(skill: &str, synonyms: &'a SynonymMap) -> Option<&'a str> {
    synonyms
        .iter()
        .find(|(_, list)| list.iter().any(|s| normalize_skill(s) == skill))
        .map(|(canonical, _)| canonical.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn javascript_map() -> SynonymMap {
        [("javascript".to_string(), strings(&["js", "java script"]))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_normalize_maps_dedups_and_lowercases() {
        let out = normalize_skills(&strings(&["JS", "Python", "js"]), &javascript_map());
        assert_eq!(out, strings(&["javascript", "python"]));
    }

    #[test]
    fn test_canonical_name_passes_through() {
        let out = normalize_skills(&strings(&["JavaScript", "java script"]), &javascript_map());
        assert_eq!(out, strings(&["javascript"]));
    }

    #[test]
    fn test_matches_mixed_case_synonym_entries() {
        let map: SynonymMap = [("tailwind".to_string(), strings(&["TailwindCSS"]))]
            .into_iter()
            .collect();
        assert_eq!(
            normalize_skills(&strings(&["tailwindcss"]), &map),
            strings(&["tailwind"])
        );
    }

    #[test]
    fn test_first_canonical_in_key_order_wins() {
        let map: SynonymMap = [
            ("zeta".to_string(), strings(&["shared"])),
            ("alpha".to_string(), strings(&["shared"])),
        ]
        .into_iter()
        .collect();
        assert_eq!(normalize_skills(&strings(&["shared"]), &map), strings(&["alpha"]));
    }

    #[test]
    fn test_blank_skills_dropped() {
        assert!(normalize_skills(&strings(&["  ", ""]), &SynonymMap::new()).is_empty());
    }
}
