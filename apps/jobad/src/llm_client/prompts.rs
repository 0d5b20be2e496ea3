// Shared prompt fragments.
// Each feature that calls the completion service keeps its own prompts.rs alongside it.

/// Appended to every instruction block: answers are always in English,
/// whatever language the job ad was written in.
pub const ENGLISH_ONLY_INSTRUCTION: &str =
    "Whatever the language of the input, you should always answer in english.";

/// Appended to every instruction block: the answer must follow the attached schema.
pub const SCHEMA_INSTRUCTION: &str =
    "Send the results of your work in the JSON response format attached, and nothing else.";

/// Joins an instruction body with the shared fragments.
pub fn with_shared_rules(body: &str) -> String {
    format!(
        "{}\n\n{}\n{}",
        body.trim(),
        ENGLISH_ONLY_INSTRUCTION,
        SCHEMA_INSTRUCTION
    )
}
