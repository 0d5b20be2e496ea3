// Prompt constants for the duplicate-skill finder.

use serde_json::{json, Value};

pub const FIND_DUPLICATES_NAME: &str = "find-duplicate-skills";

/// Sampling temperature for the duplicate finder. Grouping should be as repeatable as possible.
pub const FIND_DUPLICATES_TEMPERATURE: f32 = 0.01;

/// Instructions for the duplicate finder. The input is a JSON array of skill names.
pub const FIND_DUPLICATES_INSTRUCTIONS: &str = r#"
You will receive a JSON array of strings as input. It is a list of skills that have been collected from many job ads. Your job is to group together duplicate skills by following this process:
1. First analyse which skills from the `skills` input array mean exactly the same thing and put them in an array. These arrays will be called "Duplicates Arrays", and each skill inside will be called a "Duplicate".
2. Discard "Duplicates Arrays" that have a length inferior to 2.
3. For each "Duplicates Array" that has a length of 2 and more, pick one of the "Duplicate" as the "Best Name" for the skill it represents.
4. Finally, send the results of your work in the response format specified.
"#;

/// Structured output schema: `{"skills": {"<best name>": ["<duplicate>", ...]}}`.
pub fn find_duplicates_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "skills": {
                "type": "object",
                "additionalProperties": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of \"Duplicate\" skill names grouped under the \"Best Name\"."
                },
                "description": "An object where each key is the \"Best Name\" of a skill, and the value is its \"Duplicates Array\"."
            }
        },
        "required": ["skills"],
        "description": "Structured output that groups duplicate skills under a \"Best Name\"."
    })
}
