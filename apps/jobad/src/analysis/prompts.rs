// Prompt constants for job ad analysis.

use serde_json::{json, Value};

pub const JOB_AD_ANALYSIS_NAME: &str = "job_ad_analysis";

pub const JOB_AD_ANALYSIS_TEMPERATURE: f32 = 0.2;

pub const JOB_AD_ANALYSIS_INSTRUCTIONS: &str = "\
You are an assistant specialized in extracting data from job ads submitted to you. \
The user will send you job ads fully redacted in markdown format, you will analyze them \
and extract the informations detailed in the JSON response format attached.";

/// Strict structured output schema for `JobAdAnalysis`.
pub fn job_ad_analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "employer": {
                "type": "string",
                "description": "The name of the legal structure that is hiring."
            },
            "role": {
                "type": "string",
                "description": "The name of the role expected to be played by the new recruit. If it's related to DevOps, Cloud Engineering or Infrastructure, return \"DevOps Engineer\". If it's not related to the web or the mobile domain, return the 'Other' value.",
                "enum": [
                    "Front-End Developer",
                    "Back-End Developer",
                    "Full-Stack Developer",
                    "DevOps Engineer",
                    "Mobile Developer",
                    "Security Engineer",
                    "Other"
                ]
            },
            "description": {
                "type": "string",
                "description": "Describe in a few lines who is hiring and for what purpose."
            },
            "experience": {
                "type": "integer",
                "description": "The number of years of previous experience expected of the new recruit. If not specified, set the value to 0."
            },
            "skills": {
                "type": "array",
                "items": {
                    "type": "string",
                    "description": "List as many skills expected of the new recruit as you can: soft skills, hard skills, natural languages (English, French, Dutch, German, ...), technologies, programming languages, frameworks, libraries, software, theoretical skills, expertise fields. Don't include version numbers in their names. Split each tool mentioned in brackets into its own value."
                }
            },
            "work_hours": {
                "type": "integer",
                "description": "The number of weekly work hours expected of the new recruit. By default, it's 40 hours."
            },
            "contract_type": {
                "type": "string",
                "description": "The type of employment or engagement arrangement between the recruit and the employer.",
                "enum": [
                    "Permanent contract",
                    "Internship",
                    "Temporary contract",
                    "Freelance Contract"
                ]
            },
            "is_ethical": {
                "type": "boolean",
                "description": "Only true if the job is involved in areas such as sustainable development, the circular economy, medical innovation, healthy eating, solidarity and gender equality."
            },
            "is_remote": {
                "type": "boolean",
                "description": "Only true if the job conditions include partially or totally working remotely."
            }
        },
        "additionalProperties": false,
        "required": [
            "employer",
            "role",
            "description",
            "experience",
            "skills",
            "work_hours",
            "contract_type",
            "is_ethical",
            "is_remote"
        ]
    })
}
