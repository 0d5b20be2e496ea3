//! Job ad analysis — structured properties extracted from one cleaned ad, and the
//! front matter they are written into.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::warn;

use crate::analysis::prompts::{
    job_ad_analysis_schema, JOB_AD_ANALYSIS_INSTRUCTIONS, JOB_AD_ANALYSIS_NAME,
    JOB_AD_ANALYSIS_TEMPERATURE,
};
use crate::documents::Document;
use crate::errors::AppError;
use crate::llm_client::prompts::with_shared_rules;
use crate::llm_client::{complete_json, CompletionRequest, CompletionService, Usage};
use crate::skills::mapper::normalize_skills;
use crate::skills::synonyms::SynonymMap;

/// Tag appended to every document the pipeline has enriched.
pub const ANALYZED_TAG: &str = "job-ad-analyzed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Front-End Developer")]
    FrontEnd,
    #[serde(rename = "Back-End Developer")]
    BackEnd,
    #[serde(rename = "Full-Stack Developer")]
    FullStack,
    #[serde(rename = "DevOps Engineer")]
    DevOps,
    #[serde(rename = "Mobile Developer")]
    Mobile,
    #[serde(rename = "Security Engineer")]
    Security,
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::FrontEnd => "Front-End Developer",
            Role::BackEnd => "Back-End Developer",
            Role::FullStack => "Full-Stack Developer",
            Role::DevOps => "DevOps Engineer",
            Role::Mobile => "Mobile Developer",
            Role::Security => "Security Engineer",
            Role::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "Permanent contract")]
    Permanent,
    Internship,
    #[serde(rename = "Temporary contract")]
    Temporary,
    #[serde(rename = "Freelance Contract")]
    Freelance,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Permanent => "Permanent contract",
            ContractType::Internship => "Internship",
            ContractType::Temporary => "Temporary contract",
            ContractType::Freelance => "Freelance Contract",
        }
    }
}

fn default_work_hours() -> u32 {
    40
}

/// Full structured output of job ad analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAdAnalysis {
    pub employer: String,
    pub role: Role,
    pub description: String,
    /// Years of experience; 0 when the ad does not say.
    #[serde(default)]
    pub experience: u32,
    pub skills: Vec<String>,
    #[serde(default = "default_work_hours")]
    pub work_hours: u32,
    pub contract_type: ContractType,
    pub is_ethical: bool,
    pub is_remote: bool,
}

pub fn analysis_request(cleaned_text: &str) -> CompletionRequest {
    CompletionRequest {
        name: JOB_AD_ANALYSIS_NAME.to_string(),
        instructions: with_shared_rules(JOB_AD_ANALYSIS_INSTRUCTIONS),
        input: cleaned_text.to_string(),
        schema: job_ad_analysis_schema(),
        strict: true,
        temperature: JOB_AD_ANALYSIS_TEMPERATURE,
    }
}

/// Sends one cleaned ad to the completion service.
pub async fn analyze_job_ad(
    service: &dyn CompletionService,
    cleaned_text: &str,
) -> Result<(JobAdAnalysis, Usage), AppError> {
    complete_json(service, &analysis_request(cleaned_text))
        .await
        .map_err(|e| AppError::ServiceFailure(format!("Job ad analysis failed: {e}")))
}

/// Writes the analysis into `doc`'s front matter, keeping every existing key.
/// Skills go through the synonym map first.
pub fn enrich(doc: &mut Document, analysis: &JobAdAnalysis, synonyms: &SynonymMap, region: &[String]) {
    add_tag(doc, ANALYZED_TAG);

    doc.set("job_employer", analysis.employer.as_str());
    doc.set("job_role", analysis.role.as_str());
    doc.set("job_description", analysis.description.as_str());
    doc.set("job_region", region.to_vec());
    doc.set("job_experience", analysis.experience);
    doc.set_job_skills(&normalize_skills(&analysis.skills, synonyms));
    doc.set("job_type", analysis.contract_type.as_str());
    doc.set("job_hours", analysis.work_hours);
    doc.set("job_ethical", analysis.is_ethical);
    doc.set("job_remote", analysis.is_remote);
}

fn add_tag(doc: &mut Document, tag: &str) {
    let tags = match doc.get("tags") {
        Some(Value::Sequence(items)) => {
            let mut items = items.clone();
            if !items.iter().any(|t| t.as_str() == Some(tag)) {
                items.push(Value::from(tag));
            }
            items
        }
        Some(Value::String(single)) if single == tag => return,
        Some(Value::String(single)) => vec![Value::from(single.as_str()), Value::from(tag)],
        None | Some(Value::Null) => vec![Value::from(tag)],
        Some(other) => {
            warn!("'tags' in {} is not a list ({other:?}), replacing it", doc.name);
            vec![Value::from(tag)]
        }
    };
    doc.set("tags", Value::Sequence(tags));
}
