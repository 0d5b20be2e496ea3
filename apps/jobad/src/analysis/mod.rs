// Job ad analysis: structured extraction through the completion service,
// then enrichment of the ad's front matter.
// All completion calls go through llm_client.

pub mod job_ad;
pub mod pipeline;
pub mod prompts;
