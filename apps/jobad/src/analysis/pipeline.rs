//! The main pipeline: every ad in the input directory is cleaned, analyzed and
//! written, enriched, into the output directory under the same name.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::analysis::job_ad::{analyze_job_ad, enrich};
use crate::documents::clean::prepare_for_analysis;
use crate::documents::{file_name, list_markdown_files, write_document, Document};
use crate::errors::AppError;
use crate::llm_client::{CompletionService, Usage};
use crate::skills::synonyms::SynonymMap;

/// Directories and fixed values for one pipeline run.
pub struct PipelineParams<'a> {
    pub input_dir: &'a Path,
    pub output_dir: &'a Path,
    pub synonyms: &'a SynonymMap,
    pub region: &'a [String],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: Vec<String>,
    pub usage: Usage,
}

pub async fn process_markdown_files(
    service: &dyn CompletionService,
    params: PipelineParams<'_>,
) -> Result<RunSummary, AppError> {
    let mut summary = RunSummary::default();

    for path in list_markdown_files(params.input_dir)? {
        let name = file_name(&path);
        match process_file(service, &params, &path).await {
            Ok((written, usage)) => {
                info!(
                    "💾 Processed and saved: {} ({} prompt / {} completion / {} total tokens)",
                    written.display(),
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    usage.total_tokens
                );
                summary.usage += usage;
                summary.processed += 1;
            }
            Err(e) => {
                error!("Failed to process {name}: {e}");
                summary.failed.push(name);
            }
        }
    }

    if summary.processed > 1 {
        info!(
            "💸 Tokens consumed in total - {} Prompt - {} Completion - {} Total",
            summary.usage.prompt_tokens, summary.usage.completion_tokens, summary.usage.total_tokens
        );
    }
    Ok(summary)
}

async fn process_file(
    service: &dyn CompletionService,
    params: &PipelineParams<'_>,
    path: &Path,
) -> Result<(PathBuf, Usage), AppError> {
    let name = file_name(path);
    info!("⏳ Reading \"{name}\"...");
    let text = std::fs::read_to_string(path)?;
    let mut doc = Document::parse(&name, &text)?;
    let cleaned = prepare_for_analysis(&name, &text);

    info!("🤖 Submitting \"{name}\" for analysis...");
    let (analysis, usage) = analyze_job_ad(service, &cleaned).await?;

    enrich(&mut doc, &analysis, params.synonyms, params.region);
    let written = write_document(params.output_dir, &doc)?;
    Ok((written, usage))
}
