use anyhow::Result;
use tracing::{info, warn};

use jobad::analysis::pipeline::{process_markdown_files, PipelineParams};
use jobad::config::Config;
use jobad::llm_client::{self, LlmClient};
use jobad::skills::synonyms::SynonymStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;
    jobad::init_tracing(&config.rust_log);

    info!("Starting job ad analyzer v{}", env!("CARGO_PKG_VERSION"));

    let synonyms = SynonymStore::new(&config.skills_mapping_path).load()?;

    let llm = LlmClient::new(config.api_key()?.to_string())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let summary = process_markdown_files(
        &llm,
        PipelineParams {
            input_dir: &config.input_path,
            output_dir: &config.output_path,
            synonyms: &synonyms,
            region: &config.job_region,
        },
    )
    .await?;

    info!("✅ {} job ads processed", summary.processed);
    if !summary.failed.is_empty() {
        warn!("{} job ads failed: {}", summary.failed.len(), summary.failed.join(", "));
        anyhow::bail!("{} job ads could not be processed", summary.failed.len());
    }

    Ok(())
}
