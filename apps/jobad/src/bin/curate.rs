use anyhow::Result;
use tracing::info;

use jobad::config::Config;
use jobad::console::ConsolePrompter;
use jobad::llm_client::{self, LlmClient};
use jobad::skills::blacklist::BlacklistStore;
use jobad::skills::curation::run_curation;
use jobad::skills::synonyms::SynonymStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    jobad::init_tracing(&config.rust_log);

    info!("Starting skill curation v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.api_key()?.to_string())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let synonym_store = SynonymStore::new(&config.skills_mapping_path);
    let blacklist_store = BlacklistStore::new(&config.blacklist_path);
    let mut prompter = ConsolePrompter::new();

    let report = run_curation(
        &synonym_store,
        &blacklist_store,
        &config.output_path,
        &llm,
        &mut prompter,
    )
    .await?;

    if report.aborted {
        info!("Curation cancelled, no files were changed");
    } else {
        info!(
            "Curation finished: {} new groups, {} new synonyms, {} rejected groups, {} rejected synonyms",
            report.tally.new_groups,
            report.tally.new_duplicates,
            report.tally.rejected_keys,
            report.tally.rejected_duplicates
        );
    }

    Ok(())
}
