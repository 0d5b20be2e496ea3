use anyhow::Result;
use tracing::info;

use jobad::config::Config;
use jobad::skills::remap::remap_documents;
use jobad::skills::synonyms::SynonymStore;

fn main() -> Result<()> {
    let config = Config::from_env()?;
    jobad::init_tracing(&config.rust_log);

    info!("Remapping skills in {}", config.output_path.display());

    let synonyms = SynonymStore::new(&config.skills_mapping_path).load()?;
    remap_documents(&config.output_path, &synonyms)?;

    Ok(())
}
