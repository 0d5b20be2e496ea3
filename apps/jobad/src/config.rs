use std::path::PathBuf;

use anyhow::{Context, Result};

/// Tool configuration loaded from environment variables (and `.env`, if present).
/// Only `OPENAI_API_KEY` has no default, and only the binaries that talk to the
/// completion service ask for it.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub skills_mapping_path: PathBuf,
    pub blacklist_path: PathBuf,
    pub openai_api_key: Option<String>,
    pub job_region: Vec<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            input_path: env_or("INPUT_PATH", "./input-files").into(),
            output_path: env_or("OUTPUT_PATH", "./output-files").into(),
            skills_mapping_path: env_or("SKILLS_MAPPING_PATH", "./data/skills-mapping.json")
                .into(),
            blacklist_path: env_or("BLACKLIST_PATH", "./data/blacklist.json").into(),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            job_region: parse_region(&env_or("JOB_REGION", "Belgium,Brussels")),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// The API key for the completion service. Fails with a message naming the variable.
    pub fn api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .context("Required environment variable 'OPENAI_API_KEY' is not set")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_region(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
