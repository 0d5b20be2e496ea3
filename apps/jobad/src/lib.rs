pub mod analysis;
pub mod config;
pub mod console;
pub mod documents;
pub mod errors;
pub mod llm_client;
pub mod skills;
pub mod storage;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes structured logging. `RUST_LOG` from the environment wins;
/// otherwise the crate logs at `rust_log`.
pub fn init_tracing(rust_log: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
