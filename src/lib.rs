pub mod config;
pub mod core_state; // configuration + record store façade
pub mod db;
pub mod models;
pub mod pipeline;
pub mod reference; // canonical tests + aliases
pub mod rules; // lifestyle, triage, mental, BP, diet

use std::io::Read;

use tracing_subscriber::EnvFilter;

use crate::core_state::{load_configuration, CoreError};
use crate::pipeline::ReportProcessor;
use crate::reference::AliasResolver;

/// Analyze report text from stdin and print the result as JSON.
pub fn run() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config_dir = config::config_dir();
    let (reference, _rules) = load_configuration(config_dir.as_deref())?;
    let resolver = AliasResolver::with_default_synonyms(&reference);

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let analysis = ReportProcessor::new(&reference, &resolver).analyze_text(&text);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
