//! List targets command

use anyhow::{Context, Result};
use filemap_core::Config;

/// Print every `task:target` pair, one per line
pub fn run(config_path: &str) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    tracing::debug!("Listing targets of {}", config.project.name);

    for task in config.tasks() {
        for target in config.targets(task)? {
            println!("{}:{}", task, target);
        }
    }
    Ok(())
}
