//! Validate configuration command

use anyhow::{Context, Result};
use filemap_core::Config;

/// Normalize every target, stopping at the first failure
pub fn run(config_path: &str) -> Result<()> {
    tracing::info!("Validating configuration: {}", config_path);

    let config = Config::load(config_path).context("Failed to load configuration")?;
    let normalizer = config.normalizer();

    tracing::info!("✓ Project: {}", config.project.name);
    tracing::info!("✓ Base directory: {}", config.base_dir().display());

    let mut total = 0;
    for task in config.tasks() {
        for target in config.targets(task)? {
            let entries = config
                .normalize_target(&normalizer, task, target)
                .with_context(|| format!("Invalid target {}:{}", task, target))?;
            let sources: usize = entries.iter().map(|e| e.src.len()).sum();
            tracing::info!(
                "✓ {}:{} → {} entries, {} sources",
                task,
                target,
                entries.len(),
                sources
            );
            total += 1;
        }
    }

    tracing::info!("✓ Configuration is valid ({} targets)", total);
    Ok(())
}
