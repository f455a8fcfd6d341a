//! Normalize one target

use anyhow::{Context, Result};
use filemap_core::Config;
use filemap_core::config::parse_target_ref;

/// Print the normalized entries of `reference` as a JSON array
pub fn run(config_path: &str, reference: &str, pretty: bool) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    let (task, target) = parse_target_ref(reference)?;

    let entries = config
        .normalize_target(&config.normalizer(), task, target)
        .with_context(|| format!("Failed to normalize {}", reference))?;
    tracing::debug!("{} produced {} entries", reference, entries.len());

    let json = if pretty {
        serde_json::to_string_pretty(&entries)?
    } else {
        serde_json::to_string(&entries)?
    };
    println!("{}", json);
    Ok(())
}
