use std::path::Path;

use anyhow::{Context, Result};

use crate::store::{RepositoryConfig, RepositoryLayout};

/// Load the repository config for a given layout; defaults when no file exists.
pub fn load_repository_config(layout: &RepositoryLayout) -> Result<RepositoryConfig> {
    match layout.config_path() {
        Some(path) => read_repository_config(&path),
        None => Ok(RepositoryConfig::default()),
    }
}

/// Parse a config file, picking the format from its extension.
pub fn read_repository_config(path: &Path) -> Result<RepositoryConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read repository config at {}", path.display()))?;
    let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
    let config = if is_yaml {
        serde_yaml::from_str(&text).context("Failed to parse repository config YAML")?
    } else {
        serde_json::from_str(&text).context("Failed to parse repository config JSON")?
    };
    Ok(config)
}
