//! Initialize the configuration directory: default config and a knowledge base template.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

static DEFAULT_KNOWLEDGE: &str = include_str!("../config/knowledge.txt");

/// Create the config directory and default files if they do not exist.
/// - Creates the config directory (parent of config file path).
/// - Writes `config.json` with `{}` if missing.
/// - Seeds `knowledge.txt` from the bundled template if missing.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let knowledge_path = config_dir.join("knowledge.txt");
    if !knowledge_path.exists() {
        std::fs::write(&knowledge_path, DEFAULT_KNOWLEDGE).with_context(|| {
            format!("writing knowledge template to {}", knowledge_path.display())
        })?;
        log::info!("wrote knowledge base template to {}", knowledge_path.display());
    }

    Ok(config_dir.to_path_buf())
}
