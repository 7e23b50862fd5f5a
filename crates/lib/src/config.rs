//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.dentline/config.json`) and environment.
//! Credentials resolve env-first so deployments can keep secrets out of the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Channel settings (WhatsApp via Twilio).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Generative-text settings (Gemini).
    #[serde(default)]
    pub llm: LlmConfig,

    /// Knowledge base location.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook HTTP server (default 8080).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub whatsapp: WhatsAppChannelConfig,
}

/// WhatsApp channel config (Twilio credentials and addresses).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppChannelConfig {
    /// Twilio account SID. Overridden by TWILIO_ACCOUNT_SID env when set.
    pub account_sid: Option<String>,
    /// Twilio auth token. Overridden by TWILIO_AUTH_TOKEN env when set.
    pub auth_token: Option<String>,
    /// Sending address, e.g. "whatsapp:+14155238886" (Twilio sandbox). Overridden by TWILIO_NUMBER env.
    pub sender_address: Option<String>,
    /// The practitioner's address, e.g. "whatsapp:+919031807701". Escalations go here,
    /// and only this address may issue relay commands. Overridden by PRACTITIONER_NUMBER env.
    pub practitioner_address: Option<String>,
}

/// Generative-text config (Gemini).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// Gemini API key. Overridden by GEMINI_API_KEY env when set.
    pub api_key: Option<String>,
    /// Model name (default "gemini-1.5-flash").
    pub model: Option<String>,
    /// API base URL override (for tests or proxies).
    pub base_url: Option<String>,
}

/// Knowledge base config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeConfig {
    /// Path to the clinic facts file. Relative paths are resolved against the config
    /// file's parent. Default: `knowledge.txt` next to the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Env var value, trimmed; empty or unset => None.
fn env_value(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Config string value, trimmed; empty or absent => None.
fn config_value(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the Twilio account SID: env TWILIO_ACCOUNT_SID overrides config.
pub fn resolve_account_sid(config: &Config) -> Option<String> {
    env_value("TWILIO_ACCOUNT_SID").or_else(|| config_value(&config.channels.whatsapp.account_sid))
}

/// Resolve the Twilio auth token: env TWILIO_AUTH_TOKEN overrides config.
pub fn resolve_auth_token(config: &Config) -> Option<String> {
    env_value("TWILIO_AUTH_TOKEN").or_else(|| config_value(&config.channels.whatsapp.auth_token))
}

/// Resolve the sending address: env TWILIO_NUMBER overrides config.
pub fn resolve_sender_address(config: &Config) -> Option<String> {
    env_value("TWILIO_NUMBER").or_else(|| config_value(&config.channels.whatsapp.sender_address))
}

/// Resolve the practitioner address: env PRACTITIONER_NUMBER overrides config.
pub fn resolve_practitioner_address(config: &Config) -> Option<String> {
    env_value("PRACTITIONER_NUMBER")
        .or_else(|| config_value(&config.channels.whatsapp.practitioner_address))
}

/// Resolve the Gemini API key: env GEMINI_API_KEY overrides config.
pub fn resolve_gemini_api_key(config: &Config) -> Option<String> {
    env_value("GEMINI_API_KEY").or_else(|| config_value(&config.llm.api_key))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("DENTLINE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".dentline").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or DENTLINE_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used (for resolving the config directory).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Resolve the knowledge base path: uses `knowledge.path` if set (relative paths
/// resolved against the config file's parent), otherwise `knowledge.txt` next to the config file.
pub fn resolve_knowledge_path(config: &Config, config_path: &Path) -> PathBuf {
    let config_parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match &config.knowledge.path {
        Some(p) if !p.as_os_str().is_empty() => {
            if p.is_absolute() {
                p.clone()
            } else {
                config_parent.join(p)
            }
        }
        _ => config_parent.join("knowledge.txt"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 8080);
        assert_eq!(g.bind, "127.0.0.1");
    }

    #[test]
    fn resolve_knowledge_path_default() {
        let config = Config::default();
        let path = Path::new("/home/user/.dentline/config.json");
        assert_eq!(
            resolve_knowledge_path(&config, path),
            PathBuf::from("/home/user/.dentline/knowledge.txt")
        );
    }

    #[test]
    fn resolve_knowledge_path_override_relative() {
        let mut config = Config::default();
        config.knowledge.path = Some(PathBuf::from("facts/clinic.txt"));
        let path = Path::new("/home/user/.dentline/config.json");
        assert_eq!(
            resolve_knowledge_path(&config, path),
            PathBuf::from("/home/user/.dentline/facts/clinic.txt")
        );
    }

    #[test]
    fn resolve_knowledge_path_override_absolute() {
        let mut config = Config::default();
        config.knowledge.path = Some(PathBuf::from("/srv/clinic/knowledge.txt"));
        let path = Path::new("/home/user/.dentline/config.json");
        assert_eq!(
            resolve_knowledge_path(&config, path),
            PathBuf::from("/srv/clinic/knowledge.txt")
        );
    }

    #[test]
    fn empty_config_strings_resolve_to_none() {
        let mut config = Config::default();
        config.channels.whatsapp.practitioner_address = Some("   ".to_string());
        // env PRACTITIONER_NUMBER is not set in the test environment
        if std::env::var("PRACTITIONER_NUMBER").is_err() {
            assert_eq!(resolve_practitioner_address(&config), None);
        }
    }
}
