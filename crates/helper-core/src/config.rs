use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Smallest and largest `top_k` the backend accepts on an ask.
pub const MIN_TOP_K: u32 = 1;
pub const MAX_TOP_K: u32 = 20;

/// Top-level configuration for the helper client.
///
/// Loaded from `~/.helper/config.toml` by default. Each section corresponds
/// to one consumer: logging, the backend connection, and the chat session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelperConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl HelperConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: HelperConfig = toml::from_str(&content)?;
        config.validate();
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Replace out-of-range values with their defaults.
    pub fn validate(&mut self) {
        if !(MIN_TOP_K..=MAX_TOP_K).contains(&self.chat.top_k) {
            let fallback = ChatConfig::default().top_k;
            warn!(
                top_k = self.chat.top_k,
                fallback, "chat.top_k out of range {}..={}", MIN_TOP_K, MAX_TOP_K
            );
            self.chat.top_k = fallback;
        }
        let trimmed = self.api.base_url.trim_end_matches('/');
        if trimmed.len() != self.api.base_url.len() {
            self.api.base_url = trimmed.to_string();
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the RAG backend, without a trailing slash.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Number of chunks the backend retrieves per question.
    pub top_k: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}
