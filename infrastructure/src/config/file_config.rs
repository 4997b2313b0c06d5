//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain types with
//! validation.

use crate::config::ConfigError;
use chorus_application::ExecutionParams;
use chorus_domain::{ModelDescriptor, ModelRegistry, ProviderId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Ordered model registry; empty means the built-in registry
    pub models: Vec<FileModelEntry>,
    /// Model designated to merge multiple answers
    pub synthesis: Option<FileModelEntry>,
    /// Provider credentials and routing default
    pub providers: FileProvidersConfig,
    /// Fan-out bounds
    pub execution: FileExecutionConfig,
}

impl FileConfig {
    /// Convert the raw model list into a validated registry.
    pub fn to_registry(&self) -> Result<ModelRegistry, ConfigError> {
        if self.models.is_empty() {
            return Ok(ModelRegistry::builtin());
        }
        let models = self
            .models
            .iter()
            .map(FileModelEntry::to_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        let synthesis = self
            .synthesis
            .as_ref()
            .map(FileModelEntry::to_descriptor)
            .transpose()?;
        Ok(ModelRegistry::new(models, synthesis)?)
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        self.execution.to_params()
    }
}

/// One model registry entry as written in TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelEntry {
    pub name: String,
    pub provider: String,
    pub model_id: String,
    pub color: String,
    pub guaranteed: bool,
}

impl FileModelEntry {
    fn to_descriptor(&self) -> Result<ModelDescriptor, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name"));
        }
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::MissingField("model_id"));
        }
        let provider: ProviderId =
            self.provider
                .parse()
                .map_err(|_| ConfigError::UnknownProvider {
                    provider: self.provider.clone(),
                    model: self.name.clone(),
                })?;

        let color = if self.color.is_empty() {
            "#888888".to_string()
        } else {
            self.color.clone()
        };

        let mut descriptor = ModelDescriptor::new(&self.name, provider, &self.model_id, color);
        if self.guaranteed {
            descriptor = descriptor.guaranteed();
        }
        Ok(descriptor)
    }
}

/// Provider credential settings. Keys are referenced by environment
/// variable name, never stored inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Fallback provider kind when a model's own provider is not configured
    pub default: Option<String>,
    pub openai: FileProviderEntry,
    pub anthropic: FileProviderEntry,
    pub openrouter: FileProviderEntry,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            default: None,
            openai: FileProviderEntry::new("OPENAI_API_KEY"),
            anthropic: FileProviderEntry::new("ANTHROPIC_API_KEY"),
            openrouter: FileProviderEntry::new("OPENROUTER_API_KEY"),
        }
    }
}

impl FileProvidersConfig {
    pub fn default_kind(&self) -> ProviderId {
        self.default
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(ProviderId::OpenAi)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderEntry {
    pub api_key_env: String,
    pub base_url: Option<String>,
}

impl FileProviderEntry {
    fn new(api_key_env: &str) -> Self {
        Self {
            api_key_env: api_key_env.to_string(),
            base_url: None,
        }
    }
}

impl Default for FileProviderEntry {
    fn default() -> Self {
        Self::new("")
    }
}

/// Fan-out bounds as written in TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Per-invocation deadline in seconds
    pub timeout_secs: u64,
    /// Event channel capacity for streaming callers
    pub channel_capacity: usize,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            channel_capacity: 64,
        }
    }
}

impl FileExecutionConfig {
    fn to_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_invocation_timeout(Duration::from_secs(self.timeout_secs))
            .with_channel_capacity(self.channel_capacity)
    }
}
