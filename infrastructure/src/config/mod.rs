//! Configuration: raw TOML structures and the multi-source loader.

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileExecutionConfig, FileModelEntry, FileProviderEntry, FileProvidersConfig,
};
pub use loader::ConfigLoader;

use chorus_domain::DomainError;
use thiserror::Error;

/// Errors raised while loading or converting configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown provider '{provider}' for model '{model}'")]
    UnknownProvider { provider: String, model: String },

    #[error("Model entry is missing a {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Load(#[from] Box<figment::Error>),
}
