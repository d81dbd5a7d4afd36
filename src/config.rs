//! Configuration System
//!
//! Hierarchical configuration for the resolver and its logging: built-in
//! defaults, then the user's global file, then workspace files, then
//! `ACTX__`-prefixed environment variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::types::{keys, DataKey};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActxConfig {
    /// Resolution behavior
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Knobs of the resolution chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Walk the anchor's component ancestry when on the UI thread
    #[serde(default = "default_true")]
    pub ancestry_walk: bool,

    /// Stop the ancestry walk after this many components
    #[serde(default = "default_max_ancestry_depth")]
    pub max_ancestry_depth: usize,

    /// Revalidate live editor values against the anchor
    #[serde(default = "default_true")]
    pub validate_editors: bool,

    /// Keys holding live editors
    #[serde(default = "default_editor_keys")]
    pub editor_keys: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_ancestry_depth() -> usize {
    256
}

fn default_editor_keys() -> Vec<String> {
    [keys::EDITOR, keys::HOST_EDITOR, keys::INJECTED_EDITOR]
        .iter()
        .map(|k| k.name().to_string())
        .collect()
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            ancestry_walk: default_true(),
            max_ancestry_depth: default_max_ancestry_depth(),
            validate_editors: default_true(),
            editor_keys: default_editor_keys(),
        }
    }
}

impl ResolverSettings {
    pub fn is_editor_key(&self, key: &DataKey) -> bool {
        self.editor_keys.iter().any(|k| k == key.name())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_ancestry_depth == 0 {
            return Err("max_ancestry_depth must be at least 1".to_string());
        }
        if self.editor_keys.iter().any(|k| k.trim().is_empty()) {
            return Err("editor_keys cannot contain an empty key".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Resolver(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Resolver(msg) => write!(f, "Resolver: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ActxConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.resolver.validate() {
            errors.push(ValidationError::Resolver(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every error into one `ApiError`.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}
