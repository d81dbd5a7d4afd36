//! CLI route: single route table and run context.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_replay_json, format_replay_text, format_validate_text};
use crate::config::{ActxConfig, ConfigLoader};
use crate::error::ApiError;
use crate::scenario::Scenario;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: the loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
#[derive(Debug)]
pub struct RunContext {
    config: ActxConfig,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self { config })
    }

    pub fn from_config(config: ActxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ActxConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        debug!(command = command_name(command), "Executing command");
        match command {
            Commands::Replay { file, format } => self.replay(file, *format),
            Commands::Validate { file } => {
                let scenario = load_valid(file)?;
                Ok(format_validate_text(&scenario))
            }
        }
    }

    fn replay(&self, file: &Path, format: OutputFormat) -> Result<String, ApiError> {
        let scenario = load_valid(file)?;
        let report = scenario.replay_with(self.config.resolver.clone());
        info!(
            action = %report.action,
            keys = report.outcomes.len(),
            failed = report.failed,
            "Replay finished"
        );
        match format {
            OutputFormat::Text => Ok(format_replay_text(&report)),
            OutputFormat::Json => format_replay_json(&report),
        }
    }
}

fn load_valid(file: &Path) -> Result<Scenario, ApiError> {
    let scenario = Scenario::load(file)?;
    scenario.validate()?;
    Ok(scenario)
}
