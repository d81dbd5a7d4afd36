//! CLI help and command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name used in log events (e.g. "replay", "validate").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Replay { .. } => "replay",
        Commands::Validate { .. } => "validate",
    }
}
