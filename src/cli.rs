//! CLI domain: parse, route, help, output, and presentation only.
//! No resolution logic; the route table dispatches to the scenario runner.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_replay_json, format_replay_text, format_validate_text};
pub use route::RunContext;
