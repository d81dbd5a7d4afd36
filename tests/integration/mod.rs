//! Integration tests for action data context resolution

mod ancestry;
mod editor_validation;
mod resolution;
mod test_utils;

pub use test_utils::with_xdg_env;
