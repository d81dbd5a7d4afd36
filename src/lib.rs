//! actx: Action Data Context Resolution
//!
//! Resolves the data an action asks for at execution time, reconciling the
//! values captured when the action was requested against the state that is
//! actually current. Stale protected values abort the action instead of
//! letting it run on partial data.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod provider;
pub mod scenario;
pub mod timestamp;
pub mod types;
pub mod ui;
pub mod upgrade;
