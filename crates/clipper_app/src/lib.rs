//! Front end for the clipper workspace: configuration, logging, the task
//! orchestrator and the `clipper` command line.

pub mod cli;
pub mod platform;

pub use platform::app::{ActionError, Orchestrator};
pub use platform::config::{load_config, ClipperConfig, ConfigError};
