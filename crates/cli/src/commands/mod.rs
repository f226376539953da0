pub mod config;
pub mod probe;
pub mod utils;

pub use config::{handle_config_command, ConfigCommands};
pub use probe::{handle_probe_command, ProbeOptions};
