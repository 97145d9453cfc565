//! CLI module

mod commands;
mod logging;
mod progress;

pub use commands::{CarveArgs, Cli, Commands, parse_formats};
pub use logging::{default_filter, init_logging};
pub use progress::ProgressReporter;
