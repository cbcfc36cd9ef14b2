//! CLI command handlers
//!
//! This module contains all CLI-related functionality including:
//! - Argument parsing structures
//! - Command implementations
//! - Verbosity handling

pub mod args;
pub mod help;
pub mod router;

// Re-export the main CLI structures for convenience
pub use args::{Cli, Commands, MonthArgs, SessionArgs};
pub use help::get_log_level;
pub use router::{execute_command, render_signed_request, run_calendar, run_summary};
