//! CLI layer
//!
//! Command-line interface using clap.

pub mod browser;
pub mod clipboard;
pub mod commands;
pub mod context;
pub mod output;
pub mod precondition;
pub mod prompt;

pub use context::{AppContext, RepoSession};
pub use output::Output;
pub use prompt::{Prompter, TerminalPrompter};
