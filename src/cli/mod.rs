//! CLI argument parsing and command handling.

mod args;
pub mod help;
mod validators;

pub use args::{AnalyzeArgs, Cli, Command, ConfigAction, CorrectionsAction, ModelsAction};
