//! CLI argument definitions.

use super::validators::{parse_confidence, parse_file_size_mb};
use crate::config::CropMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Livestock species and breed identification from images.
#[derive(Debug, Parser)]
#[command(name = "breedid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "BREEDID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Input images or directories to analyze.
    pub inputs: Vec<PathBuf>,

    /// Common options for analysis.
    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage models.
    Models {
        /// Models action to perform.
        #[command(subcommand)]
        action: ModelsAction,
    },
    /// Print the resolved label sets for every head.
    Labels,
    /// Run the image quality gate without loading any model.
    Quality {
        /// Image to assess.
        image: PathBuf,
        /// Upload limit in megabytes (overrides config).
        #[arg(long, value_parser = parse_file_size_mb)]
        max_file_size_mb: Option<f64>,
    },
    /// Record a user correction for an image.
    Correct {
        /// Image the correction refers to.
        image: PathBuf,
        /// Label the system predicted.
        #[arg(long)]
        predicted: String,
        /// Label the user says is correct.
        #[arg(long)]
        actual: String,
        /// Confidence of the original prediction (0.0-1.0).
        #[arg(long, value_parser = parse_confidence)]
        confidence: f32,
        /// Also export this session's active-learning queue to a CSV file.
        #[arg(long)]
        queue: Option<PathBuf>,
    },
    /// Inspect or export recorded corrections.
    Corrections {
        /// Corrections action to perform.
        #[command(subcommand)]
        action: CorrectionsAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Models subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ModelsAction {
    /// List configured model paths.
    List,
    /// Verify model files exist for the selected mode.
    Check {
        /// Check the offline species-only model instead of the full ensemble.
        #[arg(long)]
        offline: bool,
    },
}

/// Corrections subcommand actions.
#[derive(Debug, Subcommand)]
pub enum CorrectionsAction {
    /// Print recorded corrections.
    Show,
    /// Export recorded corrections as CSV.
    Export {
        /// Destination CSV file.
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs {
    /// Species confidence required to commit to a breed head (0.0-1.0).
    #[arg(long, value_parser = parse_confidence, env = "BREEDID_SPECIES_THRESHOLD")]
    pub species_threshold: Option<f32>,

    /// Breed confidence required to accept a breed without review (0.0-1.0).
    #[arg(long, value_parser = parse_confidence, env = "BREEDID_BREED_THRESHOLD")]
    pub breed_threshold: Option<f32>,

    /// Use the species-only lite model and skip breed classification.
    #[arg(long, env = "BREEDID_OFFLINE")]
    pub offline: bool,

    /// Do not keep a session history.
    #[arg(long, env = "BREEDID_PRIVACY")]
    pub privacy: bool,

    /// Framing applied before inference (none, center, center-weighted).
    #[arg(long, env = "BREEDID_CROP")]
    pub crop: Option<CropMode>,

    /// Number of breed candidates to report.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=20))]
    pub top_k: Option<u16>,

    /// Write all results to a JSON file.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write one CSV row per image.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Export the session history as CSV when the batch finishes.
    #[arg(long, conflicts_with = "privacy")]
    pub history: Option<PathBuf>,

    /// Disable UTF-8 BOM in CSV output (BOM is enabled by default for Excel compatibility).
    #[arg(long)]
    pub no_csv_bom: bool,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}
