//! breedid - Hierarchical livestock species and breed identification.
//!
//! Photos are routed through a species classifier and then to the matching
//! breed head (sheep or bovine). Low-confidence species calls engage a
//! guardrail that runs both breed heads and asks the user to choose.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod imaging;
pub mod inference;
pub mod labels;
pub mod ledger;
pub mod locking;
pub mod output;
pub mod pipeline;
pub mod router;
pub mod session;

use clap::Parser;
use cli::{AnalyzeArgs, Cli, Command};
use config::{
    Config, config_file_path, load_config, model_path, save_config_to, validate_config,
    validate_model_paths,
};
use imaging::{assess, decode_image_file};
use labels::{Head, resolve_labels};
use ledger::{CorrectionLedger, export_corrections_csv};
use output::{CsvWriter, JsonResultWriter, JsonSettings, OutputWriter, progress, summary};
use pipeline::{collect_input_files, process_image};
use router::HierarchicalRouter;
use session::SessionContext;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for the breedid CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.analyze.verbose, cli.analyze.quiet);

    // Install Ctrl+C handler to clean up lock files on interrupt
    if let Err(e) = ctrlc::set_handler(|| {
        locking::cleanup_all_locks();
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let config_path = cli.config.as_deref();
    let config = load_config(config_path)?;

    if let Some(command) = cli.command {
        return handle_command(command, config_path, &config);
    }

    if cli.inputs.is_empty() {
        cli::help::print_smart_help(&config);
        std::process::exit(0);
    }

    analyze_files(&cli.inputs, &cli.analyze, config)
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(mut config: Config, args: &AnalyzeArgs) -> Config {
    if let Some(threshold) = args.species_threshold {
        config.inference.species_threshold = threshold;
    }
    if let Some(threshold) = args.breed_threshold {
        config.inference.breed_threshold = threshold;
    }
    if let Some(crop) = args.crop {
        config.inference.crop = crop;
    }
    if let Some(top_k) = args.top_k {
        config.inference.top_k = usize::from(top_k);
    }
    config.session.offline |= args.offline;
    config.session.privacy |= args.privacy;
    config
}

/// Analyze input images with the given options.
fn analyze_files(inputs: &[PathBuf], args: &AnalyzeArgs, config: Config) -> Result<()> {
    use std::time::Instant;

    let total_start = Instant::now();
    let config = apply_overrides(config, args);
    validate_config(&config)?;

    let files = collect_input_files(inputs)?;
    if files.is_empty() {
        return Err(Error::NoValidImageFiles);
    }
    info!("Found {} image(s) to process", files.len());

    let labels = resolve_labels(&config.labels);
    for head in Head::ALL {
        info!("{head} head: {} label(s)", labels.for_head(head).len());
    }

    let mut session = SessionContext::new(config.session);
    let ensemble = session.load_ensemble(&config)?;
    let router = HierarchicalRouter::from_config(&config, ensemble, labels);
    let max_file_size = Some(config.inference.max_file_size_bytes());

    let mut writers = create_writers(args, &config, &session)?;
    for writer in &mut writers {
        writer.write_header()?;
    }

    let progress_enabled = !args.quiet && !args.no_progress;
    let image_progress = progress::create_image_progress(files.len(), progress_enabled);

    let mut records = Vec::with_capacity(files.len());
    let mut errors = 0;

    for file in &files {
        progress::set_progress_message(image_progress.as_ref(), &file.display().to_string());

        match process_image(file, &router, &mut session, max_file_size) {
            Ok(record) => {
                for writer in &mut writers {
                    writer.write_record(&record)?;
                }
                if !args.quiet {
                    progress::print_above(
                        image_progress.as_ref(),
                        &summary::format_result(&record),
                    );
                }
                records.push(record);
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                errors += 1;
                if args.fail_fast {
                    progress::finish_progress(image_progress, "Failed");
                    return Err(e);
                }
            }
        }
        progress::inc_progress(image_progress.as_ref());
    }

    progress::finish_progress(image_progress, "Complete");

    for writer in &mut writers {
        writer.finalize()?;
    }

    if let Some(path) = &args.history {
        output::write_history_csv(session.history(), path, !args.no_csv_bom)?;
        info!("Session history written to {}", path.display());
    }

    let results: Vec<_> = records.iter().map(|r| &r.result).collect();
    info!(
        "{} in {:.2}s",
        summary::format_batch_summary(&results, errors),
        total_start.elapsed().as_secs_f64()
    );

    if errors > 0 {
        warn!("{} image(s) had errors", errors);
    }

    Ok(())
}

/// Build the file writers requested on the command line.
fn create_writers(
    args: &AnalyzeArgs,
    config: &Config,
    session: &SessionContext,
) -> Result<Vec<Box<dyn OutputWriter>>> {
    let mut writers: Vec<Box<dyn OutputWriter>> = Vec::new();

    if let Some(path) = &args.csv {
        writers.push(Box::new(CsvWriter::new(path, !args.no_csv_bom)?));
    }
    if let Some(path) = &args.json {
        let settings = JsonSettings {
            species_threshold: config.inference.species_threshold,
            breed_threshold: config.inference.breed_threshold,
            offline: session.offline,
            crop: config.inference.crop.to_string(),
        };
        writers.push(Box::new(JsonResultWriter::new(path, settings)));
    }

    Ok(writers)
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed unless explicitly asked for.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn handle_command(command: Command, config_path: Option<&Path>, config: &Config) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action, config_path),
        Command::Models { action } => handle_models_command(action, config),
        Command::Labels => {
            handle_labels_command(config);
            Ok(())
        }
        Command::Quality {
            image,
            max_file_size_mb,
        } => handle_quality_command(&image, max_file_size_mb, config),
        Command::Correct {
            image,
            predicted,
            actual,
            confidence,
            queue,
        } => handle_correct_command(
            &image,
            &predicted,
            &actual,
            confidence,
            queue.as_deref(),
            config,
        ),
        Command::Corrections { action } => handle_corrections_command(action, config),
    }
}

fn handle_config_command(action: cli::ConfigAction, config_path: Option<&Path>) -> Result<()> {
    use cli::ConfigAction;

    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };

    match action {
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_config_to(&Config::default(), Some(&path))?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  Set the [models] paths, then run 'breedid models check'");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(Some(&path))?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn handle_models_command(action: cli::ModelsAction, config: &Config) -> Result<()> {
    use cli::ModelsAction;

    match action {
        ModelsAction::List => {
            let models = &config.models;
            for (name, path) in [
                ("species", &models.species),
                ("sheep", &models.sheep),
                ("bovine", &models.bovine),
                ("lite", &models.lite),
            ] {
                match path {
                    Some(path) => println!("  {name:<8} {}", path.display()),
                    None => println!("  {name:<8} (not configured)"),
                }
            }
            Ok(())
        }
        ModelsAction::Check { offline } => {
            println!("Checking models ({} mode)...", if offline { "offline" } else { "full" });
            let heads: &[Head] = if offline { &[Head::Species] } else { &Head::ALL };
            let mut all_ok = true;
            for &head in heads {
                match model_path(config, head, offline) {
                    Ok(path) => println!("  ✓ {head}: {}", path.display()),
                    Err(e) => {
                        println!("  ✗ {head}: {e}");
                        all_ok = false;
                    }
                }
            }
            if all_ok {
                println!("All models OK");
            }
            validate_model_paths(config, offline)
        }
    }
}

fn handle_labels_command(config: &Config) {
    let labels = resolve_labels(&config.labels);
    for head in Head::ALL {
        let set = labels.for_head(head);
        if set.is_empty() {
            println!("{head}: (no labels)");
        } else {
            println!("{head} ({}): {}", set.len(), set.names().join(", "));
        }
    }
}

fn handle_quality_command(
    image: &Path,
    max_file_size_mb: Option<f64>,
    config: &Config,
) -> Result<()> {
    let decoded = decode_image_file(image)?;
    let mut inference = config.inference.clone();
    if let Some(mb) = max_file_size_mb {
        inference.max_file_size_mb = mb;
    }
    let report = assess(
        &decoded.image,
        Some(decoded.file_size_bytes),
        Some(inference.max_file_size_bytes()),
    );
    print!("{}", summary::format_quality(&report));
    Ok(())
}

fn handle_correct_command(
    image: &Path,
    predicted: &str,
    actual: &str,
    confidence: f32,
    queue: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let decoded = decode_image_file(image)?;
    let labels = resolve_labels(&config.labels);
    if labels.heads_with(actual).is_empty() {
        warn!("'{actual}' is not a known label of any head; recording it anyway");
    }
    let ledger = CorrectionLedger::new(&config.ledger.path);
    let mut session = SessionContext::new(config.session);
    let correction = ledger.record(
        &mut session.queue,
        &decoded.content_hash,
        predicted,
        actual,
        confidence,
    )?;
    println!(
        "Recorded correction: {} -> {} ({})",
        correction.predicted,
        correction.actual,
        ledger.path().display()
    );
    if let Some(path) = queue {
        session.queue.export_csv(path)?;
        println!(
            "Exported {} queued correction(s) to {}",
            session.queue.len(),
            path.display()
        );
    }
    Ok(())
}

fn handle_corrections_command(action: cli::CorrectionsAction, config: &Config) -> Result<()> {
    use cli::CorrectionsAction;

    let ledger = CorrectionLedger::new(&config.ledger.path);
    let corrections = ledger.read_all()?;

    match action {
        CorrectionsAction::Show => {
            if corrections.is_empty() {
                println!("No corrections recorded.");
            }
            for c in &corrections {
                println!(
                    "{}  {}  {} -> {} ({:.2})",
                    c.timestamp.to_rfc3339(),
                    c.image_hash.chars().take(12).collect::<String>(),
                    c.predicted,
                    c.actual,
                    c.confidence
                );
            }
            Ok(())
        }
        CorrectionsAction::Export { output } => {
            export_corrections_csv(&corrections, &output)?;
            println!(
                "Exported {} correction(s) to {}",
                corrections.len(),
                output.display()
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CropMode;

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from([
            "breedid",
            "cow.jpg",
            "--species-threshold",
            "0.9",
            "--top-k",
            "5",
            "--crop",
            "none",
            "--privacy",
        ])
        .unwrap();

        let config = apply_overrides(Config::default(), &cli.analyze);
        assert!((config.inference.species_threshold - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.inference.top_k, 5);
        assert_eq!(config.inference.crop, CropMode::None);
        assert!(config.session.privacy);
        assert!(!config.session.offline);
    }

    #[test]
    fn test_overrides_keep_config_values_when_absent() {
        let cli = Cli::try_parse_from(["breedid", "cow.jpg"]).unwrap();
        let mut base = Config::default();
        base.session.offline = true;
        base.inference.breed_threshold = 0.6;

        let config = apply_overrides(base, &cli.analyze);
        assert!(config.session.offline);
        assert!((config.inference.breed_threshold - 0.6).abs() < f32::EPSILON);
    }
}
