//! Help message display for CLI.

#![allow(clippy::print_stdout)]

use crate::config::Config;

/// Print help message based on configuration state.
pub fn print_smart_help(config: &Config) {
    if needs_setup(config) {
        print_first_time_help();
    } else {
        print_configured_help();
    }
}

/// True when no species model is configured for either mode.
fn needs_setup(config: &Config) -> bool {
    config.models.species.is_none() && config.models.lite.is_none()
}

/// Print detailed setup guide for first-time users.
pub fn print_first_time_help() {
    println!("No models configured. Get started with breedid:");
    println!();
    println!("1. Initialize configuration:");
    println!("   breedid config init");
    println!();
    println!("2. Point the [models] section at your exported ONNX classifiers:");
    println!("   species = \"models/species.onnx\"");
    println!("   sheep   = \"models/sheep_breeds.onnx\"");
    println!("   bovine  = \"models/bovine_breeds.onnx\"");
    println!("   lite    = \"models/species_lite.onnx\"   (optional, for --offline)");
    println!();
    println!("3. Check that labels resolve and models are present:");
    println!("   breedid labels");
    println!("   breedid models check");
    println!();
    println!("4. Analyze photos:");
    println!("   breedid cow.jpg");
    println!();
    println!("Run 'breedid -h' for all options.");
}

/// Print brief usage reminder for configured users.
pub fn print_configured_help() {
    println!("Usage: breedid [IMAGES]... [OPTIONS]");
    println!();
    println!("Example: breedid photos/ --species-threshold 0.85 --json results.json");
    println!();
    println!("Run 'breedid -h' for all options or 'breedid quality <image>' to check a photo.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_needs_setup() {
        assert!(needs_setup(&Config::default()));
    }

    #[test]
    fn test_lite_only_config_is_usable() {
        let mut config = Config::default();
        config.models.lite = Some(PathBuf::from("/tmp/lite.onnx"));
        assert!(!needs_setup(&config));
    }
}
