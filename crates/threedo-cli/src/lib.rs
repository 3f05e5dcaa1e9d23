//! CLI logic for the threedo converter.
//!
//! This module contains the core CLI logic: load a `.3d` document, convert
//! one root definition, print the flavor listing and write the JSON
//! manifest.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use threedo::{
    ModelBuilder, ThreedoError,
    config::{AppConfig, ConvertConfig, ParseConfig},
};

/// Run the threedo CLI application
///
/// # Errors
///
/// Returns `ThreedoError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Conversion errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), ThreedoError> {
    info!(
        input_path = args.input,
        root = args.root;
        "Processing model"
    );

    let file_config = config::load_config(args.config.as_ref())?;
    let app_config = apply_overrides(&file_config, args)?;

    let source = fs::read_to_string(&args.input)?;

    let builder = ModelBuilder::new(app_config);
    let definitions = builder.parse(&source)?;
    let model = builder.convert(&definitions, &args.root, args.hash.as_deref())?;

    if !args.silent {
        print!("{}", builder.render_listing(&model));
    }

    if let Some(output) = &args.output {
        fs::write(output, builder.render_json(&model)?)?;
        info!(output_file = output; "Manifest exported successfully");
    }

    Ok(())
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(config: &AppConfig, args: &Args) -> Result<AppConfig, ThreedoError> {
    let scale = args.scale.unwrap_or(config.convert().scale());
    config::validate_scale(scale)?;

    Ok(AppConfig::new(
        ParseConfig::new(args.allow_dup || config.parse().allow_duplicates()),
        ConvertConfig::new(scale),
    ))
}
