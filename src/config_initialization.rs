//! Configuration initialization and hierarchy management

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::toml_config::{RunConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands, DatasetArgs, EncoderArgs};

/// Resolve the run configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<RunConfig> {
    let mut config = TomlConfigAdapter::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration file")?;

    let env_overrides = apply_environment(&mut config, |key| std::env::var(key).ok())?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_overrides(&mut config, &cli.command);
    if cli_overrides > 0 {
        debug!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Apply `ACTCLIP_*` variables read through `lookup`, returning how many were set
pub fn apply_environment<F>(config: &mut RunConfig, lookup: F) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    let mut read = |key: &str| {
        let value = lookup(key);
        if let Some(value) = &value {
            debug!("Found environment override: {} = {}", key, value);
            applied += 1;
        }
        value
    };

    if let Some(value) = read("ACTCLIP_BASE") {
        config.paths.base = PathBuf::from(value);
    }
    if let Some(value) = read("ACTCLIP_OUTPUT") {
        config.paths.output = PathBuf::from(value);
    }
    if let Some(value) = read("ACTCLIP_VIDEO_EXTENSION") {
        config.paths.video_extension = Some(value);
    }
    if let Some(value) = read("ACTCLIP_ENCODER") {
        config.encoder.binary = value;
    }
    if let Some(value) = read("ACTCLIP_CODEC") {
        config.encoder.codec = value;
    }
    if let Some(value) = read("ACTCLIP_CRF") {
        config.encoder.crf = parse_env("ACTCLIP_CRF", &value)?;
    }
    if let Some(value) = read("ACTCLIP_MIN_BLOCK") {
        config.encoder.min_block = parse_env("ACTCLIP_MIN_BLOCK", &value)?;
    }
    if let Some(value) = read("ACTCLIP_CROP") {
        config.run.crop = parse_env("ACTCLIP_CROP", &value)?;
    }
    if let Some(value) = read("ACTCLIP_ATOMIC_OUTPUT") {
        config.run.atomic_output = parse_env("ACTCLIP_ATOMIC_OUTPUT", &value)?;
    }

    Ok(applied)
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value '{}' for {}", value, key))
}

/// Apply command-line overrides, returning how many were set
pub fn apply_cli_overrides(config: &mut RunConfig, command: &Commands) -> usize {
    match command {
        Commands::Crop(args) => {
            let mut applied = apply_dataset_args(config, &args.dataset) + apply_encoder_args(config, &args.encoder);
            if args.no_crop {
                config.run.crop = false;
                applied += 1;
            }
            if let Some(name) = &args.manifest_name {
                config.paths.manifest_name = name.clone();
                applied += 1;
            }
            applied
        }
        Commands::Cut(args) => apply_dataset_args(config, &args.dataset) + apply_encoder_args(config, &args.encoder),
        Commands::Scan(args) => apply_dataset_args(config, &args.dataset),
        Commands::Inspect(_) => 0,
    }
}

fn apply_dataset_args(config: &mut RunConfig, args: &DatasetArgs) -> usize {
    let mut applied = 0;
    if let Some(base) = &args.base {
        config.paths.base = base.clone();
        applied += 1;
    }
    if let Some(input) = &args.input {
        config.paths.input = input.clone();
        applied += 1;
    }
    if let Some(output) = &args.output {
        config.paths.output = output.clone();
        applied += 1;
    }
    if let Some(extension) = &args.video_extension {
        config.paths.video_extension = Some(extension.clone());
        applied += 1;
    }
    if !args.classes.is_empty() {
        config.classes.relevant = Some(args.classes.clone());
        applied += 1;
    }
    applied
}

fn apply_encoder_args(config: &mut RunConfig, args: &EncoderArgs) -> usize {
    let mut applied = 0;
    if let Some(binary) = &args.encoder {
        config.encoder.binary = binary.clone();
        applied += 1;
    }
    if let Some(codec) = &args.codec {
        config.encoder.codec = codec.clone();
        applied += 1;
    }
    if let Some(crf) = args.crf {
        config.encoder.crf = crf;
        applied += 1;
    }
    if let Some(min_block) = args.min_block {
        config.encoder.min_block = min_block;
        applied += 1;
    }
    if let Some(extension) = &args.extension {
        config.encoder.extension = extension.clone();
        applied += 1;
    }
    if args.encoder_verbose {
        config.encoder.verbose = true;
        applied += 1;
    }
    if args.no_atomic {
        config.run.atomic_output = false;
        applied += 1;
    }
    applied
}
