//! CLI module for ActClip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

pub use args::{CropArgs, CutArgs, DatasetArgs, EncoderArgs, InspectArgs, ScanArgs};

/// ActClip activity clip extractor
///
/// Cuts and crops labeled action instances out of annotated video datasets
/// into one short clip per activity.
#[derive(Parser, Debug)]
#[command(name = "actclip")]
#[command(about = "Extract labeled activity clips from annotated video datasets")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level
    #[arg(long, value_enum, default_value = "info", env = "ACTCLIP_LOG_LEVEL", global = true)]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", env = "ACTCLIP_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Configuration file (default: ./actclip.toml when present)
    #[arg(long, env = "ACTCLIP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut and crop every annotated activity into its own clip
    Crop(CropArgs),
    /// Cut merged per-class time spans without cropping
    Cut(CutArgs),
    /// Count annotation documents per activity class
    Scan(ScanArgs),
    /// Print frame rate and size of a source video as JSON
    Inspect(InspectArgs),
}
