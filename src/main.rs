//! ActClip command-line entry point
//!
//! # Usage
//!
//! ```bash
//! actclip crop --format virat --base /data/virat
//! actclip cut --format meva --base /data/meva --class person_sits_down
//! actclip scan --format meva --base /data/meva --video-list relevant.txt
//! actclip inspect --input video.mp4
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use actclip_cli::app::AppContainer;
use actclip_cli::cli::{commands, Cli, Commands};
use actclip_cli::config_initialization::initialize_configuration_hierarchy;
use actclip_cli::utils::logging::{LoggingConfig, LoggingSystem};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingSystem::new(LoggingConfig {
        level: cli.log_level,
        format: cli.log_format,
        ..LoggingConfig::default()
    });
    logging
        .initialize()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    logging.log_system_info();

    let config = initialize_configuration_hierarchy(&cli)?;
    let container = AppContainer::new(config)?;

    match &cli.command {
        Commands::Crop(args) => commands::crop(&container, args)?,
        Commands::Cut(args) => commands::cut(&container, args)?,
        Commands::Scan(args) => commands::scan(&container, args)?,
        Commands::Inspect(args) => commands::inspect(&container, args)?,
    }

    info!("Done");
    Ok(())
}
