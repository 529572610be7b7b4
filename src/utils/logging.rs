//! Logging setup and batch progress reporting

use std::time::Instant;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::utils::Utils;

/// Logging configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level, overridden by `RUST_LOG` when set
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include target module information
    pub target: bool,
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// One line per event
    Compact,
    /// JSON lines for log collectors
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            target: false,
        }
    }
}

/// Logging system manager
pub struct LoggingSystem {
    config: LoggingConfig,
}

impl LoggingSystem {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.config.level.as_filter()))
    }

    /// Install the global subscriber; logs go to stderr so stdout stays clean
    pub fn initialize(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_target(self.config.target)
            .with_writer(std::io::stderr);

        match self.config.format {
            LogFormat::Pretty => builder.pretty().try_init()?,
            LogFormat::Compact => builder.compact().try_init()?,
            LogFormat::Json => builder.json().try_init()?,
        }

        tracing::debug!(
            "Logging initialized at {:?} in {:?} format",
            self.config.level,
            self.config.format
        );
        Ok(())
    }

    /// Log version and platform
    pub fn log_system_info(&self) {
        tracing::info!("actclip {}", env!("CARGO_PKG_VERSION"));
        tracing::debug!("Platform: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new(LoggingConfig::default())
    }
}

/// Progress of a batch over a known number of items
pub struct ProgressReporter {
    operation: String,
    total: usize,
    done: usize,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(operation: impl Into<String>, total: usize) -> Self {
        let operation = operation.into();
        tracing::info!("Starting {} over {} documents", operation, total);
        Self {
            operation,
            total,
            done: 0,
            start_time: Instant::now(),
        }
    }

    /// Report that work on the next item starts
    pub fn advance(&mut self, item: &str) {
        self.done += 1;
        let eta = Utils::estimate_remaining_time(
            (self.done - 1) as u64,
            self.total as u64,
            self.start_time.elapsed(),
        );
        match eta {
            Some(eta) => tracing::info!(
                "[{}/{}] {} (ETA {})",
                self.done,
                self.total,
                item,
                Utils::format_duration(eta)
            ),
            None => tracing::info!("[{}/{}] {}", self.done, self.total, item),
        }
    }

    pub fn processed(&self) -> usize {
        self.done
    }

    /// Log the end of the batch
    pub fn complete(&self) {
        tracing::info!(
            "{} finished {} of {} documents in {}",
            self.operation,
            self.done,
            self.total,
            Utils::format_duration(self.start_time.elapsed())
        );
    }
}
