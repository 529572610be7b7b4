//! Clip extraction engine

use serde::{Deserialize, Serialize};

use crate::adapters::toml_config::RunConfig;

pub mod cutcrop;
pub mod frame;

pub use cutcrop::CutCropEngine;

/// Extraction engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smallest encoded dimension; frames below it are scaled up
    pub min_block: u32,
    /// Clip file extension
    pub extension: String,
    /// Encode into a temporary file and rename on success
    pub atomic_output: bool,
}

impl EngineConfig {
    pub fn from_run_config(config: &RunConfig) -> Self {
        Self {
            min_block: config.encoder.min_block,
            extension: config.encoder.extension.clone(),
            atomic_output: config.run.atomic_output,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_block: 64,
            extension: "mp4".to_string(),
            atomic_output: true,
        }
    }
}

/// Result of extracting one activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A new clip was written
    Created { frames: u64 },
    /// The clip already existed
    Skipped,
    /// Extraction failed. With atomic output nothing is left at the clip path
    Failed(String),
}

impl ExtractOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, ExtractOutcome::Created { .. })
    }
}
