//! ActClip activity clip extractor
//!
//! Turns dataset annotations (MEVA, Okutama-Action, UCF-Aerial, VIRAT) into
//! one short video clip per labeled activity, cut frame-accurately from the
//! source video and optionally cropped to the activity's bounding tube.

pub mod adapters;
pub mod annotations;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{Activity, FrameSize, Rect, Timespan};
pub use engine::{CutCropEngine, EngineConfig, ExtractOutcome};
pub use error::{ActClipError, ActClipResult};

