//! Error handling module for ActClip

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ActClip operations
#[derive(Error, Debug)]
pub enum ActClipError {
    /// Annotation document could not be read or parsed
    #[error("Failed to parse annotation document {path}: {message}")]
    AnnotationError { path: PathBuf, message: String },

    /// Source video could not be opened or decoded
    #[error("Video source error for {path}: {message}")]
    SourceError { path: PathBuf, message: String },

    /// Encoder subprocess could not be launched or fed
    #[error("Encoder error: {message}")]
    EncoderError { message: String },

    /// Encoder binary not found
    #[error("Encoder binary '{binary}' not found on PATH")]
    EncoderNotFound { binary: String },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// Output file or directory write error
    #[error("Failed to write output {path}: {message}")]
    OutputError { path: PathBuf, message: String },

    /// Domain validation error
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// FFmpeg initialization error
    #[error("Failed to initialize FFmpeg: {message}")]
    FFmpegInitError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// XML error
    #[error("XML error: {0}")]
    XmlError(#[from] roxmltree::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ActClipError {
    /// Annotation document error for `path`
    pub fn annotation(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::AnnotationError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Source video error for `path`
    pub fn source(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::SourceError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Encoder error
    pub fn encoder(message: impl ToString) -> Self {
        Self::EncoderError {
            message: message.to_string(),
        }
    }
}

/// Result type alias for ActClip operations
pub type ActClipResult<T> = std::result::Result<T, ActClipError>;
