//! Clip file staging
//!
//! With atomic writes enabled the encoder writes a hidden temporary file next
//! to the target, which is renamed into place only after a successful encode.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

use crate::error::{ActClipError, ActClipResult};

/// Prepares output files for the encoder
#[derive(Debug, Clone)]
pub struct ClipWriter {
    atomic_writes: bool,
}

impl ClipWriter {
    pub fn new(atomic_writes: bool) -> Self {
        Self { atomic_writes }
    }

    /// Create the target's directory and reserve the file the encoder writes
    pub fn stage(&self, target: &Path) -> ActClipResult<StagedClip> {
        let directory = target.parent().ok_or_else(|| ActClipError::OutputError {
            path: target.to_path_buf(),
            message: "output path has no parent directory".to_string(),
        })?;
        std::fs::create_dir_all(directory).map_err(|e| ActClipError::OutputError {
            path: directory.to_path_buf(),
            message: format!("failed to create directory: {}", e),
        })?;

        if !self.atomic_writes {
            return Ok(StagedClip {
                target: target.to_path_buf(),
                temp: None,
            });
        }

        // Keep the extension so the encoder picks the right container
        let suffix = target
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let temp = tempfile::Builder::new()
            .prefix(".tmp_")
            .suffix(&suffix)
            .tempfile_in(directory)
            .map_err(|e| ActClipError::OutputError {
                path: target.to_path_buf(),
                message: format!("failed to create temporary file: {}", e),
            })?
            .into_temp_path();
        debug!("Staging {} as {}", target.display(), temp.display());

        Ok(StagedClip {
            target: target.to_path_buf(),
            temp: Some(temp),
        })
    }
}

/// Output file reserved for one encode.
///
/// Dropping an uncommitted atomic clip deletes its temporary file.
#[derive(Debug)]
pub struct StagedClip {
    target: PathBuf,
    temp: Option<TempPath>,
}

impl StagedClip {
    /// Path handed to the encoder
    pub fn write_path(&self) -> &Path {
        match &self.temp {
            Some(temp) => &**temp,
            None => &self.target,
        }
    }

    /// Move the encoded file to its final name
    pub fn commit(self) -> ActClipResult<()> {
        if let Some(temp) = self.temp {
            temp.persist(&self.target).map_err(|e| ActClipError::OutputError {
                path: self.target.clone(),
                message: format!("failed to rename temporary file: {}", e),
            })?;
        }
        Ok(())
    }
}
