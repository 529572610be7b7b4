// Inspect interactor - Source video properties

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::model::SourceInfo;
use crate::error::{ActClipError, ActClipResult};
use crate::ports::SourceOpener;

/// Properties reported for one source video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub frame_rate: f64,
    pub width: u32,
    pub height: u32,
    /// Estimated from container metadata
    pub frame_count: Option<u64>,
}

impl InspectReport {
    fn new(path: &Path, info: &SourceInfo) -> Self {
        Self {
            path: path.to_path_buf(),
            frame_rate: info.frame_rate,
            width: info.size.width,
            height: info.size.height,
            frame_count: info.frame_count,
        }
    }

    pub fn to_json(&self) -> ActClipResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Interactor for the inspect use case
pub struct InspectInteractor {
    opener: Arc<dyn SourceOpener>,
}

impl InspectInteractor {
    pub fn new(opener: Arc<dyn SourceOpener>) -> Self {
        Self { opener }
    }

    pub fn execute(&self, path: &Path) -> ActClipResult<InspectReport> {
        if !path.is_file() {
            return Err(ActClipError::source(path, "file does not exist"));
        }
        let source = self.opener.open(path)?;
        let report = InspectReport::new(path, source.info());
        info!(
            "{}: {}x{} at {:.3} fps",
            path.display(),
            report.width,
            report.height,
            report.frame_rate
        );
        Ok(report)
    }
}
