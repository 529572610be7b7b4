// Scan interactor - Class statistics over a dataset's annotations

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::adapters::DatasetLayout;
use crate::app::{for_each_document, RunSummary};
use crate::domain::usecases::{classes_present, ClassPolicy};
use crate::error::{ActClipError, ActClipResult};

/// Per-class document counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// Documents parsed
    pub documents: usize,
    /// Documents that could not be read
    pub documents_failed: usize,
    /// Canonical class to the number of documents labeling it
    pub classes: BTreeMap<String, usize>,
    /// Source videos of documents labeling at least one relevant class
    pub videos: Vec<PathBuf>,
}

/// Interactor for the scan use case
pub struct ScanInteractor {
    layout: DatasetLayout,
    policy: ClassPolicy,
}

impl ScanInteractor {
    pub fn new(layout: DatasetLayout, policy: ClassPolicy) -> Self {
        Self { layout, policy }
    }

    pub fn execute(&self) -> ActClipResult<ScanReport> {
        let mut report = ScanReport::default();
        let mut summary = RunSummary::default();

        for_each_document(&self.layout, "scan", &mut summary, |document, _| {
            let classes = classes_present(&document.observations, &self.policy);
            if classes.is_empty() {
                return Ok(());
            }
            for class in classes {
                *report.classes.entry(class).or_default() += 1;
            }
            report.videos.push(self.layout.video_path(&document));
            Ok(())
        })?;

        report.documents = summary.documents;
        report.documents_failed = summary.documents_failed;
        info!(
            "Scanned {} documents, {} classes in {} videos",
            report.documents,
            report.classes.len(),
            report.videos.len()
        );
        Ok(report)
    }

    /// Write the matching video paths, one per line
    pub fn write_video_list(report: &ScanReport, path: &Path) -> ActClipResult<()> {
        let output_error = |e: std::io::Error| ActClipError::OutputError {
            path: path.to_path_buf(),
            message: format!("failed to write video list: {}", e),
        };
        let mut file = std::fs::File::create(path).map_err(output_error)?;
        for video in &report.videos {
            writeln!(file, "{}", video.display()).map_err(output_error)?;
        }
        info!("Wrote {} video paths to {}", report.videos.len(), path.display());
        Ok(())
    }
}
