// Run summary - Counters reported at the end of a batch

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::ExtractOutcome;

/// What a crop or cut run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Annotation documents parsed
    pub documents: usize,
    /// Annotation documents that could not be read
    pub documents_failed: usize,
    /// Videos whose source could not be opened
    pub videos_skipped: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Frames written across all created clips
    pub frames: u64,
}

impl RunSummary {
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn record(&mut self, outcome: &ExtractOutcome) {
        match outcome {
            ExtractOutcome::Created { frames } => {
                self.created += 1;
                self.frames += frames;
            }
            ExtractOutcome::Skipped => self.skipped += 1,
            ExtractOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn extracted(&self) -> usize {
        self.created + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.documents_failed > 0 || self.videos_skipped > 0
    }

    pub fn log(&self, operation: &str) {
        info!(
            "{}: {} created, {} skipped, {} failed ({} frames)",
            operation, self.created, self.skipped, self.failed, self.frames
        );
        if self.has_failures() {
            warn!(
                "{}: {} unreadable documents, {} videos without a readable source, {} failed clips",
                operation, self.documents_failed, self.videos_skipped, self.failed
            );
        }
    }
}
