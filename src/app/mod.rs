// Application layer - Use case interactors

use std::path::Path;

use tracing::warn;

use crate::adapters::DatasetLayout;
use crate::annotations::{load_document, AnnotationDocument};
use crate::error::{ActClipError, ActClipResult};
use crate::ports::{SourceOpener, VideoSource};
use crate::utils::logging::ProgressReporter;

pub mod container;
pub mod crop_interactor;
pub mod cut_interactor;
pub mod inspect_interactor;
pub mod scan_interactor;
pub mod summary;

// Re-export interactors
pub use container::AppContainer;
pub use crop_interactor::CropInteractor;
pub use cut_interactor::CutInteractor;
pub use inspect_interactor::InspectInteractor;
pub use scan_interactor::ScanInteractor;
pub use summary::RunSummary;

/// Parse every discovered document in order.
///
/// Unreadable documents are logged, counted and skipped. Errors returned by
/// `handle` abort the batch.
pub(crate) fn for_each_document<F>(
    layout: &DatasetLayout,
    operation: &str,
    summary: &mut RunSummary,
    mut handle: F,
) -> ActClipResult<()>
where
    F: FnMut(AnnotationDocument, &mut RunSummary) -> ActClipResult<()>,
{
    let paths = layout.discover()?;
    summary.start();
    let mut progress = ProgressReporter::new(operation, paths.len());

    for path in &paths {
        progress.advance(&path.display().to_string());
        match load_document(layout.format(), path) {
            Ok(document) => {
                summary.documents += 1;
                handle(document, summary)?;
            }
            Err(e) => {
                warn!("Skipping annotation document: {}", e);
                summary.documents_failed += 1;
            }
        }
    }

    progress.complete();
    summary.finish();
    Ok(())
}

/// Open the source video of a document, `None` when it cannot be read
pub(crate) fn open_source(
    opener: &dyn SourceOpener,
    layout: &DatasetLayout,
    document: &AnnotationDocument,
    summary: &mut RunSummary,
) -> Option<Box<dyn VideoSource>> {
    let path = layout.video_path(document);
    match opener.open(&path) {
        Ok(source) => Some(source),
        Err(e) => {
            warn!(
                video = %document.observations.video_name,
                "Skipping video: {}", e
            );
            summary.videos_skipped += 1;
            None
        }
    }
}

/// Create a run's output directory; failure ends the run
pub(crate) fn create_output_root(path: &Path) -> ActClipResult<()> {
    std::fs::create_dir_all(path).map_err(|e| ActClipError::OutputError {
        path: path.to_path_buf(),
        message: format!("cannot create output directory: {}", e),
    })
}
