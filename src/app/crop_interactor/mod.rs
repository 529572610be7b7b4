// Crop interactor - Spatio-temporal extraction of every annotated activity

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::DatasetLayout;
use crate::app::{create_output_root, for_each_document, open_source, RunSummary};
use crate::domain::usecases::{ActivityBuilder, ClassPolicy};
use crate::engine::CutCropEngine;
use crate::error::ActClipResult;
use crate::output::manifest::Manifest;
use crate::output::ClipTarget;
use crate::ports::SourceOpener;

/// Result of a crop run
#[derive(Debug, Clone)]
pub struct CropResponse {
    pub summary: RunSummary,
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
}

/// Interactor for the crop use case
pub struct CropInteractor {
    layout: DatasetLayout,
    policy: ClassPolicy,
    opener: Arc<dyn SourceOpener>,
    engine: CutCropEngine,
    clip_root: PathBuf,
    manifest_path: PathBuf,
}

impl CropInteractor {
    pub fn new(
        layout: DatasetLayout,
        policy: ClassPolicy,
        opener: Arc<dyn SourceOpener>,
        engine: CutCropEngine,
        clip_root: PathBuf,
        manifest_path: PathBuf,
    ) -> Self {
        Self {
            layout,
            policy,
            opener,
            engine,
            clip_root,
            manifest_path,
        }
    }

    /// Extract every relevant activity, cropping to its box when `crop` is set
    pub fn execute(&self, crop: bool) -> ActClipResult<CropResponse> {
        let dataset = self.layout.format().dataset_name();
        info!(
            "Extracting {} activities into {} (crop: {})",
            dataset,
            self.clip_root.display(),
            crop
        );
        create_output_root(&self.clip_root)?;

        let builder = ActivityBuilder::new(&self.policy);
        let mut manifest = Manifest::new();
        let mut summary = RunSummary::default();

        for_each_document(&self.layout, "crop", &mut summary, |document, summary| {
            let video_name = document.observations.video_name.clone();
            // Documents sharing a video name continue its numbering
            let first_id = manifest.next_id(&video_name);
            let activities = builder.build_from(&document.observations, first_id);
            debug!(video = %video_name, "{} activities", activities.len());

            if !activities.is_empty() {
                if let Some(mut source) = open_source(self.opener.as_ref(), &self.layout, &document, summary) {
                    let target = ClipTarget::new(dataset, &video_name, &self.clip_root);
                    for activity in &activities {
                        let outcome = self.engine.extract(source.as_mut(), activity, &target, crop);
                        summary.record(&outcome);
                    }
                }
            }

            manifest.record(&video_name, activities);
            Ok(())
        })?;

        manifest.write(&self.manifest_path)?;
        summary.log("crop");

        Ok(CropResponse {
            summary,
            manifest,
            manifest_path: self.manifest_path.clone(),
        })
    }
}
