// Cut interactor - Temporal cutting of merged per-class spans

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::DatasetLayout;
use crate::app::{create_output_root, for_each_document, open_source, RunSummary};
use crate::domain::model::{Activity, Rect};
use crate::domain::usecases::{plan_class_cuts, ClassPolicy};
use crate::engine::CutCropEngine;
use crate::error::ActClipResult;
use crate::output::ClipTarget;
use crate::ports::SourceOpener;

/// Interactor for the cut use case.
///
/// Each video's label spans are grouped by class and merged, and every
/// merged span becomes one full-frame clip numbered within its class.
pub struct CutInteractor {
    layout: DatasetLayout,
    policy: ClassPolicy,
    opener: Arc<dyn SourceOpener>,
    engine: CutCropEngine,
    clip_root: PathBuf,
}

impl CutInteractor {
    pub fn new(
        layout: DatasetLayout,
        policy: ClassPolicy,
        opener: Arc<dyn SourceOpener>,
        engine: CutCropEngine,
        clip_root: PathBuf,
    ) -> Self {
        Self {
            layout,
            policy,
            opener,
            engine,
            clip_root,
        }
    }

    pub fn execute(&self) -> ActClipResult<RunSummary> {
        let dataset = self.layout.format().dataset_name();
        info!("Cutting {} class spans into {}", dataset, self.clip_root.display());
        create_output_root(&self.clip_root)?;

        let mut summary = RunSummary::default();
        // Per video and class, so documents sharing a video name never reuse a clip path
        let mut next_index: HashMap<(String, String), u32> = HashMap::new();

        for_each_document(&self.layout, "cut", &mut summary, |document, summary| {
            let video_name = document.observations.video_name.clone();
            let plan = plan_class_cuts(&document.observations, &self.policy);
            if plan.is_empty() {
                debug!(video = %video_name, "No relevant classes");
                return Ok(());
            }

            let Some(mut source) = open_source(self.opener.as_ref(), &self.layout, &document, summary) else {
                return Ok(());
            };
            let frame = source.info().size;
            let full_frame = Rect::new(0, 0, frame.width, frame.height);
            let target = ClipTarget::new(dataset, &video_name, &self.clip_root);

            for class in &plan {
                debug!(video = %video_name, class = %class.class, "{} merged spans", class.spans.len());
                let next = next_index.entry((video_name.clone(), class.class.clone())).or_insert(0);
                for span in &class.spans {
                    let segment = Activity::new(*next, class.class.clone(), *span, full_frame);
                    *next += 1;
                    let outcome = self.engine.extract(source.as_mut(), &segment, &target, false);
                    summary.record(&outcome);
                }
            }
            Ok(())
        })?;

        summary.log("cut");
        Ok(summary)
    }
}
