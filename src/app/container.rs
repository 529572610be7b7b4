use std::sync::Arc;

use crate::adapters::toml_config::RunConfig;
use crate::adapters::{DatasetLayout, FfmpegEncoder, LibavSourceOpener};
use crate::annotations::AnnotationFormat;
use crate::app::{CropInteractor, CutInteractor, InspectInteractor, ScanInteractor};
use crate::engine::{CutCropEngine, EngineConfig};
use crate::error::ActClipResult;
use crate::ports::SourceOpener;

/// Wires the production adapters into interactors for one run
pub struct AppContainer {
    config: RunConfig,
}

impl AppContainer {
    /// Validate the configuration and keep it for the interactors
    pub fn new(config: RunConfig) -> ActClipResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    fn layout(&self, format: AnnotationFormat) -> DatasetLayout {
        DatasetLayout::new(format, &self.config.paths)
    }

    fn opener(&self) -> ActClipResult<Arc<dyn SourceOpener>> {
        Ok(Arc::new(LibavSourceOpener::new()?))
    }

    fn engine(&self) -> ActClipResult<CutCropEngine> {
        let encoder = FfmpegEncoder::new(self.config.encoder.clone())?;
        Ok(CutCropEngine::new(
            Box::new(encoder),
            EngineConfig::from_run_config(&self.config),
        ))
    }

    pub fn crop_interactor(&self, format: AnnotationFormat) -> ActClipResult<CropInteractor> {
        Ok(CropInteractor::new(
            self.layout(format),
            self.config.classes.policy(format),
            self.opener()?,
            self.engine()?,
            self.config.paths.clip_root(),
            self.config.paths.manifest_path(),
        ))
    }

    pub fn cut_interactor(&self, format: AnnotationFormat) -> ActClipResult<CutInteractor> {
        Ok(CutInteractor::new(
            self.layout(format),
            self.config.classes.policy(format),
            self.opener()?,
            self.engine()?,
            self.config.paths.clip_root(),
        ))
    }

    pub fn scan_interactor(&self, format: AnnotationFormat) -> ScanInteractor {
        ScanInteractor::new(self.layout(format), self.config.classes.policy(format))
    }

    pub fn inspect_interactor(&self) -> ActClipResult<InspectInteractor> {
        Ok(InspectInteractor::new(self.opener()?))
    }
}
