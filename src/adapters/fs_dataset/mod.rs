// Dataset filesystem adapter - Annotation discovery and video path conventions

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::adapters::toml_config::PathSettings;
use crate::annotations::{AnnotationDocument, AnnotationFormat};
use crate::error::{ActClipError, ActClipResult};

/// Folder layout of one dataset
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    format: AnnotationFormat,
    annotation_root: PathBuf,
    video_root: PathBuf,
    video_extension: String,
}

impl DatasetLayout {
    pub fn new(format: AnnotationFormat, paths: &PathSettings) -> Self {
        Self {
            format,
            annotation_root: paths.annotation_root(),
            video_root: paths.video_root(format),
            video_extension: paths.video_extension(format),
        }
    }

    pub fn format(&self) -> AnnotationFormat {
        self.format
    }

    /// Annotation documents under the annotation root, sorted by path
    pub fn discover(&self) -> ActClipResult<Vec<PathBuf>> {
        if !self.annotation_root.is_dir() {
            return Err(ActClipError::ConfigError {
                message: format!(
                    "annotation directory {} does not exist",
                    self.annotation_root.display()
                ),
            });
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&self.annotation_root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.format.video_name_from_path(entry.path()).is_some() {
                documents.push(entry.into_path());
            }
        }
        documents.sort();

        debug!(
            "Found {} {} annotation documents under {}",
            documents.len(),
            self.format,
            self.annotation_root.display()
        );
        Ok(documents)
    }

    /// Directory of a document relative to the annotation root
    pub fn relative_dir(&self, document: &Path) -> PathBuf {
        document
            .parent()
            .and_then(|parent| parent.strip_prefix(&self.annotation_root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Source video of a document relative to the video root
    pub fn relative_video_path(&self, document: &AnnotationDocument) -> PathBuf {
        let video_name = &document.observations.video_name;
        match self.format {
            AnnotationFormat::Virat => {
                PathBuf::from(format!("virat_{}.{}", video_name, self.video_extension))
            }
            AnnotationFormat::Meva => self
                .relative_dir(&document.path)
                .join(format!("{}.{}", video_name, self.video_extension)),
            AnnotationFormat::Ucaerial => match &document.declared_video {
                Some(file) => PathBuf::from(file),
                None => PathBuf::from(format!("{}.{}", video_name, self.video_extension)),
            },
            AnnotationFormat::Okutama => {
                PathBuf::from(format!("{}.{}", video_name, self.video_extension))
            }
        }
    }

    /// Source video of a document
    pub fn video_path(&self, document: &AnnotationDocument) -> PathBuf {
        self.video_root.join(self.relative_video_path(document))
    }
}
