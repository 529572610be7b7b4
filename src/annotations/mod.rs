//! Annotation format adapters
//!
//! Each adapter turns one dataset's annotation document into an
//! [`ObservationSet`]: per-frame geometry plus activity labels. Rows or
//! elements that cannot be read are dropped; only an unreadable document
//! is an error.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::model::ObservationSet;
use crate::domain::usecases::ClassPolicy;
use crate::error::{ActClipError, ActClipResult};

pub mod meva;
pub mod okutama;
pub mod ucaerial;
pub mod virat;

/// Supported annotation formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationFormat {
    /// MEVA KPF YAML (`*-activities.yml` + `*-geom.yml`)
    Meva,
    /// Okutama-Action per-frame text rows
    Okutama,
    /// UCF-Aerial ViPER XML (`*.xgtf`)
    Ucaerial,
    /// VIRAT event rows (`*.viratdata.events.txt`)
    Virat,
}

impl AnnotationFormat {
    /// Dataset name used in output file names
    pub fn dataset_name(&self) -> &'static str {
        match self {
            AnnotationFormat::Meva => "meva",
            AnnotationFormat::Okutama => "okutama",
            AnnotationFormat::Ucaerial => "ucaerial",
            AnnotationFormat::Virat => "virat",
        }
    }

    /// File name suffix identifying a primary annotation document
    pub fn document_suffix(&self) -> &'static str {
        match self {
            AnnotationFormat::Meva => meva::ACTIVITIES_SUFFIX,
            AnnotationFormat::Okutama => ".txt",
            AnnotationFormat::Ucaerial => ".xgtf",
            AnnotationFormat::Virat => virat::EVENTS_SUFFIX,
        }
    }

    /// Source video directory under the input folder in the dataset's usual layout
    pub fn default_video_dir(&self) -> &'static str {
        match self {
            AnnotationFormat::Virat => "video/ground",
            _ => "video",
        }
    }

    /// Extension of the source videos in the dataset's usual layout
    pub fn default_video_extension(&self) -> &'static str {
        match self {
            AnnotationFormat::Ucaerial => "mpg",
            _ => "mp4",
        }
    }

    /// Class policy used when the configuration names none
    pub fn default_class_policy(&self) -> ClassPolicy {
        match self {
            AnnotationFormat::Meva => ClassPolicy::meva(),
            _ => ClassPolicy::permissive(),
        }
    }

    /// Video name encoded in a document's file name
    pub fn video_name_from_path(&self, path: &Path) -> Option<String> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name.strip_suffix(self.document_suffix())?;
        if stem.is_empty() {
            None
        } else {
            Some(stem.to_string())
        }
    }
}

impl fmt::Display for AnnotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset_name())
    }
}

/// A parsed annotation document
#[derive(Debug, Clone)]
pub struct AnnotationDocument {
    pub path: PathBuf,
    pub observations: ObservationSet,
    /// Video file name declared inside the document, if the format has one
    pub declared_video: Option<String>,
}

/// Read and parse one annotation document
pub fn load_document(format: AnnotationFormat, path: &Path) -> ActClipResult<AnnotationDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| ActClipError::annotation(path, e))?;
    let fallback_name = format
        .video_name_from_path(path)
        .ok_or_else(|| ActClipError::annotation(path, "file name does not name a video"));

    let (observations, declared_video) = match format {
        AnnotationFormat::Meva => {
            let video_name = fallback_name?;
            let geom_path = meva::geometry_path(path, &video_name);
            // Labels alone still serve the cut command
            let geom_text = match std::fs::read_to_string(&geom_path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(video = %video_name, "No geometry document at {}", geom_path.display());
                    String::new()
                }
                Err(e) => return Err(ActClipError::annotation(&geom_path, e)),
            };
            let set = meva::parse(&video_name, &text, &geom_text)
                .map_err(|e| ActClipError::annotation(path, e))?;
            (set, None)
        }
        AnnotationFormat::Okutama => (okutama::parse(&fallback_name?, &text), None),
        AnnotationFormat::Ucaerial => {
            let parsed = ucaerial::parse(&text).map_err(|e| ActClipError::annotation(path, e))?;
            (parsed.observations, Some(parsed.video_file))
        }
        AnnotationFormat::Virat => (virat::parse(&fallback_name?, &text), None),
    };

    Ok(AnnotationDocument {
        path: path.to_path_buf(),
        observations,
        declared_video,
    })
}

/// Parse a whitespace separated integer column
pub(crate) fn column<T: std::str::FromStr>(values: &[&str], index: usize) -> Option<T> {
    values.get(index)?.parse().ok()
}
