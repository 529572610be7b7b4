//! Run manifest
//!
//! A JSON object mapping each processed video name to the activities
//! extracted from it, in processing order.

use std::path::Path;

use serde::ser::{Serialize, Serializer};
use tracing::info;

use crate::domain::model::Activity;
use crate::error::{ActClipError, ActClipResult};

/// Ordered video name to activity list mapping
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    videos: Vec<(String, Vec<Activity>)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append activities under a video, keeping first insertion order
    pub fn record<I>(&mut self, video_name: &str, activities: I)
    where
        I: IntoIterator<Item = Activity>,
    {
        match self.videos.iter_mut().find(|(name, _)| name == video_name) {
            Some((_, existing)) => existing.extend(activities),
            None => self
                .videos
                .push((video_name.to_string(), activities.into_iter().collect())),
        }
    }

    pub fn get(&self, video_name: &str) -> Option<&[Activity]> {
        self.videos
            .iter()
            .find(|(name, _)| name == video_name)
            .map(|(_, activities)| activities.as_slice())
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    pub fn activity_count(&self) -> usize {
        self.videos.iter().map(|(_, activities)| activities.len()).sum()
    }

    /// First unused activity id under a video
    pub fn next_id(&self, video_name: &str) -> u32 {
        self.get(video_name)
            .and_then(|activities| activities.iter().map(|activity| activity.id + 1).max())
            .unwrap_or(0)
    }

    pub fn to_json(&self) -> ActClipResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest, replacing any previous one
    pub fn write(&self, path: &Path) -> ActClipResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ActClipError::OutputError {
                path: parent.to_path_buf(),
                message: format!("failed to create directory: {}", e),
            })?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| ActClipError::OutputError {
            path: path.to_path_buf(),
            message: format!("failed to write manifest: {}", e),
        })?;
        info!(
            "Wrote manifest with {} activities from {} videos to {}",
            self.activity_count(),
            self.video_count(),
            path.display()
        );
        Ok(())
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.videos.iter().map(|(name, activities)| (name, activities)))
    }
}
