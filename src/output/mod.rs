//! Output layout, clip writing and the run manifest

use std::path::{Path, PathBuf};

use crate::domain::model::Activity;

pub mod manifest;
pub mod writer;

/// Where the clips of one video go
#[derive(Debug, Clone, Copy)]
pub struct ClipTarget<'a> {
    /// Dataset name used as file name prefix
    pub dataset: &'a str,
    pub video_name: &'a str,
    /// Directory holding one sub-directory per activity class
    pub output_root: &'a Path,
}

impl<'a> ClipTarget<'a> {
    pub fn new(dataset: &'a str, video_name: &'a str, output_root: &'a Path) -> Self {
        Self {
            dataset,
            video_name,
            output_root,
        }
    }

    /// `<root>/<type>/<dataset>_<video>_<type>_<id>.<extension>`
    pub fn clip_path(&self, activity: &Activity, extension: &str) -> PathBuf {
        self.output_root.join(&activity.activity_type).join(format!(
            "{}_{}_{}_{}.{}",
            self.dataset, self.video_name, activity.activity_type, activity.id, extension
        ))
    }
}
