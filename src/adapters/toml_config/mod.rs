// TOML config adapter - Run configuration stored in TOML files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::annotations::AnnotationFormat;
use crate::domain::usecases::ClassPolicy;
use crate::error::{ActClipError, ActClipResult};

/// File looked up in the working directory when no config file is given
pub const DEFAULT_CONFIG_FILE: &str = "actclip.toml";

/// Complete configuration of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub paths: PathSettings,
    pub encoder: EncoderSettings,
    pub run: RunSettings,
    pub classes: ClassSettings,
}

/// Dataset folder layout, relative parts joined onto `base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub base: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Under `input`
    pub annotations: PathBuf,
    /// Under `input`, dataset default when unset
    pub videos: Option<PathBuf>,
    /// Under `output`
    pub clips: PathBuf,
    /// Source video extension, dataset default when unset
    pub video_extension: Option<String>,
    pub manifest_name: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            base: PathBuf::from("."),
            input: PathBuf::from("in"),
            output: PathBuf::from("out"),
            annotations: PathBuf::from("annot"),
            videos: None,
            clips: PathBuf::from("video"),
            video_extension: None,
            manifest_name: "events.json".to_string(),
        }
    }
}

impl PathSettings {
    pub fn annotation_root(&self) -> PathBuf {
        self.base.join(&self.input).join(&self.annotations)
    }

    pub fn video_root(&self, format: AnnotationFormat) -> PathBuf {
        let videos = self
            .videos
            .clone()
            .unwrap_or_else(|| PathBuf::from(format.default_video_dir()));
        self.base.join(&self.input).join(videos)
    }

    pub fn output_root(&self) -> PathBuf {
        self.base.join(&self.output)
    }

    pub fn clip_root(&self) -> PathBuf {
        self.output_root().join(&self.clips)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_root().join(&self.manifest_name)
    }

    pub fn video_extension(&self, format: AnnotationFormat) -> String {
        self.video_extension
            .clone()
            .unwrap_or_else(|| format.default_video_extension().to_string())
    }
}

/// External encoder invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Executable name or path, looked up on PATH
    pub binary: String,
    pub codec: String,
    pub crf: u8,
    pub output_pixel_format: String,
    /// Smallest coding block the codec accepts; smaller frames become this square
    pub min_block: u32,
    /// Extension of the written clips
    pub extension: String,
    /// Let the encoder print its own log output
    pub verbose: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            codec: "libx265".to_string(),
            crf: 24,
            output_pixel_format: "yuv420p".to_string(),
            min_block: 64,
            extension: "mp4".to_string(),
            verbose: false,
        }
    }
}

/// Extraction switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Crop clips to the activity box
    pub crop: bool,
    /// Encode to a temporary file renamed into place on success
    pub atomic_output: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            crop: true,
            atomic_output: true,
        }
    }
}

/// Class alias table and relevance filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSettings {
    /// Classes to extract, every class when unset
    pub relevant: Option<Vec<String>>,
    /// Canonical class name to its alternative spellings
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl ClassSettings {
    /// Class policy for a dataset, falling back to the dataset's own defaults
    pub fn policy(&self, format: AnnotationFormat) -> ClassPolicy {
        if self.relevant.is_none() && self.aliases.is_empty() {
            format.default_class_policy()
        } else {
            ClassPolicy::new(&self.aliases, self.relevant.as_deref())
        }
    }
}

impl RunConfig {
    /// Reject values the encoder cannot work with
    pub fn validate(&self) -> ActClipResult<()> {
        if self.encoder.crf > 51 {
            return Err(config_error(format!("crf {} exceeds 51", self.encoder.crf)));
        }
        if self.encoder.min_block == 0 || self.encoder.min_block % 2 != 0 {
            return Err(config_error(format!(
                "min_block must be a positive even number, got {}",
                self.encoder.min_block
            )));
        }
        if self.encoder.extension.trim().is_empty() {
            return Err(config_error("clip extension is empty"));
        }
        if self.paths.manifest_name.trim().is_empty() {
            return Err(config_error("manifest name is empty"));
        }
        Ok(())
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse a configuration from TOML text
    pub fn parse(content: &str) -> ActClipResult<RunConfig> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> ActClipResult<RunConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content).map_err(|e| {
            config_error(format!("failed to parse config file {}: {}", path.display(), e))
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the given file, else `actclip.toml` from the working directory, else defaults
    pub fn load_or_default(path: Option<&Path>) -> ActClipResult<RunConfig> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(RunConfig::default())
                }
            }
        }
    }

    /// Serialize a configuration to TOML text
    pub fn to_toml(config: &RunConfig) -> ActClipResult<String> {
        toml::to_string_pretty(config).map_err(|e| config_error(e.to_string()))
    }
}

fn config_error(message: impl Into<String>) -> ActClipError {
    ActClipError::ConfigError {
        message: message.into(),
    }
}
