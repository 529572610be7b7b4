//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::annotations::AnnotationFormat;

/// Dataset selection shared by the batch commands
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Annotation format of the dataset
    #[arg(short, long, value_enum)]
    pub format: AnnotationFormat,

    /// Dataset base directory
    #[arg(short, long)]
    pub base: Option<PathBuf>,

    /// Input directory under the base
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output directory under the base
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Source video extension (default depends on the dataset)
    #[arg(long)]
    pub video_extension: Option<String>,

    /// Only process this class; may be repeated
    #[arg(long = "class", value_name = "CLASS")]
    pub classes: Vec<String>,
}

/// Encoder overrides
#[derive(Args, Debug, Clone, Default)]
pub struct EncoderArgs {
    /// Encoder executable
    #[arg(long)]
    pub encoder: Option<String>,

    /// Video codec
    #[arg(long)]
    pub codec: Option<String>,

    /// Constant Rate Factor (0-51)
    #[arg(long)]
    pub crf: Option<u8>,

    /// Smallest encoded frame dimension
    #[arg(long)]
    pub min_block: Option<u32>,

    /// Clip file extension
    #[arg(long)]
    pub extension: Option<String>,

    /// Show the encoder's own log output
    #[arg(long)]
    pub encoder_verbose: bool,

    /// Write clips in place instead of renaming a temporary file
    #[arg(long)]
    pub no_atomic: bool,
}

/// Arguments for the crop command
#[derive(Args, Debug, Clone)]
pub struct CropArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub encoder: EncoderArgs,

    /// Keep full frames instead of cropping to the activity box
    #[arg(long)]
    pub no_crop: bool,

    /// Manifest file name under the output directory
    #[arg(long)]
    pub manifest_name: Option<String>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cut command
#[derive(Args, Debug, Clone)]
pub struct CutArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub encoder: EncoderArgs,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the scan command
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Write the source videos of matching documents to this file
    #[arg(long)]
    pub video_list: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Source video file
    #[arg(short, long)]
    pub input: PathBuf,
}
