// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use crate::domain::model::*;
use crate::error::ActClipResult;

/// One decoded frame, packed BGR24 rows without padding
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFrame {
    /// Frame index in the source's own numbering
    pub index: u64,
    pub size: FrameSize,
    pub data: Vec<u8>,
}

/// Port for an opened source video
pub trait VideoSource {
    /// Frame rate and native size
    fn info(&self) -> &SourceInfo;

    /// Position the source so the next read returns frame `frame`
    fn seek(&mut self, frame: u64) -> ActClipResult<()>;

    /// Read the next frame, `None` at end of stream
    fn read_frame(&mut self) -> ActClipResult<Option<SourceFrame>>;
}

/// Port for opening source videos by path
pub trait SourceOpener {
    fn open(&self, path: &Path) -> ActClipResult<Box<dyn VideoSource>>;
}

/// Parameters of one encoder run
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeSpec {
    /// File the encoder writes
    pub output: PathBuf,
    /// Size of every raw frame written to the session
    pub frame_size: FrameSize,
    pub frame_rate: f64,
}

/// How an encoder run ended
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderExit {
    pub success: bool,
    pub code: Option<i32>,
}

/// Port for launching the external encoder
pub trait EncoderPort {
    fn launch(&self, spec: &EncodeSpec) -> ActClipResult<Box<dyn EncoderSession>>;
}

/// A running encoder accepting raw BGR24 frames.
///
/// Dropping a session without calling [`EncoderSession::finish`] still
/// closes its input and reaps the process.
pub trait EncoderSession {
    /// Write one raw frame of the size given at launch
    fn write_frame(&mut self, data: &[u8]) -> ActClipResult<()>;

    /// Close the input, wait for the encoder and report its exit
    fn finish(self: Box<Self>) -> ActClipResult<EncoderExit>;
}
