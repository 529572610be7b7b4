//! In-memory video source and encoder used by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use actclip_cli::domain::model::{FrameSize, SourceInfo};
use actclip_cli::error::{ActClipError, ActClipResult};
use actclip_cli::ports::*;

/// Source whose frame `n` is filled with the byte `n % 251`
pub struct SyntheticSource {
    info: SourceInfo,
    total: u64,
    position: u64,
    broken_frame: Option<u64>,
}

impl SyntheticSource {
    pub fn new(total: u64, width: u32, height: u32, frame_rate: f64) -> Self {
        Self {
            info: SourceInfo {
                frame_rate,
                size: FrameSize::new(width, height),
                frame_count: Some(total),
            },
            total,
            position: 0,
            broken_frame: None,
        }
    }

    /// Reading frame `index` returns a decode error
    pub fn broken_at(mut self, index: u64) -> Self {
        self.broken_frame = Some(index);
        self
    }

    pub fn fill_byte(index: u64) -> u8 {
        (index % 251) as u8
    }
}

impl VideoSource for SyntheticSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn seek(&mut self, frame: u64) -> ActClipResult<()> {
        self.position = frame;
        Ok(())
    }

    fn read_frame(&mut self) -> ActClipResult<Option<SourceFrame>> {
        if self.position >= self.total {
            return Ok(None);
        }
        let index = self.position;
        if self.broken_frame == Some(index) {
            return Err(ActClipError::source("synthetic", format!("corrupt frame {}", index)));
        }
        self.position += 1;
        Ok(Some(SourceFrame {
            index,
            size: self.info.size,
            data: vec![Self::fill_byte(index); self.info.size.bgr_len()],
        }))
    }
}

/// Opens synthetic sources for known paths and fails for every other path
#[derive(Default)]
pub struct SyntheticOpener {
    videos: HashMap<PathBuf, (u64, u32, u32)>,
}

impl SyntheticOpener {
    pub fn with_video(mut self, path: impl Into<PathBuf>, frames: u64, width: u32, height: u32) -> Self {
        self.videos.insert(path.into(), (frames, width, height));
        self
    }
}

impl SourceOpener for SyntheticOpener {
    fn open(&self, path: &Path) -> ActClipResult<Box<dyn VideoSource>> {
        match self.videos.get(path) {
            Some(&(frames, width, height)) => Ok(Box::new(SyntheticSource::new(frames, width, height, 30.0))),
            None => Err(ActClipError::source(path, "no such video")),
        }
    }
}

/// One recorded encoder run
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub spec: EncodeSpec,
    pub frames: Vec<Vec<u8>>,
    pub finished: bool,
}

impl RecordedRun {
    pub fn first_bytes(&self) -> Vec<u8> {
        self.frames.iter().map(|frame| frame[0]).collect()
    }
}

/// Encoder that records every frame and writes a small file on finish
#[derive(Clone, Default)]
pub struct RecordingEncoder {
    pub runs: Rc<RefCell<Vec<RecordedRun>>>,
    pub exit_code: i32,
    /// Frames accepted before writes start failing
    pub accepted_frames: Option<usize>,
}

impl RecordingEncoder {
    pub fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    /// Encoder whose input pipe breaks after `frames` frames
    pub fn broken_pipe_after(frames: usize) -> Self {
        Self {
            accepted_frames: Some(frames),
            ..Self::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.runs.borrow().len()
    }

    pub fn run(&self, index: usize) -> RecordedRun {
        self.runs.borrow()[index].clone()
    }
}

impl EncoderPort for RecordingEncoder {
    fn launch(&self, spec: &EncodeSpec) -> ActClipResult<Box<dyn EncoderSession>> {
        self.runs.borrow_mut().push(RecordedRun {
            spec: spec.clone(),
            frames: Vec::new(),
            finished: false,
        });
        Ok(Box::new(RecordingSession {
            runs: Rc::clone(&self.runs),
            slot: self.runs.borrow().len() - 1,
            output: spec.output.clone(),
            exit_code: self.exit_code,
            accepted_frames: self.accepted_frames,
        }))
    }
}

struct RecordingSession {
    runs: Rc<RefCell<Vec<RecordedRun>>>,
    slot: usize,
    output: PathBuf,
    exit_code: i32,
    accepted_frames: Option<usize>,
}

impl EncoderSession for RecordingSession {
    fn write_frame(&mut self, data: &[u8]) -> ActClipResult<()> {
        let mut runs = self.runs.borrow_mut();
        let expected = runs[self.slot].spec.frame_size.bgr_len();
        if data.len() != expected {
            return Err(ActClipError::encoder(format!("got {} bytes, expected {}", data.len(), expected)));
        }
        if self.accepted_frames == Some(runs[self.slot].frames.len()) {
            return Err(ActClipError::encoder("broken pipe"));
        }
        runs[self.slot].frames.push(data.to_vec());
        Ok(())
    }

    fn finish(self: Box<Self>) -> ActClipResult<EncoderExit> {
        let frames = {
            let mut runs = self.runs.borrow_mut();
            runs[self.slot].finished = true;
            runs[self.slot].frames.len()
        };
        std::fs::write(&self.output, format!("{} frames", frames))?;
        Ok(EncoderExit {
            success: self.exit_code == 0,
            code: Some(self.exit_code),
        })
    }
}
