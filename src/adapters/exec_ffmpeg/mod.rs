//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` binary as a subprocess reading raw BGR24 frames from
//! its standard input.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, warn};

use crate::adapters::toml_config::EncoderSettings;
use crate::domain::model::FrameSize;
use crate::error::{ActClipError, ActClipResult};
use crate::ports::*;

/// Builder for an ffmpeg invocation reading raw frames from a pipe
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    output: PathBuf,
    frame_size: FrameSize,
    frame_rate: f64,
    codec: String,
    crf: u8,
    pixel_format: String,
    min_block: u32,
    quiet: bool,
}

impl FfmpegCommand {
    /// Command encoding `spec` with the given settings
    pub fn new(spec: &EncodeSpec, settings: &EncoderSettings) -> Self {
        Self {
            output: spec.output.clone(),
            frame_size: spec.frame_size,
            frame_rate: spec.frame_rate,
            codec: settings.codec.clone(),
            crf: settings.crf,
            pixel_format: settings.output_pixel_format.clone(),
            min_block: settings.min_block,
            quiet: !settings.verbose,
        }
    }

    fn is_x265(&self) -> bool {
        self.codec.contains("265") || self.codec.contains("hevc")
    }

    /// Build the command arguments
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-s".to_string(),
            self.frame_size.to_string(),
            "-pixel_format".to_string(),
            "bgr24".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-r".to_string(),
            self.frame_rate.to_string(),
            "-i".to_string(),
            "pipe:".to_string(),
            "-vcodec".to_string(),
            self.codec.clone(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
        ];

        if self.quiet {
            args.extend(["-hide_banner", "-loglevel", "error"].map(String::from));
        }

        if self.is_x265() {
            let log_level = if self.quiet { "log-level=error:" } else { "" };
            args.push("-x265-params".to_string());
            args.push(format!("{}ctu={}", log_level, self.min_block));
        }

        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Encoder port backed by the ffmpeg binary
pub struct FfmpegEncoder {
    binary: PathBuf,
    settings: EncoderSettings,
}

impl FfmpegEncoder {
    /// Resolve the configured binary on PATH
    pub fn new(settings: EncoderSettings) -> ActClipResult<Self> {
        let binary = which::which(&settings.binary).map_err(|_| ActClipError::EncoderNotFound {
            binary: settings.binary.clone(),
        })?;
        debug!("Using encoder binary {}", binary.display());
        Ok(Self { binary, settings })
    }
}

impl EncoderPort for FfmpegEncoder {
    fn launch(&self, spec: &EncodeSpec) -> ActClipResult<Box<dyn EncoderSession>> {
        let args = FfmpegCommand::new(spec, &self.settings).build_args();
        debug!("Launching {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ActClipError::encoder(format!("failed to start {}: {}", self.binary.display(), e)))?;

        let stdin = child.stdin.take();
        Ok(Box::new(FfmpegSession {
            child: Some(child),
            stdin,
            frame_len: spec.frame_size.bgr_len(),
        }))
    }
}

/// Running ffmpeg process.
///
/// Input is closed and the process reaped when the session finishes or is
/// dropped, whichever comes first.
pub struct FfmpegSession {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frame_len: usize,
}

impl FfmpegSession {
    /// Close stdin, wait for exit, then make sure the process is gone
    fn shutdown(&mut self) -> ActClipResult<Option<EncoderExit>> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(None);
        };
        let status = child.wait();
        // Reaped already on success; only matters when wait failed
        let _ = child.kill();
        let status = status.map_err(|e| ActClipError::encoder(format!("failed to wait for encoder: {}", e)))?;
        Ok(Some(EncoderExit {
            success: status.success(),
            code: status.code(),
        }))
    }
}

impl EncoderSession for FfmpegSession {
    fn write_frame(&mut self, data: &[u8]) -> ActClipResult<()> {
        if data.len() != self.frame_len {
            return Err(ActClipError::encoder(format!(
                "frame of {} bytes, encoder expects {}",
                data.len(),
                self.frame_len
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ActClipError::encoder("encoder input already closed"))?;
        stdin
            .write_all(data)
            .map_err(|e| ActClipError::encoder(format!("failed to write frame to encoder: {}", e)))
    }

    fn finish(mut self: Box<Self>) -> ActClipResult<EncoderExit> {
        self.shutdown()?
            .ok_or_else(|| ActClipError::encoder("encoder already finished"))
    }
}

impl Drop for FfmpegSession {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Encoder cleanup failed: {}", e);
        }
    }
}
