// Source LibAV adapter - Frame-accurate decoding using libav

use std::path::{Path, PathBuf};

use ffmpeg_next as ffmpeg;
use ffmpeg::codec::decoder::Video as VideoDecoder;
use ffmpeg::format::{context::Input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::Rational;
use tracing::debug;

use crate::domain::model::*;
use crate::error::{ActClipError, ActClipResult};
use crate::ports::*;

/// Opens source videos through libav
pub struct LibavSourceOpener;

impl LibavSourceOpener {
    /// Create new opener, initializing libav once
    pub fn new() -> ActClipResult<Self> {
        ffmpeg::init().map_err(|e| ActClipError::FFmpegInitError {
            message: e.to_string(),
        })?;
        Ok(Self)
    }
}

impl SourceOpener for LibavSourceOpener {
    fn open(&self, path: &Path) -> ActClipResult<Box<dyn VideoSource>> {
        Ok(Box::new(LibavSource::open(path)?))
    }
}

/// Decoded video stream converted to packed BGR24
pub struct LibavSource {
    path: PathBuf,
    input: Input,
    stream_index: usize,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    time_base: Rational,
    start_pts: i64,
    info: SourceInfo,
    decoded: VideoFrame,
    converted: VideoFrame,
    /// Index assumed for the next frame lacking a timestamp
    next_index: u64,
    /// Frames before this index are decoded and discarded after a seek
    skip_until: u64,
    eof_sent: bool,
}

impl LibavSource {
    /// Open the best video stream of a file
    pub fn open(path: &Path) -> ActClipResult<Self> {
        let input = ffmpeg::format::input(&path).map_err(|e| ActClipError::source(path, e))?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| ActClipError::source(path, "no video stream"))?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let start_pts = Some(stream.start_time())
            .filter(|&pts| pts != ffmpeg::ffi::AV_NOPTS_VALUE)
            .unwrap_or(0);

        let frame_rate = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|rate| rate.numerator() > 0 && rate.denominator() > 0)
            .map(f64::from)
            .ok_or_else(|| ActClipError::source(path, "unknown frame rate"))?;

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|e| ActClipError::source(path, format!("failed to create decoder: {}", e)))?;

        let size = FrameSize::new(decoder.width(), decoder.height());
        let frame_count = match stream.frames() {
            n if n > 0 => Some(n as u64),
            _ if input.duration() > 0 => Some(
                (input.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64 * frame_rate).round() as u64,
            ),
            _ => None,
        };

        let scaler = ScalingContext::get(
            decoder.format(),
            size.width,
            size.height,
            Pixel::BGR24,
            size.width,
            size.height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| ActClipError::source(path, format!("failed to create scaler: {}", e)))?;

        debug!(
            path = %path.display(),
            fps = frame_rate,
            size = %size,
            "Opened source video"
        );

        Ok(Self {
            path: path.to_path_buf(),
            input,
            stream_index,
            decoder,
            scaler,
            time_base,
            start_pts,
            info: SourceInfo {
                frame_rate,
                size,
                frame_count,
            },
            decoded: VideoFrame::empty(),
            converted: VideoFrame::empty(),
            next_index: 0,
            skip_until: 0,
            eof_sent: false,
        })
    }

    /// Frame index of the frame just decoded, from its timestamp when present
    fn decoded_index(&self) -> u64 {
        match self.decoded.timestamp().or_else(|| self.decoded.pts()) {
            Some(pts) => {
                let seconds = (pts - self.start_pts) as f64 * f64::from(self.time_base);
                (seconds * self.info.frame_rate).round().max(0.0) as u64
            }
            None => self.next_index,
        }
    }

    /// Convert the decoded frame to tightly packed BGR24
    fn convert(&mut self, index: u64) -> ActClipResult<SourceFrame> {
        self.scaler
            .run(&self.decoded, &mut self.converted)
            .map_err(|e| ActClipError::source(&self.path, format!("failed to convert frame {}: {}", index, e)))?;

        let size = self.info.size;
        let row_len = size.width as usize * 3;
        let stride = self.converted.stride(0);
        let plane = self.converted.data(0);
        let mut data = Vec::with_capacity(size.bgr_len());
        for row in 0..size.height as usize {
            let start = row * stride;
            data.extend_from_slice(&plane[start..start + row_len]);
        }

        Ok(SourceFrame { index, size, data })
    }
}

impl VideoSource for LibavSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn seek(&mut self, frame: u64) -> ActClipResult<()> {
        let seconds = frame as f64 / self.info.frame_rate + self.start_pts as f64 * f64::from(self.time_base);
        let timestamp = (seconds * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;

        // Lands on the keyframe at or before the target; decode forward from there
        self.input
            .seek(timestamp, ..timestamp)
            .map_err(|e| ActClipError::source(&self.path, format!("failed to seek to frame {}: {}", frame, e)))?;
        self.decoder.flush();
        self.skip_until = frame;
        self.next_index = frame;
        self.eof_sent = false;
        Ok(())
    }

    fn read_frame(&mut self) -> ActClipResult<Option<SourceFrame>> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                let index = self.decoded_index();
                self.next_index = index + 1;
                if index < self.skip_until {
                    continue;
                }
                return self.convert(index).map(Some);
            }
            if self.eof_sent {
                return Ok(None);
            }

            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    self.decoder
                        .send_packet(&packet)
                        .map_err(|e| ActClipError::source(&self.path, format!("failed to decode packet: {}", e)))?;
                }
                None => {
                    self.decoder
                        .send_eof()
                        .map_err(|e| ActClipError::source(&self.path, format!("failed to flush decoder: {}", e)))?;
                    self.eof_sent = true;
                }
            }
        }
    }
}
