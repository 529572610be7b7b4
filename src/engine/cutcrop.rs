//! Frame-accurate cut and crop of one activity

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::model::{Activity, FrameSize, Timespan};
use crate::domain::rules::{clamp_crop, corrected_frame_size, CropRegion};
use crate::engine::frame;
use crate::engine::{EngineConfig, ExtractOutcome};
use crate::error::{ActClipError, ActClipResult};
use crate::output::writer::ClipWriter;
use crate::output::ClipTarget;
use crate::ports::{EncodeSpec, EncoderPort, EncoderSession, VideoSource};

/// Streams the frames of an activity from a source into an encoder
pub struct CutCropEngine {
    encoder: Box<dyn EncoderPort>,
    writer: ClipWriter,
    config: EngineConfig,
}

impl CutCropEngine {
    pub fn new(encoder: Box<dyn EncoderPort>, config: EngineConfig) -> Self {
        Self {
            encoder,
            writer: ClipWriter::new(config.atomic_output),
            config,
        }
    }

    /// Extract one activity into its clip file.
    ///
    /// Frames `[start, end)` of the activity are written. With `crop` the
    /// frames are cut down to the activity box, otherwise the full frame is
    /// kept. An existing clip is never overwritten.
    pub fn extract(
        &self,
        source: &mut dyn VideoSource,
        activity: &Activity,
        target: &ClipTarget<'_>,
        crop: bool,
    ) -> ExtractOutcome {
        let path = target.clip_path(activity, &self.config.extension);
        if path.exists() {
            debug!("Clip {} already exists, skipping", path.display());
            return ExtractOutcome::Skipped;
        }

        let started = Instant::now();
        match self.encode(source, activity, &path, crop) {
            Ok(frames) => {
                info!(
                    "Created {} ({} frames, {} {}) in {:.2}s",
                    path.display(),
                    frames,
                    activity.activity_type,
                    activity.timespan,
                    started.elapsed().as_secs_f64()
                );
                ExtractOutcome::Created { frames }
            }
            Err(e) => {
                warn!("Failed to extract {}: {}", path.display(), e);
                ExtractOutcome::Failed(e.to_string())
            }
        }
    }

    fn encode(
        &self,
        source: &mut dyn VideoSource,
        activity: &Activity,
        path: &Path,
        crop: bool,
    ) -> ActClipResult<u64> {
        let info = source.info().clone();
        let region = if crop {
            Some(clamp_crop(&activity.bbox, info.size)?)
        } else {
            None
        };
        let requested = region.map(|r| r.size()).unwrap_or(info.size);
        let output_size = corrected_frame_size(requested, self.config.min_block);
        if output_size != requested {
            debug!("Scaling {} frames to {}", requested, output_size);
        }

        let staged = self.writer.stage(path)?;
        let spec = EncodeSpec {
            output: staged.write_path().to_path_buf(),
            frame_size: output_size,
            frame_rate: info.frame_rate,
        };
        let mut session = self.encoder.launch(&spec)?;

        // The encoder is reaped even when streaming fails
        let streamed = stream_frames(source, activity.timespan, region, output_size, session.as_mut());
        let exit = session.finish();
        let frames = streamed?;
        let exit = exit?;

        if !exit.success {
            return Err(ActClipError::encoder(match exit.code {
                Some(code) => format!("encoder exited with status {}", code),
                None => "encoder terminated by signal".to_string(),
            }));
        }

        staged.commit()?;
        Ok(frames)
    }
}

fn stream_frames(
    source: &mut dyn VideoSource,
    span: Timespan,
    region: Option<CropRegion>,
    output_size: FrameSize,
    session: &mut dyn EncoderSession,
) -> ActClipResult<u64> {
    source.seek(span.start)?;

    let mut written = 0;
    while let Some(decoded) = source.read_frame()? {
        if decoded.index >= span.end {
            break;
        }
        if !span.contains(decoded.index) {
            continue;
        }
        let data = frame::prepare(&decoded, region, output_size)?;
        session.write_frame(&data)?;
        written += 1;
    }

    if written < span.frame_count() {
        debug!(
            "Source ended after {} of {} frames for {}",
            written,
            span.frame_count(),
            span
        );
    }
    Ok(written)
}
