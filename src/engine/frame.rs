//! Raw frame cropping and scaling

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};

use crate::domain::model::FrameSize;
use crate::domain::rules::CropRegion;
use crate::error::{ActClipError, ActClipResult};
use crate::ports::SourceFrame;

const CHANNELS: usize = 3;

/// Turn a decoded frame into the bytes the encoder expects.
///
/// The frame is cropped to `crop` when given, then scaled to `output` if the
/// sizes differ. Untouched frames are borrowed.
pub fn prepare<'a>(
    frame: &'a SourceFrame,
    crop: Option<CropRegion>,
    output: FrameSize,
) -> ActClipResult<Cow<'a, [u8]>> {
    if frame.data.len() != frame.size.bgr_len() {
        return Err(ActClipError::encoder(format!(
            "frame {} has {} bytes, expected {} for {}",
            frame.index,
            frame.data.len(),
            frame.size.bgr_len(),
            frame.size
        )));
    }

    let (pixels, size) = match crop {
        Some(region) => (Cow::Owned(crop_rows(frame, region)), region.size()),
        None => (Cow::Borrowed(frame.data.as_slice()), frame.size),
    };

    if size == output {
        return Ok(pixels);
    }
    Ok(Cow::Owned(resize(pixels.into_owned(), size, output)?))
}

fn crop_rows(frame: &SourceFrame, region: CropRegion) -> Vec<u8> {
    let stride = frame.size.width as usize * CHANNELS;
    let row_len = region.width as usize * CHANNELS;
    let left = region.x as usize * CHANNELS;

    let mut out = Vec::with_capacity(row_len * region.height as usize);
    for row in region.y..region.y + region.height {
        let offset = row as usize * stride + left;
        out.extend_from_slice(&frame.data[offset..offset + row_len]);
    }
    out
}

// Channel order does not matter to the filter, so BGR goes through as Rgb
fn resize(pixels: Vec<u8>, from: FrameSize, to: FrameSize) -> ActClipResult<Vec<u8>> {
    let buffer = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(from.width, from.height, pixels)
        .ok_or_else(|| ActClipError::encoder(format!("pixel buffer does not match {}", from)))?;
    Ok(imageops::resize(&buffer, to.width, to.height, FilterType::Triangle).into_raw())
}
