// Domain rules - Geometry aggregation and frame size policies

use std::collections::HashMap;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Running enclosing box for one object.
///
/// A fresh tube is the identity element of the fold: corners start at
/// `i64::MAX` and extents (or far corners) at their minimum, so the first
/// observation replaces every field. An empty tube yields no rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingTube {
    MinCornerMaxExtent {
        min_x: i64,
        min_y: i64,
        max_w: u32,
        max_h: u32,
    },
    ExactCorners {
        min_x: i64,
        min_y: i64,
        max_x2: i64,
        max_y2: i64,
    },
}

impl BoundingTube {
    /// Identity element for the given policy
    pub fn identity(policy: TubePolicy) -> Self {
        match policy {
            TubePolicy::MinCornerMaxExtent => BoundingTube::MinCornerMaxExtent {
                min_x: i64::MAX,
                min_y: i64::MAX,
                max_w: 0,
                max_h: 0,
            },
            TubePolicy::ExactCorners => BoundingTube::ExactCorners {
                min_x: i64::MAX,
                min_y: i64::MAX,
                max_x2: i64::MIN,
                max_y2: i64::MIN,
            },
        }
    }

    /// Fold one observation into the tube
    pub fn fold(&mut self, rect: &Rect) {
        match self {
            BoundingTube::MinCornerMaxExtent {
                min_x,
                min_y,
                max_w,
                max_h,
            } => {
                *min_x = (*min_x).min(rect.x as i64);
                *min_y = (*min_y).min(rect.y as i64);
                *max_w = (*max_w).max(rect.w);
                *max_h = (*max_h).max(rect.h);
            }
            BoundingTube::ExactCorners {
                min_x,
                min_y,
                max_x2,
                max_y2,
            } => {
                *min_x = (*min_x).min(rect.x as i64);
                *min_y = (*min_y).min(rect.y as i64);
                *max_x2 = (*max_x2).max(rect.x2());
                *max_y2 = (*max_y2).max(rect.y2());
            }
        }
    }

    /// Whether nothing has been folded yet
    pub fn is_empty(&self) -> bool {
        match self {
            BoundingTube::MinCornerMaxExtent { min_x, .. }
            | BoundingTube::ExactCorners { min_x, .. } => *min_x == i64::MAX,
        }
    }

    /// Read the enclosing rectangle out of the tube
    pub fn rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        match *self {
            BoundingTube::MinCornerMaxExtent {
                min_x,
                min_y,
                max_w,
                max_h,
            } => Some(Rect::new(min_x as i32, min_y as i32, max_w, max_h)),
            BoundingTube::ExactCorners {
                min_x,
                min_y,
                max_x2,
                max_y2,
            } => Some(Rect::new(
                min_x as i32,
                min_y as i32,
                (max_x2 - min_x) as u32,
                (max_y2 - min_y) as u32,
            )),
        }
    }
}

/// Keyed collection of bounding tubes, one per object
#[derive(Debug, Clone)]
pub struct TubeAggregator {
    policy: TubePolicy,
    tubes: HashMap<ObjectId, BoundingTube>,
}

impl TubeAggregator {
    pub fn new(policy: TubePolicy) -> Self {
        Self {
            policy,
            tubes: HashMap::new(),
        }
    }

    /// Fold an observation into the tube of `object_id`
    pub fn observe(&mut self, object_id: &str, rect: &Rect) {
        let policy = self.policy;
        self.tubes
            .entry(object_id.to_string())
            .or_insert_with(|| BoundingTube::identity(policy))
            .fold(rect);
    }

    /// Aggregate a whole stream of geometry observations
    pub fn from_observations<'a, I>(policy: TubePolicy, observations: I) -> Self
    where
        I: IntoIterator<Item = &'a GeometryObservation>,
    {
        let mut aggregator = Self::new(policy);
        for observation in observations {
            aggregator.observe(&observation.object_id, &observation.rect);
        }
        aggregator
    }

    pub fn rect(&self, object_id: &str) -> Option<Rect> {
        self.tubes.get(object_id).and_then(BoundingTube::rect)
    }
}

/// Merge overlapping or touching timespans into a sorted disjoint set.
///
/// Spans are sorted by `(start, end)`; a span whose start is at or before the
/// open span's end extends it.
pub fn merge_timespans(spans: &[Timespan]) -> Vec<Timespan> {
    let mut sorted = spans.to_vec();
    sorted.sort();

    let mut merged: Vec<Timespan> = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter();
    let Some(mut open) = iter.next() else {
        return merged;
    };
    for span in iter {
        if span.start <= open.end {
            open.end = open.end.max(span.end);
        } else {
            merged.push(open);
            open = span;
        }
    }
    merged.push(open);
    merged
}

/// Round an odd dimension up to the next even value
pub fn even_dimension(value: u32) -> u32 {
    if value % 2 == 0 {
        value
    } else {
        value + 1
    }
}

/// Size handed to the encoder for a requested output size.
///
/// Odd dimensions are padded by one. If either result is below `min_block`,
/// both become `min_block`.
pub fn corrected_frame_size(size: FrameSize, min_block: u32) -> FrameSize {
    let width = even_dimension(size.width);
    let height = even_dimension(size.height);
    if width < min_block || height < min_block {
        FrameSize::new(min_block, min_block)
    } else {
        FrameSize::new(width, height)
    }
}

/// Region of a frame that a crop rectangle actually covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

/// Clamp a crop rectangle to the frame bounds
pub fn clamp_crop(rect: &Rect, frame: FrameSize) -> Result<CropRegion, DomainError> {
    let x1 = (rect.x as i64).clamp(0, frame.width as i64);
    let y1 = (rect.y as i64).clamp(0, frame.height as i64);
    let x2 = rect.x2().clamp(0, frame.width as i64);
    let y2 = rect.y2().clamp(0, frame.height as i64);

    if x2 <= x1 || y2 <= y1 {
        return Err(DomainError::CropOutOfBounds(format!(
            "{} does not intersect a {} frame",
            rect, frame
        )));
    }
    Ok(CropRegion {
        x: x1 as u32,
        y: y1 as u32,
        width: (x2 - x1) as u32,
        height: (y2 - y1) as u32,
    })
}
