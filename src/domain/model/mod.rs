// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::errors::DomainError;

/// Object identifier as written in the annotation document
pub type ObjectId = String;

/// Axis-aligned rectangle in pixel coordinates, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and extent
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle from two opposite corners (x1, y1) and (x2, y2)
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self, DomainError> {
        let extent = |low: i32, high: i32| u32::try_from(high as i64 - low as i64).ok();
        match (extent(x1, x2), extent(y1, y2)) {
            (Some(w), Some(h)) => Ok(Self { x: x1, y: y1, w, h }),
            _ => Err(DomainError::InvalidRect(format!(
                "corners ({}, {}) and ({}, {}) do not span a rectangle",
                x1, y1, x2, y2
            ))),
        }
    }

    /// Create a rectangle from signed width and height
    pub fn from_signed(x: i32, y: i32, w: i32, h: i32) -> Result<Self, DomainError> {
        if w < 0 || h < 0 {
            return Err(DomainError::InvalidRect(format!(
                "negative extent {}x{}",
                w, h
            )));
        }
        Ok(Self::new(x, y, w as u32, h as u32))
    }

    /// Right edge (exclusive)
    pub fn x2(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    /// Bottom edge (exclusive)
    pub fn y2(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.w, self.h)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.w, self.h, self.x, self.y)
    }
}

/// Frame index interval.
///
/// `start` is inclusive. During extraction `end` is exclusive: only frames
/// with an index strictly below `end` are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timespan {
    pub start: u64,
    pub end: u64,
}

impl Timespan {
    /// Create a new timespan, rejecting `start > end`
    pub fn new(start: u64, end: u64) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidTimespan(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a colon separated `start:end` pair
    pub fn parse_pair(value: &str) -> Result<Self, DomainError> {
        let (start, end) = value.trim().split_once(':').ok_or_else(|| {
            DomainError::InvalidTimespan(format!("'{}' is not a start:end pair", value))
        })?;
        let start = start.trim().parse::<u64>().map_err(|_| {
            DomainError::InvalidTimespan(format!("invalid start frame in '{}'", value))
        })?;
        let end = end.trim().parse::<u64>().map_err(|_| {
            DomainError::InvalidTimespan(format!("invalid end frame in '{}'", value))
        })?;
        Self::new(start, end)
    }

    /// Number of frames the extraction engine emits for this span
    pub fn frame_count(&self) -> u64 {
        self.end - self.start
    }

    /// Whether a frame index is emitted for this span
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start && frame < self.end
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

// Serialized as a two element array, matching the manifest layout
impl Serialize for Timespan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.start, self.end).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timespan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (start, end) = <(u64, u64)>::deserialize(deserializer)?;
        Timespan::new(start, end).map_err(serde::de::Error::custom)
    }
}

/// Width and height of a frame in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bytes in one packed BGR24 frame of this size
    pub fn bgr_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A labeled action instance ready for extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Sequential id, unique within one video
    pub id: u32,
    /// Canonical class label
    #[serde(rename = "type")]
    pub activity_type: String,
    pub timespan: Timespan,
    pub bbox: Rect,
    /// External id from the annotation document, when the format has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl Activity {
    pub fn new(id: u32, activity_type: impl Into<String>, timespan: Timespan, bbox: Rect) -> Self {
        Self {
            id,
            activity_type: activity_type.into(),
            timespan,
            bbox,
            source_id: None,
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

/// One per-frame rectangle observation for an object
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryObservation {
    pub object_id: ObjectId,
    pub frame: u64,
    pub rect: Rect,
}

/// One activity label observation for an acted-upon object
#[derive(Debug, Clone, PartialEq)]
pub struct LabelObservation {
    /// External activity id, used for duplicate suppression
    pub source_id: Option<String>,
    pub object_id: ObjectId,
    /// Raw class label before alias resolution
    pub label: String,
    pub timespan: Timespan,
    /// Box carried by the label itself; overrides the object's tube
    pub rect: Option<Rect>,
}

/// How per-frame rectangles of one object fold into one box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TubePolicy {
    /// Minimum top-left corner with the largest width and height seen.
    /// Approximates the enclosing box when boxes move and resize.
    MinCornerMaxExtent,
    /// Minimum top-left corner and maximum bottom-right corner
    ExactCorners,
}

/// Everything one annotation document says about one video
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    pub video_name: String,
    pub tube_policy: TubePolicy,
    pub geometry: Vec<GeometryObservation>,
    pub labels: Vec<LabelObservation>,
}

impl ObservationSet {
    pub fn new(video_name: impl Into<String>, tube_policy: TubePolicy) -> Self {
        Self {
            video_name: video_name.into(),
            tube_policy,
            geometry: Vec::new(),
            labels: Vec::new(),
        }
    }
}

/// Properties of an opened source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub frame_rate: f64,
    pub size: FrameSize,
    /// Estimated from container metadata, may be absent
    pub frame_count: Option<u64>,
}
