//! VIRAT event rows (`<video>.viratdata.events.txt`)
//!
//! Columns: `id type duration start end current x y w h`. Every row carries
//! its own box, so no geometry aggregation takes place.

use tracing::debug;

use crate::annotations::column;
use crate::domain::errors::DomainError;
use crate::domain::model::*;

pub const EVENTS_SUFFIX: &str = ".viratdata.events.txt";

/// Event type code table
pub fn class_name(code: u32) -> Option<&'static str> {
    let name = match code {
        1 => "load_car",
        2 => "unload_car",
        3 => "open_car",
        4 => "close_car",
        5 => "entering_vehicle",
        6 => "exiting_vehicle",
        7 => "gesturing",
        8 => "digging",
        9 => "carrying",
        10 => "running",
        11 => "entering_facility",
        12 => "exiting_facility",
        _ => return None,
    };
    Some(name)
}

/// Parse a whole events document
pub fn parse(video_name: &str, text: &str) -> ObservationSet {
    let mut set = ObservationSet::new(video_name, TubePolicy::MinCornerMaxExtent);
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line) {
            Ok(label) => set.labels.push(label),
            Err(e) => debug!(video = video_name, line = line_no + 1, "Dropping event row: {}", e),
        }
    }
    set
}

fn parse_row(line: &str) -> Result<LabelObservation, DomainError> {
    let values: Vec<&str> = line.split_whitespace().collect();
    let malformed = || DomainError::MalformedObservation(format!("'{}'", line));

    let id = column::<u64>(&values, 0).ok_or_else(malformed)?;
    let code = column::<u32>(&values, 1).ok_or_else(malformed)?;
    let start = column::<u64>(&values, 3).ok_or_else(malformed)?;
    let end = column::<u64>(&values, 4).ok_or_else(malformed)?;
    let bounds: Option<Vec<i32>> = (6..10).map(|i| column(&values, i)).collect();
    let bounds = bounds.ok_or_else(malformed)?;

    let label = class_name(code)
        .ok_or_else(|| DomainError::UnknownClass(format!("event type {}", code)))?;

    Ok(LabelObservation {
        source_id: Some(id.to_string()),
        object_id: id.to_string(),
        label: label.to_string(),
        timespan: Timespan::new(start, end)?,
        rect: Some(Rect::from_signed(bounds[0], bounds[1], bounds[2], bounds[3])?),
    })
}
