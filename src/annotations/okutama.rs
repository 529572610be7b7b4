//! Okutama-Action per-frame text rows
//!
//! One row per tracked id per frame:
//! `id x1 y1 x2 y2 frame lost occluded generated "object" "action"`.
//! A track becomes one activity spanning its first to last frame.

use std::collections::HashMap;

use tracing::debug;

use crate::annotations::column;
use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// Label of rows that carry no action column
pub const UNLABELED: &str = "None";

const ACTION_COLUMN: usize = 10;

struct Track {
    first: u64,
    last: u64,
    label: String,
}

/// Parse a whole annotation document
pub fn parse(video_name: &str, text: &str) -> ObservationSet {
    let mut set = ObservationSet::new(video_name, TubePolicy::ExactCorners);
    let mut order: Vec<String> = Vec::new();
    let mut tracks: HashMap<String, Track> = HashMap::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (observation, label) = match parse_row(line) {
            Ok(row) => row,
            Err(e) => {
                debug!(video = video_name, line = line_no + 1, "Dropping row: {}", e);
                continue;
            }
        };

        let frame = observation.frame;
        match tracks.get_mut(&observation.object_id) {
            Some(track) => {
                track.first = track.first.min(frame);
                track.last = track.last.max(frame);
                track.label = label;
            }
            None => {
                order.push(observation.object_id.clone());
                tracks.insert(
                    observation.object_id.clone(),
                    Track {
                        first: frame,
                        last: frame,
                        label,
                    },
                );
            }
        }
        set.geometry.push(observation);
    }

    for object_id in order {
        if let Some(track) = tracks.remove(&object_id) {
            set.labels.push(LabelObservation {
                source_id: Some(object_id.clone()),
                object_id,
                label: track.label,
                timespan: Timespan {
                    start: track.first,
                    end: track.last,
                },
                rect: None,
            });
        }
    }

    set
}

fn parse_row(line: &str) -> Result<(GeometryObservation, String), DomainError> {
    let values: Vec<&str> = line.split_whitespace().collect();
    let numbers: Option<Vec<i32>> = (0..5).map(|i| column(&values, i)).collect();
    let (Some(numbers), Some(frame)) = (numbers, column::<u64>(&values, 5)) else {
        return Err(DomainError::MalformedObservation(format!(
            "expected id, corners and frame in '{}'",
            line
        )));
    };

    let rect = Rect::from_corners(numbers[1], numbers[2], numbers[3], numbers[4])?;
    Ok((
        GeometryObservation {
            object_id: numbers[0].to_string(),
            frame,
            rect,
        },
        action_label(values.get(ACTION_COLUMN).copied()),
    ))
}

/// Action token reduced to alphanumerics, or the unlabeled sentinel
pub fn action_label(token: Option<&str>) -> String {
    let label: String = token
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if label.is_empty() {
        UNLABELED.to_string()
    } else {
        label
    }
}
