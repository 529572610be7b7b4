//! MEVA KPF YAML documents
//!
//! Activities live in `<video>-activities.yml`, per-frame boxes in the
//! sibling `<video>-geom.yml`. Both are YAML lists of single-key mappings.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::error::ActClipResult;

pub const ACTIVITIES_SUFFIX: &str = "-activities.yml";
pub const GEOMETRY_SUFFIX: &str = "-geom.yml";

/// Companion geometry document of an activities document
pub fn geometry_path(activities_path: &Path, video_name: &str) -> PathBuf {
    activities_path.with_file_name(format!("{}{}", video_name, GEOMETRY_SUFFIX))
}

/// Parse an activities document together with its geometry document
pub fn parse(video_name: &str, activities: &str, geometry: &str) -> ActClipResult<ObservationSet> {
    let mut set = ObservationSet::new(video_name, TubePolicy::MinCornerMaxExtent);

    for item in records(geometry)? {
        let Some(geom) = item.get("geom") else {
            continue;
        };
        match parse_geometry(geom) {
            Ok(observation) => set.geometry.push(observation),
            Err(e) => debug!(video = video_name, "Dropping geometry record: {}", e),
        }
    }

    for item in records(activities)? {
        let Some(act) = item.get("act") else {
            continue;
        };
        match parse_activity(act) {
            Ok(label) => set.labels.push(label),
            Err(e) => debug!(video = video_name, "Dropping activity record: {}", e),
        }
    }

    Ok(set)
}

fn records(text: &str) -> ActClipResult<Vec<Value>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_yaml::from_str(text)?;
    Ok(match value {
        Value::Sequence(items) => items,
        _ => Vec::new(),
    })
}

fn parse_geometry(geom: &Value) -> Result<GeometryObservation, DomainError> {
    let object_id = id_of(geom.get("id1")).ok_or_else(|| malformed("geom without id1"))?;
    let frame = geom
        .get("ts0")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed("geom without ts0"))?;
    let corners = geom
        .get("g0")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("geom without g0"))?;

    let values: Vec<i32> = corners
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| malformed(&format!("g0 '{}' is not numeric", corners)))?;
    let [x1, y1, x2, y2] = values[..] else {
        return Err(malformed(&format!("g0 '{}' does not hold four values", corners)));
    };

    Ok(GeometryObservation {
        object_id,
        frame,
        rect: Rect::from_corners(x1, y1, x2, y2)?,
    })
}

fn parse_activity(act: &Value) -> Result<LabelObservation, DomainError> {
    let label = class_label(act.get("act2")).ok_or_else(|| malformed("act without act2"))?;
    let source_id = id_of(act.get("id2"));

    let actor = act
        .get("actors")
        .and_then(Value::as_sequence)
        .and_then(|actors| actors.first());
    let object_id = actor
        .and_then(|actor| id_of(actor.get("id1")))
        .or_else(|| source_id.clone())
        .ok_or_else(|| malformed("act without actor or id2"))?;

    let timespan = actor
        .and_then(|actor| first_range(actor.get("timespan")))
        .or_else(|| first_range(act.get("timespan")))
        .ok_or_else(|| malformed("act without tsr0 timespan"))??;

    Ok(LabelObservation {
        source_id,
        object_id,
        label,
        timespan,
        rect: None,
    })
}

/// Lexicographically smallest label of an `act2` label set
fn class_label(act2: Option<&Value>) -> Option<String> {
    let labels: Vec<&str> = match act2? {
        Value::Mapping(map) => map.iter().filter_map(|(key, _)| key.as_str()).collect(),
        Value::Sequence(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(label) => vec![label.as_str()],
        _ => Vec::new(),
    };
    labels.into_iter().min().map(str::to_string)
}

fn first_range(timespan: Option<&Value>) -> Option<Result<Timespan, DomainError>> {
    let range = timespan?.as_sequence()?.first()?.get("tsr0")?.as_sequence()?;
    let start = range.first()?.as_u64()?;
    let end = range.get(1)?.as_u64()?;
    Some(Timespan::new(start, end))
}

fn id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn malformed(message: &str) -> DomainError {
    DomainError::MalformedObservation(message.to_string())
}
