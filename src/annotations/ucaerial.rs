//! UCF-Aerial ViPER (`.xgtf`) documents
//!
//! Only person objects are read. Their `Location`/`bounding_box` attribute
//! holds the boxes; attributes named after an action hold boolean framespan
//! entries marking when the action happens.

use roxmltree::{Document, Node};
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::error::{ActClipError, ActClipResult};

/// Actions annotated as boolean attributes on person objects
pub const ACTIONS: [&str; 14] = [
    "Standing",
    "Walking",
    "Running",
    "Digging",
    "Gesturing",
    "Carrying",
    "Opening a Trunk",
    "Closing a Trunk",
    "Getting Into a Vehicle",
    "Getting Out of a Vehicle",
    "Loading a Vehicle",
    "Unloading a Vehicle",
    "Entering a Facility",
    "Exiting a Facility",
];

const LOCATION_ATTRIBUTES: [&str; 2] = ["Location", "bounding_box"];

/// Observations of a ViPER document and the video file it describes
#[derive(Debug, Clone)]
pub struct ViperDocument {
    pub video_file: String,
    pub observations: ObservationSet,
}

/// Parse a ViPER XML document
pub fn parse(text: &str) -> ActClipResult<ViperDocument> {
    let document = Document::parse(text)?;
    let sourcefile = document
        .descendants()
        .find(|node| node.has_tag_name_local("sourcefile"))
        .ok_or_else(|| missing("sourcefile element"))?;
    let declared = sourcefile
        .attribute("filename")
        .ok_or_else(|| missing("sourcefile filename"))?;

    let video_file = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(declared)
        .to_string();
    let video_name = match video_file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => video_file.clone(),
    };

    let mut set = ObservationSet::new(video_name, TubePolicy::MinCornerMaxExtent);
    for object in children(sourcefile, "object").filter(is_person) {
        let Some(object_id) = object.attribute("id") else {
            debug!("Dropping object without id");
            continue;
        };
        for attribute in children(object, "attribute") {
            let name = attribute.attribute("name").unwrap_or_default();
            if LOCATION_ATTRIBUTES.contains(&name) {
                read_boxes(attribute, object_id, &mut set.geometry);
            } else if ACTIONS.contains(&name) {
                read_actions(attribute, object_id, name, &mut set.labels);
            }
        }
    }

    Ok(ViperDocument {
        video_file,
        observations: set,
    })
}

trait LocalName {
    fn has_tag_name_local(&self, name: &str) -> bool;
}

impl LocalName for Node<'_, '_> {
    fn has_tag_name_local(&self, name: &str) -> bool {
        self.is_element() && self.tag_name().name() == name
    }
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name_local(name))
}

/// `PERSON` objects, or generic objects whose first attribute says `man`
fn is_person(object: &Node) -> bool {
    match object.attribute("name") {
        Some("PERSON") => true,
        Some("object") => children(*object, "attribute")
            .next()
            .and_then(|attribute| children(attribute, "svalue").next())
            .and_then(|value| value.attribute("value"))
            == Some("man"),
        _ => false,
    }
}

fn read_boxes(attribute: Node, object_id: &str, geometry: &mut Vec<GeometryObservation>) {
    for bbox in children(attribute, "bbox") {
        match parse_box(bbox) {
            Ok((spans, rect)) => {
                for span in spans {
                    geometry.push(GeometryObservation {
                        object_id: object_id.to_string(),
                        frame: span.start,
                        rect,
                    });
                }
            }
            Err(e) => debug!(object = object_id, "Dropping bbox: {}", e),
        }
    }
}

fn parse_box(bbox: Node) -> Result<(Vec<Timespan>, Rect), DomainError> {
    let number = |name: &str| -> Result<i32, DomainError> {
        bbox.attribute(name)
            .and_then(|value| value.trim().parse().ok())
            .ok_or_else(|| DomainError::MalformedObservation(format!("bbox without numeric {}", name)))
    };
    let rect = Rect::from_signed(number("x")?, number("y")?, number("width")?, number("height")?)?;
    Ok((framespans(bbox)?, rect))
}

fn read_actions(attribute: Node, object_id: &str, action: &str, labels: &mut Vec<LabelObservation>) {
    for value in children(attribute, "bvalue") {
        if value.attribute("value") == Some("false") {
            continue;
        }
        match framespans(value) {
            Ok(spans) => labels.extend(spans.into_iter().map(|timespan| LabelObservation {
                source_id: None,
                object_id: object_id.to_string(),
                label: action.to_string(),
                timespan,
                rect: None,
            })),
            Err(e) => debug!(object = object_id, action, "Dropping bvalue: {}", e),
        }
    }
}

/// Whitespace separated `start:end` ranges of a `framespan` attribute
fn framespans(node: Node) -> Result<Vec<Timespan>, DomainError> {
    let value = node
        .attribute("framespan")
        .ok_or_else(|| DomainError::MalformedObservation("missing framespan".to_string()))?;
    value.split_whitespace().map(Timespan::parse_pair).collect()
}

fn missing(what: &str) -> ActClipError {
    ActClipError::Domain(DomainError::MalformedObservation(format!("document has no {}", what)))
}
