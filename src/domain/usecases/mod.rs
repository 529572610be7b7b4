// Domain use cases - Turning observations into activities

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::domain::model::*;
use crate::domain::rules::{merge_timespans, TubeAggregator};

/// Class label alias resolution and relevance filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPolicy {
    aliases: HashMap<String, String>,
    relevant: Option<BTreeSet<String>>,
}

impl ClassPolicy {
    /// Build a policy from a canonical -> aliases table and an optional
    /// list of relevant canonical classes. `None` keeps every class.
    pub fn new(aliases: &BTreeMap<String, Vec<String>>, relevant: Option<&[String]>) -> Self {
        let mut table = HashMap::new();
        for (canonical, names) in aliases {
            for name in names {
                table.insert(name.clone(), canonical.clone());
            }
        }
        let relevant = relevant.map(|classes| {
            classes
                .iter()
                .map(|class| table.get(class).unwrap_or(class).clone())
                .collect()
        });
        Self {
            aliases: table,
            relevant,
        }
    }

    /// Policy that keeps every label as written
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Revised MEVA class names and the four classes of interest
    pub fn meva() -> Self {
        Self::new(&meva_aliases(), Some(&meva_relevant()))
    }

    /// Canonical name of a label
    pub fn resolve<'a>(&'a self, label: &'a str) -> &'a str {
        self.aliases.get(label).map(String::as_str).unwrap_or(label)
    }

    /// Whether a canonical class should be extracted
    pub fn is_relevant(&self, canonical: &str) -> bool {
        match &self.relevant {
            Some(classes) => classes.contains(canonical),
            None => true,
        }
    }

    /// Relevant canonical classes, if a filter is configured
    pub fn relevant_classes(&self) -> Option<&BTreeSet<String>> {
        self.relevant.as_ref()
    }
}

/// Alias table for MEVA label revisions
pub fn meva_aliases() -> BTreeMap<String, Vec<String>> {
    let mut aliases = BTreeMap::new();
    aliases.insert(
        "person_abandons_package".to_string(),
        vec!["abandon_package".to_string()],
    );
    aliases.insert(
        "person_rides_bicycle".to_string(),
        vec!["riding".to_string(), "Riding".to_string()],
    );
    aliases.insert(
        "person_sits_down".to_string(),
        vec!["person_sitting_down".to_string()],
    );
    aliases.insert(
        "person_steals_object".to_string(),
        vec!["theft".to_string(), "Theft".to_string()],
    );
    aliases
}

/// MEVA classes extracted by default
pub fn meva_relevant() -> Vec<String> {
    meva_aliases().into_keys().collect()
}

/// Joins aggregated geometry with label observations
pub struct ActivityBuilder<'a> {
    policy: &'a ClassPolicy,
}

impl<'a> ActivityBuilder<'a> {
    pub fn new(policy: &'a ClassPolicy) -> Self {
        Self { policy }
    }

    /// Build the ordered activities of one video, numbered from zero
    pub fn build(&self, set: &ObservationSet) -> Vec<Activity> {
        self.build_from(set, 0)
    }

    /// Build the ordered activities of one video.
    ///
    /// Ids are assigned sequentially from `first_id` in first-seen order. A
    /// repeated external id is ignored, and so is a label with no geometry to
    /// crop to.
    pub fn build_from(&self, set: &ObservationSet, first_id: u32) -> Vec<Activity> {
        let tubes = TubeAggregator::from_observations(set.tube_policy, &set.geometry);
        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut activities = Vec::new();

        for label in &set.labels {
            if let Some(source_id) = label.source_id.as_deref() {
                if !seen_ids.insert(source_id) {
                    debug!(video = %set.video_name, source_id, "Ignoring duplicate activity id");
                    continue;
                }
            }

            let class = self.policy.resolve(&label.label);
            if !self.policy.is_relevant(class) {
                continue;
            }

            let Some(bbox) = label.rect.or_else(|| tubes.rect(&label.object_id)) else {
                debug!(
                    video = %set.video_name,
                    object = %label.object_id,
                    class,
                    "Dropping activity without geometry"
                );
                continue;
            };

            let mut activity = Activity::new(first_id + activities.len() as u32, class, label.timespan, bbox);
            activity.source_id = label.source_id.clone();
            activities.push(activity);
        }

        activities
    }
}

/// Merged cut spans for one canonical class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSpans {
    pub class: String,
    pub spans: Vec<Timespan>,
}

/// Groups label timespans by class and merges them, classes in first-seen order
pub fn plan_class_cuts(set: &ObservationSet, policy: &ClassPolicy) -> Vec<ClassSpans> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<Timespan>> = HashMap::new();

    for label in &set.labels {
        let class = policy.resolve(&label.label);
        if !policy.is_relevant(class) {
            continue;
        }
        if !grouped.contains_key(class) {
            order.push(class.to_string());
        }
        grouped.entry(class.to_string()).or_default().push(label.timespan);
    }

    order
        .into_iter()
        .map(|class| {
            let spans = grouped.get(&class).map(|s| merge_timespans(s)).unwrap_or_default();
            ClassSpans { class, spans }
        })
        .collect()
}

/// Relevant canonical classes labeled anywhere in a document
pub fn classes_present(set: &ObservationSet, policy: &ClassPolicy) -> BTreeSet<String> {
    set.labels
        .iter()
        .map(|label| policy.resolve(&label.label))
        .filter(|class| policy.is_relevant(class))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u64, end: u64) -> Timespan {
        Timespan::new(start, end).unwrap()
    }

    fn label(source_id: Option<&str>, object_id: &str, label: &str, timespan: Timespan) -> LabelObservation {
        LabelObservation {
            source_id: source_id.map(str::to_string),
            object_id: object_id.to_string(),
            label: label.to_string(),
            timespan,
            rect: None,
        }
    }

    fn geometry(object_id: &str, frame: u64, rect: Rect) -> GeometryObservation {
        GeometryObservation {
            object_id: object_id.to_string(),
            frame,
            rect,
        }
    }

    #[test]
    fn test_meva_policy_resolves_aliases() {
        let policy = ClassPolicy::meva();
        assert_eq!(policy.resolve("riding"), "person_rides_bicycle");
        assert_eq!(policy.resolve("Theft"), "person_steals_object");
        assert_eq!(policy.resolve("person_sits_down"), "person_sits_down");
        assert!(policy.is_relevant("person_sits_down"));
        assert!(!policy.is_relevant("person_opens_door"));
    }

    #[test]
    fn test_relevant_list_accepts_aliases() {
        let relevant = vec!["riding".to_string()];
        let policy = ClassPolicy::new(&meva_aliases(), Some(&relevant));
        assert!(policy.is_relevant("person_rides_bicycle"));
        assert!(!policy.is_relevant("person_sits_down"));
    }

    #[test]
    fn test_permissive_policy_keeps_everything() {
        let policy = ClassPolicy::permissive();
        assert_eq!(policy.resolve("Walking"), "Walking");
        assert!(policy.is_relevant("anything"));
        assert!(policy.relevant_classes().is_none());
    }

    #[test]
    fn test_builder_assigns_sequential_ids() {
        let policy = ClassPolicy::permissive();
        let mut set = ObservationSet::new("video", TubePolicy::MinCornerMaxExtent);
        set.geometry.push(geometry("7", 0, Rect::new(10, 10, 20, 20)));
        set.geometry.push(geometry("7", 1, Rect::new(5, 12, 10, 30)));
        set.labels.push(label(Some("100"), "7", "walking", span(0, 10)));
        set.labels.push(label(Some("101"), "7", "running", span(5, 15)));

        let activities = ActivityBuilder::new(&policy).build(&set);
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].id, 0);
        assert_eq!(activities[0].activity_type, "walking");
        assert_eq!(activities[0].bbox, Rect::new(5, 10, 20, 30));
        assert_eq!(activities[0].source_id.as_deref(), Some("100"));
        assert_eq!(activities[1].id, 1);
        assert_eq!(activities[1].activity_type, "running");
    }

    #[test]
    fn test_builder_first_duplicate_wins() {
        let policy = ClassPolicy::permissive();
        let mut set = ObservationSet::new("video", TubePolicy::MinCornerMaxExtent);
        let mut first = label(Some("3"), "3", "load_car", span(10, 20));
        first.rect = Some(Rect::new(1, 2, 3, 4));
        let mut second = label(Some("3"), "3", "running", span(30, 40));
        second.rect = Some(Rect::new(5, 6, 7, 8));
        set.labels.push(first);
        set.labels.push(second);

        let activities = ActivityBuilder::new(&policy).build(&set);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, "load_car");
        assert_eq!(activities[0].timespan, span(10, 20));
        assert_eq!(activities[0].bbox, Rect::new(1, 2, 3, 4));
    }

    #[test]
    fn test_builder_drops_labels_without_geometry() {
        let policy = ClassPolicy::permissive();
        let mut set = ObservationSet::new("video", TubePolicy::MinCornerMaxExtent);
        set.geometry.push(geometry("1", 0, Rect::new(0, 0, 8, 8)));
        set.labels.push(label(None, "2", "walking", span(0, 5)));
        set.labels.push(label(None, "1", "walking", span(0, 5)));

        let activities = ActivityBuilder::new(&policy).build(&set);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].id, 0);
        assert_eq!(activities[0].bbox, Rect::new(0, 0, 8, 8));
    }

    #[test]
    fn test_builder_filters_and_resolves_classes() {
        let policy = ClassPolicy::meva();
        let mut set = ObservationSet::new("video", TubePolicy::MinCornerMaxExtent);
        set.geometry.push(geometry("1", 0, Rect::new(0, 0, 8, 8)));
        set.labels.push(label(None, "1", "person_opens_door", span(0, 5)));
        set.labels.push(label(None, "1", "abandon_package", span(3, 9)));

        let activities = ActivityBuilder::new(&policy).build(&set);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].id, 0);
        assert_eq!(activities[0].activity_type, "person_abandons_package");
    }

    #[test]
    fn test_plan_class_cuts_merges_per_class() {
        let policy = ClassPolicy::meva();
        let mut set = ObservationSet::new("video", TubePolicy::MinCornerMaxExtent);
        set.labels.push(label(None, "1", "theft", span(5, 8)));
        set.labels.push(label(None, "2", "riding", span(1, 3)));
        set.labels.push(label(None, "3", "person_steals_object", span(1, 5)));
        set.labels.push(label(None, "4", "riding", span(2, 4)));
        set.labels.push(label(None, "5", "person_opens_door", span(0, 100)));

        let plan = plan_class_cuts(&set, &policy);
        assert_eq!(
            plan,
            vec![
                ClassSpans {
                    class: "person_steals_object".to_string(),
                    spans: vec![span(1, 8)],
                },
                ClassSpans {
                    class: "person_rides_bicycle".to_string(),
                    spans: vec![span(1, 4)],
                },
            ]
        );
    }

    #[test]
    fn test_classes_present() {
        let policy = ClassPolicy::meva();
        let mut set = ObservationSet::new("video", TubePolicy::MinCornerMaxExtent);
        set.labels.push(label(None, "1", "Theft", span(0, 1)));
        set.labels.push(label(None, "2", "person_steals_object", span(2, 3)));
        set.labels.push(label(None, "3", "person_opens_door", span(4, 5)));

        let classes: Vec<String> = classes_present(&set, &policy).into_iter().collect();
        assert_eq!(classes, vec!["person_steals_object".to_string()]);
    }
}
