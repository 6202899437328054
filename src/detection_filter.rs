use crate::image_classifier::interface::Detection;
use std::collections::HashSet;

/// Detections from one frame that passed the filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QualifyingEvent {
    pub matched: Vec<Detection>,
}

impl QualifyingEvent {
    pub fn qualifies(&self) -> bool {
        !self.matched.is_empty()
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Confidence threshold plus class allow-list.
///
/// The threshold is strict: a detection whose confidence equals it does not match.
#[derive(Debug, Clone)]
pub struct DetectionFilter {
    threshold: f32,
    allowed_labels: HashSet<String>,
}

impl DetectionFilter {
    pub fn new<S: AsRef<str>>(threshold: f32, allowed_labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            threshold,
            allowed_labels: allowed_labels
                .into_iter()
                .map(|label| normalize(label.as_ref()))
                .collect(),
        }
    }

    pub fn matches(&self, detection: &Detection) -> bool {
        detection.confidence > self.threshold
            && self.allowed_labels.contains(&normalize(&detection.label))
    }

    pub fn apply(&self, detections: &[Detection]) -> QualifyingEvent {
        QualifyingEvent {
            matched: detections
                .iter()
                .filter(|d| self.matches(d))
                .cloned()
                .collect(),
        }
    }
}

#[allow(dead_code)]
pub fn filter<S: AsRef<str>>(
    detections: &[Detection],
    threshold: f32,
    allowed_labels: &[S],
) -> QualifyingEvent {
    DetectionFilter::new(threshold, allowed_labels).apply(detections)
}
