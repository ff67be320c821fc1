use super::classify::MissionType;
use super::rules::{OPERATIONAL_DAYS, TRAINING_DAYS};
use super::text::normalize;

/// Infer the mission type from day names in the title, ignoring case and
/// accents. Operational days are tested first, so a title naming days from
/// both sets is Operational.
pub fn infer_from_title(title: &str) -> Option<MissionType> {
    let title = normalize(title);
    if OPERATIONAL_DAYS.iter().any(|d| title.contains(d)) {
        Some(MissionType::Operational)
    } else if TRAINING_DAYS.iter().any(|d| title.contains(d)) {
        Some(MissionType::Training)
    } else {
        None
    }
}

/// A title inference, when there is one, replaces the marker-derived type.
pub fn reconcile(from_markers: MissionType, from_title: Option<MissionType>) -> MissionType {
    from_title.unwrap_or(from_markers)
}
