use serde::Serialize;

use super::rules::{OPERATIONAL_MARKER, TRAINING_MARKER};
use super::text::plain_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissionType {
    Operational,
    Training,
    Unknown,
}

/// Marker-bearing lines of a post, cleaned, plus the type the markers imply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub orbat_lines: Vec<String>,
    pub mission_type: MissionType,
}

/// Which marker a single line carries. Operational is checked first.
pub fn line_marker(line: &str) -> Option<MissionType> {
    if line.contains(OPERATIONAL_MARKER) {
        Some(MissionType::Operational)
    } else if line.contains(TRAINING_MARKER) {
        Some(MissionType::Training)
    } else {
        None
    }
}

/// Keep only marker-bearing lines, in order. The post type is the marker of
/// the last such line in document order; `Unknown` when none carries one.
pub fn classify<S: AsRef<str>>(lines: &[S]) -> Classified {
    let (orbat_lines, mission_type) = lines.iter().fold(
        (Vec::new(), MissionType::Unknown),
        |(mut kept, current), line| match line_marker(line.as_ref()) {
            Some(kind) => {
                kept.push(clean_line(line.as_ref()));
                (kept, kind)
            }
            None => (kept, current),
        },
    );

    Classified {
        orbat_lines,
        mission_type,
    }
}

/// Plain text of one segment, without the `/` and `>` debris left by
/// cutting tags at line breaks.
fn clean_line(line: &str) -> String {
    plain_text(line)
        .trim_matches(|c: char| c == '/' || c == '>' || c.is_whitespace())
        .to_string()
}
