pub mod badge;
pub mod classify;
pub mod lines;
pub mod rules;
pub mod text;
pub mod title;

pub use classify::MissionType;

use classify::Classified;

/// Segment → classify → title override. Returns the ORBAT lines and the
/// reconciled mission type for one post body.
pub fn classify_post(post_title: &str, html: &str) -> Classified {
    let lines = lines::segment(html);
    let by_markers = classify::classify(&lines);
    Classified {
        mission_type: title::reconcile(by_markers.mission_type, title::infer_from_title(post_title)),
        orbat_lines: by_markers.orbat_lines,
    }
}
