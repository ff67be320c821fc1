use serde::Serialize;

use crate::forum::PostLink;
use crate::parser::{self, badge, text, MissionType};

/// One forum post turned into a structured mission announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionRecord {
    pub title: String,
    pub url: String,
    pub full_text: String,
    pub orbat_lines: Vec<String>,
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    pub instruction_code: Option<String>,
}

/// Build the record for one post from its listing entry and body markup.
pub fn build_record(link: &PostLink, html: &str) -> MissionRecord {
    let full_text = text::full_text(html);
    let classified = parser::classify_post(&link.title, html);

    let instruction_code = match classified.mission_type {
        MissionType::Training => badge::extract_code(html),
        _ => None,
    };

    MissionRecord {
        title: link.title.clone(),
        url: link.url.clone(),
        full_text,
        orbat_lines: classified.orbat_lines,
        mission_type: classified.mission_type,
        instruction_code,
    }
}
