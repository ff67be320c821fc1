use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::parser::text::normalize;

/// Parse the roster export into normalised name → date.
///
/// The first row is a header. Rows with fewer than two fields, or with an
/// empty name or date, are skipped. A later row whose name normalises to the
/// same key replaces the earlier one.
pub fn parse(text: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = 0usize;
    let mut roster = BTreeMap::new();

    for record in reader.records() {
        let record = record?;
        rows += 1;
        if rows == 1 {
            continue;
        }

        let (Some(name), Some(date)) = (record.get(0), record.get(1)) else {
            debug!("Roster row {} has fewer than two fields, skipping", rows);
            continue;
        };
        let (name, date) = (name.trim(), date.trim());
        if name.is_empty() || date.is_empty() {
            continue;
        }
        roster.insert(normalize(name), date.to_string());
    }

    if rows == 0 {
        return Err(Error::EmptySource);
    }
    Ok(roster)
}
