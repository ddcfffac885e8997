//! Parser for the textual output of `smartctl -iA`.
//!
//! The input format is unversioned and varies across vendors and firmware
//! revisions, so the parser is deliberately total: it extracts every line it
//! recognizes and silently ignores everything else. A malformed attribute
//! row never aborts parsing of the rest of the report.

use super::{AttributeRecord, DeviceReport};

/// Minimum column count for a row of the standard `-A` attribute table:
/// id, name, flag, value, worst, thresh, type, updated, when-failed, raw.
const ATTRIBUTE_COLUMNS: usize = 10;

/// Parses a raw smartctl report into a [`DeviceReport`].
///
/// Never fails. Informational `Field: value` lines populate the info map;
/// attribute-table rows populate the attribute map, keyed by id. If the same
/// id appears twice (some vendors print combined sections) the later row
/// wins.
pub fn parse(raw_text: &str) -> DeviceReport {
    let mut report = DeviceReport::default();

    for line in raw_text.lines() {
        if let Some(attr) = parse_attribute_line(line) {
            report.attributes.insert(attr.id, attr);
        } else if let Some((field, value)) = parse_info_line(line) {
            report.info.insert(field.to_string(), value.to_string());
        }
    }

    report
}

/// Matches informational lines of the form `Field Name: value`.
fn parse_info_line(line: &str) -> Option<(&str, &str)> {
    let (field, value) = line.split_once(':')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    Some((field, value.trim()))
}

/// Matches one row of the attribute table.
///
/// Returns `None` for the header row, for rows with too few columns and for
/// rows whose numeric columns do not parse. The raw-value column keeps only
/// its leading decimal token; trailing descriptive text such as
/// `"5376 (356 220)"` is ignored.
fn parse_attribute_line(line: &str) -> Option<AttributeRecord> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < ATTRIBUTE_COLUMNS {
        return None;
    }

    let id: u8 = cols[0].parse().ok()?;
    if id == 0 {
        // Attribute ids are 1-255.
        return None;
    }

    Some(AttributeRecord {
        id,
        name: cols[1].to_string(),
        value: cols[3].parse().ok()?,
        worst: cols[4].parse().ok()?,
        thresh: cols[5].parse().ok()?,
        raw: leading_decimal(cols[9])?,
    })
}

/// Parses the leading run of decimal digits of a token.
fn leading_decimal(token: &str) -> Option<u64> {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    if end == 0 {
        return None;
    }
    token[..end].parse().ok()
}
