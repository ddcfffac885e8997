//! In-memory model of a parsed smartctl report.
//!
//! A report consists of an informational section (`Field: value` lines such
//! as the device model and serial number) and a table of numbered SMART
//! attributes. Lookups are total: unknown info fields and unknown attribute
//! ids yield empty/zero results rather than errors, so callers never have to
//! handle "field missing" separately from "field empty".

pub mod parser;

pub use parser::parse;

use std::collections::HashMap;

/// One row of the SMART attribute table.
///
/// `value`, `worst` and `thresh` are the normalized firmware scores; `raw`
/// is the vendor-defined raw counter (the value the exporter publishes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRecord {
    pub id: u8,
    pub name: String,
    pub value: i64,
    pub worst: i64,
    pub thresh: i64,
    pub raw: u64,
}

/// Structured view of one smartctl report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceReport {
    info: HashMap<String, String>,
    attributes: HashMap<u8, AttributeRecord>,
}

impl DeviceReport {
    /// Returns the value of an informational field, or `""` if the report
    /// does not contain it.
    pub fn info(&self, field: &str) -> &str {
        self.info.get(field).map(String::as_str).unwrap_or("")
    }

    /// Returns the attribute with the given id, or a zero-valued record if
    /// the report does not contain it.
    ///
    /// An absent attribute is indistinguishable from one reporting raw value
    /// 0; use [`DeviceReport::has_attribute`] where the distinction matters.
    pub fn attribute(&self, id: u8) -> AttributeRecord {
        self.attributes.get(&id).cloned().unwrap_or_default()
    }

    /// Whether the report contains an attribute row for the given id.
    pub fn has_attribute(&self, id: u8) -> bool {
        self.attributes.contains_key(&id)
    }

    /// Number of attribute rows parsed from the report.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}
