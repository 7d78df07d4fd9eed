//! Rows returned by the engine.

use serde::Serialize;

/// One region of a map query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AggregateRow {
    /// County mnemonic (`judet`).
    pub county: String,
    /// Town (`localitate`), present for county-scoped queries.
    pub town: Option<String>,
    pub value: f64,
}

impl AggregateRow {
    /// Key of the region on the map: the town when present, else the county.
    pub fn key(&self) -> &str {
        self.town.as_deref().unwrap_or(&self.county)
    }
}

/// A school in the town roster.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SchoolRecord {
    /// SIIIR code.
    pub id: String,
    pub name: String,
    pub county: String,
    pub town: String,
    /// Distinct instruction languages, sorted.
    pub languages: Vec<String>,
    /// Distinct levels offered, sorted.
    pub levels: Vec<String>,
    /// Enrolled students across all levels; 0 without statistics rows.
    pub total_students: u64,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
}
