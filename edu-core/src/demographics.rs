//! Census lookups used for per-capita normalisation and the town profile.
//!
//! The JSON layout mirrors the published demographic file:
//!
//! ```json
//! { "cities": { "CJ": { "population": { "total": 679141, "age": { "5-9": 35000 } },
//!                       "cities": { "Turda": { "population": { "total": 47744 } } } } } }
//! ```
//!
//! The top-level `cities` key holds counties; each county has its own
//! `cities` map of towns.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Age brackets that make up the school-age population.
pub const SCHOOL_AGE_BRACKETS: [&str; 3] = ["5-9", "10-14", "15-19"];

/// County code → county demographics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(rename = "cities", default)]
    pub counties: BTreeMap<String, CountyDemographics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyDemographics {
    pub population: Population,
    #[serde(default)]
    pub cities: BTreeMap<String, TownDemographics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownDemographics {
    pub population: Population,
}

/// Population breakdown of one administrative unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub total: u64,
    /// Five-year brackets such as `"10-14"` and `"85+"`.
    #[serde(default)]
    pub age: BTreeMap<String, u64>,
    #[serde(default)]
    pub ethnicity: serde_json::Value,
    #[serde(default)]
    pub education: serde_json::Value,
}

impl Demographics {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let demographics: Demographics =
            serde_json::from_str(json).context("Failed to parse demographics JSON")?;
        log::info!(
            "[EDU Debug] demographics: Loaded {} counties",
            demographics.counties.len()
        );
        Ok(demographics)
    }

    pub fn county(&self, county: &str) -> Option<&Population> {
        self.counties.get(county).map(|c| &c.population)
    }

    pub fn town(&self, county: &str, town: &str) -> Option<&Population> {
        self.counties
            .get(county)?
            .cities
            .get(town)
            .map(|t| &t.population)
    }
}

impl Population {
    /// Sum of the given brackets; missing brackets count as zero.
    pub fn sum_brackets(&self, brackets: &[&str]) -> u64 {
        brackets
            .iter()
            .map(|b| self.age.get(*b).copied().unwrap_or(0))
            .sum()
    }

    /// Population aged 5 to 19.
    pub fn school_age(&self) -> u64 {
        self.sum_brackets(&SCHOOL_AGE_BRACKETS)
    }
}

/// Age summary shown in the town detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TownProfile {
    pub total: u64,
    /// Coarse brackets in display order: `0-4`, `5-14`, `15-19`, `20-24`,
    /// `25-64`, `65+`.
    pub age_groups: Vec<(String, u64)>,
    pub primary_age: u64,
    pub middle_school_age: u64,
    pub high_school_age: u64,
}

const AGE_GROUPS: [(&str, &[&str]); 6] = [
    ("0-4", &["0-4"]),
    ("5-14", &["5-9", "10-14"]),
    ("15-19", &["15-19"]),
    ("20-24", &["20-24"]),
    (
        "25-64",
        &[
            "25-29", "30-34", "35-39", "40-44", "45-49", "50-54", "55-59", "60-64",
        ],
    ),
    ("65+", &["65-69", "70-74", "75-79", "80-84", "85+"]),
];

impl TownProfile {
    pub fn from_population(population: &Population) -> Self {
        let age_groups = AGE_GROUPS
            .iter()
            .map(|(label, brackets)| (label.to_string(), population.sum_brackets(brackets)))
            .collect();
        Self {
            total: population.total,
            age_groups,
            primary_age: population.sum_brackets(&["5-9"]),
            middle_school_age: population.sum_brackets(&["10-14"]),
            high_school_age: population.sum_brackets(&["15-19"]),
        }
    }
}
