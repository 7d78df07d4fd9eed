//! Turns engine rows into per-region values.
//!
//! Without `per_capita` the values pass through unchanged. With it, each
//! value is divided by the unit's population expressed in tens of thousands
//! (counties) or thousands (towns). `school_age_only` swaps the total for
//! the 5-19 population.

use edu_core::demographics::{Demographics, Population};
use edu_core::filters::FilterState;
use edu_db::models::AggregateRow;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// People per unit of the per-capita denominator for counties.
pub const COUNTY_SCALE: f64 = 10_000.0;
/// People per unit of the per-capita denominator for towns.
pub const TOWN_SCALE: f64 = 1_000.0;

/// Region key (county code or town name) → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegionValues(BTreeMap<String, f64>);

impl RegionValues {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }
}

impl FromIterator<(String, f64)> for RegionValues {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Keys the rows and applies per-capita normalisation.
///
/// Units without a demographic entry, or with a zero denominator, are left
/// out of the result.
pub fn normalize(
    rows: &[AggregateRow],
    filters: &FilterState,
    demographics: &Demographics,
) -> RegionValues {
    if !filters.per_capita {
        return rows
            .iter()
            .map(|row| (row.key().to_string(), row.value))
            .collect();
    }

    let mut values = RegionValues::default();
    for row in rows {
        let (population, scale) = match &row.town {
            Some(town) => (demographics.town(&row.county, town), TOWN_SCALE),
            None => (demographics.county(&row.county), COUNTY_SCALE),
        };
        let Some(population) = population else {
            log::warn!(
                "[EDU] normalize: no demographics for {}, skipping",
                row.key()
            );
            continue;
        };
        let denominator = denominator(population, filters.school_age_only);
        if denominator == 0 {
            log::warn!(
                "[EDU] normalize: zero population for {}, skipping",
                row.key()
            );
            continue;
        }
        values.insert(row.key(), row.value / (denominator as f64 / scale));
    }
    values
}

fn denominator(population: &Population, school_age_only: bool) -> u64 {
    if school_age_only {
        population.school_age()
    } else {
        population.total
    }
}
