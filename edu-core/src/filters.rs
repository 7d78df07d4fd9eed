//! Filter state of the map and its update rules.
//!
//! [`FilterState`] is an immutable value: every user interaction produces a
//! new state through [`FilterState::apply`], so consumers can detect changes
//! by comparing values.
//!
//! Updates carry cross-field rules. They are evaluated against the state
//! *before* the update and applied once, never chased recursively:
//!
//! - `schoolAgeOnly` implies `perCapita`;
//! - enabling the baccalaureate dataset forces the `Liceal` level on, the
//!   national evaluation dataset forces `Gimnazial`;
//! - turning a forced level off disables its dataset;
//! - `examDataset` turns both datasets on.

use crate::catalog::{self, BUCHAREST, GIMNAZIAL, LICEAL};
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Everything the user has selected on the map.
///
/// Deserialising goes through `FilterPreset`, so missing fields keep
/// their defaults and a `town` without a usable `county` is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FilterPreset")]
pub struct FilterState {
    /// County mnemonic; `None` means the whole country, grouped by county.
    pub county: Option<String>,
    /// Town inside `county` whose detail view is open.
    pub town: Option<String>,
    pub levels: Selection,
    pub languages: Selection,
    pub bac_languages: Selection,
    pub bac_results: Selection,
    /// Require one statistics row to match level and language together.
    pub strict_level_language: bool,
    pub per_capita: bool,
    /// Divide by the 5-19 population instead of the total.
    pub school_age_only: bool,
    pub exam_dataset: bool,
    pub in_bac_data: bool,
    pub in_evaluare_data: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            county: None,
            town: None,
            levels: Selection::from_names(catalog::all_levels(), |level| {
                catalog::MAIN_LEVELS.contains(&level)
            }),
            languages: Selection::all(catalog::all_languages()),
            bac_languages: Selection::all(catalog::BAC_LANGUAGES),
            bac_results: Selection::all(catalog::BAC_RESULTS),
            strict_level_language: false,
            per_capita: false,
            school_age_only: false,
            exam_dataset: false,
            in_bac_data: false,
            in_evaluare_data: false,
        }
    }
}

/// A filter state as read from JSON; absent fields fall back to the
/// defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterPreset {
    county: Option<String>,
    town: Option<String>,
    levels: Option<Selection>,
    languages: Option<Selection>,
    bac_languages: Option<Selection>,
    bac_results: Option<Selection>,
    strict_level_language: Option<bool>,
    per_capita: Option<bool>,
    school_age_only: Option<bool>,
    exam_dataset: Option<bool>,
    in_bac_data: Option<bool>,
    in_evaluare_data: Option<bool>,
}

impl From<FilterPreset> for FilterState {
    fn from(preset: FilterPreset) -> Self {
        let defaults = FilterState::default();
        let state = FilterState {
            county: preset.county,
            town: None,
            levels: preset.levels.unwrap_or(defaults.levels),
            languages: preset.languages.unwrap_or(defaults.languages),
            bac_languages: preset.bac_languages.unwrap_or(defaults.bac_languages),
            bac_results: preset.bac_results.unwrap_or(defaults.bac_results),
            strict_level_language: preset
                .strict_level_language
                .unwrap_or(defaults.strict_level_language),
            per_capita: preset.per_capita.unwrap_or(defaults.per_capita),
            school_age_only: preset.school_age_only.unwrap_or(defaults.school_age_only),
            exam_dataset: preset.exam_dataset.unwrap_or(defaults.exam_dataset),
            in_bac_data: preset.in_bac_data.unwrap_or(defaults.in_bac_data),
            in_evaluare_data: preset.in_evaluare_data.unwrap_or(defaults.in_evaluare_data),
        };
        // same checks as an interactive town pick
        state.apply(FilterUpdate::SetTown(preset.town))
    }
}

/// A single user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    SetCounty(Option<String>),
    SetTown(Option<String>),
    SetLevel(String, bool),
    SetLanguage(String, bool),
    SetBacLanguage(String, bool),
    SetBacResult(String, bool),
    SetStrictLevelLanguage(bool),
    SetPerCapita(bool),
    SetSchoolAgeOnly(bool),
    SetExamDataset(bool),
    SetInBacData(bool),
    SetInEvaluareData(bool),
    /// Menu source pick: sets both dataset flags in one go.
    SetDataSource(DataSource),
}

impl FilterState {
    /// Returns the state after `update`; `self` is left untouched.
    pub fn apply(&self, update: FilterUpdate) -> FilterState {
        let prev = self;
        let mut next = self.clone();

        match update {
            FilterUpdate::SetCounty(county) => {
                if next.county != county {
                    next.town = None;
                }
                next.county = county;
            }
            FilterUpdate::SetTown(town) => match (prev.county.as_deref(), town) {
                (None, Some(town)) => {
                    log::warn!("[EDU] filters: ignoring town {town} without a county");
                }
                (Some(BUCHAREST), Some(town)) => {
                    log::warn!("[EDU] filters: ignoring town {town}, {BUCHAREST} has no towns");
                }
                (_, town) => next.town = town,
            },
            FilterUpdate::SetLevel(level, on) => {
                next.levels.set(&level, on);
                if !next.levels.is_selected(LICEAL) && prev.in_bac_data {
                    next.in_bac_data = false;
                }
                if !next.levels.is_selected(GIMNAZIAL) && prev.in_evaluare_data {
                    next.in_evaluare_data = false;
                }
            }
            FilterUpdate::SetLanguage(language, on) => next.languages.set(&language, on),
            FilterUpdate::SetBacLanguage(language, on) => next.bac_languages.set(&language, on),
            FilterUpdate::SetBacResult(result, on) => next.bac_results.set(&result, on),
            FilterUpdate::SetStrictLevelLanguage(on) => next.strict_level_language = on,
            FilterUpdate::SetPerCapita(on) => {
                next.per_capita = on;
                if !on {
                    next.school_age_only = false;
                }
            }
            FilterUpdate::SetSchoolAgeOnly(on) => {
                next.school_age_only = on;
                if on {
                    next.per_capita = true;
                }
            }
            FilterUpdate::SetExamDataset(on) => {
                next.exam_dataset = on;
                if on {
                    next.in_bac_data = true;
                    next.in_evaluare_data = true;
                    force_level(prev, &mut next, LICEAL);
                    force_level(prev, &mut next, GIMNAZIAL);
                }
            }
            FilterUpdate::SetInBacData(on) => {
                next.in_bac_data = on;
                if on {
                    force_level(prev, &mut next, LICEAL);
                }
            }
            FilterUpdate::SetInEvaluareData(on) => {
                next.in_evaluare_data = on;
                if on {
                    force_level(prev, &mut next, GIMNAZIAL);
                }
            }
            FilterUpdate::SetDataSource(source) => {
                return self
                    .apply(FilterUpdate::SetInBacData(source == DataSource::Bac))
                    .apply(FilterUpdate::SetInEvaluareData(
                        source == DataSource::Evaluare,
                    ));
            }
        }

        log::debug!("[EDU] filters: updated to {:?}", next);
        next
    }

    /// Applies several updates in order.
    pub fn apply_all(&self, updates: impl IntoIterator<Item = FilterUpdate>) -> FilterState {
        updates
            .into_iter()
            .fold(self.clone(), |state, update| state.apply(update))
    }

    /// The dataset driving aggregation.
    pub fn data_source(&self) -> DataSource {
        DataSource::resolve(self)
    }

    /// County and town, when a town detail view is open.
    pub fn resolved_town(&self) -> Option<(&str, &str)> {
        match (self.county.as_deref(), self.town.as_deref()) {
            (Some(county), Some(town)) => Some((county, town)),
            _ => None,
        }
    }
}

fn force_level(prev: &FilterState, next: &mut FilterState, level: &str) {
    if !prev.levels.is_selected(level) {
        next.levels.set(level, true);
    }
}

/// One of the three logical data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Enrolment statistics (`student_stats`).
    General,
    /// Baccalaureate results (`bac_2024`).
    Bac,
    /// National evaluation results (`en_2024`).
    Evaluare,
}

impl DataSource {
    /// Picks the source from the dataset flags. When both flags are on
    /// (through `examDataset`) the baccalaureate wins.
    pub fn resolve(filters: &FilterState) -> Self {
        if filters.in_bac_data {
            DataSource::Bac
        } else if filters.in_evaluare_data {
            DataSource::Evaluare
        } else {
            DataSource::General
        }
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(DataSource::General),
            "bac" => Ok(DataSource::Bac),
            "en" | "evaluare" => Ok(DataSource::Evaluare),
            other => Err(format!("unknown data source '{other}' (general, bac, en)")),
        }
    }
}

/// Statistic shown on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Schools,
    Students,
    Grades,
}

impl MapType {
    /// Students and grades aggregate per-student rows instead of counting
    /// distinct schools.
    pub fn for_students(self) -> bool {
        !matches!(self, MapType::Schools)
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapType::Schools => "schools",
            MapType::Students => "students",
            MapType::Grades => "grades",
        };
        f.write_str(name)
    }
}

impl FromStr for MapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schools" => Ok(MapType::Schools),
            "students" => Ok(MapType::Students),
            "grades" => Ok(MapType::Grades),
            other => Err(format!("unknown map type '{other}' (schools, students, grades)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_level(level: &str, on: bool) -> FilterUpdate {
        FilterUpdate::SetLevel(level.to_string(), on)
    }

    #[test]
    fn defaults_enable_main_levels_only() {
        let state = FilterState::default();
        assert_eq!(state.levels.selected(), vec!["Gimnazial", "Liceal", "Primar"]);
        assert!(!state.levels.is_selected("Profesional"));
        assert!(state.languages.is_selected("maghiară"));
        assert!(state.bac_results.is_selected("Absent"));
        assert_eq!(state.data_source(), DataSource::General);
    }

    #[test]
    fn apply_does_not_mutate_input() {
        let state = FilterState::default();
        let next = state.apply(set_level("Liceal", false));
        assert!(state.levels.is_selected("Liceal"));
        assert!(!next.levels.is_selected("Liceal"));
        assert_ne!(state, next);
    }

    #[test]
    fn school_age_only_forces_per_capita() {
        for per_capita in [false, true] {
            let state = FilterState {
                per_capita,
                ..FilterState::default()
            };
            let next = state.apply(FilterUpdate::SetSchoolAgeOnly(true));
            assert!(next.per_capita);
            assert!(next.school_age_only);
        }
    }

    #[test]
    fn disabling_per_capita_clears_school_age_only() {
        let state = FilterState::default().apply(FilterUpdate::SetSchoolAgeOnly(true));
        let next = state.apply(FilterUpdate::SetPerCapita(false));
        assert!(!next.per_capita);
        assert!(!next.school_age_only);
    }

    #[test]
    fn bac_data_forces_liceal() {
        let state = FilterState::default().apply(set_level("Liceal", false));
        let next = state.apply(FilterUpdate::SetInBacData(true));
        assert!(next.in_bac_data);
        assert!(next.levels.is_selected("Liceal"));
    }

    #[test]
    fn evaluare_data_forces_gimnazial() {
        let state = FilterState::default().apply(set_level("Gimnazial", false));
        let next = state.apply(FilterUpdate::SetInEvaluareData(true));
        assert!(next.in_evaluare_data);
        assert!(next.levels.is_selected("Gimnazial"));
    }

    #[test]
    fn turning_off_liceal_clears_bac_data() {
        let state = FilterState::default().apply(FilterUpdate::SetInBacData(true));
        assert!(state.in_bac_data);
        let next = state.apply(set_level("Liceal", false));
        assert!(!next.in_bac_data);
        assert!(!next.levels.is_selected("Liceal"));
    }

    #[test]
    fn turning_off_gimnazial_clears_evaluare_data() {
        let state = FilterState::default().apply(FilterUpdate::SetInEvaluareData(true));
        let next = state.apply(set_level("Gimnazial", false));
        assert!(!next.in_evaluare_data);
    }

    #[test]
    fn unrelated_level_keeps_dataset() {
        let state = FilterState::default().apply(FilterUpdate::SetInBacData(true));
        let next = state.apply(set_level("Primar", false));
        assert!(next.in_bac_data);
    }

    #[test]
    fn exam_dataset_enables_both_sources() {
        let state = FilterState::default()
            .apply(set_level("Liceal", false))
            .apply(set_level("Gimnazial", false));
        let next = state.apply(FilterUpdate::SetExamDataset(true));
        assert!(next.exam_dataset);
        assert!(next.in_bac_data);
        assert!(next.in_evaluare_data);
        assert!(next.levels.is_selected("Liceal"));
        assert!(next.levels.is_selected("Gimnazial"));
        assert_eq!(next.data_source(), DataSource::Bac);
    }

    #[test]
    fn data_source_switch_sets_both_flags() {
        let bac = FilterState::default().apply(FilterUpdate::SetDataSource(DataSource::Bac));
        assert!(bac.in_bac_data);
        assert!(!bac.in_evaluare_data);

        let en = bac.apply(FilterUpdate::SetDataSource(DataSource::Evaluare));
        assert!(!en.in_bac_data);
        assert!(en.in_evaluare_data);
        assert_eq!(en.data_source(), DataSource::Evaluare);

        let general = en.apply(FilterUpdate::SetDataSource(DataSource::General));
        assert_eq!(general.data_source(), DataSource::General);
    }

    #[test]
    fn json_town_without_county_is_dropped() {
        let orphan: FilterState = serde_json::from_str(r#"{"town":"Turda"}"#).unwrap();
        assert_eq!(orphan.town, None);
        assert_eq!(orphan, FilterState::default());

        let bucharest: FilterState =
            serde_json::from_str(r#"{"county":"B","town":"Sector 1"}"#).unwrap();
        assert_eq!(bucharest.county.as_deref(), Some("B"));
        assert_eq!(bucharest.town, None);

        let town: FilterState =
            serde_json::from_str(r#"{"county":"CJ","town":"Turda","perCapita":true}"#).unwrap();
        assert_eq!(town.resolved_town(), Some(("CJ", "Turda")));
        assert!(town.per_capita);
        assert_eq!(town.levels, FilterState::default().levels);
    }

    #[test]
    fn serialized_state_reads_back() {
        let state = FilterState::default().apply_all([
            FilterUpdate::SetCounty(Some("CJ".into())),
            FilterUpdate::SetTown(Some("Turda".into())),
            FilterUpdate::SetDataSource(DataSource::Bac),
            FilterUpdate::SetBacResult("Absent".into(), false),
        ]);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"inBacData\":true"));
        let back: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn changing_county_closes_town() {
        let state = FilterState::default()
            .apply(FilterUpdate::SetCounty(Some("CJ".into())))
            .apply(FilterUpdate::SetTown(Some("Cluj-Napoca".into())));
        assert_eq!(state.resolved_town(), Some(("CJ", "Cluj-Napoca")));

        let same = state.apply(FilterUpdate::SetCounty(Some("CJ".into())));
        assert_eq!(same.town.as_deref(), Some("Cluj-Napoca"));

        let other = state.apply(FilterUpdate::SetCounty(Some("AB".into())));
        assert_eq!(other.town, None);
        let country = state.apply(FilterUpdate::SetCounty(None));
        assert_eq!(country.town, None);
    }

    #[test]
    fn town_requires_a_county() {
        let state = FilterState::default().apply(FilterUpdate::SetTown(Some("Turda".into())));
        assert_eq!(state.town, None);
        assert_eq!(state.resolved_town(), None);
    }

    #[test]
    fn bucharest_has_no_town_view() {
        let state = FilterState::default()
            .apply(FilterUpdate::SetCounty(Some("B".into())))
            .apply(FilterUpdate::SetTown(Some("Sector 1".into())));
        assert_eq!(state.town, None);
    }

    #[test]
    fn unknown_selection_names_are_created() {
        let state = FilterState::default()
            .apply(FilterUpdate::SetLanguage("franceză".into(), true))
            .apply(FilterUpdate::SetBacResult("Neprezentat".into(), true));
        assert!(state.languages.is_selected("franceză"));
        assert!(state.bac_results.is_selected("Neprezentat"));
    }

    #[test]
    fn apply_all_folds_in_order() {
        let state = FilterState::default().apply_all([
            FilterUpdate::SetInBacData(true),
            set_level("Liceal", false),
            FilterUpdate::SetStrictLevelLanguage(true),
        ]);
        assert!(!state.in_bac_data);
        assert!(state.strict_level_language);
    }

    #[test]
    fn partial_preset_fills_defaults() {
        let state: FilterState =
            serde_json::from_str(r#"{"county":"CJ","perCapita":true,"levels":{"Liceal":true}}"#)
                .unwrap();
        assert_eq!(state.county.as_deref(), Some("CJ"));
        assert!(state.per_capita);
        assert_eq!(state.levels.selected(), vec!["Liceal"]);
        assert!(state.languages.is_selected("română"));
    }

    #[test]
    fn map_type_parsing() {
        assert_eq!("grades".parse::<MapType>(), Ok(MapType::Grades));
        assert!("towns".parse::<MapType>().is_err());
        assert!(MapType::Students.for_students());
        assert!(!MapType::Schools.for_students());
        assert_eq!(MapType::Students.to_string(), "students");
        assert_eq!("en".parse::<DataSource>(), Ok(DataSource::Evaluare));
    }
}
