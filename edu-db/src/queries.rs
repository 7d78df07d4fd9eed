//! Execution of compiled queries against the in-memory database.
//!
//! The compiler decides the column layout through [`RowShape`]; the methods
//! here only bind the parameters and read the rows back into
//! [`crate::models`].

use crate::models::{AggregateRow, SchoolRecord};
use crate::sql::{CompiledQuery, Grouping, RowShape};
use crate::Database;
use anyhow::bail;
use rusqlite::params_from_iter;

const TABLES: [&str; 4] = ["school_info", "student_stats", "bac_2024", "en_2024"];

impl Database {
    /// Runs a map query. Regions whose value is NULL (for example an average
    /// over candidates without grades) are left out.
    pub fn query_aggregate(&self, query: &CompiledQuery) -> anyhow::Result<Vec<AggregateRow>> {
        let RowShape::Regions { grouping, .. } = query.shape else {
            bail!("query_aggregate expects a region query, got {:?}", query.shape);
        };
        let value_index = match grouping {
            Grouping::County => 1,
            Grouping::Town => 2,
        };

        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                let value: Option<f64> = row.get(value_index)?;
                let county: String = row.get(0)?;
                let town = match grouping {
                    Grouping::County => None,
                    Grouping::Town => Some(row.get(1)?),
                };
                Ok(value.map(|value| AggregateRow {
                    county,
                    town,
                    value,
                }))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let rows: Vec<AggregateRow> = rows.into_iter().flatten().collect();
        if rows.len() < total {
            log::debug!(
                "[EDU Debug] query: dropped {} regions without a value",
                total - rows.len()
            );
        }
        log::info!(
            "[EDU Debug] query: query_aggregate returned {} regions",
            rows.len()
        );
        Ok(rows)
    }

    /// Runs a roster query, ordered by school name.
    pub fn query_roster(&self, query: &CompiledQuery) -> anyhow::Result<Vec<SchoolRecord>> {
        if query.shape != RowShape::Schools {
            bail!("query_roster expects a school query, got {:?}", query.shape);
        }

        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&query.sql)?;
        let raw = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                let total: Option<i64> = row.get(8)?;
                Ok((
                    SchoolRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        county: row.get(2)?,
                        town: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        phone: row.get(4)?,
                        email: row.get(5)?,
                        street: row.get(6)?,
                        number: row.get(7)?,
                        total_students: total.unwrap_or(0).max(0) as u64,
                        levels: Vec::new(),
                        languages: Vec::new(),
                    },
                    row.get::<_, Option<String>>(9)?,
                    row.get::<_, Option<String>>(10)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut schools = Vec::with_capacity(raw.len());
        for (mut school, levels, languages) in raw {
            school.levels = parse_json_list(levels.as_deref())?;
            school.languages = parse_json_list(languages.as_deref())?;
            schools.push(school);
        }
        log::info!(
            "[EDU Debug] query: query_roster returned {} schools",
            schools.len()
        );
        Ok(schools)
    }

    /// Number of rows in one of the analytical tables.
    pub fn count_rows(&self, table: &str) -> anyhow::Result<u64> {
        if !TABLES.contains(&table) {
            bail!("unknown table: {table}");
        }
        let conn = self.conn.borrow();
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Parses a `json_group_array` result, dropping NULL members.
fn parse_json_list(json: Option<&str>) -> anyhow::Result<Vec<String>> {
    let Some(json) = json else {
        return Ok(Vec::new());
    };
    let items: Vec<Option<String>> = serde_json::from_str(json)?;
    let mut items: Vec<String> = items.into_iter().flatten().collect();
    items.sort();
    items.dedup();
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_map_query;
    use crate::fixtures::sample_db;
    use crate::roster::compile_roster_query;
    use edu_core::filters::{FilterState, FilterUpdate, MapType};
    use edu_core::selection::Selection;
    use std::collections::BTreeMap;

    fn values(rows: &[AggregateRow]) -> BTreeMap<String, f64> {
        rows.iter().map(|r| (r.key().to_string(), r.value)).collect()
    }

    fn only(names: &[&str], all: &Selection) -> Selection {
        Selection::from_names(all.names(), |name| names.contains(&name))
    }

    fn cluj_napoca() -> FilterState {
        FilterState::default().apply_all([
            FilterUpdate::SetCounty(Some("CJ".into())),
            FilterUpdate::SetTown(Some("Cluj-Napoca".into())),
        ])
    }

    #[test]
    fn default_school_counts_per_county() {
        let db = sample_db();
        let rows = db
            .query_aggregate(&compile_map_query(&FilterState::default(), MapType::Schools))
            .unwrap();
        let v = values(&rows);
        assert_eq!(v.len(), 3);
        assert_eq!(v["CJ"], 4.0);
        assert_eq!(v["AB"], 2.0);
        assert_eq!(v["HR"], 1.0);
        assert!(rows.iter().all(|r| r.town.is_none()));
    }

    #[test]
    fn high_schools_only_across_the_country() {
        let db = sample_db();
        let defaults = FilterState::default();
        let filters = FilterState {
            levels: only(&["Liceal"], &defaults.levels),
            ..defaults
        };
        let rows = db
            .query_aggregate(&compile_map_query(&filters, MapType::Schools))
            .unwrap();
        let v = values(&rows);
        assert_eq!(v["CJ"], 3.0);
        assert_eq!(v["AB"], 1.0);
        assert_eq!(v["HR"], 1.0);
    }

    #[test]
    fn county_scope_returns_towns() {
        let db = sample_db();
        let filters = FilterState::default().apply(FilterUpdate::SetCounty(Some("CJ".into())));
        let rows = db
            .query_aggregate(&compile_map_query(&filters, MapType::Schools))
            .unwrap();
        let v = values(&rows);
        assert_eq!(v.len(), 2);
        assert_eq!(v["Cluj-Napoca"], 3.0);
        assert_eq!(v["Turda"], 1.0);
        assert!(rows.iter().all(|r| r.county == "CJ"));
    }

    #[test]
    fn student_sums_follow_level_filter() {
        let db = sample_db();
        let rows = db
            .query_aggregate(&compile_map_query(&FilterState::default(), MapType::Students))
            .unwrap();
        let v = values(&rows);
        assert_eq!(v["CJ"], 1830.0);
        assert_eq!(v["AB"], 720.0, "Profesional is not selected by default");
        assert_eq!(v["HR"], 480.0);
    }

    #[test]
    fn strict_mode_is_a_subset_of_independent_mode() {
        let db = sample_db();
        let defaults = FilterState::default();
        let independent = FilterState {
            levels: only(&["Gimnazial"], &defaults.levels),
            languages: only(&["maghiară"], &defaults.languages),
            ..defaults
        };
        let strict = FilterState {
            strict_level_language: true,
            ..independent.clone()
        };

        let loose = values(
            &db.query_aggregate(&compile_map_query(&independent, MapType::Schools))
                .unwrap(),
        );
        let tight = values(
            &db.query_aggregate(&compile_map_query(&strict, MapType::Schools))
                .unwrap(),
        );
        // school 2 teaches Gimnazial in română and Primar in maghiară,
        // school 7 teaches Liceal in maghiară and Gimnazial in română
        assert_eq!(loose["CJ"], 2.0);
        assert_eq!(loose["HR"], 1.0);
        assert_eq!(tight["CJ"], 1.0);
        assert!(!tight.contains_key("HR"));
        for (key, value) in &tight {
            assert!(*value <= loose[key]);
        }
    }

    #[test]
    fn unrestricted_selections_match_everything() {
        let db = sample_db();
        let defaults = FilterState::default();
        let none = FilterState {
            levels: Selection::from_names(defaults.levels.names(), |_| false),
            languages: Selection::from_names(defaults.languages.names(), |_| false),
            ..defaults.clone()
        };
        let all = FilterState {
            levels: Selection::from_names(defaults.levels.names(), |_| true),
            languages: Selection::from_names(defaults.languages.names(), |_| true),
            ..defaults
        };
        for map_type in [MapType::Schools, MapType::Students] {
            let a = values(&db.query_aggregate(&compile_map_query(&none, map_type)).unwrap());
            let b = values(&db.query_aggregate(&compile_map_query(&all, map_type)).unwrap());
            assert_eq!(a, b, "{map_type} map differs");
        }
    }

    #[test]
    fn unrestricted_bac_selections_match_everything() {
        let db = sample_db();
        let defaults = FilterState::default()
            .apply(FilterUpdate::SetInBacData(true))
            .apply(FilterUpdate::SetCounty(Some("CJ".into())));
        let none = FilterState {
            bac_languages: Selection::from_names(defaults.bac_languages.names(), |_| false),
            bac_results: Selection::from_names(defaults.bac_results.names(), |_| false),
            ..defaults.clone()
        };
        let all = FilterState {
            bac_languages: Selection::from_names(defaults.bac_languages.names(), |_| true),
            bac_results: Selection::from_names(defaults.bac_results.names(), |_| true),
            ..defaults
        };
        for map_type in [MapType::Schools, MapType::Students, MapType::Grades] {
            let a = values(&db.query_aggregate(&compile_map_query(&none, map_type)).unwrap());
            let b = values(&db.query_aggregate(&compile_map_query(&all, map_type)).unwrap());
            assert_eq!(a, b, "{map_type} map differs");
        }

        let schools = values(&db.query_aggregate(&compile_map_query(&all, MapType::Schools)).unwrap());
        assert_eq!(schools.get("Cluj-Napoca"), Some(&2.0));
        assert_eq!(schools.get("Turda"), Some(&1.0), "explicit 'română' rows count when unrestricted");
    }

    #[test]
    fn bac_majority_language_excludes_explicit_romanian_rows() {
        let db = sample_db();
        let defaults = FilterState::default()
            .apply(FilterUpdate::SetInBacData(true))
            .apply(FilterUpdate::SetCounty(Some("CJ".into())));
        let filters = FilterState {
            bac_languages: only(&["română"], &defaults.bac_languages),
            ..defaults
        };
        let rows = db
            .query_aggregate(&compile_map_query(&filters, MapType::Schools))
            .unwrap();
        let v = values(&rows);
        assert_eq!(v.get("Cluj-Napoca"), Some(&1.0));
        assert!(!v.contains_key("Turda"), "school 4 only has an explicit 'română' row");
    }

    #[test]
    fn bac_candidates_and_grades() {
        let db = sample_db();
        let filters = FilterState::default().apply(FilterUpdate::SetInBacData(true));

        let students = values(
            &db.query_aggregate(&compile_map_query(&filters, MapType::Students))
                .unwrap(),
        );
        assert_eq!(students["CJ"], 5.0);
        assert_eq!(students["AB"], 1.0);

        let grades = values(
            &db.query_aggregate(&compile_map_query(&filters, MapType::Grades))
                .unwrap(),
        );
        assert!((grades["CJ"] - (8.5 + 5.2 + 9.1 + 7.0) / 4.0).abs() < 1e-9);
        assert!((grades["HR"] - 8.8).abs() < 1e-9);
        assert!(!grades.contains_key("AB"), "No graded candidates means no value");
    }

    #[test]
    fn evaluare_grades_average() {
        let db = sample_db();
        let filters = FilterState::default().apply(FilterUpdate::SetInEvaluareData(true));
        let grades = values(
            &db.query_aggregate(&compile_map_query(&filters, MapType::Grades))
                .unwrap(),
        );
        assert_eq!(grades.len(), 1);
        assert!((grades["CJ"] - (9.0 + 7.5 + 8.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn roster_lists_town_schools_by_name() {
        let db = sample_db();
        let query = compile_roster_query(&cluj_napoca()).unwrap();
        let schools = db.query_roster(&query).unwrap();

        let ids: Vec<&str> = schools.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);

        let avram = &schools[1];
        assert_eq!(avram.total_students, 500);
        assert_eq!(avram.levels, vec!["Gimnazial", "Liceal"]);
        assert_eq!(avram.languages, vec!["română"]);
        assert_eq!(avram.phone.as_deref(), Some("0264123456"));
        assert_eq!(avram.town, "Cluj-Napoca");

        let creanga = &schools[2];
        assert_eq!(creanga.languages, vec!["maghiară", "română"]);
        assert!(creanga.email.is_none());
    }

    #[test]
    fn strict_roster_is_a_subset_of_independent_roster() {
        let db = sample_db();
        let base = cluj_napoca();
        let independent = FilterState {
            levels: only(&["Gimnazial"], &base.levels),
            languages: only(&["maghiară"], &base.languages),
            ..base
        };
        let strict = independent.apply(FilterUpdate::SetStrictLevelLanguage(true));

        let loose = db
            .query_roster(&compile_roster_query(&independent).unwrap())
            .unwrap();
        let tight = db
            .query_roster(&compile_roster_query(&strict).unwrap())
            .unwrap();
        assert_eq!(loose.len(), 2);
        assert_eq!(tight.len(), 1);
        assert_eq!(tight[0].id, "3");
        assert!(tight.iter().all(|s| loose.contains(s)));
    }

    #[test]
    fn roster_without_statistics_has_zero_students() {
        let db = sample_db();
        db.load_schools("id,judet,localitate,nume\n99,CJ,Cluj-Napoca,Școala Nouă\n")
            .unwrap();
        let base = cluj_napoca();
        let filters = FilterState {
            levels: Selection::from_names(base.levels.names(), |_| false),
            languages: Selection::from_names(base.languages.names(), |_| false),
            ..base
        };
        let schools = db
            .query_roster(&compile_roster_query(&filters).unwrap())
            .unwrap();
        let new_school = schools.iter().find(|s| s.id == "99").unwrap();
        assert_eq!(new_school.total_students, 0);
        assert!(new_school.levels.is_empty());
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let db = sample_db();
        let roster = compile_roster_query(&cluj_napoca()).unwrap();
        assert!(db.query_aggregate(&roster).is_err());
        let map = compile_map_query(&FilterState::default(), MapType::Schools);
        assert!(db.query_roster(&map).is_err());
    }

    #[test]
    fn count_rows_rejects_unknown_tables() {
        let db = sample_db();
        assert_eq!(db.count_rows("school_info").unwrap(), 7);
        assert_eq!(db.count_rows("bac_2024").unwrap(), 7);
        assert!(db.count_rows("sqlite_master; DROP TABLE x").is_err());
    }
}
