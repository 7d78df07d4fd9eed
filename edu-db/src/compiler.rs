//! Compiles a [`FilterState`] into the aggregation query behind the map.
//!
//! Every query starts from `school_info si` and is grouped by county, or by
//! town when a county is selected. One of three strategies adds the join and
//! filter clauses, picked by [`DataSource::resolve`]:
//!
//! - **general** (`student_stats`): level and language filters, joint or
//!   independent depending on `strict_level_language`;
//! - **bac** (`bac_2024`): mother-tongue language and result filters;
//! - **evaluare** (`en_2024`): no extra filters.
//!
//! School counts use semi-joins (`SELECT DISTINCT key`) purely for
//! existence. Student and grade maps join the detail rows directly so the
//! value expression can sum, count or average them.

use crate::sql::{CompiledQuery, Fragment, Grouping, JoinKind, RowShape, SqlBuilder};
use edu_core::catalog::MAJORITY_LANGUAGE;
use edu_core::filters::{DataSource, FilterState, MapType};
use edu_core::selection::Selection;

pub(crate) const SCHOOLS: &str = "school_info si";
const TOWN_KEY: &str = "COALESCE(si.localitate, 'Unknown')";

/// Builds the map query for `filters` and `map_type`. Never fails: an
/// unknown county simply yields no rows.
pub fn compile_map_query(filters: &FilterState, map_type: MapType) -> CompiledQuery {
    let source = filters.data_source();
    let for_students = map_type.for_students();
    let mut query = SqlBuilder::from(SCHOOLS);

    let grouping = match &filters.county {
        Some(county) => {
            query
                .select("si.judet")
                .select(&format!("{TOWN_KEY} AS localitate"))
                .filter(Fragment::eq("si.judet", county))
                .group_by("si.judet")
                .group_by(TOWN_KEY);
            Grouping::Town
        }
        None => {
            query.select("si.judet").group_by("si.judet");
            Grouping::County
        }
    };

    match source {
        DataSource::General if for_students => join_student_rows(&mut query, filters),
        DataSource::General => restrict_by_level_and_language(&mut query, filters),
        DataSource::Bac => {
            let condition = bac_condition(filters);
            if for_students {
                join_exam_rows(&mut query, "bac_2024", condition);
            } else {
                semi_join(&mut query, "bac_2024", "school_code", condition, "bac");
            }
        }
        DataSource::Evaluare => {
            if for_students {
                join_exam_rows(&mut query, "en_2024", None);
            } else {
                semi_join(&mut query, "en_2024", "school_code", None, "en");
            }
        }
    }

    let (value_expr, value_column) = value_expression(source, map_type);
    query.select(value_expr);

    let compiled = query.build(RowShape::Regions {
        grouping,
        value_column,
    });
    log::debug!(
        "[EDU Debug] compiler: {:?}/{} query:\n{}\nparams: {:?}",
        source,
        map_type,
        compiled.sql,
        compiled.params
    );
    compiled
}

/// Value column of the map query: `(expression, column name)`.
fn value_expression(source: DataSource, map_type: MapType) -> (&'static str, &'static str) {
    match (source, map_type) {
        (_, MapType::Schools) => (
            "CAST(COUNT(DISTINCT si.id) AS INTEGER) AS school_count",
            "school_count",
        ),
        // enrolment rows carry their own head count; there is no grade column
        (DataSource::General, _) => (
            "CAST(SUM(fs.numar_elevi) AS INTEGER) AS student_count",
            "student_count",
        ),
        (_, MapType::Students) => ("CAST(COUNT(*) AS INTEGER) AS student_count", "student_count"),
        (_, MapType::Grades) => (
            "CAST(AVG(x.mean_grade) FILTER (WHERE x.mean_grade IS NOT NULL) AS REAL) AS mean_grade",
            "mean_grade",
        ),
    }
}

/// Enrolment rows matching the level and language selections, filtered
/// row by row.
fn join_student_rows(query: &mut SqlBuilder, filters: &FilterState) {
    let mut rows = SqlBuilder::from("student_stats");
    rows.select("cod_siiir_unitate")
        .select("numar_elevi")
        .filter_opt(Fragment::in_list("nivel", &filters.levels.selected()))
        .filter_opt(Fragment::in_list(
            "limba_de_predare",
            &filters.languages.selected(),
        ));
    query.join(
        JoinKind::Inner,
        rows.to_fragment(),
        "fs",
        "fs.cod_siiir_unitate = si.id",
    );
}

/// Exam rows (one per candidate) joined as `x`.
fn join_exam_rows(query: &mut SqlBuilder, table: &str, condition: Option<Fragment>) {
    let mut rows = SqlBuilder::from(table);
    rows.filter_opt(condition);
    query.join(
        JoinKind::Inner,
        rows.to_fragment(),
        "x",
        "x.school_code = si.id",
    );
}

/// Keeps schools having at least one `table` row matching `condition`.
pub(crate) fn semi_join(
    query: &mut SqlBuilder,
    table: &str,
    key: &str,
    condition: Option<Fragment>,
    alias: &str,
) {
    let mut keys = SqlBuilder::from(table);
    keys.distinct().select(key).filter_opt(condition);
    query.join(
        JoinKind::Inner,
        keys.to_fragment(),
        alias,
        &format!("{alias}.{key} = si.id"),
    );
}

/// School-level level/language restriction shared by the map and the roster.
///
/// In strict mode, with both selections non-empty, each selected level needs
/// its own statistics row in one of the selected languages. Otherwise the
/// level and language conditions are independent semi-joins that may be
/// satisfied by different rows.
pub(crate) fn restrict_by_level_and_language(query: &mut SqlBuilder, filters: &FilterState) {
    let levels = filters.levels.selected();
    let languages = filters.languages.selected();

    if filters.strict_level_language && !levels.is_empty() && !languages.is_empty() {
        for level in &levels {
            let mut rows = SqlBuilder::from("student_stats");
            rows.select("1")
                .filter(Fragment::raw("cod_siiir_unitate = si.id"))
                .filter(Fragment::eq("nivel", level))
                .filter_opt(Fragment::in_list("limba_de_predare", &languages));
            query.filter(rows.to_fragment().exists());
        }
        return;
    }

    if let Some(condition) = Fragment::in_list("nivel", &levels) {
        semi_join(
            query,
            "student_stats",
            "cod_siiir_unitate",
            Some(condition),
            "lvl",
        );
    }
    if let Some(condition) = Fragment::in_list("limba_de_predare", &languages) {
        semi_join(
            query,
            "student_stats",
            "cod_siiir_unitate",
            Some(condition),
            "lng",
        );
    }
}

/// Language and result filter on `bac_2024` rows.
///
/// A selection with every box ticked adds no clause, exactly like one with
/// none ticked.
pub(crate) fn bac_condition(filters: &FilterState) -> Option<Fragment> {
    Fragment::all([
        bac_language_condition(&filters.bac_languages),
        filters
            .bac_results
            .restriction()
            .and_then(|results| Fragment::in_list("result", &results)),
    ])
}

/// The majority language is stored as a NULL `non_romanian_lang`, so
/// selecting it matches NULL rows; an explicit `'română'` value is not a
/// majority-language row and never matches through that branch.
fn bac_language_condition(languages: &Selection) -> Option<Fragment> {
    let picked = languages.restriction()?;
    let minorities: Vec<&str> = picked
        .iter()
        .copied()
        .filter(|language| *language != MAJORITY_LANGUAGE)
        .collect();
    let minority_condition = Fragment::in_list("non_romanian_lang", &minorities);

    if picked.contains(&MAJORITY_LANGUAGE) {
        let majority = Fragment::raw("non_romanian_lang IS NULL");
        Some(
            match minority_condition {
                Some(minority) => majority.or(minority),
                None => majority,
            }
            .grouped(),
        )
    } else {
        minority_condition
    }
}
