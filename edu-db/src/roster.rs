//! Row-level school listing for the town detail view.
//!
//! Unlike the map query this returns one row per matching school, annotated
//! with its total enrolment and the distinct levels and languages found in
//! `student_stats`. The same dataset precedence and filters as the map
//! apply.

use crate::compiler::{bac_condition, restrict_by_level_and_language, semi_join, SCHOOLS};
use crate::sql::{CompiledQuery, Fragment, JoinKind, RowShape, SqlBuilder};
use edu_core::filters::{DataSource, FilterState};

/// Builds the roster query, or `None` when no town is open.
pub fn compile_roster_query(filters: &FilterState) -> Option<CompiledQuery> {
    let (county, town) = filters.resolved_town()?;

    let mut stats = SqlBuilder::from("student_stats");
    stats
        .select("cod_siiir_unitate")
        .select("SUM(numar_elevi) AS total_elevi")
        .select("json_group_array(DISTINCT nivel) AS nivele")
        .select("json_group_array(DISTINCT limba_de_predare) AS limbi")
        .group_by("cod_siiir_unitate");

    let mut query = SqlBuilder::from(SCHOOLS);
    for column in [
        "si.id",
        "si.nume",
        "si.judet",
        "si.localitate",
        "si.telefon",
        "si.email",
        "si.strada",
        "si.numar",
        "stats.total_elevi",
        "stats.nivele",
        "stats.limbi",
    ] {
        query.select(column);
    }
    query
        .join(
            JoinKind::Left,
            stats.to_fragment(),
            "stats",
            "stats.cod_siiir_unitate = si.id",
        )
        .filter(Fragment::eq("si.judet", county))
        .filter(Fragment::eq("si.localitate", town));

    match filters.data_source() {
        DataSource::Bac => semi_join(
            &mut query,
            "bac_2024",
            "school_code",
            bac_condition(filters),
            "bac",
        ),
        DataSource::Evaluare => semi_join(&mut query, "en_2024", "school_code", None, "en"),
        DataSource::General => restrict_by_level_and_language(&mut query, filters),
    }

    query.order_by("si.nume");
    let compiled = query.build(RowShape::Schools);
    log::debug!(
        "[EDU Debug] roster: query for {town} ({county}):\n{}\nparams: {:?}",
        compiled.sql,
        compiled.params
    );
    Some(compiled)
}
