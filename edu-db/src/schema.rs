//! SQL schema definitions for the in-memory SQLite database.
//!
//! The four analytical tables mirror the published parquet exports. Column
//! names keep their Romanian source names because the query compiler
//! addresses them directly.

/// Returns the full SQL schema as a single batch string.
///
/// - `school_info` - one row per school (SIIIR code, county, town, contact)
/// - `student_stats` - enrolment per school, level and instruction language
/// - `bac_2024` - one row per baccalaureate candidate
/// - `en_2024` - one row per national evaluation candidate
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS school_info (
        id TEXT PRIMARY KEY,
        judet TEXT NOT NULL,
        localitate TEXT,
        nume TEXT NOT NULL,
        telefon TEXT,
        email TEXT,
        strada TEXT,
        numar TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_school_scope ON school_info(judet, localitate);

    CREATE TABLE IF NOT EXISTS student_stats (
        cod_siiir_unitate TEXT NOT NULL,
        nivel TEXT NOT NULL,
        limba_de_predare TEXT,
        numar_elevi INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_stats_school ON student_stats(cod_siiir_unitate);

    CREATE TABLE IF NOT EXISTS bac_2024 (
        school_code TEXT NOT NULL,
        sex TEXT,
        profil TEXT,
        non_romanian_lang TEXT,
        foreign_lang TEXT,
        result TEXT,
        mean_grade REAL
    );
    CREATE INDEX IF NOT EXISTS idx_bac_school ON bac_2024(school_code);

    CREATE TABLE IF NOT EXISTS en_2024 (
        school_code TEXT NOT NULL,
        sex TEXT,
        ro_grade REAL,
        math_grade REAL,
        mean_grade REAL,
        mean_grade_school REAL
    );
    CREATE INDEX IF NOT EXISTS idx_en_school ON en_2024(school_code);
    "#
}
