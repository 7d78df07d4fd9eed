//! CSV data loading functions for populating the in-memory SQLite database.
//!
//! Every file has a header row; columns are matched by name and unknown
//! columns are ignored, so the full exports can be loaded as they are.
//!
//! # CSV Formats
//!
//! - **Schools**: `id,judet,localitate,nume,telefon,email,strada,numar`
//! - **Student statistics**: `cod_siiir_unitate,nivel,limba_de_predare,numar_elevi`
//! - **Baccalaureate**: `school_code,sex,profil,non_romanian_lang,foreign_lang,result,mean_grade`
//! - **National evaluation**: `school_code,sex,ro_grade,math_grade,mean_grade,mean_grade_school`
//!
//! Text is cleaned on the way in: cedilla diacritics (`ş`, `ţ`) become the
//! comma-below forms used everywhere else, and language names written as
//! `Limba Maghiară` are reduced to `maghiară`.

use crate::Database;
use rusqlite::params;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SchoolRow {
    id: String,
    judet: String,
    localitate: Option<String>,
    nume: String,
    telefon: Option<String>,
    email: Option<String>,
    strada: Option<String>,
    numar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StudentStatsRow {
    cod_siiir_unitate: String,
    nivel: String,
    limba_de_predare: Option<String>,
    numar_elevi: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BacRow {
    school_code: String,
    sex: Option<String>,
    profil: Option<String>,
    non_romanian_lang: Option<String>,
    foreign_lang: Option<String>,
    result: Option<String>,
    mean_grade: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EvaluareRow {
    school_code: String,
    sex: Option<String>,
    ro_grade: Option<f64>,
    math_grade: Option<f64>,
    mean_grade: Option<f64>,
    mean_grade_school: Option<f64>,
}

impl Database {
    /// Load the school directory.
    ///
    /// # Example CSV
    /// ```text
    /// id,judet,localitate,nume,telefon,email,strada,numar
    /// 1261104567,CJ,Turda,Colegiul Național Mihai Viteazul,0264311000,,Avram Iancu,1
    /// ```
    pub fn load_schools(&self, csv_data: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let mut count = 0u32;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO school_info
                 (id, judet, localitate, nume, telefon, email, strada, numar)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in read_rows::<SchoolRow>(csv_data) {
                let r = row?;
                stmt.execute(params![
                    r.id,
                    r.judet,
                    r.localitate.map(|s| normalize_diacritics(&s)),
                    normalize_diacritics(&r.nume),
                    r.telefon,
                    r.email,
                    r.strada.map(|s| normalize_diacritics(&s)),
                    r.numar,
                ])?;
                count += 1;
            }
        }
        tx.commit()?;
        log::info!("[EDU Debug] loader: Loaded {} schools", count);
        Ok(())
    }

    /// Load enrolment statistics. Rows that fail to parse (for example a
    /// non-numeric head count) are skipped.
    ///
    /// # Example CSV
    /// ```text
    /// cod_siiir_unitate,nivel,limba_de_predare,numar_elevi
    /// 1261104567,Liceal,Limba Română,812
    /// ```
    pub fn load_student_stats(&self, csv_data: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let (mut count, mut skipped) = (0u32, 0u32);
        {
            let mut stmt = tx.prepare(
                "INSERT INTO student_stats (cod_siiir_unitate, nivel, limba_de_predare, numar_elevi)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in read_rows::<StudentStatsRow>(csv_data) {
                let r = match row {
                    Ok(r) => r,
                    Err(e) => {
                        log::debug!("[EDU Debug] loader: skipping student_stats row: {e}");
                        skipped += 1;
                        continue;
                    }
                };
                stmt.execute(params![
                    r.cod_siiir_unitate,
                    normalize_diacritics(&r.nivel),
                    r.limba_de_predare.map(|l| simplify_language(&l)),
                    r.numar_elevi.unwrap_or(0).max(0),
                ])?;
                count += 1;
            }
        }
        tx.commit()?;
        log::info!(
            "[EDU Debug] loader: Loaded {} student_stats rows, skipped {} invalid",
            count,
            skipped
        );
        Ok(())
    }

    /// Load baccalaureate candidates. An empty `non_romanian_lang` means
    /// the candidate took the majority-language exam and is stored as NULL.
    ///
    /// # Example CSV
    /// ```text
    /// school_code,sex,non_romanian_lang,result,mean_grade
    /// 1261104567,F,,Promovat,8.45
    /// 1961100123,M,Limba Maghiară,Absent,
    /// ```
    pub fn load_bac_results(&self, csv_data: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let (mut count, mut skipped) = (0u32, 0u32);
        {
            let mut stmt = tx.prepare(
                "INSERT INTO bac_2024
                 (school_code, sex, profil, non_romanian_lang, foreign_lang, result, mean_grade)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in read_rows::<BacRow>(csv_data) {
                let r = match row {
                    Ok(r) => r,
                    Err(e) => {
                        log::debug!("[EDU Debug] loader: skipping bac_2024 row: {e}");
                        skipped += 1;
                        continue;
                    }
                };
                stmt.execute(params![
                    r.school_code,
                    r.sex,
                    r.profil,
                    r.non_romanian_lang.map(|l| simplify_language(&l)),
                    r.foreign_lang.map(|l| simplify_language(&l)),
                    r.result,
                    r.mean_grade,
                ])?;
                count += 1;
            }
        }
        tx.commit()?;
        log::info!(
            "[EDU Debug] loader: Loaded {} bac_2024 rows, skipped {} invalid",
            count,
            skipped
        );
        Ok(())
    }

    /// Load national evaluation candidates.
    ///
    /// # Example CSV
    /// ```text
    /// school_code,sex,ro_grade,math_grade,mean_grade,mean_grade_school
    /// 1261104567,F,9.10,8.50,8.80,9.35
    /// ```
    pub fn load_evaluare_results(&self, csv_data: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let (mut count, mut skipped) = (0u32, 0u32);
        {
            let mut stmt = tx.prepare(
                "INSERT INTO en_2024
                 (school_code, sex, ro_grade, math_grade, mean_grade, mean_grade_school)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in read_rows::<EvaluareRow>(csv_data) {
                let r = match row {
                    Ok(r) => r,
                    Err(e) => {
                        log::debug!("[EDU Debug] loader: skipping en_2024 row: {e}");
                        skipped += 1;
                        continue;
                    }
                };
                stmt.execute(params![
                    r.school_code,
                    r.sex,
                    r.ro_grade,
                    r.math_grade,
                    r.mean_grade,
                    r.mean_grade_school,
                ])?;
                count += 1;
            }
        }
        tx.commit()?;
        log::info!(
            "[EDU Debug] loader: Loaded {} en_2024 rows, skipped {} invalid",
            count,
            skipped
        );
        Ok(())
    }
}

fn read_rows<'a, T: DeserializeOwned + 'a>(
    csv_data: &'a str,
) -> impl Iterator<Item = Result<T, csv::Error>> + 'a {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes())
        .into_deserialize()
}

/// Replaces cedilla diacritics with their comma-below forms.
fn normalize_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ş' => 'ș',
            'Ş' => 'Ș',
            'ţ' => 'ț',
            'Ţ' => 'Ț',
            other => other,
        })
        .collect()
}

/// `"Limba Maghiară"` → `"maghiară"`; other values only get their
/// diacritics normalised.
fn simplify_language(language: &str) -> String {
    let language = normalize_diacritics(language);
    match language.strip_prefix("Limba ") {
        Some(name) => name.to_lowercase(),
        None => language,
    }
}
