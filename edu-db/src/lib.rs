//! Query compiler and in-memory SQLite engine for Romanian education data.
//!
//! The crate has two halves:
//!
//! - a pure compiler ([`compiler::compile_map_query`],
//!   [`roster::compile_roster_query`]) that turns a
//!   [`FilterState`](edu_core::filters::FilterState) into parameterized SQL
//!   built with [`sql::SqlBuilder`];
//! - [`Database`], an in-memory SQLite database holding the four analytical
//!   tables and implementing [`engine::AnalyticsEngine`].
//!
//! # Usage
//!
//! ```rust
//! use edu_core::filters::{FilterState, MapType};
//! use edu_db::{compiler::compile_map_query, Database};
//!
//! let db = Database::new().unwrap();
//! db.load_schools("id,judet,localitate,nume\n1,CJ,Turda,Liceul Teoretic\n").unwrap();
//! db.load_student_stats("cod_siiir_unitate,nivel,limba_de_predare,numar_elevi\n1,Liceal,română,300\n").unwrap();
//!
//! let query = compile_map_query(&FilterState::default(), MapType::Schools);
//! let rows = db.query_aggregate(&query).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].value, 1.0);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod compiler;
pub mod engine;
mod loader;
pub mod models;
mod queries;
pub mod roster;
pub mod schema;
pub mod sql;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database with the analytical tables.
///
/// Cheaply cloneable (via `Rc`); the handle is opened once and passed to
/// whoever needs it. It is single-threaded by construction.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::Database;

    pub const SCHOOLS: &str = "\
id,judet,localitate,nume,telefon,email,strada,numar
1,CJ,Cluj-Napoca,Liceul Teoretic Avram Iancu,0264123456,avram@example.ro,Republicii,9
2,CJ,Cluj-Napoca,Școala Gimnazială Ion Creangă,,,,
3,CJ,Cluj-Napoca,Liceul Teoretic Apáczai Csere János,,,,
4,CJ,Turda,Colegiul Național Mihai Viteazul,,,,
5,AB,Alba Iulia,Colegiul Național Horea Cloșca și Crișan,,,,
6,AB,Blaj,Școala Primară Blaj,,,,
7,HR,Miercurea Ciuc,Márton Áron Főgimnázium,,,,
";

    pub const STUDENT_STATS: &str = "\
cod_siiir_unitate,nivel,limba_de_predare,numar_elevi
1,Liceal,română,400
1,Gimnazial,română,100
2,Gimnazial,română,250
2,Primar,maghiară,80
3,Liceal,maghiară,350
3,Gimnazial,maghiară,150
4,Liceal,română,500
5,Liceal,română,600
5,Profesional,română,50
6,Primar,română,120
7,Liceal,maghiară,450
7,Gimnazial,română,30
";

    pub const BAC: &str = "\
school_code,sex,non_romanian_lang,result,mean_grade
1,F,,Promovat,8.5
1,M,,Nepromovat,5.2
3,F,maghiară,Promovat,9.1
3,M,maghiară,Absent,
4,F,română,Promovat,7.0
5,M,,Eliminat,
7,F,maghiară,Promovat,8.8
";

    pub const EN: &str = "\
school_code,sex,mean_grade
1,F,9.0
2,M,7.5
2,F,8.0
3,F,
";

    pub fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_schools(SCHOOLS).unwrap();
        db.load_student_stats(STUDENT_STATS).unwrap();
        db.load_bac_results(BAC).unwrap();
        db.load_evaluare_results(EN).unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_creates_successfully() {
        let db = Database::new();
        assert!(db.is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_schools("id,judet,localitate,nume\n1,CJ,Turda,Liceu\n")
            .unwrap();
        assert_eq!(
            db2.count_rows("school_info").unwrap(),
            1,
            "Clone should see same data via shared Rc"
        );
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        assert_eq!(db.count_rows("school_info").unwrap(), 0);
    }
}
