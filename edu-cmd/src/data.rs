//! Loading a data directory into the in-memory engine.
//!
//! Expected layout (each table as plain or gzip-compressed CSV):
//!
//! ```text
//! data/
//!   school_info.csv[.gz]      required
//!   student_stats.csv[.gz]
//!   bac_2024.csv[.gz]
//!   en_2024.csv[.gz]
//!   demographics.json
//! ```

use anyhow::Context;
use edu_core::demographics::Demographics;
use edu_db::Database;
use flate2::read::GzDecoder;
use log::{info, warn};
use std::io::Read;
use std::path::Path;

/// Reads `<name>.csv`, falling back to `<name>.csv.gz`. `None` when
/// neither exists.
pub fn read_table(dir: &Path, name: &str) -> anyhow::Result<Option<String>> {
    let plain = dir.join(format!("{name}.csv"));
    if plain.exists() {
        let text = std::fs::read_to_string(&plain)
            .with_context(|| format!("Failed to read {}", plain.display()))?;
        return Ok(Some(text));
    }

    let gz = dir.join(format!("{name}.csv.gz"));
    if gz.exists() {
        let file =
            std::fs::File::open(&gz).with_context(|| format!("Failed to open {}", gz.display()))?;
        let mut text = String::new();
        GzDecoder::new(file)
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to decompress {}", gz.display()))?;
        return Ok(Some(text));
    }

    Ok(None)
}

/// Builds the database from the tables found in `dir`.
pub fn load_database(dir: &Path) -> anyhow::Result<Database> {
    let db = Database::new()?;

    let schools = read_table(dir, "school_info")?
        .with_context(|| format!("No school_info.csv in {}", dir.display()))?;
    db.load_schools(&schools)?;

    type Loader = fn(&Database, &str) -> anyhow::Result<()>;
    let optional: [(&str, Loader); 3] = [
        ("student_stats", Database::load_student_stats),
        ("bac_2024", Database::load_bac_results),
        ("en_2024", Database::load_evaluare_results),
    ];
    for (table, load) in optional {
        match read_table(dir, table)? {
            Some(csv) => load(&db, &csv).with_context(|| format!("Failed to load {table}"))?,
            None => warn!("[EDU] data: {table} not found in {}, table left empty", dir.display()),
        }
    }

    info!(
        "[EDU] data: {} schools, {} enrolment rows, {} bac candidates, {} evaluation candidates",
        db.count_rows("school_info")?,
        db.count_rows("student_stats")?,
        db.count_rows("bac_2024")?,
        db.count_rows("en_2024")?,
    );
    Ok(db)
}

/// Reads `demographics.json`; without it per-capita maps come out empty.
pub fn load_demographics(dir: &Path) -> anyhow::Result<Demographics> {
    let path = dir.join("demographics.json");
    if !path.exists() {
        warn!("[EDU] data: {} not found", path.display());
        return Ok(Demographics::default());
    }
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Demographics::from_json(&json)
}
