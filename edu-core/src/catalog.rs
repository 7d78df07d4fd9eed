//! Known values for the filter menus and the county lookup table.
//!
//! Level and language names are the exact strings stored in the
//! `student_stats` and `bac_2024` tables, so they double as query values.

/// Level forced on when the baccalaureate dataset is selected.
pub const LICEAL: &str = "Liceal";

/// Level forced on when the national evaluation dataset is selected.
pub const GIMNAZIAL: &str = "Gimnazial";

/// Education levels enabled by default.
pub const MAIN_LEVELS: [&str; 3] = ["Primar", GIMNAZIAL, LICEAL];

/// Education levels disabled by default.
pub const OTHER_LEVELS: [&str; 4] = ["Profesional", "Postliceal", "Preșcolar", "Antepreșcolar"];

/// Instruction languages shown first in the menu.
pub const COMMON_LANGUAGES: [&str; 3] = ["română", "maghiară", "germană"];

pub const OTHER_LANGUAGES: [&str; 10] = [
    "romani (rromani)",
    "slovacă",
    "sârbă",
    "italiană",
    "engleză",
    "cehă",
    "croată",
    "ucraineană",
    "polonă",
    "bulgară",
];

/// The majority language. In the baccalaureate data it is never recorded
/// explicitly: a NULL `non_romanian_lang` means the candidate took it.
pub const MAJORITY_LANGUAGE: &str = "română";

/// Mother-tongue languages present in the baccalaureate data.
pub const BAC_LANGUAGES: [&str; 9] = [
    MAJORITY_LANGUAGE,
    "maghiară",
    "germană",
    "turcă",
    "croată",
    "slovacă",
    "italiană",
    "ucraineană",
    "sârbă",
];

/// Baccalaureate result categories.
pub const BAC_RESULTS: [&str; 4] = ["Promovat", "Nepromovat", "Eliminat", "Absent"];

/// Bucharest is split into sectors, not towns, so it has no town drill-down.
pub const BUCHAREST: &str = "B";

/// Every education level, main levels first.
pub fn all_levels() -> impl Iterator<Item = &'static str> {
    MAIN_LEVELS.iter().chain(OTHER_LEVELS.iter()).copied()
}

/// Every instruction language, common languages first.
pub fn all_languages() -> impl Iterator<Item = &'static str> {
    COMMON_LANGUAGES
        .iter()
        .chain(OTHER_LANGUAGES.iter())
        .copied()
}

/// County mnemonic and display name, as used by the boundary data.
pub static COUNTIES: [(&str, &str); 42] = [
    ("AB", "Alba"),
    ("AR", "Arad"),
    ("AG", "Argeș"),
    ("BC", "Bacău"),
    ("BH", "Bihor"),
    ("BN", "Bistrița-Năsăud"),
    ("BR", "Brăila"),
    ("BT", "Botoșani"),
    ("BV", "Brașov"),
    ("B", "București"),
    ("BZ", "Buzău"),
    ("CS", "Caraș-Severin"),
    ("CL", "Călărași"),
    ("CJ", "Cluj"),
    ("CT", "Constanța"),
    ("CV", "Covasna"),
    ("DB", "Dâmbovița"),
    ("DJ", "Dolj"),
    ("GL", "Galați"),
    ("GR", "Giurgiu"),
    ("GJ", "Gorj"),
    ("HR", "Harghita"),
    ("HD", "Hunedoara"),
    ("IL", "Ialomița"),
    ("IS", "Iași"),
    ("IF", "Ilfov"),
    ("MM", "Maramureș"),
    ("MH", "Mehedinți"),
    ("MS", "Mureș"),
    ("NT", "Neamț"),
    ("OT", "Olt"),
    ("PH", "Prahova"),
    ("SM", "Satu Mare"),
    ("SJ", "Sălaj"),
    ("SB", "Sibiu"),
    ("SV", "Suceava"),
    ("TR", "Teleorman"),
    ("TM", "Timiș"),
    ("TL", "Tulcea"),
    ("VS", "Vaslui"),
    ("VL", "Vâlcea"),
    ("VN", "Vrancea"),
];

/// Display name for a county mnemonic.
pub fn county_name(code: &str) -> Option<&'static str> {
    COUNTIES
        .iter()
        .find(|(mnemonic, _)| *mnemonic == code)
        .map(|(_, name)| *name)
}
