//! Filter flags shared by the subcommands.
//!
//! Flags are turned into [`FilterUpdate`]s and applied on top of the
//! defaults (or a JSON preset), so the same cascades as in the interactive
//! map apply: `--source bac` still switches the `Liceal` level on.

use anyhow::Context;
use clap::Args;
use edu_core::filters::{DataSource, FilterState, FilterUpdate};
use edu_core::selection::Selection;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// JSON filter preset (camelCase FilterState fields) applied before the flags
    #[arg(long = "filters")]
    pub preset: Option<PathBuf>,

    /// County mnemonic, e.g. CJ; groups the map by town
    #[arg(short = 'c', long)]
    pub county: Option<String>,

    /// Town inside the county, for the school roster
    #[arg(short = 't', long)]
    pub town: Option<String>,

    /// Education level to keep (repeatable); replaces the level selection
    #[arg(long = "level")]
    pub levels: Vec<String>,

    /// Instruction language to keep (repeatable); replaces the language selection
    #[arg(long = "language")]
    pub languages: Vec<String>,

    /// Baccalaureate mother-tongue language to keep (repeatable)
    #[arg(long = "bac-language")]
    pub bac_languages: Vec<String>,

    /// Baccalaureate result to keep (repeatable)
    #[arg(long = "bac-result")]
    pub bac_results: Vec<String>,

    /// Require level and language to match on the same enrolment row
    #[arg(long)]
    pub strict: bool,

    /// Divide by population (per 10 000 for counties, 1 000 for towns)
    #[arg(long)]
    pub per_capita: bool,

    /// Divide by the 5-19 population only (implies --per-capita)
    #[arg(long)]
    pub school_age_only: bool,

    /// Turn on both exam datasets
    #[arg(long)]
    pub exam_dataset: bool,

    /// Data source: general, bac or en
    #[arg(short = 's', long)]
    pub source: Option<DataSource>,
}

impl FilterArgs {
    pub fn to_state(&self) -> anyhow::Result<FilterState> {
        let base = match &self.preset {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read filter preset {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("Invalid filter preset {}", path.display()))?
            }
            None => FilterState::default(),
        };
        Ok(base.apply_all(self.updates(&base)))
    }

    fn updates(&self, base: &FilterState) -> Vec<FilterUpdate> {
        let mut updates = Vec::new();
        if self.county.is_some() {
            updates.push(FilterUpdate::SetCounty(self.county.clone()));
        }
        if self.town.is_some() {
            updates.push(FilterUpdate::SetTown(self.town.clone()));
        }

        // a flag list replaces the whole selection
        for (wanted, current, update) in [
            (
                &self.levels,
                &base.levels,
                FilterUpdate::SetLevel as fn(String, bool) -> FilterUpdate,
            ),
            (&self.languages, &base.languages, FilterUpdate::SetLanguage),
            (&self.bac_languages, &base.bac_languages, FilterUpdate::SetBacLanguage),
            (&self.bac_results, &base.bac_results, FilterUpdate::SetBacResult),
        ] {
            updates.extend(replace_selection(wanted, current, update));
        }

        if self.strict {
            updates.push(FilterUpdate::SetStrictLevelLanguage(true));
        }
        if self.per_capita {
            updates.push(FilterUpdate::SetPerCapita(true));
        }
        if self.school_age_only {
            updates.push(FilterUpdate::SetSchoolAgeOnly(true));
        }
        if self.exam_dataset {
            updates.push(FilterUpdate::SetExamDataset(true));
        }
        if let Some(source) = self.source {
            updates.push(FilterUpdate::SetDataSource(source));
        }
        updates
    }
}

fn replace_selection(
    wanted: &[String],
    current: &Selection,
    update: fn(String, bool) -> FilterUpdate,
) -> Vec<FilterUpdate> {
    if wanted.is_empty() {
        return Vec::new();
    }
    let mut updates: Vec<FilterUpdate> = wanted
        .iter()
        .map(|name| update(name.clone(), true))
        .collect();
    updates.extend(
        current
            .names()
            .filter(|name| !wanted.iter().any(|w| w.as_str() == *name))
            .map(|name| update(name.to_string(), false)),
    );
    updates
}
