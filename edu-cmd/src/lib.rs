//! Command implementations for the education map CLI.
//!
//! Provides subcommands for inspecting the compiled SQL, computing the
//! coloured map for a filter state and listing the schools of a town.

use clap::Subcommand;
use edu_core::filters::MapType;
use std::path::PathBuf;

pub mod args;
pub mod data;
pub mod report;

use args::FilterArgs;

#[derive(Subcommand)]
pub enum Command {
    /// Print the SQL compiled for a filter state, without touching any data
    Sql {
        #[command(flatten)]
        filters: FilterArgs,

        /// Statistic to aggregate: schools, students or grades
        #[arg(short = 'm', long, default_value_t = MapType::Schools)]
        map_type: MapType,

        /// Compile the town roster query instead of the map query
        #[arg(long)]
        roster: bool,
    },

    /// Compute per-region values, legend and colours as JSON
    Map {
        /// Directory holding school_info.csv, student_stats.csv, ... and demographics.json
        #[arg(short = 'd', long)]
        data_dir: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Statistic to aggregate: schools, students or grades
        #[arg(short = 'm', long, default_value_t = MapType::Schools)]
        map_type: MapType,

        /// JSON colour settings (ramp, fallback_color, empty_color)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the schools of a town (requires --county and --town)
    Roster {
        /// Directory holding school_info.csv, student_stats.csv, ... and demographics.json
        #[arg(short = 'd', long)]
        data_dir: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Sql {
            filters,
            map_type,
            roster,
        } => report::run_sql(&filters, map_type, roster),
        Command::Map {
            data_dir,
            filters,
            map_type,
            config,
        } => report::run_map(&data_dir, &filters, map_type, config.as_deref()).await,
        Command::Roster { data_dir, filters } => report::run_roster(&data_dir, &filters).await,
    }
}
