//! Subcommand bodies. Everything is printed to stdout as pretty JSON.

use crate::args::FilterArgs;
use crate::data;
use anyhow::Context;
use edu_core::filters::MapType;
use edu_db::compiler::compile_map_query;
use edu_db::roster::compile_roster_query;
use edu_map::config::MapConfig;
use edu_map::session::MapSession;
use log::info;
use serde_json::json;
use std::path::Path;

pub fn run_sql(args: &FilterArgs, map_type: MapType, roster: bool) -> anyhow::Result<()> {
    let filters = args.to_state()?;
    let query = if roster {
        compile_roster_query(&filters).context("The roster query needs --county and --town")?
    } else {
        compile_map_query(&filters, map_type)
    };
    println!("{}", serde_json::to_string_pretty(&query)?);
    Ok(())
}

pub async fn run_map(
    data_dir: &Path,
    args: &FilterArgs,
    map_type: MapType,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let filters = args.to_state()?;
    let session = open_session(data_dir, load_config(config)?)?;

    let view = session
        .refresh(&filters, map_type)
        .await
        .context("Map request was superseded")?;
    info!(
        "Map {} for {}: {} regions",
        map_type,
        view.legend.subtitle,
        view.values.len()
    );

    let output = json!({
        "filters": filters,
        "mapType": view.map_type,
        "values": view.values,
        "legend": view.legend,
        "fill": view.fill_expression(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn run_roster(data_dir: &Path, args: &FilterArgs) -> anyhow::Result<()> {
    let filters = args.to_state()?;
    let (county, town) = filters
        .resolved_town()
        .context("The roster needs --county and --town")?;
    let session = open_session(data_dir, MapConfig::default())?;

    let schools = session
        .roster(&filters)
        .await
        .context("Roster request was superseded")?;
    info!("Roster for {} ({}): {} schools", town, county, schools.len());

    let output = json!({
        "county": county,
        "town": town,
        "profile": session.town_profile(&filters),
        "schools": schools,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn open_session(
    data_dir: &Path,
    config: MapConfig,
) -> anyhow::Result<MapSession<edu_db::Database>> {
    let db = data::load_database(data_dir)?;
    let demographics = data::load_demographics(data_dir)?;
    MapSession::new(db, demographics, config)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MapConfig> {
    let Some(path) = path else {
        return Ok(MapConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid map config {}", path.display()))
}
