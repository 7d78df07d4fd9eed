//! The map round trip: compile, execute, normalise, colour.
//!
//! A [`MapSession`] owns the engine handle and the demographic lookup.
//! Every [`MapSession::refresh`] and [`MapSession::roster`] takes a new
//! request generation before it awaits the engine; when the response
//! arrives after a newer request of the same kind has started, it is
//! dropped and the call returns `None`.

use crate::config::MapConfig;
use crate::legend::{color_property, ColorMatch, ColorRamp, Legend, LegendBounds};
use crate::normalize::{normalize, RegionValues};
use edu_core::demographics::{Demographics, TownProfile};
use edu_core::filters::{FilterState, MapType};
use edu_db::compiler::compile_map_query;
use edu_db::engine::AnalyticsEngine;
use edu_db::models::SchoolRecord;
use edu_db::roster::compile_roster_query;
use serde::Serialize;
use serde_json::Value;
use std::cell::Cell;

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct RequestGeneration(Cell<u64>);

impl RequestGeneration {
    /// Starts a new request and returns its generation.
    pub fn next(&self) -> u64 {
        let generation = self.0.get() + 1;
        self.0.set(generation);
        generation
    }

    /// Whether `generation` is still the latest request.
    pub fn is_current(&self, generation: u64) -> bool {
        self.0.get() == generation
    }
}

/// Everything the renderer needs for one map state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub map_type: MapType,
    pub values: RegionValues,
    pub legend: Legend,
    pub colors: ColorMatch,
}

impl MapView {
    /// Fill expression for the region layer.
    pub fn fill_expression(&self) -> Value {
        self.colors.to_expression()
    }

    pub fn bounds(&self) -> LegendBounds {
        self.legend.bounds
    }
}

pub struct MapSession<E> {
    engine: E,
    demographics: Demographics,
    config: MapConfig,
    ramp: ColorRamp,
    generation: RequestGeneration,
    roster_generation: RequestGeneration,
}

impl<E: AnalyticsEngine> MapSession<E> {
    pub fn new(engine: E, demographics: Demographics, config: MapConfig) -> anyhow::Result<Self> {
        let ramp = ColorRamp::from_config(&config)?;
        Ok(Self {
            engine,
            demographics,
            config,
            ramp,
            generation: RequestGeneration::default(),
            roster_generation: RequestGeneration::default(),
        })
    }

    /// Recomputes the map for `filters`. Returns `None` when a newer
    /// refresh started while this one was waiting for the engine. Engine
    /// failures are logged and produce an empty map.
    pub async fn refresh(&self, filters: &FilterState, map_type: MapType) -> Option<MapView> {
        let generation = self.generation.next();
        let query = compile_map_query(filters, map_type);

        let rows = match self.engine.aggregate(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("[EDU] session: aggregation failed: {e:#}");
                Vec::new()
            }
        };

        if !self.generation.is_current(generation) {
            log::debug!("[EDU Debug] session: dropping stale response #{generation}");
            return None;
        }

        let values = normalize(&rows, filters, &self.demographics);
        let bounds = LegendBounds::from_values(&values);
        let colors = ColorMatch::build(
            &values,
            color_property(filters),
            &self.ramp,
            bounds,
            &self.config,
        );
        let legend = Legend::new(filters, map_type, bounds, &self.ramp);
        log::info!(
            "[EDU Debug] session: refresh #{generation} coloured {} regions",
            values.len()
        );

        Some(MapView {
            map_type,
            values,
            legend,
            colors,
        })
    }

    /// Schools of the open town; empty without a town or on engine
    /// failure. Returns `None` when a newer roster request started while
    /// this one was waiting for the engine.
    pub async fn roster(&self, filters: &FilterState) -> Option<Vec<SchoolRecord>> {
        let generation = self.roster_generation.next();
        let Some(query) = compile_roster_query(filters) else {
            return Some(Vec::new());
        };

        let schools = match self.engine.roster(&query).await {
            Ok(schools) => schools,
            Err(e) => {
                log::error!("[EDU] session: roster failed: {e:#}");
                Vec::new()
            }
        };

        if !self.roster_generation.is_current(generation) {
            log::debug!("[EDU Debug] session: dropping stale roster #{generation}");
            return None;
        }
        Some(schools)
    }

    /// Age profile of the open town, when its demographics are known.
    pub fn town_profile(&self, filters: &FilterState) -> Option<TownProfile> {
        let (county, town) = filters.resolved_town()?;
        self.demographics
            .town(county, town)
            .map(TownProfile::from_population)
    }
}
