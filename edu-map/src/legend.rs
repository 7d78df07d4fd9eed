//! Legend bounds and region colours.
//!
//! Colours are interpolated linearly in sRGB between the adjacent stops of a
//! [`ColorRamp`], over the `[min, max]` range of the legend.

use crate::config::MapConfig;
use crate::normalize::RegionValues;
use anyhow::{bail, Context};
use edu_core::catalog::county_name;
use edu_core::filters::{FilterState, MapType};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Feature property holding the county mnemonic on the country map.
pub const COUNTY_PROPERTY: &str = "mnemonic";
/// Feature property holding the town name on a county map.
pub const TOWN_PROPERTY: &str = "name";

/// Subtitle of the country-wide legend.
pub const COUNTRY_NAME: &str = "România";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendBounds {
    pub min: f64,
    pub max: f64,
}

impl LegendBounds {
    /// Extrema of `values`; `{0, 0}` when empty. A single distinct value
    /// starts the scale at zero.
    pub fn from_values(values: &RegionValues) -> Self {
        if values.is_empty() {
            return Self { min: 0.0, max: 0.0 };
        }
        let (min, max) = values
            .values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min == max {
            Self { min: 0.0, max }
        } else {
            Self { min, max }
        }
    }

    /// Position of `value` in `[0, 1]`, clamped.
    fn position(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Colour stops as sRGB components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<[f64; 3]>,
}

impl ColorRamp {
    /// Parses CSS colours, lowest value first.
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> anyhow::Result<Self> {
        if colors.is_empty() {
            bail!("colour ramp needs at least one stop");
        }
        let stops = colors
            .iter()
            .map(|color| {
                let color = color.as_ref();
                csscolorparser::parse(color)
                    .map(|c| [c.r as f64, c.g as f64, c.b as f64])
                    .with_context(|| format!("Invalid color '{color}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { stops })
    }

    pub fn from_config(config: &MapConfig) -> anyhow::Result<Self> {
        Self::parse(config.ramp.as_slice())
    }

    /// Hex colour of `value` within `bounds`.
    pub fn color_at(&self, value: f64, bounds: LegendBounds) -> String {
        let t = bounds.position(value);
        let segments = self.stops.len() - 1;
        if segments == 0 {
            return to_hex(self.stops[0]);
        }
        let scaled = t * segments as f64;
        let segment = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - segment as f64;
        let (from, to) = (self.stops[segment], self.stops[segment + 1]);
        to_hex([
            from[0] + (to[0] - from[0]) * local,
            from[1] + (to[1] - from[1]) * local,
            from[2] + (to[2] - from[2]) * local,
        ])
    }

    /// The stops as hex strings, e.g. for a gradient swatch.
    pub fn hex_stops(&self) -> Vec<String> {
        self.stops.iter().copied().map(to_hex).collect()
    }
}

fn to_hex(rgb: [f64; 3]) -> String {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Per-region colours for one feature property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorMatch {
    pub property: String,
    pub colors: BTreeMap<String, String>,
    pub fallback: String,
    pub empty: String,
}

impl ColorMatch {
    pub fn build(
        values: &RegionValues,
        property: &str,
        ramp: &ColorRamp,
        bounds: LegendBounds,
        config: &MapConfig,
    ) -> Self {
        let colors = values
            .iter()
            .map(|(key, value)| (key.clone(), ramp.color_at(*value, bounds)))
            .collect();
        Self {
            property: property.to_string(),
            colors,
            fallback: config.fallback_color.clone(),
            empty: config.empty_color.clone(),
        }
    }

    /// `["match", ["get", property], key, colour, …, fallback]`, or the
    /// plain empty colour when there are no regions.
    pub fn to_expression(&self) -> Value {
        if self.colors.is_empty() {
            return Value::String(self.empty.clone());
        }
        let mut expression = vec![json!("match"), json!(["get", self.property])];
        for (key, color) in &self.colors {
            expression.push(json!(key));
            expression.push(json!(color));
        }
        expression.push(json!(self.fallback));
        Value::Array(expression)
    }
}

/// Feature property the colours are keyed on at the current scope.
pub fn color_property(filters: &FilterState) -> &'static str {
    if filters.county.is_some() {
        TOWN_PROPERTY
    } else {
        COUNTY_PROPERTY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    /// Statistic shown, as a translation key (`schools`, `students`, `grades`).
    pub title: String,
    pub subtitle: String,
    pub bounds: LegendBounds,
    pub gradient: Vec<String>,
}

impl Legend {
    pub fn new(
        filters: &FilterState,
        map_type: MapType,
        bounds: LegendBounds,
        ramp: &ColorRamp,
    ) -> Self {
        Self {
            title: map_type.to_string(),
            subtitle: legend_subtitle(filters),
            bounds,
            gradient: ramp.hex_stops(),
        }
    }
}

/// County display name, or the country name at the top level.
pub fn legend_subtitle(filters: &FilterState) -> String {
    match filters.county.as_deref() {
        Some(code) => county_name(code).unwrap_or(code).to_string(),
        None => COUNTRY_NAME.to_string(),
    }
}
