//! Colour settings of the map.

use serde::{Deserialize, Serialize};

/// Ten-step blue ramp, lightest first.
pub const DEFAULT_RAMP: [&str; 10] = [
    "#e6f4ff", "#bae0ff", "#91caff", "#69b1ff", "#4096ff", "#1677ff", "#0958d9", "#003eb3",
    "#002c8c", "#001d66",
];

/// Colour of regions absent from the result.
pub const DEFAULT_FALLBACK: &str = "#f0f0f0";

/// Fill used when there is nothing to colour at all.
pub const DEFAULT_EMPTY: &str = "#ccc";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// CSS colours, lowest value first.
    pub ramp: Vec<String>,
    pub fallback_color: String,
    pub empty_color: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            ramp: DEFAULT_RAMP.iter().map(|c| c.to_string()).collect(),
            fallback_color: DEFAULT_FALLBACK.to_string(),
            empty_color: DEFAULT_EMPTY.to_string(),
        }
    }
}
