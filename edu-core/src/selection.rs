use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A set of checkbox values: name → ticked.
///
/// Nothing ticked means "no restriction"; the query compiler omits the
/// clause instead of producing one that can never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, bool>);

impl Selection {
    /// Every name ticked.
    pub fn all<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_names(names, |_| true)
    }

    /// Every name present, ticked when `enabled` says so.
    pub fn from_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
        enabled: impl Fn(&str) -> bool,
    ) -> Self {
        Self(
            names
                .into_iter()
                .map(|name| (name.to_string(), enabled(name)))
                .collect(),
        )
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Tick or untick `name`, adding it if unknown.
    pub fn set(&mut self, name: &str, on: bool) {
        self.0.insert(name.to_string(), on);
    }

    /// Ticked names in stable (sorted) order.
    pub fn selected(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// True when no name is ticked.
    pub fn is_unrestricted(&self) -> bool {
        !self.0.values().any(|on| *on)
    }

    /// True when there are names and every one of them is ticked.
    pub fn is_all(&self) -> bool {
        !self.0.is_empty() && self.0.values().all(|on| *on)
    }

    /// Ticked names, or `None` when the selection lets everything through
    /// (nothing ticked, or everything ticked).
    pub fn restriction(&self) -> Option<Vec<&str>> {
        if self.is_unrestricted() || self.is_all() {
            None
        } else {
            Some(self.selected())
        }
    }

    /// All known names, ticked or not.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
