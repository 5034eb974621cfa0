use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::settings::{item_toggle_prefix, SettingsModel};
use crate::view::OverlayView;

/// Partition of display items into shown and hidden. Every known item lives
/// in exactly one of the two sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilitySets {
    enabled: BTreeSet<String>,
    disabled: BTreeSet<String>,
}

impl VisibilitySets {
    pub fn from_settings(settings: &SettingsModel) -> Self {
        let mut sets = Self::default();
        for entry in settings.entries() {
            let Some(prefix) = item_toggle_prefix(entry.name) else {
                continue;
            };
            let Some(enabled) = entry.value.as_bool() else {
                continue;
            };
            sets.insert(prefix, enabled);
        }
        sets
    }

    fn insert(&mut self, prefix: &str, enabled: bool) {
        self.enabled.remove(prefix);
        self.disabled.remove(prefix);
        if enabled {
            self.enabled.insert(prefix.to_string());
        } else {
            self.disabled.insert(prefix.to_string());
        }
    }

    /// Moves `prefix` into the set matching `enabled`. Unknown prefixes are
    /// ignored so the partition never grows a stray entry.
    pub fn toggle(&mut self, prefix: &str, enabled: bool) {
        if !self.contains(prefix) {
            warn!("visibility toggle for unknown item {prefix}");
            return;
        }
        self.insert(prefix, enabled);
        debug!("item {prefix} {}", if enabled { "shown" } else { "hidden" });
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.enabled.contains(prefix) || self.disabled.contains(prefix)
    }

    pub fn is_enabled(&self, prefix: &str) -> bool {
        self.enabled.contains(prefix)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    pub fn disabled(&self) -> impl Iterator<Item = &str> {
        self.disabled.iter().map(String::as_str)
    }

    pub fn apply(&self, view: &mut OverlayView) {
        for item in &self.disabled {
            view.set_visible(item, false);
        }
        for item in &self.enabled {
            view.set_visible(item, true);
        }
    }
}
