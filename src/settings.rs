use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

pub const OVERLAY_TOGGLE: &str = "overlay_toggle";
pub const METRIC_UNITS: &str = "metric_units";
pub const SIMBRIEF_ENABLED: &str = "simbrief_enabled";
pub const SIMBRIEF_USERNAME: &str = "simbrief_username";
pub const DESTINATION: &str = "destination";
pub const CUSTOM_ICON: &str = "custom_icon";
pub const FONT_SIZE: &str = "font_size";
pub const OVERLAY_BOTTOM: &str = "overlay_bottom";
pub const DISPLAY_ICONS: &str = "display_icons";
pub const BLACK_ICONS: &str = "black_icons";
pub const OUTLINE_TEXT: &str = "outline_text";
pub const COLOR_WRAPPER: &str = "color_wrapper";
pub const COLOR_OUTLINE: &str = "color_outline";
pub const COLOR_BACKGROUND: &str = "color_background";
pub const COLOR_TEXT: &str = "color_text";

/// Suffix that marks a per-item visibility toggle.
pub const ENABLED_SUFFIX: &str = "_enabled";
/// `_enabled` settings that switch whole features rather than one display item.
pub const META_TOGGLES: &[&str] = &[OVERLAY_TOGGLE, SIMBRIEF_ENABLED];

pub const USERNAME_PLACEHOLDER: &str = "USERNAME";
pub const AIRPORT_PLACEHOLDER: &str = "----";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKind {
    Boolean,
    Number,
    Text,
}

impl SettingKind {
    pub fn label(self) -> &'static str {
        match self {
            SettingKind::Boolean => "boolean",
            SettingKind::Number => "number",
            SettingKind::Text => "text",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Bool(_) => SettingKind::Boolean,
            SettingValue::Number(_) => SettingKind::Number,
            SettingValue::Text(_) => SettingKind::Text,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Number(value) => write!(f, "{value}"),
            SettingValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum SettingDefault {
    Bool(bool),
    Number(f64),
    Text(&'static str),
}

impl SettingDefault {
    pub fn kind(self) -> SettingKind {
        match self {
            SettingDefault::Bool(_) => SettingKind::Boolean,
            SettingDefault::Number(_) => SettingKind::Number,
            SettingDefault::Text(_) => SettingKind::Text,
        }
    }

    pub fn value(self) -> SettingValue {
        match self {
            SettingDefault::Bool(value) => SettingValue::Bool(value),
            SettingDefault::Number(value) => SettingValue::Number(value),
            SettingDefault::Text(value) => SettingValue::Text(value.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SettingDef {
    pub name: &'static str,
    pub default: SettingDefault,
}

const fn flag(name: &'static str, value: bool) -> SettingDef {
    SettingDef {
        name,
        default: SettingDefault::Bool(value),
    }
}

const fn text(name: &'static str, value: &'static str) -> SettingDef {
    SettingDef {
        name,
        default: SettingDefault::Text(value),
    }
}

const fn number(name: &'static str, value: f64) -> SettingDef {
    SettingDef {
        name,
        default: SettingDefault::Number(value),
    }
}

/// Every user setting in panel order. Display items come in `<name>` /
/// `<name>_enabled` pairs so the visibility sets can be derived from the flags.
pub const SETTINGS_SCHEMA: &[SettingDef] = &[
    flag(OVERLAY_TOGGLE, true),
    flag(METRIC_UNITS, false),
    flag(SIMBRIEF_ENABLED, false),
    text(SIMBRIEF_USERNAME, USERNAME_PLACEHOLDER),
    flag("type_enabled", false),
    text("type", "C172"),
    flag("registration_enabled", false),
    text("registration", "N172SP"),
    flag("iata_enabled", false),
    text("iata", "My Airline"),
    flag("origin_enabled", true),
    text("origin", AIRPORT_PLACEHOLDER),
    flag("destination_enabled", true),
    text(DESTINATION, AIRPORT_PLACEHOLDER),
    flag("distance_enabled", true),
    flag("pad_distance", true),
    flag("ete_enabled", false),
    flag("rules_enabled", false),
    text("rules", "VFR"),
    flag("network_enabled", false),
    text("network", "Multiplayer"),
    flag("airspeed_enabled", true),
    flag("pad_airspeed", true),
    flag("vertspeed_enabled", true),
    flag("pad_vertspeed", true),
    flag("altitude_enabled", true),
    flag("pad_altitude", true),
    flag("heading_enabled", true),
    flag("wind_enabled", false),
    flag("oat_enabled", false),
    flag("oat_fahrenheit", false),
    flag("custom_enabled", false),
    text(CUSTOM_ICON, "note-text"),
    text("custom", "Change me!"),
    number(FONT_SIZE, 23.0),
    flag(OVERLAY_BOTTOM, false),
    flag(DISPLAY_ICONS, true),
    flag(BLACK_ICONS, false),
    flag(OUTLINE_TEXT, true),
    text(COLOR_WRAPPER, "#00000090"),
    text(COLOR_OUTLINE, "#A0A0A0FF"),
    text(COLOR_BACKGROUND, "#00000090"),
    text(COLOR_TEXT, "#FFFFFFFF"),
];

/// Item prefix controlled by `name`, if `name` is a per-item visibility toggle.
pub fn item_toggle_prefix(name: &str) -> Option<&str> {
    if META_TOGGLES.contains(&name) {
        return None;
    }
    name.strip_suffix(ENABLED_SUFFIX)
        .filter(|prefix| !prefix.is_empty())
}

pub type PersistedSettings = BTreeMap<String, SettingValue>;

/// Host key/value persistence for the settings model.
pub trait SettingsStore {
    /// Previously exported settings, or `None` when nothing was stored yet.
    fn import(&mut self) -> Result<Option<PersistedSettings>>;
    fn export(&mut self, settings: &PersistedSettings) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct SettingEntry {
    pub name: &'static str,
    pub kind: SettingKind,
    pub value: SettingValue,
}

pub struct SettingsModel {
    entries: Vec<SettingEntry>,
    store: Box<dyn SettingsStore>,
}

impl SettingsModel {
    pub fn initialize(schema: &[SettingDef], store: Box<dyn SettingsStore>) -> Self {
        let entries = schema
            .iter()
            .map(|def| SettingEntry {
                name: def.name,
                kind: def.default.kind(),
                value: def.default.value(),
            })
            .collect();
        Self { entries, store }
    }

    /// Overlays persisted values onto the current ones. Unknown keys and values
    /// of the wrong kind are ignored.
    pub fn load(&mut self, persisted: &PersistedSettings) {
        for entry in &mut self.entries {
            let Some(value) = persisted.get(entry.name) else {
                continue;
            };
            if value.kind() == entry.kind {
                entry.value = value.clone();
            } else {
                debug!(
                    "ignoring persisted {} (expected {}, got {})",
                    entry.name,
                    entry.kind.label(),
                    value.kind().label()
                );
            }
        }
    }

    /// Loads from the backing store. Nothing stored, or a store that cannot be
    /// read, leaves the defaults in place.
    pub fn import_from_store(&mut self) {
        match self.store.import() {
            Ok(Some(persisted)) => {
                debug!("imported {} persisted settings", persisted.len());
                self.load(&persisted);
            }
            Ok(None) => debug!("no persisted settings, using defaults"),
            Err(err) => warn!("settings import failed, using defaults: {err:#}"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.entry(name).map(|entry| &entry.value)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(SettingValue::as_bool).unwrap_or(false)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(SettingValue::as_str).unwrap_or("")
    }

    pub fn number(&self, name: &str) -> f64 {
        self.get(name).and_then(SettingValue::as_f64).unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[SettingEntry] {
        &self.entries
    }

    pub fn kind_of(&self, name: &str) -> Option<SettingKind> {
        self.entry(name).map(|entry| entry.kind)
    }

    /// Updates one value and writes the whole model through to the store.
    pub fn set(&mut self, name: &str, value: SettingValue) -> Result<()> {
        self.assign(name, value)?;
        self.export();
        Ok(())
    }

    /// Updates several values with a single export. Nothing is applied when
    /// any pair is rejected.
    pub fn set_many(&mut self, values: Vec<(&str, SettingValue)>) -> Result<()> {
        for (name, value) in &values {
            self.check(name, value)?;
        }
        for (name, value) in values {
            self.assign(name, value)?;
        }
        self.export();
        Ok(())
    }

    pub fn snapshot(&self) -> PersistedSettings {
        self.entries
            .iter()
            .map(|entry| (entry.name.to_string(), entry.value.clone()))
            .collect()
    }

    fn entry(&self, name: &str) -> Option<&SettingEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    fn check(&self, name: &str, value: &SettingValue) -> Result<()> {
        let entry = self
            .entry(name)
            .ok_or_else(|| anyhow!("unknown setting: {name}"))?;
        if entry.kind != value.kind() {
            return Err(anyhow!(
                "setting {name} expects a {} value, got {}",
                entry.kind.label(),
                value.kind().label()
            ));
        }
        Ok(())
    }

    fn assign(&mut self, name: &str, value: SettingValue) -> Result<()> {
        self.check(name, &value)?;
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            entry.value = value;
        }
        Ok(())
    }

    fn export(&mut self) {
        let snapshot = self.snapshot();
        if let Err(err) = self.store.export(&snapshot) {
            warn!("settings export failed: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const AB_SCHEMA: &[SettingDef] = &[flag("a", true), text("b", "x")];

    fn model(schema: &[SettingDef]) -> (SettingsModel, MemoryStore) {
        let store = MemoryStore::default();
        let model = SettingsModel::initialize(schema, Box::new(store.clone()));
        (model, store)
    }

    #[test]
    fn load_overlays_known_keys_only() {
        let (mut model, _) = model(AB_SCHEMA);
        let mut persisted = PersistedSettings::new();
        persisted.insert("a".to_string(), SettingValue::Bool(false));
        persisted.insert("c".to_string(), SettingValue::from("ignored"));
        model.load(&persisted);

        let snapshot = model.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a"), Some(&SettingValue::Bool(false)));
        assert_eq!(snapshot.get("b"), Some(&SettingValue::from("x")));
        assert!(!snapshot.contains_key("c"));
    }

    #[test]
    fn load_ignores_kind_mismatch() {
        let (mut model, _) = model(AB_SCHEMA);
        let mut persisted = PersistedSettings::new();
        persisted.insert("a".to_string(), SettingValue::from("yes"));
        persisted.insert("b".to_string(), SettingValue::Bool(true));
        model.load(&persisted);
        assert!(model.flag("a"));
        assert_eq!(model.text("b"), "x");
    }

    #[test]
    fn import_without_stored_data_keeps_defaults() {
        let (mut model, store) = model(SETTINGS_SCHEMA);
        model.import_from_store();
        assert!(model.flag(OVERLAY_TOGGLE));
        assert_eq!(model.text(DESTINATION), AIRPORT_PLACEHOLDER);
        assert_eq!(model.number(FONT_SIZE), 23.0);
        assert_eq!(store.export_count(), 0);
    }

    #[test]
    fn set_writes_through() {
        let (mut model, store) = model(SETTINGS_SCHEMA);
        model.set(DESTINATION, SettingValue::from("KSEA")).unwrap();
        assert_eq!(model.text(DESTINATION), "KSEA");
        assert_eq!(store.export_count(), 1);
        let exported = store.last_export().unwrap();
        assert_eq!(exported.get(DESTINATION), Some(&SettingValue::from("KSEA")));
        assert_eq!(exported.len(), SETTINGS_SCHEMA.len());
    }

    #[test]
    fn set_rejects_unknown_and_wrong_kind() {
        let (mut model, store) = model(SETTINGS_SCHEMA);
        assert!(model.set("nope", SettingValue::Bool(true)).is_err());
        let err = model.set(METRIC_UNITS, SettingValue::from("true")).unwrap_err();
        assert!(err.to_string().contains("expects a boolean"));
        assert!(!model.flag(METRIC_UNITS));
        assert_eq!(store.export_count(), 0);
    }

    #[test]
    fn set_many_exports_once_and_is_all_or_nothing() {
        let (mut model, store) = model(SETTINGS_SCHEMA);
        model
            .set_many(vec![
                ("origin", SettingValue::from("KPDX")),
                (DESTINATION, SettingValue::from("KSEA")),
            ])
            .unwrap();
        assert_eq!(store.export_count(), 1);

        let rejected = model.set_many(vec![
            ("origin", SettingValue::from("KBFI")),
            (FONT_SIZE, SettingValue::from("big")),
        ]);
        assert!(rejected.is_err());
        assert_eq!(model.text("origin"), "KPDX");
        assert_eq!(store.export_count(), 1);
    }

    #[test]
    fn toggle_prefixes() {
        assert_eq!(item_toggle_prefix("origin_enabled"), Some("origin"));
        assert_eq!(item_toggle_prefix("simbrief_enabled"), None);
        assert_eq!(item_toggle_prefix("pad_distance"), None);
        assert_eq!(item_toggle_prefix("_enabled"), None);
    }

    #[test]
    fn schema_names_are_unique() {
        let mut names: Vec<&str> = SETTINGS_SCHEMA.iter().map(|def| def.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SETTINGS_SCHEMA.len());
    }
}
