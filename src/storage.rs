use anyhow::{Context, Result};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use serde::Deserialize;
use toml::Value;
use toml_edit::DocumentMut;
use tracing::debug;

use crate::model::Airport;
use crate::settings::{PersistedSettings, SettingValue, SettingsStore};

/// Settings persisted as a flat TOML table. Exports edit the existing
/// document in place, so comments and foreign keys in the file survive.
#[derive(Clone, Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn import(&mut self) -> Result<Option<PersistedSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings: {}", self.path.display()))?;
        let table: toml::Table = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", self.path.display()))?;
        let settings = table
            .into_iter()
            .filter_map(|(key, value)| toml_to_setting(value).map(|value| (key, value)))
            .collect();
        Ok(Some(settings))
    }

    fn export(&mut self, settings: &PersistedSettings) -> Result<()> {
        let existing = fs::read_to_string(&self.path).unwrap_or_default();
        let mut doc = existing
            .parse::<DocumentMut>()
            .unwrap_or_else(|_| DocumentMut::new());

        for (key, value) in settings {
            doc[key.as_str()] = setting_to_edit(value);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        fs::write(&self.path, doc.to_string())
            .with_context(|| format!("Failed to write settings: {}", self.path.display()))?;
        debug!("settings exported to {}", self.path.display());
        Ok(())
    }
}

fn toml_to_setting(value: Value) -> Option<SettingValue> {
    match value {
        Value::Boolean(b) => Some(SettingValue::Bool(b)),
        Value::Integer(i) => Some(SettingValue::Number(i as f64)),
        Value::Float(f) => Some(SettingValue::Number(f)),
        Value::String(s) => Some(SettingValue::Text(s)),
        _ => None,
    }
}

fn setting_to_edit(value: &SettingValue) -> toml_edit::Item {
    match value {
        SettingValue::Bool(b) => toml_edit::value(*b),
        SettingValue::Number(n) => toml_edit::value(*n),
        SettingValue::Text(s) => toml_edit::value(s.as_str()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct AirportsFile {
    #[serde(default)]
    airport: Vec<Airport>,
}

/// Reads `[[airport]]` entries for the bundled lookup table.
pub fn load_airports(path: &Path) -> Result<Vec<Airport>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read airports: {}", path.display()))?;
    let file: AirportsFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse airports: {}", path.display()))?;
    Ok(file.airport)
}

#[derive(Debug, Default)]
struct MemoryState {
    stored: Option<PersistedSettings>,
    exports: usize,
}

/// In-process store. Clones share the same state, so a caller can keep a
/// handle and inspect what the model exported.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    pub fn with_settings(settings: PersistedSettings) -> Self {
        let store = Self::default();
        store.state.borrow_mut().stored = Some(settings);
        store
    }

    pub fn export_count(&self) -> usize {
        self.state.borrow().exports
    }

    pub fn last_export(&self) -> Option<PersistedSettings> {
        let state = self.state.borrow();
        if state.exports == 0 {
            None
        } else {
            state.stored.clone()
        }
    }
}

impl SettingsStore for MemoryStore {
    fn import(&mut self) -> Result<Option<PersistedSettings>> {
        Ok(self.state.borrow().stored.clone())
    }

    fn export(&mut self, settings: &PersistedSettings) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.stored = Some(settings.clone());
        state.exports += 1;
        Ok(())
    }
}
