use anyhow::{anyhow, Result};

use crate::settings::{
    item_toggle_prefix, SettingKind, SettingValue, SettingsModel, BLACK_ICONS, COLOR_BACKGROUND,
    COLOR_OUTLINE, COLOR_TEXT, COLOR_WRAPPER, CUSTOM_ICON, DESTINATION, DISPLAY_ICONS, FONT_SIZE,
    OUTLINE_TEXT, OVERLAY_BOTTOM, OVERLAY_TOGGLE,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    Checkbox,
    Text,
}

/// One row of the host settings panel.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionDescriptor {
    pub name: &'static str,
    pub kind: OptionKind,
    pub label: String,
    pub value: SettingValue,
}

/// Raw value coming back from the settings panel.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionInput {
    Checkbox(bool),
    Text(String),
}

impl OptionInput {
    /// Converts panel input into a value of the setting's kind.
    pub fn into_value(self, kind: SettingKind) -> Result<SettingValue> {
        match (kind, self) {
            (SettingKind::Boolean, OptionInput::Checkbox(checked)) => Ok(SettingValue::Bool(checked)),
            (SettingKind::Text, OptionInput::Text(text)) => Ok(SettingValue::Text(text)),
            (SettingKind::Number, OptionInput::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map(SettingValue::Number)
                .map_err(|_| anyhow!("invalid number: {text}")),
            (kind, input) => Err(anyhow!("cannot apply {input:?} to a {} setting", kind.label())),
        }
    }
}

/// Side effect a settings change has beyond storing the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeEffect {
    None,
    ItemToggle(&'static str),
    Destination,
    Restyle,
    CustomIcon,
    Position,
    FontSize,
    DisplayIcons,
}

pub fn change_effect(name: &'static str) -> ChangeEffect {
    match name {
        DESTINATION => ChangeEffect::Destination,
        CUSTOM_ICON => ChangeEffect::CustomIcon,
        OVERLAY_BOTTOM => ChangeEffect::Position,
        FONT_SIZE => ChangeEffect::FontSize,
        DISPLAY_ICONS => ChangeEffect::DisplayIcons,
        COLOR_WRAPPER | COLOR_OUTLINE | COLOR_BACKGROUND | COLOR_TEXT | OUTLINE_TEXT
        | BLACK_ICONS => ChangeEffect::Restyle,
        _ => match item_toggle_prefix(name) {
            Some(prefix) => ChangeEffect::ItemToggle(prefix),
            None => ChangeEffect::None,
        },
    }
}

pub fn human_readable(name: &str) -> String {
    name.replace('_', " ").to_uppercase()
}

/// Panel rows for every user-facing setting, in schema order.
pub fn derive_options(settings: &SettingsModel) -> Vec<OptionDescriptor> {
    settings
        .entries()
        .iter()
        .filter(|entry| entry.name != OVERLAY_TOGGLE)
        .map(|entry| OptionDescriptor {
            name: entry.name,
            kind: match entry.kind {
                SettingKind::Boolean => OptionKind::Checkbox,
                SettingKind::Number | SettingKind::Text => OptionKind::Text,
            },
            label: human_readable(entry.name),
            value: entry.value.clone(),
        })
        .collect()
}
