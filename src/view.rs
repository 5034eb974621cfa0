//! Retained presentation state. The host renders an [`OverlayView`]; the
//! overlay only ever writes into it.

use tracing::trace;

use crate::units::clamp_font_size;

pub const ICON_DIR: &str = "mdi/icons";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Every item, wind sampled on the fast tick.
    Full,
    /// Text and flight data only; no wind item and no fast tick.
    Compact,
}

const FULL_ITEMS: &[&str] = &[
    "type",
    "registration",
    "iata",
    "origin",
    "destination",
    "distance",
    "ete",
    "rules",
    "network",
    "airspeed",
    "vertspeed",
    "altitude",
    "heading",
    "wind",
    "oat",
    "custom",
];

const COMPACT_ITEMS: &[&str] = &[
    "type",
    "registration",
    "iata",
    "origin",
    "destination",
    "distance",
    "ete",
    "rules",
    "network",
    "airspeed",
    "vertspeed",
    "altitude",
    "heading",
    "oat",
    "custom",
];

impl Variant {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "lite" => Variant::Compact,
            _ => Variant::Full,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::Full => "full",
            Variant::Compact => "compact",
        }
    }

    /// Display items in layout order.
    pub fn items(self) -> &'static [&'static str] {
        match self {
            Variant::Full => FULL_ITEMS,
            Variant::Compact => COMPACT_ITEMS,
        }
    }

    pub fn has_fast_tick(self) -> bool {
        self.items().contains(&"wind")
    }
}

pub fn icon_source(name: &str) -> String {
    format!("{ICON_DIR}/{name}.svg")
}

fn default_icon(item: &str) -> &'static str {
    match item {
        "type" => "airplane",
        "registration" => "card-text",
        "iata" => "badge-account",
        "origin" => "airplane-takeoff",
        "destination" => "airplane-landing",
        "distance" => "map-marker-distance",
        "ete" => "timer-sand",
        "rules" => "eye",
        "network" => "web",
        "airspeed" => "speedometer",
        "vertspeed" => "minus-circle",
        "altitude" => "altimeter",
        "heading" => "compass",
        "wind" => "navigation",
        "oat" => "thermometer-lines",
        _ => "note-text",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconTint {
    White,
    Black,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub wrapper_color: String,
    pub outline_color: String,
    pub background_color: String,
    pub text_color: String,
    pub outline_text: bool,
    pub icon_tint: IconTint,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            wrapper_color: "#00000090".to_string(),
            outline_color: "#A0A0A0FF".to_string(),
            background_color: "#00000090".to_string(),
            text_color: "#FFFFFFFF".to_string(),
            outline_text: true,
            icon_tint: IconTint::White,
        }
    }
}

/// Pixel sizes derived from the font size setting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub label_px: f64,
    pub text_px: f64,
    pub icon_px: f64,
}

impl FontMetrics {
    pub fn from_font_size(size: f64) -> Self {
        let size = clamp_font_size(size);
        Self {
            label_px: (size * 0.75).round(),
            text_px: size,
            icon_px: size,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemView {
    pub key: &'static str,
    pub visible: bool,
    /// Caption shown instead of the icon when icons are off.
    pub label: String,
    pub text: String,
    pub icon: String,
    pub rotation_deg: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayView {
    pub visible: bool,
    pub anchor: Anchor,
    pub show_icons: bool,
    pub fonts: FontMetrics,
    pub style: Style,
    items: Vec<ItemView>,
}

impl OverlayView {
    pub fn new(variant: Variant) -> Self {
        let items = variant
            .items()
            .iter()
            .map(|&key| ItemView {
                key,
                visible: false,
                label: key.to_ascii_uppercase(),
                text: String::new(),
                icon: icon_source(default_icon(key)),
                rotation_deg: 0.0,
            })
            .collect();
        Self {
            visible: true,
            anchor: Anchor::Top,
            show_icons: true,
            fonts: FontMetrics::from_font_size(23.0),
            style: Style::default(),
            items,
        }
    }

    pub fn items(&self) -> &[ItemView] {
        &self.items
    }

    pub fn item(&self, key: &str) -> Option<&ItemView> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn item_mut(&mut self, key: &str) -> Option<&mut ItemView> {
        let found = self.items.iter_mut().find(|item| item.key == key);
        if found.is_none() {
            trace!("view has no item {key}, skipping write");
        }
        found
    }

    pub fn set_text(&mut self, key: &str, text: impl Into<String>) {
        if let Some(item) = self.item_mut(key) {
            item.text = text.into();
        }
    }

    pub fn set_icon(&mut self, key: &str, icon_name: &str) {
        if let Some(item) = self.item_mut(key) {
            item.icon = icon_source(icon_name);
        }
    }

    pub fn set_rotation(&mut self, key: &str, degrees: f64) {
        if let Some(item) = self.item_mut(key) {
            item.rotation_deg = degrees;
        }
    }

    pub fn set_visible(&mut self, key: &str, visible: bool) {
        if let Some(item) = self.item_mut(key) {
            item.visible = visible;
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.item(key).map(|item| item.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses() {
        assert_eq!(Variant::from_str("compact"), Variant::Compact);
        assert_eq!(Variant::from_str(" LITE "), Variant::Compact);
        assert_eq!(Variant::from_str("full"), Variant::Full);
        assert_eq!(Variant::from_str("other"), Variant::Full);
    }

    #[test]
    fn only_full_variant_samples_wind() {
        assert!(Variant::Full.has_fast_tick());
        assert!(!Variant::Compact.has_fast_tick());
        assert!(OverlayView::new(Variant::Compact).item("wind").is_none());
    }

    #[test]
    fn writes_to_missing_items_are_skipped() {
        let mut view = OverlayView::new(Variant::Compact);
        view.set_text("wind", "270@10kt");
        view.set_visible("wind", true);
        view.set_text("heading", "090");
        assert_eq!(view.text("heading"), Some("090"));
        assert_eq!(view.text("wind"), None);
    }

    #[test]
    fn font_metrics_scale_labels() {
        let fonts = FontMetrics::from_font_size(23.0);
        assert_eq!(fonts.label_px, 17.0);
        assert_eq!(fonts.text_px, 23.0);
        assert_eq!(FontMetrics::from_font_size(4.0).icon_px, 8.0);
    }

    #[test]
    fn icons_resolve_to_svg_paths() {
        let view = OverlayView::new(Variant::Full);
        assert_eq!(
            view.item("wind").map(|item| item.icon.as_str()),
            Some("mdi/icons/navigation.svg")
        );
    }
}
