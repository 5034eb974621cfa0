//! The overlay controller. One [`Overlay`] owns the settings, the visibility
//! sets, the destination resolver, the refresh gate and the attached view;
//! every host callback and tick goes through it on a single thread.

use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::lookup::{AirportMessage, AirportRequest};
use crate::model::FlightPlan;
use crate::options::{change_effect, derive_options, ChangeEffect, OptionDescriptor, OptionInput};
use crate::resolver::DestinationResolver;
use crate::sampler::{format_flight, format_wind, FormatOptions};
use crate::settings::{
    SettingValue, SettingsModel, SettingsStore, AIRPORT_PLACEHOLDER, BLACK_ICONS,
    COLOR_BACKGROUND, COLOR_OUTLINE, COLOR_TEXT, COLOR_WRAPPER, CUSTOM_ICON, DESTINATION,
    DISPLAY_ICONS, FONT_SIZE, METRIC_UNITS, OUTLINE_TEXT, OVERLAY_BOTTOM, OVERLAY_TOGGLE,
    SETTINGS_SCHEMA, SIMBRIEF_ENABLED, SIMBRIEF_USERNAME, USERNAME_PLACEHOLDER,
};
use crate::simbrief::{PlanMessage, PlanRequest, RefreshGate};
use crate::telemetry::{slew_active, FlightSample, Position, Telemetry, UnitSystem, WindSample};
use crate::units::{clamp_font_size, great_circle_distance};
use crate::view::{Anchor, FontMetrics, IconTint, OverlayView, Style, Variant};
use crate::visibility::VisibilitySets;

pub const STATUS_ICON_ACTIVE: &str = "mdi:airplane-check";
pub const STATUS_ICON_INACTIVE: &str = "mdi:airplane-off";

/// Items whose text is the setting of the same name.
pub const STATIC_TEXT_ITEMS: &[&str] = &[
    "type",
    "registration",
    "iata",
    "origin",
    "destination",
    "rules",
    "network",
    "custom",
];

const DISTANCE_ENABLED: &str = "distance_enabled";

pub struct Overlay {
    variant: Variant,
    settings: SettingsModel,
    visibility: VisibilitySets,
    resolver: DestinationResolver,
    gate: RefreshGate,
    view: Option<OverlayView>,
    pending_lookup: Option<AirportRequest>,
}

impl Overlay {
    /// Loads persisted settings from `store` and seeds the visibility sets.
    /// The SimBrief gate starts cooling at `now`.
    pub fn new(
        variant: Variant,
        store: Box<dyn SettingsStore>,
        cooldown: Duration,
        now: Instant,
    ) -> Self {
        let mut settings = SettingsModel::initialize(SETTINGS_SCHEMA, store);
        settings.import_from_store();
        let visibility = VisibilitySets::from_settings(&settings);
        info!(
            "overlay ready ({} variant, {} items shown)",
            variant.label(),
            visibility.enabled().count()
        );
        Self {
            variant,
            settings,
            visibility,
            resolver: DestinationResolver::new(),
            gate: RefreshGate::cooling_from(cooldown, now),
            view: None,
            pending_lookup: None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn settings(&self) -> &SettingsModel {
        &self.settings
    }

    pub fn visibility(&self) -> &VisibilitySets {
        &self.visibility
    }

    pub fn resolver(&self) -> &DestinationResolver {
        &self.resolver
    }

    pub fn view(&self) -> Option<&OverlayView> {
        self.view.as_ref()
    }

    pub fn options(&self) -> Vec<OptionDescriptor> {
        derive_options(&self.settings)
    }

    /// Creates the view and brings it in line with the current settings.
    pub fn attach(&mut self) {
        self.view = Some(OverlayView::new(self.variant));
        self.refresh_presentation();
        debug!("overlay view attached");
    }

    pub fn detach(&mut self) {
        if self.view.take().is_some() {
            debug!("overlay view detached");
        }
    }

    fn refresh_presentation(&mut self) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        view.visible = self.settings.flag(OVERLAY_TOGGLE);
        view.anchor = anchor(&self.settings);
        view.show_icons = self.settings.flag(DISPLAY_ICONS);
        view.fonts = FontMetrics::from_font_size(self.settings.number(FONT_SIZE));
        view.style = style(&self.settings);
        view.set_icon("custom", self.settings.text(CUSTOM_ICON));
        self.visibility.apply(view);
        write_static_text(view, &self.settings);
    }

    /// Stores a value edited in the settings panel and runs its side effect.
    pub fn apply_option(&mut self, name: &str, input: OptionInput) -> Result<()> {
        let (name, kind) = self
            .settings
            .entries()
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| (entry.name, entry.kind))
            .ok_or_else(|| anyhow!("unknown setting: {name}"))?;
        if name == OVERLAY_TOGGLE {
            return Err(anyhow!("{OVERLAY_TOGGLE} is not a panel option"));
        }

        let effect = change_effect(name);
        let value = match (effect, input.into_value(kind)?) {
            (ChangeEffect::FontSize, SettingValue::Number(size)) => {
                SettingValue::Number(clamp_font_size(size))
            }
            (_, value) => value,
        };
        debug!("option {name} = {value}");
        self.settings.set(name, value)?;
        self.apply_effect(name, effect);
        Ok(())
    }

    fn apply_effect(&mut self, name: &str, effect: ChangeEffect) {
        match effect {
            ChangeEffect::None => {}
            ChangeEffect::ItemToggle(prefix) => {
                let enabled = self.settings.flag(name);
                self.visibility.toggle(prefix, enabled);
                if let Some(view) = self.view.as_mut() {
                    view.set_visible(prefix, enabled);
                }
            }
            ChangeEffect::Destination => self.forget_destination(),
            ChangeEffect::Restyle => {
                if let Some(view) = self.view.as_mut() {
                    view.style = style(&self.settings);
                }
            }
            ChangeEffect::CustomIcon => {
                if let Some(view) = self.view.as_mut() {
                    view.set_icon("custom", self.settings.text(CUSTOM_ICON));
                }
            }
            ChangeEffect::Position => {
                if let Some(view) = self.view.as_mut() {
                    view.anchor = anchor(&self.settings);
                }
            }
            ChangeEffect::FontSize => self.rescale_fonts(),
            ChangeEffect::DisplayIcons => {
                if let Some(view) = self.view.as_mut() {
                    view.show_icons = self.settings.flag(DISPLAY_ICONS);
                }
            }
        }
    }

    fn forget_destination(&mut self) {
        self.resolver.invalidate();
        self.pending_lookup = None;
    }

    fn rescale_fonts(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.fonts = FontMetrics::from_font_size(self.settings.number(FONT_SIZE));
        }
    }

    fn units(&self) -> UnitSystem {
        UnitSystem::from_metric_flag(self.settings.flag(METRIC_UNITS))
    }

    /// Distance to the live destination, once its coordinates are known.
    /// Queues an airport lookup when nothing is cached or in flight.
    fn destination_distance(&mut self, position: Position) -> Option<f64> {
        if !self.settings.flag(DISTANCE_ENABLED) {
            return None;
        }
        let destination = self.settings.text(DESTINATION).trim();
        if destination.is_empty() || destination == AIRPORT_PLACEHOLDER {
            return None;
        }
        if let Some(request) = self.resolver.poll(destination) {
            self.pending_lookup = Some(request);
        }
        self.resolver
            .airport_for(destination)
            .map(|airport| {
                great_circle_distance(position.lat, position.lon, airport.lat, airport.lon)
            })
            .map(f64::round)
    }

    /// The ~1 Hz refresh of everything except wind.
    pub fn slow_tick(&mut self, telemetry: &dyn Telemetry) {
        let position = Position::read(telemetry);
        let distance_nm = self.destination_distance(position);

        if slew_active(telemetry) {
            trace!("slew active, labels held");
            return;
        }
        let units = self.units();
        let Some(view) = self.view.as_mut() else {
            trace!("no view attached, slow tick skipped");
            return;
        };

        let sample = FlightSample::read(telemetry, units);
        let readout = format_flight(&sample, distance_nm, &FormatOptions::from_settings(&self.settings));
        view.set_text("distance", readout.distance);
        view.set_text("ete", readout.ete);
        view.set_text("airspeed", readout.airspeed);
        view.set_text("vertspeed", readout.vertspeed);
        view.set_icon("vertspeed", readout.vertspeed_icon);
        view.set_text("altitude", readout.altitude);
        view.set_text("heading", readout.heading);
        view.set_text("oat", readout.oat);
        view.set_icon("oat", readout.oat_icon);
        write_static_text(view, &self.settings);
    }

    /// The ~15 Hz wind refresh. Variants without a wind item never run it.
    pub fn fast_tick(&mut self, telemetry: &dyn Telemetry) {
        if !self.variant.has_fast_tick() {
            return;
        }
        let units = self.units();
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let readout = format_wind(&WindSample::read(telemetry, units));
        view.set_text("wind", readout.label);
        view.set_rotation("wind", readout.rotation_deg);
    }

    /// Lookup queued by the last slow tick, if any.
    pub fn take_airport_request(&mut self) -> Option<AirportRequest> {
        self.pending_lookup.take()
    }

    /// Returns true when the answer resolved the live destination.
    pub fn apply_airport_result(&mut self, message: AirportMessage) -> bool {
        let live = self.settings.text(DESTINATION);
        self.resolver.complete(message, live)
    }

    /// Scroll gesture on the overlay. Yields a plan request when SimBrief is
    /// configured and the refresh window has passed.
    pub fn on_scroll(&mut self, now: Instant) -> Option<PlanRequest> {
        if !self.settings.flag(SIMBRIEF_ENABLED) {
            trace!("simbrief disabled, scroll ignored");
            return None;
        }
        let username = self.settings.text(SIMBRIEF_USERNAME).trim();
        if username.is_empty() || username == USERNAME_PLACEHOLDER {
            debug!("simbrief username not set, scroll ignored");
            return None;
        }
        if !self.gate.try_acquire(now) {
            debug!(
                "simbrief refresh cooling down, {}s left",
                ceil_secs(self.gate.remaining(now))
            );
            return None;
        }
        info!("requesting simbrief plan for {username}");
        Some(PlanRequest {
            username: username.to_string(),
        })
    }

    pub fn apply_plan(&mut self, message: PlanMessage) {
        let plan = match message {
            PlanMessage::Plan(plan) => plan,
            PlanMessage::Error(err) => {
                warn!("simbrief refresh failed: {err}");
                return;
            }
        };
        let destination_changed = plan.destination.trim() != self.settings.text(DESTINATION).trim();
        let FlightPlan {
            aircraft_type,
            registration,
            origin,
            destination,
            airline_label,
        } = plan;
        info!("simbrief plan {origin} -> {destination} ({aircraft_type} {registration})");

        let updated = self.settings.set_many(vec![
            ("type", aircraft_type.into()),
            ("registration", registration.into()),
            ("origin", origin.into()),
            (DESTINATION, destination.into()),
            ("iata", airline_label.into()),
        ]);
        if let Err(err) = updated {
            warn!("simbrief plan not applied: {err:#}");
            return;
        }
        if destination_changed {
            self.forget_destination();
        }
        if let Some(view) = self.view.as_mut() {
            write_static_text(view, &self.settings);
        }
    }

    /// The host's run action: shows or hides the whole overlay.
    pub fn toggle_overlay(&mut self) {
        let enabled = !self.settings.flag(OVERLAY_TOGGLE);
        if let Err(err) = self.settings.set(OVERLAY_TOGGLE, enabled.into()) {
            warn!("overlay toggle failed: {err:#}");
            return;
        }
        if let Some(view) = self.view.as_mut() {
            view.visible = enabled;
        }
        info!("overlay {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Wheel over the overlay: up grows the font, down shrinks it.
    pub fn on_wheel(&mut self, delta_y: f64) {
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let current = self.settings.number(FONT_SIZE);
        let step = if delta_y < 0.0 { 1.0 } else { -1.0 };
        let size = clamp_font_size(current + step);
        if size == current {
            return;
        }
        if let Err(err) = self.settings.set(FONT_SIZE, size.into()) {
            warn!("font resize failed: {err:#}");
            return;
        }
        self.rescale_fonts();
    }

    pub fn is_active(&self) -> bool {
        self.settings.flag(OVERLAY_TOGGLE)
    }

    pub fn status_icon(&self) -> &'static str {
        if self.is_active() {
            STATUS_ICON_ACTIVE
        } else {
            STATUS_ICON_INACTIVE
        }
    }

    pub fn status_info(&self, now: Instant) -> String {
        if !self.is_active() {
            return "Overlay disabled".to_string();
        }
        if self.settings.flag(SIMBRIEF_ENABLED) {
            let username = self.settings.text(SIMBRIEF_USERNAME).trim();
            if username.is_empty() || username == USERNAME_PLACEHOLDER {
                return "Please set SimBrief username".to_string();
            }
            let remaining = self.gate.remaining(now);
            if !remaining.is_zero() {
                let secs = countdown_secs(&self.gate, remaining);
                return format!("SimBrief available in {secs}s");
            }
        }
        "Overlay enabled".to_string()
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs_f64().ceil() as u64
}

// Window minus the rounded elapsed time, so 7.5s into a 20s window reads 12s.
fn countdown_secs(gate: &RefreshGate, remaining: Duration) -> u64 {
    let elapsed = gate.window().saturating_sub(remaining);
    gate.window()
        .as_secs()
        .saturating_sub(elapsed.as_secs_f64().round() as u64)
}

fn anchor(settings: &SettingsModel) -> Anchor {
    if settings.flag(OVERLAY_BOTTOM) {
        Anchor::Bottom
    } else {
        Anchor::Top
    }
}

fn style(settings: &SettingsModel) -> Style {
    Style {
        wrapper_color: settings.text(COLOR_WRAPPER).to_string(),
        outline_color: settings.text(COLOR_OUTLINE).to_string(),
        background_color: settings.text(COLOR_BACKGROUND).to_string(),
        text_color: settings.text(COLOR_TEXT).to_string(),
        outline_text: settings.flag(OUTLINE_TEXT),
        icon_tint: if settings.flag(BLACK_ICONS) {
            IconTint::Black
        } else {
            IconTint::White
        },
    }
}

fn write_static_text(view: &mut OverlayView, settings: &SettingsModel) {
    for key in STATIC_TEXT_ITEMS {
        view.set_text(key, settings.text(key));
    }
}
