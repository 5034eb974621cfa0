//! Turns raw telemetry samples into display strings.

use crate::settings::SettingsModel;
use crate::telemetry::{FlightSample, UnitSystem, WindSample};
use crate::units::{celsius_to_fahrenheit, ete_hours, format_ete, nm_to_km, pad_number, relative_wind};

pub const DISTANCE_PLACEHOLDER: &str = "---";
pub const MIN_DISPLAYED_AIRSPEED: i64 = 5;
pub const VS_THRESHOLD_FPM: f64 = 50.0;
pub const VS_THRESHOLD_MPS: f64 = 0.25;
pub const COLD_LIMIT_C: i64 = 0;
pub const HOT_LIMIT_C: i64 = 37;

pub const ICON_VS_DOWN: &str = "arrow-down-circle";
pub const ICON_VS_UP: &str = "arrow-up-circle";
pub const ICON_VS_LEVEL: &str = "minus-circle";
pub const ICON_COLD: &str = "snowflake-alert";
pub const ICON_HOT: &str = "fire-alert";
pub const ICON_TEMPERATURE: &str = "thermometer-lines";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub pad_distance: bool,
    pub pad_airspeed: bool,
    pub pad_vertspeed: bool,
    pub pad_altitude: bool,
    pub fahrenheit: bool,
}

impl FormatOptions {
    pub fn from_settings(settings: &SettingsModel) -> Self {
        Self {
            pad_distance: settings.flag("pad_distance"),
            pad_airspeed: settings.flag("pad_airspeed"),
            pad_vertspeed: settings.flag("pad_vertspeed"),
            pad_altitude: settings.flag("pad_altitude"),
            fahrenheit: settings.flag("oat_fahrenheit"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlightReadout {
    pub distance: String,
    pub ete: String,
    pub airspeed: String,
    pub vertspeed: String,
    pub vertspeed_icon: &'static str,
    pub altitude: String,
    pub heading: String,
    pub oat: String,
    pub oat_icon: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindReadout {
    pub label: String,
    pub rotation_deg: f64,
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

fn maybe_pad(value: i64, width: usize, pad: bool) -> String {
    if pad {
        pad_number(value, width, '0')
    } else {
        value.to_string()
    }
}

pub fn distance_text(distance_nm: Option<f64>, units: UnitSystem, pad: bool) -> String {
    let Some(distance_nm) = distance_nm else {
        return format!("{DISTANCE_PLACEHOLDER}{}", units.distance_suffix());
    };
    let mut distance = round(distance_nm);
    if units.is_metric() {
        distance = round(nm_to_km(distance as f64));
    }
    format!("{}{}", maybe_pad(distance, 4, pad), units.distance_suffix())
}

pub fn vertical_speed_icon(vertical_speed: f64, units: UnitSystem) -> &'static str {
    let threshold = if units.is_metric() {
        VS_THRESHOLD_MPS
    } else {
        VS_THRESHOLD_FPM
    };
    if vertical_speed <= -threshold {
        ICON_VS_DOWN
    } else if vertical_speed >= threshold {
        ICON_VS_UP
    } else {
        ICON_VS_LEVEL
    }
}

pub fn temperature_icon(celsius: i64) -> &'static str {
    if celsius <= COLD_LIMIT_C {
        ICON_COLD
    } else if celsius >= HOT_LIMIT_C {
        ICON_HOT
    } else {
        ICON_TEMPERATURE
    }
}

pub fn format_flight(
    sample: &FlightSample,
    distance_nm: Option<f64>,
    options: &FormatOptions,
) -> FlightReadout {
    let units = sample.units;

    let mut airspeed = round(sample.airspeed);
    if airspeed < MIN_DISPLAYED_AIRSPEED {
        airspeed = 0;
    }

    // The icon follows the displayed value, not the raw reading.
    let vertical_speed = round(sample.vertical_speed);

    let celsius = round(sample.temperature_c);
    let (oat, oat_suffix) = if options.fahrenheit {
        (round(celsius_to_fahrenheit(celsius as f64)), "f")
    } else {
        (celsius, "c")
    };

    let ete = ete_hours(distance_nm.unwrap_or(0.0), sample.groundspeed_kt);

    FlightReadout {
        distance: distance_text(distance_nm, units, options.pad_distance),
        ete: format_ete(ete),
        airspeed: format!(
            "{}{}",
            maybe_pad(airspeed, 3, options.pad_airspeed),
            units.speed_suffix()
        ),
        vertspeed: format!(
            "{}{}",
            maybe_pad(vertical_speed, 4, options.pad_vertspeed),
            units.vertical_speed_suffix()
        ),
        vertspeed_icon: vertical_speed_icon(vertical_speed as f64, units),
        altitude: format!(
            "{}{}",
            maybe_pad(round(sample.altitude), 5, options.pad_altitude),
            units.altitude_suffix()
        ),
        heading: pad_number(round(sample.heading_magnetic), 3, '0'),
        oat: format!("{oat}{oat_suffix}"),
        oat_icon: temperature_icon(celsius),
    }
}

pub fn format_wind(sample: &WindSample) -> WindReadout {
    let direction = round(sample.direction);
    let speed = round(sample.speed);
    WindReadout {
        label: format!("{direction}@{speed}{}", sample.units.speed_suffix()),
        rotation_deg: relative_wind(sample.heading_gyro, direction as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Position;

    fn sample(units: UnitSystem) -> FlightSample {
        FlightSample {
            units,
            position: Position { lat: 45.0, lon: -122.0 },
            airspeed: 110.4,
            vertical_speed: -620.0,
            altitude: 4500.2,
            heading_magnetic: 89.6,
            temperature_c: 12.4,
            groundspeed_kt: 120.0,
        }
    }

    fn padded() -> FormatOptions {
        FormatOptions {
            pad_distance: true,
            pad_airspeed: true,
            pad_vertspeed: true,
            pad_altitude: true,
            fahrenheit: false,
        }
    }

    #[test]
    fn imperial_readout_is_padded() {
        let readout = format_flight(&sample(UnitSystem::Imperial), Some(120.08), &padded());
        assert_eq!(readout.distance, "0120nm");
        assert_eq!(readout.ete, "01:00");
        assert_eq!(readout.airspeed, "110kt");
        assert_eq!(readout.vertspeed, "-0620fpm");
        assert_eq!(readout.vertspeed_icon, ICON_VS_DOWN);
        assert_eq!(readout.altitude, "04500ft");
        assert_eq!(readout.heading, "090");
        assert_eq!(readout.oat, "12c");
        assert_eq!(readout.oat_icon, ICON_TEMPERATURE);
    }

    #[test]
    fn unpadded_and_fahrenheit() {
        let options = FormatOptions {
            fahrenheit: true,
            ..FormatOptions::default()
        };
        let readout = format_flight(&sample(UnitSystem::Imperial), Some(7.4), &options);
        assert_eq!(readout.distance, "7nm");
        assert_eq!(readout.altitude, "4500ft");
        assert_eq!(readout.oat, "54f");
    }

    #[test]
    fn metric_distance_converts_rounded_nm() {
        assert_eq!(distance_text(Some(10.2), UnitSystem::Metric, true), "0019km");
        assert_eq!(distance_text(None, UnitSystem::Metric, true), "---km");
        assert_eq!(distance_text(None, UnitSystem::Imperial, false), "---nm");
    }

    #[test]
    fn slow_airspeed_reads_zero() {
        let mut slow = sample(UnitSystem::Imperial);
        slow.airspeed = 4.4;
        let readout = format_flight(&slow, None, &padded());
        assert_eq!(readout.airspeed, "000kt");
        assert_eq!(readout.ete, "00:00");
    }

    #[test]
    fn vertical_speed_thresholds_depend_on_units() {
        assert_eq!(vertical_speed_icon(49.0, UnitSystem::Imperial), ICON_VS_LEVEL);
        assert_eq!(vertical_speed_icon(50.0, UnitSystem::Imperial), ICON_VS_UP);
        assert_eq!(vertical_speed_icon(-50.0, UnitSystem::Imperial), ICON_VS_DOWN);
        assert_eq!(vertical_speed_icon(1.0, UnitSystem::Metric), ICON_VS_UP);
        assert_eq!(vertical_speed_icon(0.2, UnitSystem::Metric), ICON_VS_LEVEL);
    }

    #[test]
    fn vertical_speed_icon_matches_rounded_label() {
        let mut climbing = sample(UnitSystem::Imperial);
        climbing.vertical_speed = 49.6;
        let readout = format_flight(&climbing, None, &padded());
        assert_eq!(readout.vertspeed, "0050fpm");
        assert_eq!(readout.vertspeed_icon, ICON_VS_UP);

        let mut metric = sample(UnitSystem::Metric);
        metric.vertical_speed = 0.3;
        let readout = format_flight(&metric, None, &padded());
        assert_eq!(readout.vertspeed, "0000m/s");
        assert_eq!(readout.vertspeed_icon, ICON_VS_LEVEL);

        metric.vertical_speed = -0.6;
        let readout = format_flight(&metric, None, &padded());
        assert_eq!(readout.vertspeed, "-0001m/s");
        assert_eq!(readout.vertspeed_icon, ICON_VS_DOWN);
    }

    #[test]
    fn temperature_thresholds() {
        assert_eq!(temperature_icon(0), ICON_COLD);
        assert_eq!(temperature_icon(-12), ICON_COLD);
        assert_eq!(temperature_icon(36), ICON_TEMPERATURE);
        assert_eq!(temperature_icon(37), ICON_HOT);
    }

    #[test]
    fn wind_label_and_rotation() {
        let wind = WindSample {
            units: UnitSystem::Imperial,
            direction: 270.2,
            speed: 9.6,
            heading_gyro: 90.0,
        };
        let readout = format_wind(&wind);
        assert_eq!(readout.label, "270@10kt");
        assert_eq!(readout.rotation_deg, 0.0);

        let metric = WindSample {
            units: UnitSystem::Metric,
            ..wind
        };
        assert_eq!(format_wind(&metric).label, "270@10km/h");
    }
}
