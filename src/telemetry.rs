use std::collections::HashMap;

use crate::units::{feet_to_meters, fpm_to_mps, knots_to_kmh};

pub const PLANE_LATITUDE: &str = "A:PLANE LATITUDE";
pub const PLANE_LONGITUDE: &str = "A:PLANE LONGITUDE";
pub const AIRSPEED_INDICATED: &str = "A:AIRSPEED INDICATED";
pub const VERTICAL_SPEED: &str = "A:VERTICAL SPEED";
pub const PLANE_ALTITUDE: &str = "A:PLANE ALTITUDE";
pub const HEADING_MAGNETIC: &str = "A:PLANE HEADING DEGREES MAGNETIC";
pub const HEADING_GYRO: &str = "A:PLANE HEADING DEGREES GYRO";
pub const AMBIENT_TEMPERATURE: &str = "A:AMBIENT TEMPERATURE";
pub const WIND_DIRECTION: &str = "A:AMBIENT WIND DIRECTION";
pub const WIND_VELOCITY: &str = "A:AMBIENT WIND VELOCITY";
pub const GROUND_VELOCITY: &str = "A:GROUND VELOCITY";
pub const IS_SLEW_ACTIVE: &str = "A:IS SLEW ACTIVE";

/// Host simulator variable access.
pub trait Telemetry {
    fn read(&self, variable: &str, unit: &str) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn from_metric_flag(metric: bool) -> Self {
        if metric {
            UnitSystem::Metric
        } else {
            UnitSystem::Imperial
        }
    }

    pub fn is_metric(self) -> bool {
        self == UnitSystem::Metric
    }

    pub fn speed_unit(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "knots",
            UnitSystem::Metric => "kph",
        }
    }

    pub fn vertical_speed_unit(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "ft/min",
            UnitSystem::Metric => "m/s",
        }
    }

    pub fn altitude_unit(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "feet",
            UnitSystem::Metric => "meters",
        }
    }

    pub fn speed_suffix(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "kt",
            UnitSystem::Metric => "km/h",
        }
    }

    pub fn vertical_speed_suffix(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "fpm",
            UnitSystem::Metric => "m/s",
        }
    }

    pub fn altitude_suffix(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "ft",
            UnitSystem::Metric => "m",
        }
    }

    pub fn distance_suffix(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "nm",
            UnitSystem::Metric => "km",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn read(telemetry: &dyn Telemetry) -> Self {
        Self {
            lat: telemetry.read(PLANE_LATITUDE, "degrees"),
            lon: telemetry.read(PLANE_LONGITUDE, "degrees"),
        }
    }
}

pub fn slew_active(telemetry: &dyn Telemetry) -> bool {
    telemetry.read(IS_SLEW_ACTIVE, "number") != 0.0
}

/// Values read once per slow tick, already in the selected unit system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightSample {
    pub units: UnitSystem,
    pub position: Position,
    pub airspeed: f64,
    pub vertical_speed: f64,
    pub altitude: f64,
    pub heading_magnetic: f64,
    pub temperature_c: f64,
    pub groundspeed_kt: f64,
}

impl FlightSample {
    pub fn read(telemetry: &dyn Telemetry, units: UnitSystem) -> Self {
        Self {
            units,
            position: Position::read(telemetry),
            airspeed: telemetry.read(AIRSPEED_INDICATED, units.speed_unit()),
            vertical_speed: telemetry.read(VERTICAL_SPEED, units.vertical_speed_unit()),
            altitude: telemetry.read(PLANE_ALTITUDE, units.altitude_unit()),
            heading_magnetic: telemetry.read(HEADING_MAGNETIC, "degrees"),
            temperature_c: telemetry.read(AMBIENT_TEMPERATURE, "celsius"),
            groundspeed_kt: telemetry.read(GROUND_VELOCITY, "knots"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindSample {
    pub units: UnitSystem,
    pub direction: f64,
    pub speed: f64,
    pub heading_gyro: f64,
}

impl WindSample {
    pub fn read(telemetry: &dyn Telemetry, units: UnitSystem) -> Self {
        Self {
            units,
            direction: telemetry.read(WIND_DIRECTION, "degrees"),
            speed: telemetry.read(WIND_VELOCITY, units.speed_unit()),
            heading_gyro: telemetry.read(HEADING_GYRO, "degrees"),
        }
    }
}

/// Fixed telemetry for hosts without a simulator attached. Values are held in
/// knots, ft/min, feet, degrees and Celsius and converted on read.
#[derive(Clone, Debug, Default)]
pub struct StaticTelemetry {
    values: HashMap<&'static str, f64>,
}

impl StaticTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variable: &'static str, value: f64) -> Self {
        self.values.insert(variable, value);
        self
    }

    pub fn set(&mut self, variable: &'static str, value: f64) {
        self.values.insert(variable, value);
    }
}

impl Telemetry for StaticTelemetry {
    fn read(&self, variable: &str, unit: &str) -> f64 {
        let value = self.values.get(variable).copied().unwrap_or(0.0);
        match unit {
            "kph" => knots_to_kmh(value),
            "m/s" => fpm_to_mps(value),
            "meters" => feet_to_meters(value),
            _ => value,
        }
    }
}
