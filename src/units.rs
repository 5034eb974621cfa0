//! Unit conversions and label formatting shared by the samplers.

use std::f64::consts::PI;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const KM_PER_NM: f64 = 1.852;
pub const FEET_PER_METER: f64 = 3.28084;
pub const FPM_PER_MPS: f64 = 196.850_394;
pub const MIN_FONT_SIZE: f64 = 8.0;
pub const MAX_FONT_SIZE: f64 = 128.0;

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Great-circle distance in nautical miles between two lat/lon pairs (haversine).
pub fn great_circle_distance(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let dlat = deg_to_rad(lat_b - lat_a);
    let dlon = deg_to_rad(lon_b - lon_a);
    let a = (dlat / 2.0).sin().powi(2)
        + deg_to_rad(lat_a).cos() * deg_to_rad(lat_b).cos() * (dlon / 2.0).sin().powi(2);
    // atan2 keeps this finite when rounding pushes `a` slightly outside [0, 1].
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c / KM_PER_NM
}

/// Pads the absolute value of `number` to `width` characters. A minus sign is
/// placed in front of the padding, so negative values may be one wider.
pub fn pad_number(number: i64, width: usize, pad_char: char) -> String {
    let digits = number.unsigned_abs().to_string();
    let fill = width.saturating_sub(digits.chars().count());
    let mut out = String::with_capacity(fill + digits.len() + 1);
    if number < 0 {
        out.push('-');
    }
    out.extend(std::iter::repeat(pad_char).take(fill));
    out.push_str(&digits);
    out
}

pub fn knots_to_kmh(knots: f64) -> f64 {
    knots * KM_PER_NM
}

pub fn kmh_to_knots(kmh: f64) -> f64 {
    kmh / KM_PER_NM
}

pub fn fpm_to_mps(fpm: f64) -> f64 {
    fpm / FPM_PER_MPS
}

pub fn mps_to_fpm(mps: f64) -> f64 {
    mps * FPM_PER_MPS
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet / FEET_PER_METER
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) / 1.8
}

pub fn nm_to_km(nm: f64) -> f64 {
    nm * KM_PER_NM
}

pub fn km_to_nm(km: f64) -> f64 {
    km / KM_PER_NM
}

/// Rotation for the wind arrow, relative to the aircraft nose.
pub fn relative_wind(heading: f64, wind_direction: f64) -> f64 {
    -((360.0 + (heading - wind_direction)) % 360.0).abs() + 180.0
}

/// Hours to destination, or zero when the aircraft is effectively stationary.
pub fn ete_hours(distance_nm: f64, groundspeed_kt: f64) -> f64 {
    if groundspeed_kt > 10.0 && distance_nm > 0.0 {
        distance_nm / groundspeed_kt
    } else {
        0.0
    }
}

/// Truncated `HH:MM`. Spans of 100 hours or more print a wider hour field.
pub fn format_ete(hours: f64) -> String {
    let hours = hours.max(0.0);
    let whole = hours.trunc();
    let minutes = ((hours - whole) * 60.0).trunc();
    format!(
        "{}:{}",
        pad_number(whole as i64, 2, '0'),
        pad_number(minutes as i64, 2, '0')
    )
}

pub fn clamp_font_size(size: f64) -> f64 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let ab = great_circle_distance(45.0, -122.0, 47.45, -122.31);
        let ba = great_circle_distance(47.45, -122.31, 45.0, -122.0);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn distance_same_point_is_zero() {
        assert_eq!(great_circle_distance(26.0, -80.0, 26.0, -80.0), 0.0);
    }

    #[test]
    fn distance_short_hop_is_one_nm() {
        let dist = great_circle_distance(0.0, 0.0, 0.0, 1.852 / 111.2);
        assert!((dist - 1.0).abs() < 0.01, "got {dist}");
    }

    #[test]
    fn distance_antipodal_is_finite() {
        let dist = great_circle_distance(0.0, 0.0, 0.0, 180.0);
        assert!(dist.is_finite());
        let half_circumference = PI * EARTH_RADIUS_KM / KM_PER_NM;
        assert!((dist - half_circumference).abs() < 0.001);
    }

    #[test]
    fn pad_number_cases() {
        assert_eq!(pad_number(7, 3, '0'), "007");
        assert_eq!(pad_number(-7, 3, '0'), "-007");
        assert_eq!(pad_number(1234, 3, '0'), "1234");
        assert_eq!(pad_number(0, 4, '0'), "0000");
        assert_eq!(pad_number(5, 2, ' '), " 5");
    }

    #[test]
    fn conversions() {
        assert!((knots_to_kmh(100.0) - 185.2).abs() < 1e-9);
        assert!((kmh_to_knots(knots_to_kmh(42.0)) - 42.0).abs() < 1e-9);
        assert!((mps_to_fpm(1.0) - 196.85).abs() < 0.01);
        assert!((fpm_to_mps(mps_to_fpm(3.5)) - 3.5).abs() < 1e-9);
        assert!((feet_to_meters(1000.0) - 304.8).abs() < 0.01);
        assert!((meters_to_feet(feet_to_meters(1234.0)) - 1234.0).abs() < 1e-9);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 1e-9);
        assert!((nm_to_km(10.0) - 18.52).abs() < 1e-9);
        assert!((km_to_nm(18.52) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn relative_wind_cases() {
        assert_eq!(relative_wind(90.0, 270.0), 0.0);
        assert_eq!(relative_wind(0.0, 0.0), 180.0);
        assert_eq!(relative_wind(90.0, 0.0), 90.0);
        assert_eq!(relative_wind(0.0, 90.0), -90.0);
    }

    #[test]
    fn ete_requires_motion_and_distance() {
        assert_eq!(ete_hours(120.0, 5.0), 0.0);
        assert_eq!(ete_hours(0.0, 120.0), 0.0);
        assert_eq!(ete_hours(120.0, 240.0), 0.5);
    }

    #[test]
    fn ete_formatting_truncates() {
        assert_eq!(format_ete(0.0), "00:00");
        assert_eq!(format_ete(1.999), "01:59");
        assert_eq!(format_ete(0.5), "00:30");
        assert_eq!(format_ete(150.0), "150:00");
    }

    #[test]
    fn font_size_is_clamped() {
        assert_eq!(clamp_font_size(2.0), 8.0);
        assert_eq!(clamp_font_size(500.0), 128.0);
        assert_eq!(clamp_font_size(23.0), 23.0);
    }
}
