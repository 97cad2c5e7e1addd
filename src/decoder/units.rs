//! Unit conversions used to normalize METAR values, and the derived humidity.

pub(crate) const KNOTS_TO_MPS: f64 = 0.514444;
pub(crate) const KMH_TO_MPS: f64 = 1.0 / 3.6;
pub(crate) const MPH_TO_MPS: f64 = 0.44704;
pub(crate) const HPA_TO_MMHG: f64 = 0.750062;
pub(crate) const INHG_TO_MMHG: f64 = 25.4;
pub(crate) const FEET_TO_METERS: f64 = 0.3048;
pub(crate) const STATUTE_MILES_TO_METERS: f64 = 1609.344;

const MAGNUS_B: f64 = 17.67;
const MAGNUS_C: f64 = 243.5;

/// Speed unit suffix of a wind group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpeedUnit {
    Knots,
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
}

impl SpeedUnit {
    pub(crate) fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "KT" | "KTS" => Some(SpeedUnit::Knots),
            "MPS" => Some(SpeedUnit::MetersPerSecond),
            "KMH" => Some(SpeedUnit::KilometersPerHour),
            "MPH" => Some(SpeedUnit::MilesPerHour),
            _ => None,
        }
    }

    pub(crate) fn to_mps(self, value: f64) -> f64 {
        match self {
            SpeedUnit::Knots => value * KNOTS_TO_MPS,
            SpeedUnit::MetersPerSecond => value,
            SpeedUnit::KilometersPerHour => value * KMH_TO_MPS,
            SpeedUnit::MilesPerHour => value * MPH_TO_MPS,
        }
    }
}

/// Relative humidity from temperature and dew point (both °C) via the Magnus
/// approximation, as a fraction clamped to `[0, 1]`.
///
/// Reports where the rounded dew point exceeds the temperature would otherwise give
/// values above 1.
pub fn relative_humidity(temperature: f64, dew_point: f64) -> f64 {
    let exponent = MAGNUS_B * dew_point / (MAGNUS_C + dew_point)
        - MAGNUS_B * temperature / (MAGNUS_C + temperature);
    exponent.exp().clamp(0.0, 1.0)
}
