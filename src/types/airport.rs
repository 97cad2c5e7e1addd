//! Defines the static reference entities the resolver works over: airports with a
//! METAR-reporting weather station, identified by their ICAO code.

use crate::types::location::{LatLon, Located};
use serde::{Deserialize, Serialize};

/// An airport that may report METAR observations.
///
/// Loaded once from the airports reference table and never modified afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Airport {
    /// The 4-character ICAO code (e.g., "UUEE"). Observation lines are keyed by it.
    pub code: String,
    /// Human readable airport name (e.g., "Sheremetyevo").
    pub name: String,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
}

impl Airport {
    pub fn new(code: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

impl Located for Airport {
    fn location(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}
