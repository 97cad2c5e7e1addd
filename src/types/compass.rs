//! Defines the `CompassPoint` enum, mapping a wind direction in degrees to the nearest
//! of the eight principal compass directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight principal compass directions.
///
/// Used to render a wind arrow or a short textual direction for an [`Observation`](crate::Observation).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

// 360 maps back to north so that directions just below 360 do not snap to NW.
const BEARINGS: [(f64, CompassPoint); 9] = [
    (0.0, CompassPoint::North),
    (45.0, CompassPoint::NorthEast),
    (90.0, CompassPoint::East),
    (135.0, CompassPoint::SouthEast),
    (180.0, CompassPoint::South),
    (225.0, CompassPoint::SouthWest),
    (270.0, CompassPoint::West),
    (315.0, CompassPoint::NorthWest),
    (360.0, CompassPoint::North),
];

impl CompassPoint {
    /// Returns the compass point closest to `degrees`.
    ///
    /// Exact midpoints (e.g. 22.5) resolve to the point with the smaller bearing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metar_weather::CompassPoint;
    ///
    /// assert_eq!(CompassPoint::from_degrees(10.0), CompassPoint::North);
    /// assert_eq!(CompassPoint::from_degrees(200.0), CompassPoint::South);
    /// assert_eq!(CompassPoint::from_degrees(350.0), CompassPoint::North);
    /// ```
    pub fn from_degrees(degrees: f64) -> Self {
        let mut best = BEARINGS[0];
        for candidate in BEARINGS.iter().skip(1) {
            if (candidate.0 - degrees).abs() < (best.0 - degrees).abs() {
                best = *candidate;
            }
        }
        best.1
    }

    /// Lowercase abbreviation ("n", "ne", ...), handy as a CSS class or short label.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompassPoint::North => "n",
            CompassPoint::NorthEast => "ne",
            CompassPoint::East => "e",
            CompassPoint::SouthEast => "se",
            CompassPoint::South => "s",
            CompassPoint::SouthWest => "sw",
            CompassPoint::West => "w",
            CompassPoint::NorthWest => "nw",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}
