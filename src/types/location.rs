//! Geographic coordinates and the two distance measures used by the crate: a cheap
//! planar proxy for ranking candidates, and the haversine great-circle distance for
//! the value that is actually reported.

use haversine::{distance, Location as HaversineLocation, Units};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are in decimal degrees.
///
/// # Examples
///
/// ```
/// use metar_weather::LatLon;
///
/// let moscow = LatLon(55.7558, 37.6173);
/// assert_eq!(moscow.0, 55.7558); // Latitude
/// assert_eq!(moscow.1, 37.6173); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// Anything with a fixed position on the globe: airports, cities, query points.
pub trait Located {
    fn location(&self) -> LatLon;
}

impl Located for LatLon {
    fn location(&self) -> LatLon {
        *self
    }
}

/// Squared Euclidean distance in (longitude, latitude) degree space.
///
/// This is only a ranking proxy. It distorts badly away from the equator and across
/// the antimeridian, so it must never be reported as a distance.
pub fn planar_distance_2(a: LatLon, b: LatLon) -> f64 {
    let d_lon = a.longitude() - b.longitude();
    let d_lat = a.latitude() - b.latitude();
    d_lon * d_lon + d_lat * d_lat
}

/// Great-circle distance in kilometers between two coordinates, using the haversine
/// formula on a sphere of radius 6371 km.
///
/// # Examples
///
/// ```
/// use metar_weather::{great_circle_distance_km, LatLon};
///
/// let a = LatLon(0.0, 0.0);
/// let b = LatLon(0.0, 1.0);
/// let d = great_circle_distance_km(a, b);
/// assert!((d - 111.195).abs() < 0.01);
/// assert_eq!(great_circle_distance_km(a, a), 0.0);
/// ```
pub fn great_circle_distance_km(a: LatLon, b: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: a.latitude(),
            longitude: a.longitude(),
        },
        HaversineLocation {
            latitude: b.latitude(),
            longitude: b.longitude(),
        },
        Units::Kilometers,
    )
}
