//! An immutable view of all reference data and current observations.

use crate::decoder::metar_decoder::MetarDecoder;
use crate::stations::error::NoStationFoundError;
use crate::stations::resolve::{resolve_candidates, ObservationSource, ResolvedWeather};
use crate::stations::spatial_index::SpatialIndex;
use crate::types::airport::Airport;
use crate::types::city::City;
use crate::types::location::LatLon;
use std::collections::HashMap;
use std::sync::Arc;

/// Airports, cities and the latest raw METAR text per ICAO code.
///
/// Nothing in a snapshot changes after construction. The parts sit behind `Arc`, so
/// cloning is cheap and [`with_observations`](Self::with_observations) shares the
/// reference tables with the snapshot it was derived from.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    airports: Arc<SpatialIndex<Airport>>,
    cities: Arc<SpatialIndex<City>>,
    observations: Arc<HashMap<String, String>>,
}

impl WeatherSnapshot {
    pub fn new(
        airports: Vec<Airport>,
        cities: Vec<City>,
        observations: HashMap<String, String>,
    ) -> Self {
        Self {
            airports: Arc::new(SpatialIndex::new(airports)),
            cities: Arc::new(SpatialIndex::new(cities)),
            observations: Arc::new(observations),
        }
    }

    /// A new snapshot with the same airports and cities and the given observations.
    pub fn with_observations(&self, observations: HashMap<String, String>) -> Self {
        Self {
            airports: Arc::clone(&self.airports),
            cities: Arc::clone(&self.cities),
            observations: Arc::new(observations),
        }
    }

    pub fn airports(&self) -> &[Airport] {
        self.airports.records()
    }

    pub fn cities(&self) -> &[City] {
        self.cities.records()
    }

    pub fn observations(&self) -> &HashMap<String, String> {
        &self.observations
    }

    /// Looks up a city by its id, which is also its row index.
    pub fn city(&self, id: usize) -> Option<&City> {
        self.cities.get(id)
    }

    pub fn nearest_airports(&self, point: LatLon, n: usize) -> Vec<&Airport> {
        self.airports.nearest(point, n)
    }

    pub fn nearest_cities(&self, point: LatLon, n: usize) -> Vec<&City> {
        self.cities.nearest(point, n)
    }

    /// Cities whose English or Russian name starts with `text`, ignoring case.
    ///
    /// Matches are ordered by Russian name and cut to `limit`.
    pub fn search_cities(&self, text: &str, limit: usize) -> Vec<&City> {
        let prefix = text.to_lowercase();
        let mut matches: Vec<&City> = self
            .cities()
            .iter()
            .filter(|city| city.name_starts_with(&prefix))
            .collect();
        matches.sort_by(|a, b| a.name_ru.cmp(&b.name_ru));
        matches.truncate(limit);
        matches
    }

    /// Resolves the nearest airport with a decodable observation in this snapshot.
    ///
    /// Same contract as [`resolve_nearest_with`](crate::resolve_nearest_with), with the
    /// ranking served by the R-tree.
    pub fn resolve(
        &self,
        decoder: &MetarDecoder,
        point: LatLon,
        limit: usize,
    ) -> Result<ResolvedWeather, NoStationFoundError> {
        let candidates = self.airports.nearest(point, limit);
        resolve_candidates(decoder, point, candidates, self, limit)
    }
}

impl ObservationSource for WeatherSnapshot {
    fn latest(&self, code: &str) -> Option<&str> {
        self.observations.latest(code)
    }
}
