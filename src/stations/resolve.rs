use crate::decoder::metar_decoder::MetarDecoder;
use crate::stations::error::NoStationFoundError;
use crate::stations::nearest::nearest_n;
use crate::types::airport::Airport;
use crate::types::location::{great_circle_distance_km, LatLon, Located};
use crate::types::observation::Observation;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// How many of the nearest airports are tried before giving up.
pub const DEFAULT_STATION_LIMIT: usize = 10;

/// Lookup of the most recent raw METAR text by ICAO code.
pub trait ObservationSource {
    fn latest(&self, code: &str) -> Option<&str>;
}

impl<S: BuildHasher> ObservationSource for HashMap<String, String, S> {
    fn latest(&self, code: &str) -> Option<&str> {
        self.get(code).map(String::as_str)
    }
}

/// The observation of the nearest airport that had a decodable report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWeather {
    pub airport: Airport,
    pub observation: Observation,
    /// Great-circle distance from the query point to the airport.
    pub distance_km: f64,
}

/// Finds the nearest airport with a decodable current observation.
///
/// The `limit` nearest airports (see [`nearest_n`]) are tried closest first. An
/// airport without raw text, or whose text fails to decode, is skipped. The first
/// success wins and its distance is recomputed on the great circle.
///
/// Reports are decoded with [`MetarDecoder::default`]; use [`resolve_nearest_with`]
/// to control the reference date.
///
/// # Errors
///
/// Returns [`NoStationFoundError`] when none of the candidates yields an observation,
/// including when `airports` is empty or `limit` is zero.
///
/// # Examples
///
/// ```rust
/// use metar_weather::{resolve_nearest, Airport, LatLon};
/// use std::collections::HashMap;
///
/// let airports = vec![
///     Airport::new("UUEE", "Sheremetyevo", 55.9726, 37.4146),
///     Airport::new("UUDD", "Domodedovo", 55.4088, 37.9063),
/// ];
/// let mut latest = HashMap::new();
/// latest.insert("UUDD".to_string(), "UUDD 151030Z 18004MPS 9999 SCT030 10/05 Q1015".to_string());
///
/// let resolved = resolve_nearest(LatLon(55.7558, 37.6173), &airports, &latest, 10).unwrap();
/// assert_eq!(resolved.airport.code, "UUDD");
/// assert_eq!(resolved.observation.temperature, Some(10.0));
/// ```
pub fn resolve_nearest<S: ObservationSource + ?Sized>(
    point: LatLon,
    airports: &[Airport],
    latest: &S,
    limit: usize,
) -> Result<ResolvedWeather, NoStationFoundError> {
    resolve_nearest_with(&MetarDecoder::default(), point, airports, latest, limit)
}

/// [`resolve_nearest`] with an explicit decoder.
pub fn resolve_nearest_with<S: ObservationSource + ?Sized>(
    decoder: &MetarDecoder,
    point: LatLon,
    airports: &[Airport],
    latest: &S,
    limit: usize,
) -> Result<ResolvedWeather, NoStationFoundError> {
    let candidates = nearest_n(point, airports, limit);
    resolve_candidates(decoder, point, candidates, latest, limit)
}

/// Walks already ranked candidates. Shared with the snapshot, which ranks through
/// its R-tree instead of a linear scan.
pub(crate) fn resolve_candidates<'a, I, S>(
    decoder: &MetarDecoder,
    point: LatLon,
    candidates: I,
    latest: &S,
    limit: usize,
) -> Result<ResolvedWeather, NoStationFoundError>
where
    I: IntoIterator<Item = &'a Airport>,
    S: ObservationSource + ?Sized,
{
    let mut tried = 0;
    let mut missing = 0;
    let mut undecodable = 0;
    let mut last_decode_error = None;

    for airport in candidates.into_iter().take(limit) {
        tried += 1;
        let Some(raw) = latest.latest(&airport.code) else {
            debug!("No current observation for {}, skipping", airport.code);
            missing += 1;
            continue;
        };

        match decoder.decode(raw) {
            Ok(observation) => {
                let distance_km = great_circle_distance_km(point, airport.location());
                return Ok(ResolvedWeather {
                    airport: airport.clone(),
                    observation,
                    distance_km,
                });
            }
            Err(e) => {
                debug!("Observation for {} failed to decode: {}", airport.code, e);
                undecodable += 1;
                last_decode_error = Some(Box::new(e));
            }
        }
    }

    Err(NoStationFoundError {
        lat: point.latitude(),
        lon: point.longitude(),
        limit,
        tried,
        missing,
        undecodable,
        last_decode_error,
    })
}
