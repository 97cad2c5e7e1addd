use crate::decoder::error::DecodeError;
use thiserror::Error;

/// None of the nearest candidate airports had an observation that could be decoded.
///
/// `missing` and `undecodable` separate stations that simply had no current report
/// from stations whose report was corrupt. Widening the search or refreshing the
/// observation snapshot are the caller's options.
#[derive(Debug, Error, Clone, PartialEq)]
#[error(
    "No station with a decodable observation among the {tried} nearest to ({lat}, {lon}) \
     (limit {limit}): {missing} without data, {undecodable} undecodable"
)]
pub struct NoStationFoundError {
    pub lat: f64,
    pub lon: f64,
    pub limit: usize,
    /// Candidates actually examined, at most `limit`.
    pub tried: usize,
    pub missing: usize,
    pub undecodable: usize,
    pub last_decode_error: Option<Box<DecodeError>>,
}
