//! Linear nearest-neighbor selection over a slice of records.

use crate::types::location::{planar_distance_2, LatLon, Located};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// Helper struct for BinaryHeap ordering. The input index takes part in the ordering
// so that equal distances keep their input order.
struct Candidate<'a, T> {
    distance_2: OrderedFloat<f64>,
    index: usize,
    record: &'a T,
}

impl<T> Candidate<'_, T> {
    fn key(&self) -> (OrderedFloat<f64>, usize) {
        (self.distance_2, self.index)
    }
}

impl<T> PartialEq for Candidate<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl<T> Eq for Candidate<'_, T> {}
impl<T> PartialOrd for Candidate<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Candidate<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Returns up to `n` records closest to `point`, closest first.
///
/// Ranking uses the planar distance in (longitude, latitude) degree space, not the
/// great-circle distance. Records at equal distance keep their input order.
///
/// # Examples
///
/// ```rust
/// use metar_weather::{nearest_n, Airport, LatLon};
///
/// let airports = vec![
///     Airport::new("UUEE", "Sheremetyevo", 55.9726, 37.4146),
///     Airport::new("UUDD", "Domodedovo", 55.4088, 37.9063),
///     Airport::new("ULLI", "Pulkovo", 59.8003, 30.2625),
/// ];
/// let nearest = nearest_n(LatLon(55.9386, 37.5101), &airports, 2);
/// let codes: Vec<&str> = nearest.iter().map(|a| a.code.as_str()).collect();
/// assert_eq!(codes, ["UUEE", "UUDD"]);
/// ```
pub fn nearest_n<T: Located>(point: LatLon, records: &[T], n: usize) -> Vec<&T> {
    if n == 0 {
        return vec![];
    }

    let mut heap: BinaryHeap<Candidate<'_, T>> = BinaryHeap::with_capacity(n);
    for (index, record) in records.iter().enumerate() {
        let candidate = Candidate {
            distance_2: OrderedFloat(planar_distance_2(point, record.location())),
            index,
            record,
        };

        if heap.len() < n {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop(); // Remove the farthest
            heap.push(candidate);
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|candidate| candidate.record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_truncated() {
        let points = vec![
            LatLon(0.0, 5.0),
            LatLon(0.0, 1.0),
            LatLon(0.0, 3.0),
            LatLon(0.0, 2.0),
            LatLon(0.0, 4.0),
        ];
        let nearest = nearest_n(LatLon(0.0, 0.0), &points, 3);
        assert_eq!(nearest, [&points[1], &points[3], &points[2]]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        // All four are at distance 1 from the origin.
        let points = vec![
            LatLon(1.0, 0.0),
            LatLon(0.0, 1.0),
            LatLon(-1.0, 0.0),
            LatLon(0.0, -1.0),
        ];
        let nearest = nearest_n(LatLon(0.0, 0.0), &points, 2);
        assert_eq!(nearest, [&points[0], &points[1]]);

        let all = nearest_n(LatLon(0.0, 0.0), &points, 10);
        assert_eq!(all, points.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_ranks_by_longitude_latitude_plane() {
        // Planar ranking ignores the shrinking of longitude degrees toward the poles.
        let points = vec![LatLon(60.0, 1.5), LatLon(61.2, 0.0)];
        let nearest = nearest_n(LatLon(60.0, 0.0), &points, 1);
        assert_eq!(nearest, [&points[1]]);
    }

    #[test]
    fn test_zero_and_empty() {
        let points = vec![LatLon(0.0, 0.0)];
        assert!(nearest_n(LatLon(0.0, 0.0), &points, 0).is_empty());
        let none: Vec<LatLon> = vec![];
        assert!(nearest_n(LatLon(0.0, 0.0), &none, 5).is_empty());
    }
}
