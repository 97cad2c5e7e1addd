use crate::types::location::{planar_distance_2, LatLon, Located};
use ordered_float::OrderedFloat;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point in the R-tree, pointing back into the owned record list.
#[derive(Debug, Clone)]
struct IndexedPoint {
    index: usize,
    location: LatLon,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        // A record is a single point (latitude, longitude).
        AABB::from_point([self.location.latitude(), self.location.longitude()])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        // Same value as the linear scan, so both agree on ties.
        planar_distance_2(LatLon(point[0], point[1]), self.location)
    }
}

/// Owns a list of located records and answers nearest-N queries through an R-tree.
///
/// Results are identical to [`nearest_n`](crate::nearest_n) over the same records,
/// including the input-order tie-break, but a query touches only the neighborhood of
/// the point instead of the whole list.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    records: Vec<T>,
    rtree: RTree<IndexedPoint>,
}

impl<T: Located> SpatialIndex<T> {
    pub fn new(records: Vec<T>) -> Self {
        let points = records
            .iter()
            .enumerate()
            .map(|(index, record)| IndexedPoint {
                index,
                location: record.location(),
            })
            .collect();
        let rtree = RTree::bulk_load(points);
        Self { records, rtree }
    }

    /// Records in their original input order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Up to `n` records closest to `point` by planar distance, closest first.
    ///
    /// A point with a NaN or infinite coordinate has no meaningful neighbours and
    /// yields an empty result.
    pub fn nearest(&self, point: LatLon, n: usize) -> Vec<&T> {
        if n == 0 || !point.latitude().is_finite() || !point.longitude().is_finite() {
            return vec![];
        }

        let query_point = [point.latitude(), point.longitude()];
        let mut found: Vec<(OrderedFloat<f64>, usize)> = Vec::with_capacity(n);

        // The iterator yields non-decreasing distances. Keep going past `n` while the
        // distance still equals the n-th one, so that the tie-break below sees every
        // record sharing the boundary distance.
        for (entry, distance_2) in self.rtree.nearest_neighbor_iter_with_distance_2(&query_point) {
            let distance_2 = OrderedFloat(distance_2);
            if found.len() >= n && found.last().is_some_and(|(last, _)| distance_2 > *last) {
                break;
            }
            found.push((distance_2, entry.index));
        }

        found.sort_unstable();
        found.truncate(n);
        found
            .into_iter()
            .filter_map(|(_, index)| self.records.get(index))
            .collect()
    }
}
