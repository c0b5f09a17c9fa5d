//! Neighbor lookup over the ant positions of one tick.
//!
//! The index is rebuilt from scratch every tick (bulk loading an R*-tree is
//! O(n log n)) and is only valid for the positions it was built from.
//! [`LinearScan`] answers the same queries by brute force and exists to
//! verify the tree.

use crate::geometry::{angle_between, Vec2};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// One indexed ant: id plus the position it had when the index was built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Ant id
    pub id: u32,

    /// Position at index build time
    pub position: Vec2,
}

/// Lightweight position-only entry stored in the tree.
#[derive(Debug, Clone, Copy)]
struct AntLocation {
    id: u32,
    position: [f64; 2],
}

impl AntLocation {
    fn neighbor(&self) -> Neighbor {
        Neighbor {
            id: self.id,
            position: Vec2::new(self.position[0], self.position[1]),
        }
    }
}

impl RTreeObject for AntLocation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for AntLocation {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        squared_distance(self.position, *point)
    }
}

fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Circle and sector queries over a fixed set of ant positions.
pub trait NeighborQuery {
    /// All entries within Euclidean distance `<= radius` of `center`,
    /// sorted by id. The entry whose id equals `exclude` is skipped.
    fn positions_in_radius(&self, center: Vec2, radius: f64, exclude: Option<u32>) -> Vec<Neighbor>;

    /// Number of indexed entries.
    fn len(&self) -> usize;

    /// True when nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries within `radius` of `center` whose bearing from `center` lies
    /// within `angle_width / 2` degrees of `direction` (either side).
    ///
    /// An entry sitting exactly on `center` has no bearing and is never part
    /// of a sector. A zero `direction` yields an empty result.
    fn positions_in_sector(
        &self,
        center: Vec2,
        direction: Vec2,
        radius: f64,
        angle_width: f64,
        exclude: Option<u32>,
    ) -> Vec<Neighbor> {
        let half_width = angle_width / 2.0;
        let mut in_sector = self.positions_in_radius(center, radius, exclude);
        in_sector.retain(|n| {
            matches!(angle_between(direction, n.position - center), Ok(angle) if angle <= half_width)
        });
        in_sector
    }
}

/// R*-tree backed index.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    tree: RTree<AntLocation>,
}

impl SpatialIndex {
    /// Bulk-loads an index from `(id, position)` pairs.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, Vec2)>,
    {
        let locations: Vec<AntLocation> = entries
            .into_iter()
            .map(|(id, position)| AntLocation {
                id,
                position: [position.x, position.y],
            })
            .collect();
        Self {
            tree: RTree::bulk_load(locations),
        }
    }
}

impl NeighborQuery for SpatialIndex {
    fn positions_in_radius(&self, center: Vec2, radius: f64, exclude: Option<u32>) -> Vec<Neighbor> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let mut result: Vec<Neighbor> = self
            .tree
            .locate_within_distance([center.x, center.y], radius * radius)
            .filter(|loc| Some(loc.id) != exclude)
            .map(AntLocation::neighbor)
            .collect();
        result.sort_unstable_by_key(|n| n.id);
        result
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}

/// Brute-force O(n) reference index.
#[derive(Debug, Default, Clone)]
pub struct LinearScan {
    locations: Vec<AntLocation>,
}

impl LinearScan {
    /// Stores `(id, position)` pairs for scanning.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, Vec2)>,
    {
        Self {
            locations: entries
                .into_iter()
                .map(|(id, position)| AntLocation {
                    id,
                    position: [position.x, position.y],
                })
                .collect(),
        }
    }
}

impl NeighborQuery for LinearScan {
    fn positions_in_radius(&self, center: Vec2, radius: f64, exclude: Option<u32>) -> Vec<Neighbor> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let r_sq = radius * radius;
        let point = [center.x, center.y];
        let mut result: Vec<Neighbor> = self
            .locations
            .iter()
            .filter(|loc| Some(loc.id) != exclude)
            .filter(|loc| loc.distance_2(&point) <= r_sq)
            .map(AntLocation::neighbor)
            .collect();
        result.sort_unstable_by_key(|n| n.id);
        result
    }

    fn len(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entries(points: &[(f64, f64)]) -> Vec<(u32, Vec2)> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (i as u32, Vec2::new(x, y)))
            .collect()
    }

    fn ids(neighbors: &[Neighbor]) -> Vec<u32> {
        neighbors.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_radius_query_finds_agents_within_radius() {
        let index = SpatialIndex::build(entries(&[(5.0, 5.0), (6.0, 5.0), (50.0, 50.0)]));
        let result = index.positions_in_radius(Vec2::new(5.0, 5.0), 2.0, None);
        assert_eq!(ids(&result), vec![0, 1]);
    }

    #[test]
    fn test_radius_query_is_inclusive() {
        let index = SpatialIndex::build(entries(&[(0.0, 0.0), (3.0, 4.0)]));
        let result = index.positions_in_radius(Vec2::zeros(), 5.0, Some(0));
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_radius_query_excludes_self_only() {
        // A different ant sharing the exact position is still a neighbor.
        let index = SpatialIndex::build(entries(&[(1.0, 1.0), (1.0, 1.0), (1.5, 1.0)]));
        let result = index.positions_in_radius(Vec2::new(1.0, 1.0), 1.0, Some(0));
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_negative_radius_is_empty() {
        let index = SpatialIndex::build(entries(&[(0.0, 0.0)]));
        assert!(index.positions_in_radius(Vec2::zeros(), -1.0, None).is_empty());
        assert!(index.positions_in_radius(Vec2::zeros(), f64::NAN, None).is_empty());
    }

    #[test]
    fn test_sector_query_respects_half_angle() {
        let index = SpatialIndex::build(entries(&[
            (5.0, 0.0),  // dead ahead
            (3.0, 3.0),  // 45 degrees left
            (0.0, 5.0),  // 90 degrees left
            (-5.0, 0.0), // behind
        ]));
        let result = index.positions_in_sector(Vec2::zeros(), Vec2::new(1.0, 0.0), 10.0, 100.0, None);
        assert_eq!(ids(&result), vec![0, 1]);
    }

    #[test]
    fn test_sector_query_skips_center_and_zero_direction() {
        let index = SpatialIndex::build(entries(&[(0.0, 0.0), (1.0, 0.0)]));
        let result = index.positions_in_sector(Vec2::zeros(), Vec2::new(1.0, 0.0), 2.0, 90.0, None);
        assert_eq!(ids(&result), vec![1]);

        let none = index.positions_in_sector(Vec2::zeros(), Vec2::zeros(), 2.0, 90.0, None);
        assert!(none.is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.positions_in_radius(Vec2::zeros(), 100.0, None).is_empty());
    }

    fn point() -> impl Strategy<Value = (f64, f64)> {
        (-200.0f64..200.0, -200.0f64..200.0)
    }

    proptest! {
        #[test]
        fn prop_tree_matches_linear_scan(
            points in prop::collection::vec(point(), 0..200),
            center in point(),
            radius in 0.0f64..120.0,
            heading in 0.0f64..360.0,
            width in 0.0f64..360.0,
            exclude in prop::option::of(0u32..200),
        ) {
            let entries = entries(&points);
            let tree = SpatialIndex::build(entries.clone());
            let scan = LinearScan::build(entries);
            let center = Vec2::new(center.0, center.1);
            let direction = crate::geometry::rotate(Vec2::new(1.0, 0.0), heading);

            prop_assert_eq!(
                tree.positions_in_radius(center, radius, exclude),
                scan.positions_in_radius(center, radius, exclude)
            );
            prop_assert_eq!(
                tree.positions_in_sector(center, direction, radius, width, exclude),
                scan.positions_in_sector(center, direction, radius, width, exclude)
            );
        }
    }
}
