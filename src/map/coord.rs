//! Grid coordinates and adjacency/distance topologies
//!
//! A point is identified by (x, y, topology). Terrain is cell data owned by
//! the grid, never part of point identity, so cached path and score maps stay
//! valid when terrain changes.

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};

/// Adjacency and distance rule set for a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Topology {
    /// 4-neighbor square grid, Manhattan distance
    Orthogonal4,
    /// 8-neighbor square grid, Chebyshev distance
    #[default]
    Orthogonal8,
    /// Axial hex grid, cube distance
    HexAxial,
}

impl Topology {
    /// Neighbor offset table: 4, 8, or 6 entries
    pub fn neighbor_offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Topology::Orthogonal4 => &[(-1, 0), (0, -1), (0, 1), (1, 0)],
            Topology::Orthogonal8 => &[
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ],
            Topology::HexAxial => &[(-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0)],
        }
    }
}

/// A coordinate on a battle grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
    pub topology: Topology,
}

impl GridPoint {
    pub fn new(x: i32, y: i32, topology: Topology) -> Self {
        Self { x, y, topology }
    }

    /// Topology-aware distance between two points.
    ///
    /// Mixing topologies is a contract violation, not a valid query.
    pub fn distance(&self, other: &Self) -> Result<u32> {
        if self.topology != other.topology {
            return Err(ArenaError::TopologyMismatch(self.topology, other.topology));
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let d = match self.topology {
            Topology::Orthogonal4 => dx.abs() + dy.abs(),
            Topology::Orthogonal8 => dx.abs().max(dy.abs()),
            Topology::HexAxial => (dx.abs() + (dx + dy).abs() + dy.abs()) / 2,
        };
        Ok(d as u32)
    }

    pub fn is_adjacent(&self, other: &Self) -> Result<bool> {
        Ok(self.distance(other)? == 1)
    }

    pub fn is_within_range(&self, other: &Self, range: u32) -> Result<bool> {
        Ok(self.distance(other)? <= range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32, t: Topology) -> GridPoint {
        GridPoint::new(x, y, t)
    }

    #[test]
    fn test_neighbor_offset_counts() {
        assert_eq!(Topology::Orthogonal4.neighbor_offsets().len(), 4);
        assert_eq!(Topology::Orthogonal8.neighbor_offsets().len(), 8);
        assert_eq!(Topology::HexAxial.neighbor_offsets().len(), 6);
    }

    #[test]
    fn test_manhattan_distance() {
        let a = p(0, 0, Topology::Orthogonal4);
        let b = p(3, 4, Topology::Orthogonal4);
        assert_eq!(a.distance(&b).unwrap(), 7);
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = p(0, 0, Topology::Orthogonal8);
        let b = p(3, 4, Topology::Orthogonal8);
        assert_eq!(a.distance(&b).unwrap(), 4);
    }

    #[test]
    fn test_hex_distance() {
        let a = p(0, 0, Topology::HexAxial);
        assert_eq!(a.distance(&p(1, 0, Topology::HexAxial)).unwrap(), 1);
        assert_eq!(a.distance(&p(1, -1, Topology::HexAxial)).unwrap(), 1);
        assert_eq!(a.distance(&p(2, -1, Topology::HexAxial)).unwrap(), 2);
        assert_eq!(a.distance(&p(-2, -1, Topology::HexAxial)).unwrap(), 3);
    }

    #[test]
    fn test_distance_same_point() {
        for t in [Topology::Orthogonal4, Topology::Orthogonal8, Topology::HexAxial] {
            let a = p(5, 5, t);
            assert_eq!(a.distance(&a).unwrap(), 0);
        }
    }

    #[test]
    fn test_topology_mismatch_is_error() {
        let a = p(0, 0, Topology::Orthogonal4);
        let b = p(1, 1, Topology::HexAxial);
        assert!(matches!(
            a.distance(&b),
            Err(ArenaError::TopologyMismatch(_, _))
        ));
    }

    #[test]
    fn test_adjacency_diagonal() {
        let a = p(2, 2, Topology::Orthogonal8);
        let b = p(3, 3, Topology::Orthogonal8);
        assert!(a.is_adjacent(&b).unwrap());

        let a4 = p(2, 2, Topology::Orthogonal4);
        let b4 = p(3, 3, Topology::Orthogonal4);
        assert!(!a4.is_adjacent(&b4).unwrap());
    }

    #[test]
    fn test_within_range() {
        let a = p(0, 0, Topology::Orthogonal8);
        let b = p(4, 2, Topology::Orthogonal8);
        assert!(a.is_within_range(&b, 5).unwrap());
        assert!(a.is_within_range(&b, 4).unwrap());
        assert!(!a.is_within_range(&b, 3).unwrap());
    }
}
