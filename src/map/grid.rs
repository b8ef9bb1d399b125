//! Battle grid: dense terrain storage plus fighter occupancy
//!
//! The grid owns the occupant mapping. Fighters hold a copy of their own
//! coordinate; the cell-to-fighter direction lives only here, so there are no
//! bidirectional references to keep in sync.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::core::types::FighterId;
use crate::map::coord::{GridPoint, Topology};
use crate::map::terrain::Terrain;

/// A single grid cell
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Cell {
    terrain: Terrain,
    occupant: Option<FighterId>,
}

/// Fixed-size 2D battle grid with one topology for its whole lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleGrid {
    width: u32,
    height: u32,
    topology: Topology,
    cells: Vec<Cell>,
}

impl BattleGrid {
    /// Create a grid of plain terrain
    pub fn new(width: u32, height: u32, topology: Topology) -> Self {
        Self {
            width,
            height,
            topology,
            cells: vec![Cell::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    /// Point at (x, y), or None when out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<GridPoint> {
        self.index(x, y)
            .map(|_| GridPoint::new(x, y, self.topology))
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        point.topology == self.topology && self.index(point.x, point.y).is_some()
    }

    pub fn terrain_at(&self, point: GridPoint) -> Option<Terrain> {
        self.index(point.x, point.y).map(|i| self.cells[i].terrain)
    }

    /// Set terrain; silently ignores out-of-bounds coordinates
    pub fn set_terrain(&mut self, x: i32, y: i32, terrain: Terrain) {
        if let Some(i) = self.index(x, y) {
            self.cells[i].terrain = terrain;
        }
    }

    pub fn occupant_at(&self, point: GridPoint) -> Option<FighterId> {
        self.index(point.x, point.y)
            .and_then(|i| self.cells[i].occupant)
    }

    pub fn is_occupied(&self, point: GridPoint) -> bool {
        self.occupant_at(point).is_some()
    }

    /// In-bounds neighbors of a point, in topology offset order
    pub fn neighbors(&self, point: GridPoint) -> Vec<GridPoint> {
        self.topology
            .neighbor_offsets()
            .iter()
            .filter_map(|(dx, dy)| self.get(point.x + dx, point.y + dy))
            .collect()
    }

    /// Distance between two points on this grid
    pub fn distance(&self, a: GridPoint, b: GridPoint) -> Result<u32> {
        if a.topology != self.topology {
            return Err(ArenaError::TopologyMismatch(a.topology, self.topology));
        }
        a.distance(&b)
    }

    pub fn is_adjacent(&self, a: GridPoint, b: GridPoint) -> Result<bool> {
        Ok(self.distance(a, b)? == 1)
    }

    pub fn is_within_range(&self, a: GridPoint, b: GridPoint, range: u32) -> Result<bool> {
        Ok(self.distance(a, b)? <= range)
    }

    /// Bind a fighter to a cell. Fails if the cell already has an occupant.
    pub fn occupy(&mut self, id: FighterId, point: GridPoint) -> Result<()> {
        let i = self
            .index(point.x, point.y)
            .ok_or(ArenaError::OutOfBounds(point.x, point.y))?;
        if self.cells[i].occupant.is_some() {
            return Err(ArenaError::PositionOccupied(point.x, point.y));
        }
        self.cells[i].occupant = Some(id);
        Ok(())
    }

    /// Clear a cell's occupant; no-op when already empty
    pub fn vacate(&mut self, point: GridPoint) {
        if let Some(i) = self.index(point.x, point.y) {
            self.cells[i].occupant = None;
        }
    }

    /// Atomic vacate-old plus occupy-new. No partial state on failure.
    pub fn move_occupant(&mut self, from: GridPoint, to: GridPoint) -> Result<()> {
        let from_i = self
            .index(from.x, from.y)
            .ok_or(ArenaError::OutOfBounds(from.x, from.y))?;
        let to_i = self
            .index(to.x, to.y)
            .ok_or(ArenaError::OutOfBounds(to.x, to.y))?;
        if self.cells[to_i].occupant.is_some() {
            return Err(ArenaError::PositionOccupied(to.x, to.y));
        }
        let id = self.cells[from_i]
            .occupant
            .take()
            .ok_or(ArenaError::EmptyPosition(from.x, from.y))?;
        self.cells[to_i].occupant = Some(id);
        Ok(())
    }

    /// Random passable, unoccupied cell for spawn placement
    pub fn random_unoccupied(&self, rng: &mut impl Rng) -> Option<GridPoint> {
        let candidates: Vec<GridPoint> = (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| (x, y)))
            .filter_map(|(x, y)| self.get(x, y))
            .filter(|p| self.terrain_at(*p).is_some_and(|t| t.is_passable()) && !self.is_occupied(*p))
            .collect();
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_get_in_bounds() {
        let grid = BattleGrid::new(10, 10, Topology::Orthogonal8);
        assert!(grid.get(0, 0).is_some());
        assert!(grid.get(9, 9).is_some());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = BattleGrid::new(10, 10, Topology::Orthogonal8);
        assert!(grid.get(-1, 0).is_none());
        assert!(grid.get(10, 5).is_none());
        assert!(grid.get(5, 100).is_none());
    }

    #[test]
    fn test_neighbors_filter_bounds() {
        let grid = BattleGrid::new(5, 5, Topology::Orthogonal8);
        let corner = grid.get(0, 0).unwrap();
        assert_eq!(grid.neighbors(corner).len(), 3);
        let center = grid.get(2, 2).unwrap();
        assert_eq!(grid.neighbors(center).len(), 8);
    }

    #[test]
    fn test_neighbors_hex() {
        let grid = BattleGrid::new(5, 5, Topology::HexAxial);
        let center = grid.get(2, 2).unwrap();
        assert_eq!(grid.neighbors(center).len(), 6);
    }

    #[test]
    fn test_occupy_and_exclusivity() {
        let mut grid = BattleGrid::new(5, 5, Topology::Orthogonal8);
        let p = grid.get(1, 1).unwrap();
        let a = FighterId::new();
        let b = FighterId::new();

        grid.occupy(a, p).unwrap();
        assert_eq!(grid.occupant_at(p), Some(a));
        assert!(matches!(
            grid.occupy(b, p),
            Err(ArenaError::PositionOccupied(1, 1))
        ));
        assert_eq!(grid.occupant_at(p), Some(a));
    }

    #[test]
    fn test_vacate_idempotent() {
        let mut grid = BattleGrid::new(5, 5, Topology::Orthogonal8);
        let p = grid.get(1, 1).unwrap();
        grid.occupy(FighterId::new(), p).unwrap();
        grid.vacate(p);
        assert!(!grid.is_occupied(p));
        grid.vacate(p); // no-op
        assert!(!grid.is_occupied(p));
    }

    #[test]
    fn test_move_occupant_atomic() {
        let mut grid = BattleGrid::new(5, 5, Topology::Orthogonal8);
        let from = grid.get(1, 1).unwrap();
        let to = grid.get(2, 2).unwrap();
        let a = FighterId::new();
        let b = FighterId::new();

        grid.occupy(a, from).unwrap();
        grid.occupy(b, to).unwrap();

        // Blocked move leaves both cells untouched
        assert!(grid.move_occupant(from, to).is_err());
        assert_eq!(grid.occupant_at(from), Some(a));
        assert_eq!(grid.occupant_at(to), Some(b));

        let free = grid.get(3, 3).unwrap();
        grid.move_occupant(from, free).unwrap();
        assert!(!grid.is_occupied(from));
        assert_eq!(grid.occupant_at(free), Some(a));
    }

    #[test]
    fn test_move_from_empty_cell() {
        let mut grid = BattleGrid::new(5, 5, Topology::Orthogonal8);
        let from = grid.get(1, 1).unwrap();
        let to = grid.get(2, 2).unwrap();
        assert!(matches!(
            grid.move_occupant(from, to),
            Err(ArenaError::EmptyPosition(1, 1))
        ));
    }

    #[test]
    fn test_random_unoccupied_avoids_water_and_occupants() {
        let mut grid = BattleGrid::new(2, 2, Topology::Orthogonal4);
        grid.set_terrain(0, 0, Terrain::Water);
        grid.set_terrain(0, 1, Terrain::Water);
        let taken = grid.get(1, 0).unwrap();
        grid.occupy(FighterId::new(), taken).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let p = grid.random_unoccupied(&mut rng).unwrap();
        assert_eq!((p.x, p.y), (1, 1));
    }

    #[test]
    fn test_random_unoccupied_full_grid() {
        let mut grid = BattleGrid::new(1, 1, Topology::Orthogonal4);
        let p = grid.get(0, 0).unwrap();
        grid.occupy(FighterId::new(), p).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(grid.random_unoccupied(&mut rng).is_none());
    }

    #[test]
    fn test_terrain_is_mutable_cell_data() {
        let mut grid = BattleGrid::new(5, 5, Topology::Orthogonal8);
        let p = grid.get(2, 2).unwrap();
        assert_eq!(grid.terrain_at(p), Some(Terrain::Plain));
        grid.set_terrain(2, 2, Terrain::Forest);
        // Same point value keys the same cell after terraforming
        assert_eq!(grid.terrain_at(p), Some(Terrain::Forest));
    }
}
