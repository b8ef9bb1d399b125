//! Spatial layer: coordinates, terrain, the occupancy-aware grid, and A* pathfinding

pub mod coord;
pub mod grid;
pub mod pathfinding;
pub mod terrain;

pub use coord::{GridPoint, Topology};
pub use grid::BattleGrid;
pub use pathfinding::{find_path, path_cost};
pub use terrain::Terrain;
