//! Terrain types and their movement costs

use serde::{Deserialize, Serialize};

/// Terrain of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Plain,
    Forest,
    Mountain,
    Water,
}

impl Terrain {
    /// Cost to enter a cell of this terrain (1.0 = normal)
    pub fn movement_cost(&self) -> f32 {
        match self {
            Terrain::Plain => 1.0,
            Terrain::Forest => 2.0,
            Terrain::Mountain => 3.0,
            Terrain::Water => f32::INFINITY, // Impassable
        }
    }

    pub fn is_passable(&self) -> bool {
        self.movement_cost().is_finite()
    }
}
