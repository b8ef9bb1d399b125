//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for fighters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FighterId(pub Uuid);

impl FighterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FighterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Battle round counter
pub type Turn = u32;

/// Team grouping label; a battle ends when one faction has living members
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Faction(pub String);

impl Faction {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
