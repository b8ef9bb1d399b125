//! Static equipment lookup tables
//!
//! Name-to-stats data consumed at battle setup; the core treats these as
//! read-only input, never generated state.

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};

/// Ammunition kind; a ranged weapon names the kind it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoKind {
    Arrow,
    Bolt,
    Stone,
}

/// Weapon stats: `dice`d`sides` + `bonus`, usable out to `range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub name: String,
    pub dice: u32,
    pub sides: u32,
    pub bonus: i32,
    pub range: u32,
    pub ammo: Option<AmmoKind>,
}

impl WeaponSpec {
    fn melee(name: &str, dice: u32, sides: u32, bonus: i32) -> Self {
        Self {
            name: name.to_string(),
            dice,
            sides,
            bonus,
            range: 1,
            ammo: None,
        }
    }

    fn ranged(name: &str, dice: u32, sides: u32, bonus: i32, range: u32, ammo: AmmoKind) -> Self {
        Self {
            name: name.to_string(),
            dice,
            sides,
            bonus,
            range,
            ammo: Some(ammo),
        }
    }

    /// Bare fists: 1d2 at range 1
    pub fn unarmed() -> Self {
        Self::melee("unarmed", 1, 2, 0)
    }

    /// Look up a weapon by table name
    pub fn by_name(name: &str) -> Option<Self> {
        let spec = match name {
            "axe" => Self::melee(name, 1, 6, 0),
            "battle axe" => Self::melee(name, 1, 8, 0),
            "club" => Self::melee(name, 1, 6, 0),
            "dagger" => Self::melee(name, 1, 4, 0),
            "flail" => Self::melee(name, 1, 6, 1),
            "hammer" => Self::melee(name, 1, 4, 1),
            "mace" => Self::melee(name, 1, 6, 1),
            "morning star" => Self::melee(name, 2, 4, 0),
            "scimitar" => Self::melee(name, 1, 8, 0),
            "spear" => Self::melee(name, 1, 6, 0),
            "quarterstaff" => Self::melee(name, 1, 6, 0),
            "broad sword" => Self::melee(name, 2, 4, 0),
            "long sword" => Self::melee(name, 1, 8, 0),
            "short sword" => Self::melee(name, 1, 6, 0),
            "trident" => Self::melee(name, 1, 6, 1),
            "two-handed sword" => Self::melee(name, 1, 10, 0),
            "bow" => Self::ranged(name, 1, 6, 0, 5, AmmoKind::Arrow),
            "crossbow" => Self::ranged(name, 1, 4, 1, 5, AmmoKind::Bolt),
            "sling" => Self::ranged(name, 1, 4, 0, 3, AmmoKind::Stone),
            _ => return None,
        };
        Some(spec)
    }

    /// Resolve an optional role entry; None means fighting unarmed
    pub fn resolve(name: Option<&str>) -> Result<Self> {
        match name {
            None => Ok(Self::unarmed()),
            Some(n) => Self::by_name(n).ok_or_else(|| ArenaError::UnknownEquipment(n.to_string())),
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.range > 1
    }

    /// Expected damage per hit, the threat heuristic input
    pub fn average_damage(&self) -> f32 {
        self.dice as f32 * (self.sides as f32 + 1.0) / 2.0 + self.bonus as f32
    }
}

/// Armor stats: flat armor class reduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSpec {
    pub name: String,
    pub reduction: i32,
}

impl ArmorSpec {
    pub fn by_name(name: &str) -> Option<Self> {
        let reduction = match name {
            "padded armor" => 2,
            "leather armor" => 2,
            "studded leather" => 3,
            "ring mail" => 3,
            "scale mail" => 4,
            "chain mail" => 5,
            "splint mail" => 6,
            "banded mail" => 6,
            "plate mail" => 7,
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            reduction,
        })
    }

    pub fn resolve(name: Option<&str>) -> Result<Option<Self>> {
        match name {
            None => Ok(None),
            Some(n) => Self::by_name(n)
                .map(Some)
                .ok_or_else(|| ArenaError::UnknownEquipment(n.to_string())),
        }
    }
}

/// Shield stats: flat armor class reduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldSpec {
    pub name: String,
    pub reduction: i32,
}

impl ShieldSpec {
    pub fn by_name(name: &str) -> Option<Self> {
        let reduction = match name {
            "small shield" => 1,
            "large shield" => 2,
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            reduction,
        })
    }

    pub fn resolve(name: Option<&str>) -> Result<Option<Self>> {
        match name {
            None => Ok(None),
            Some(n) => Self::by_name(n)
                .map(Some)
                .ok_or_else(|| ArenaError::UnknownEquipment(n.to_string())),
        }
    }
}
