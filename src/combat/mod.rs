//! Fighter state, equipment data, dice, and the status effect engine

pub mod dice;
pub mod effects;
pub mod equipment;
pub mod fighter;

pub use effects::{EffectKind, EffectPhase, StatusEffect};
pub use equipment::{AmmoKind, ArmorSpec, ShieldSpec, WeaponSpec};
pub use fighter::Fighter;
