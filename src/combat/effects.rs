//! Status effect state machine
//!
//! Effects are data, not closures: each kind carries a fixed duration,
//! cooldown, and tick rule, dispatched by pattern matching. Attribute deltas
//! are never written into fighter state; fighters recompute their modifiers
//! as the sum over active effects, so expiry cannot drift or double-apply.

use serde::{Deserialize, Serialize};

/// The effects the simulator knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Last-survivor rage: attack bonus starting at 5, fading by 1 per turn
    BerserkRage,
    /// Braced posture: -4 armor class for one turn
    DefensiveStance,
    /// Shield brace: -6 armor class for two turns, then a long cooldown
    ShieldWall,
    /// Heals 5 on apply and 5 per active turn
    Regeneration,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::BerserkRage => "Berserk Rage",
            EffectKind::DefensiveStance => "Defensive Stance",
            EffectKind::ShieldWall => "Shield Wall",
            EffectKind::Regeneration => "Regeneration",
        }
    }

    pub fn duration(&self) -> u32 {
        match self {
            EffectKind::BerserkRage => 5,
            EffectKind::DefensiveStance => 1,
            EffectKind::ShieldWall => 2,
            EffectKind::Regeneration => 3,
        }
    }

    pub fn cooldown(&self) -> u32 {
        match self {
            EffectKind::ShieldWall => 5,
            _ => 0,
        }
    }

    /// Immediate heal when the effect is first applied
    pub fn on_apply_heal(&self) -> i32 {
        match self {
            EffectKind::Regeneration => 5,
            _ => 0,
        }
    }
}

/// Lifecycle phase of one effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPhase {
    Active,
    Cooldown,
    Exhausted,
}

/// What a single tick did to an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub heal: i32,
    pub expired: bool,
}

/// One named effect on one fighter.
///
/// Duration and cooldown are mutually exclusive phases: while duration > 0
/// the cooldown is 0, and the cooldown is set only at the moment the
/// duration reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub remaining_duration: u32,
    pub remaining_cooldown: u32,
}

impl StatusEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            remaining_duration: kind.duration(),
            remaining_cooldown: 0,
        }
    }

    pub fn phase(&self) -> EffectPhase {
        if self.remaining_duration > 0 {
            EffectPhase::Active
        } else if self.remaining_cooldown > 0 {
            EffectPhase::Cooldown
        } else {
            EffectPhase::Exhausted
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() == EffectPhase::Active
    }

    /// Active or cooling down; the kind may not be reapplied yet
    pub fn is_engaged(&self) -> bool {
        self.phase() != EffectPhase::Exhausted
    }

    /// Armor class delta contributed while active (negative = harder to hit)
    pub fn armor_class_delta(&self) -> i32 {
        if !self.is_active() {
            return 0;
        }
        match self.kind {
            EffectKind::DefensiveStance => -4,
            EffectKind::ShieldWall => -6,
            _ => 0,
        }
    }

    /// Attack bonus contributed while active
    pub fn attack_bonus(&self) -> i32 {
        if !self.is_active() {
            return 0;
        }
        match self.kind {
            // Rage fades: the bonus tracks the remaining duration, 5 down to 1
            EffectKind::BerserkRage => self.remaining_duration as i32,
            _ => 0,
        }
    }

    /// Damage bonus contributed while active
    pub fn damage_bonus(&self) -> i32 {
        0
    }

    /// Advance one turn. Called once per owner turn before the owner acts.
    pub fn tick(&mut self) -> TickOutcome {
        if self.remaining_duration > 0 {
            let heal = match self.kind {
                EffectKind::Regeneration => 5,
                _ => 0,
            };
            self.remaining_duration -= 1;
            if self.remaining_duration == 0 {
                self.remaining_cooldown = self.kind.cooldown();
                return TickOutcome {
                    heal,
                    expired: true,
                };
            }
            TickOutcome {
                heal,
                expired: false,
            }
        } else {
            if self.remaining_cooldown > 0 {
                self.remaining_cooldown -= 1;
            }
            TickOutcome {
                heal: 0,
                expired: false,
            }
        }
    }
}
