//! Per-fighter combat state
//!
//! A fighter's combat modifiers are always the sum over its active effects,
//! recomputed on demand. Nothing here stores an adjusted armor class or
//! attack bonus, so an effect expiring can never leave a stale delta behind.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::ai::TargetingPolicy;
use crate::combat::dice;
use crate::combat::effects::{EffectKind, StatusEffect};
use crate::combat::equipment::{ArmorSpec, ShieldSpec, WeaponSpec};
use crate::core::types::{Faction, FighterId};
use crate::map::coord::GridPoint;

/// What one effect did during a fighter's pre-action tick
#[derive(Debug, Clone, Copy)]
pub struct EffectTickReport {
    pub kind: EffectKind,
    pub healed: i32,
    pub expired: bool,
}

/// An autonomous fighter on the battle grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub id: FighterId,
    pub name: String,
    pub faction: Faction,
    pub level: u32,
    pub max_health: i32,
    pub health: i32,
    pub weapon: WeaponSpec,
    /// Rounds left for a ranged weapon; irrelevant for melee
    pub ammo: u32,
    pub armor: Option<ArmorSpec>,
    pub shield: Option<ShieldSpec>,
    /// Current cell; None before placement and after death
    pub position: Option<GridPoint>,
    pub policy: TargetingPolicy,
    pub effects: Vec<StatusEffect>,
    /// Consecutive low-health turns spent defending (Defensive policy only)
    pub stall_turns: u32,
}

impl Fighter {
    /// Create a fighter with health rolled as `level` d10s
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        faction: Faction,
        level: u32,
        weapon: WeaponSpec,
        armor: Option<ArmorSpec>,
        shield: Option<ShieldSpec>,
        ammo: u32,
        policy: TargetingPolicy,
        rng: &mut impl Rng,
    ) -> Self {
        let level = level.max(1);
        let max_health = dice::roll(rng, level, 10);
        Self {
            id: FighterId::new(),
            name: name.into(),
            faction,
            level,
            max_health,
            health: max_health,
            weapon,
            ammo,
            armor,
            shield,
            position: None,
            policy,
            effects: Vec::new(),
            stall_turns: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Effective defense: base 10 minus equipment reductions, plus the sum
    /// of active effect deltas. Lower means harder to hit.
    pub fn armor_class(&self) -> i32 {
        let armor = self.armor.as_ref().map_or(0, |a| a.reduction);
        let shield = self.shield.as_ref().map_or(0, |s| s.reduction);
        let effects: i32 = self.effects.iter().map(|e| e.armor_class_delta()).sum();
        10 - armor - shield + effects
    }

    pub fn attack_bonus(&self) -> i32 {
        self.effects.iter().map(|e| e.attack_bonus()).sum()
    }

    pub fn damage_bonus(&self) -> i32 {
        self.effects.iter().map(|e| e.damage_bonus()).sum()
    }

    /// Expected damage output, the GreatestThreat targeting heuristic
    pub fn threat(&self) -> f32 {
        self.weapon.average_damage() + self.damage_bonus() as f32
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Is an effect of this kind active or cooling down?
    pub fn has_engaged_effect(&self, kind: EffectKind) -> bool {
        self.effects
            .iter()
            .any(|e| e.kind == kind && e.is_engaged())
    }

    /// Apply an effect unless the same kind is active or cooling down.
    ///
    /// Returns whether anything happened; reapplication is a strict no-op.
    pub fn apply_effect(&mut self, kind: EffectKind) -> bool {
        if self.has_engaged_effect(kind) {
            return false;
        }
        self.effects.retain(|e| e.kind != kind);
        self.heal(kind.on_apply_heal());
        self.effects.push(StatusEffect::new(kind));
        true
    }

    /// Tick all effects once, before the fighter acts. Applies over-time
    /// heals and drops effects whose duration and cooldown are exhausted.
    pub fn tick_effects(&mut self) -> Vec<EffectTickReport> {
        let mut reports = Vec::new();
        for effect in &mut self.effects {
            let outcome = effect.tick();
            if outcome.heal != 0 || outcome.expired {
                reports.push(EffectTickReport {
                    kind: effect.kind,
                    healed: outcome.heal,
                    expired: outcome.expired,
                });
            }
        }
        let healed: i32 = reports.iter().map(|r| r.healed).sum();
        if healed > 0 {
            self.heal(healed);
        }
        self.effects.retain(|e| e.is_engaged());
        reports
    }

    /// Shield Wall if shielded and available, else Defensive Stance if
    /// available, else nothing. Returns what was applied.
    pub fn take_defensive_action(&mut self) -> Option<EffectKind> {
        if self.shield.is_some() && !self.has_engaged_effect(EffectKind::ShieldWall) {
            self.apply_effect(EffectKind::ShieldWall);
            return Some(EffectKind::ShieldWall);
        }
        if !self.has_engaged_effect(EffectKind::DefensiveStance) {
            self.apply_effect(EffectKind::DefensiveStance);
            return Some(EffectKind::DefensiveStance);
        }
        None
    }
}
