//! Targeting policies
//!
//! One enum, one decision path. A policy picks a target from the living
//! enemies; the shared decision layer turns that into an attack, an advance
//! along the A* path, or a defensive action for this turn.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::fighter::Fighter;
use crate::core::types::FighterId;
use crate::map::grid::BattleGrid;

/// Turns a Defensive fighter waits at low health before forcing an attack
const STALL_THRESHOLD: u32 = 5;

/// How a fighter chooses its target each turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetingPolicy {
    /// Uniform-random living enemy
    RandomAttack,
    /// Enemy with the least current health
    LowestHealth,
    /// Enemy with the highest expected damage output
    GreatestThreat,
    /// Guard at low health, fight like GreatestThreat otherwise
    Defensive,
}

/// What a fighter does with its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    Attack { target: FighterId },
    /// Move one step along the path toward the target
    Advance { target: FighterId },
    Defend,
    Hold,
}

/// A turn decision plus the fighter's updated stall counter
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub action: TurnAction,
    pub stall_turns: u32,
}

impl TargetingPolicy {
    /// Pick a target among living enemies (roster order breaks ties)
    pub fn select_target<'a>(
        &self,
        enemies: &[&'a Fighter],
        rng: &mut impl Rng,
    ) -> Option<&'a Fighter> {
        match self {
            TargetingPolicy::RandomAttack => enemies.choose(rng).copied(),
            TargetingPolicy::LowestHealth => {
                enemies.iter().copied().reduce(|best, candidate| {
                    if candidate.health < best.health {
                        candidate
                    } else {
                        best
                    }
                })
            }
            TargetingPolicy::GreatestThreat | TargetingPolicy::Defensive => {
                enemies.iter().copied().reduce(|best, candidate| {
                    if candidate.threat() > best.threat() {
                        candidate
                    } else {
                        best
                    }
                })
            }
        }
    }
}

/// Decide the actor's turn.
///
/// Every policy attacks an adjacent enemy first. Otherwise the policy's
/// chosen target is attacked when in weapon range, approached when not.
pub fn decide(
    actor: &Fighter,
    enemies: &[&Fighter],
    grid: &BattleGrid,
    rng: &mut impl Rng,
) -> Decision {
    let stall_turns = actor.stall_turns;
    let Some(position) = actor.position else {
        return Decision {
            action: TurnAction::Hold,
            stall_turns,
        };
    };
    if enemies.is_empty() {
        return Decision {
            action: TurnAction::Hold,
            stall_turns,
        };
    }

    // Adjacent enemy in topology offset order wins outright
    for neighbor in grid.neighbors(position) {
        if let Some(occupant) = grid.occupant_at(neighbor) {
            if enemies.iter().any(|e| e.id == occupant) {
                return Decision {
                    action: TurnAction::Attack { target: occupant },
                    stall_turns,
                };
            }
        }
    }

    let (policy, stall_turns) = match actor.policy {
        TargetingPolicy::Defensive if actor.health * 4 < actor.max_health => {
            let stalled = stall_turns + 1;
            if stalled >= STALL_THRESHOLD {
                // Deadlock breaker: one forced attack, then the counter resets
                (TargetingPolicy::GreatestThreat, 0)
            } else {
                return Decision {
                    action: TurnAction::Defend,
                    stall_turns: stalled,
                };
            }
        }
        TargetingPolicy::Defensive => (TargetingPolicy::GreatestThreat, 0),
        other => (other, stall_turns),
    };

    let Some(target) = policy.select_target(enemies, rng) else {
        return Decision {
            action: TurnAction::Hold,
            stall_turns,
        };
    };

    let action = if in_weapon_range(actor, target, grid) {
        TurnAction::Attack { target: target.id }
    } else {
        TurnAction::Advance { target: target.id }
    };
    Decision {
        action,
        stall_turns,
    }
}

/// Can the actor attack the target from where it stands?
///
/// Adjacency always suffices. Beyond that the weapon's range applies, and a
/// ranged shot needs ammunition left.
pub fn in_weapon_range(actor: &Fighter, target: &Fighter, grid: &BattleGrid) -> bool {
    let (Some(from), Some(to)) = (actor.position, target.position) else {
        return false;
    };
    let Ok(distance) = grid.distance(from, to) else {
        return false;
    };
    if distance <= 1 {
        return true;
    }
    actor.weapon.is_ranged() && distance <= actor.weapon.range && actor.ammo > 0
}
