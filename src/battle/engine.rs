//! Turn-based battle engine
//!
//! One `Battle` owns the grid, the roster, the event log, and a seeded RNG;
//! every random draw in a battle flows through that single stream, so a seed
//! fully determines the simulation.
//!
//! Rounds run in descending-health order. Each fighter ticks its effects,
//! decides through its targeting policy, and acts; the battle ends when the
//! living fighters converge to one faction or the turn limit passes.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::ai::{self, TargetingPolicy, TurnAction};
use crate::battle::events::{BattleEventKind, BattleEventLog};
use crate::combat::dice;
use crate::combat::effects::EffectKind;
use crate::combat::equipment::{ArmorSpec, ShieldSpec, WeaponSpec};
use crate::combat::fighter::Fighter;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{Faction, FighterId, Turn};
use crate::map::coord::Topology;
use crate::map::grid::BattleGrid;
use crate::map::pathfinding::find_path;

/// A to-hit roll succeeds when `d20 + bonuses` reaches this threshold minus
/// the target's armor class and the attacker's level
const TO_HIT_BASE: i32 = 22;

/// Fighter recipe consumed at spawn time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    pub faction: String,
    pub level: u32,
    /// Weapon table name; None fights unarmed
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub shield: Option<String>,
    #[serde(default)]
    pub ammunition: u32,
    pub policy: TargetingPolicy,
}

/// Battle parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleConfig {
    pub width: u32,
    pub height: u32,
    pub topology: Topology,
    pub turn_limit: Turn,
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            topology: Topology::Orthogonal8,
            turn_limit: 100,
            seed: 42,
        }
    }
}

/// How a battle ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Winner(Faction),
    Draw,
}

/// A running battle simulation
pub struct Battle {
    grid: BattleGrid,
    fighters: Vec<Fighter>,
    log: BattleEventLog,
    rng: ChaCha8Rng,
    turn: Turn,
    turn_limit: Turn,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    pub fn new(config: &BattleConfig) -> Self {
        Self {
            grid: BattleGrid::new(config.width, config.height, config.topology),
            fighters: Vec::new(),
            log: BattleEventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            turn: 0,
            turn_limit: config.turn_limit,
            outcome: None,
        }
    }

    /// Create a fighter from a role and place it on a random free cell
    pub fn spawn(&mut self, role: &RoleSpec) -> Result<FighterId> {
        let weapon = WeaponSpec::resolve(role.weapon.as_deref())?;
        let armor = ArmorSpec::resolve(role.armor.as_deref())?;
        let shield = ShieldSpec::resolve(role.shield.as_deref())?;
        let mut fighter = Fighter::new(
            role.name.clone(),
            Faction::new(role.faction.clone()),
            role.level,
            weapon,
            armor,
            shield,
            role.ammunition,
            role.policy,
            &mut self.rng,
        );

        let point = self
            .grid
            .random_unoccupied(&mut self.rng)
            .ok_or(ArenaError::GridFull)?;
        self.grid.occupy(fighter.id, point)?;
        fighter.position = Some(point);

        let id = fighter.id;
        self.log.push(
            self.turn,
            BattleEventKind::Spawned { fighter: id },
            format!(
                "{} [{}] enters at ({}, {}) with {} hp",
                fighter.name, fighter.faction, point.x, point.y, fighter.max_health
            ),
        );
        self.fighters.push(fighter);
        Ok(id)
    }

    /// Run rounds until one faction remains or the turn limit passes
    pub fn run(&mut self) -> BattleOutcome {
        self.log.push(
            self.turn,
            BattleEventKind::BattleStarted,
            format!("battle begins with {} fighters", self.fighters.len()),
        );
        self.check_convergence();
        while self.outcome.is_none() && self.turn < self.turn_limit {
            self.turn += 1;
            self.play_round();
        }
        let outcome = self.outcome.clone().unwrap_or(BattleOutcome::Draw);
        self.outcome = Some(outcome.clone());
        let winner = match &outcome {
            BattleOutcome::Winner(faction) => Some(faction.clone()),
            BattleOutcome::Draw => None,
        };
        let description = match &winner {
            Some(faction) => format!("faction {} wins on turn {}", faction, self.turn),
            None => format!("draw after {} turns", self.turn),
        };
        debug!(turn = self.turn, "{description}");
        self.log
            .push(self.turn, BattleEventKind::BattleEnded { winner }, description);
        outcome
    }

    /// One full round: every living fighter acts once, strongest first
    fn play_round(&mut self) {
        for idx in self.turn_order() {
            if self.outcome.is_some() {
                break;
            }
            if !self.fighters[idx].is_alive() {
                continue; // died earlier this round
            }
            self.tick_effects(idx);
            let decision = {
                let actor = &self.fighters[idx];
                let enemies: Vec<&Fighter> = self
                    .fighters
                    .iter()
                    .filter(|f| f.is_alive() && f.faction != actor.faction)
                    .collect();
                ai::decide(actor, &enemies, &self.grid, &mut self.rng)
            };
            self.fighters[idx].stall_turns = decision.stall_turns;
            match decision.action {
                TurnAction::Attack { target } => self.resolve_attack(idx, target),
                TurnAction::Advance { target } => self.advance_toward(idx, target),
                TurnAction::Defend => self.defend(idx),
                TurnAction::Hold => {}
            }
            self.check_convergence();
        }
    }

    /// Roster indices of living fighters, highest current health first.
    /// The sort is stable, so equal health keeps roster order.
    fn turn_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.fighters.len())
            .filter(|&i| self.fighters[i].is_alive())
            .collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.fighters[i].health));
        order
    }

    fn tick_effects(&mut self, idx: usize) {
        let reports = self.fighters[idx].tick_effects();
        let (id, name) = (self.fighters[idx].id, self.fighters[idx].name.clone());
        for report in reports {
            if report.healed > 0 {
                self.log.push(
                    self.turn,
                    BattleEventKind::Healed {
                        fighter: id,
                        amount: report.healed,
                    },
                    format!("{} regains {} hp from {}", name, report.healed, report.kind.name()),
                );
            }
            if report.expired {
                self.log.push(
                    self.turn,
                    BattleEventKind::EffectExpired {
                        fighter: id,
                        effect: report.kind.name().to_string(),
                    },
                    format!("{} on {} wears off", report.kind.name(), name),
                );
            }
        }
    }

    fn defend(&mut self, idx: usize) {
        if let Some(kind) = self.fighters[idx].take_defensive_action() {
            let fighter = &self.fighters[idx];
            self.log.push(
                self.turn,
                BattleEventKind::EffectApplied {
                    fighter: fighter.id,
                    effect: kind.name().to_string(),
                },
                format!("{} assumes {}", fighter.name, kind.name()),
            );
        }
    }

    /// Resolve one attack. A dead or missing target refuses the attack; a
    /// ranged shot past adjacency consumes one round of ammunition.
    fn resolve_attack(&mut self, attacker_idx: usize, target: FighterId) {
        let Some(target_idx) = self.index_of(target) else {
            self.refuse_attack(attacker_idx, "target is gone");
            return;
        };
        if !self.fighters[target_idx].is_alive() {
            self.refuse_attack(attacker_idx, "target is already down");
            return;
        }
        let (Some(from), Some(to)) = (
            self.fighters[attacker_idx].position,
            self.fighters[target_idx].position,
        ) else {
            self.refuse_attack(attacker_idx, "no line to target");
            return;
        };
        let Ok(distance) = self.grid.distance(from, to) else {
            self.refuse_attack(attacker_idx, "no line to target");
            return;
        };

        if distance > 1 {
            let attacker = &self.fighters[attacker_idx];
            if distance > attacker.weapon.range || !attacker.weapon.is_ranged() {
                self.refuse_attack(attacker_idx, "target out of reach");
                return;
            }
            if attacker.ammo == 0 {
                self.refuse_attack(attacker_idx, "quiver is empty");
                return;
            }
            self.fighters[attacker_idx].ammo -= 1;
        }

        let attacker = &self.fighters[attacker_idx];
        let (attacker_id, attacker_name) = (attacker.id, attacker.name.clone());
        let attack_bonus = attacker.attack_bonus();
        let level = attacker.level as i32;
        let weapon = attacker.weapon.clone();
        let damage_bonus = attacker.damage_bonus();
        let target_ac = self.fighters[target_idx].armor_class();

        let to_hit = dice::d20(&mut self.rng) + attack_bonus;
        if to_hit < TO_HIT_BASE - target_ac - level {
            let target_ref = &self.fighters[target_idx];
            self.log.push(
                self.turn,
                BattleEventKind::Missed {
                    attacker: attacker_id,
                    target: target_ref.id,
                },
                format!("{} misses {}", attacker_name, target_ref.name),
            );
            return;
        }

        let damage = dice::roll(&mut self.rng, weapon.dice, weapon.sides) + weapon.bonus + damage_bonus;
        let target_ref = &mut self.fighters[target_idx];
        target_ref.health -= damage;
        let (target_id, target_name) = (target_ref.id, target_ref.name.clone());
        debug!(attacker = %attacker_name, target = %target_name, damage, "hit");
        self.log.push(
            self.turn,
            BattleEventKind::Attacked {
                attacker: attacker_id,
                target: target_id,
                damage,
            },
            format!(
                "{} hits {} with {} for {} damage",
                attacker_name, target_name, weapon.name, damage
            ),
        );
        if !self.fighters[target_idx].is_alive() {
            self.handle_death(target_idx);
        }
    }

    fn refuse_attack(&mut self, attacker_idx: usize, reason: &str) {
        let attacker = &self.fighters[attacker_idx];
        self.log.push(
            self.turn,
            BattleEventKind::AttackRefused {
                attacker: attacker.id,
            },
            format!("{} holds the blow: {}", attacker.name, reason),
        );
    }

    /// Remove the fallen fighter from the grid; when exactly one teammate
    /// survives it, that teammate flies into a berserk rage.
    fn handle_death(&mut self, idx: usize) {
        if let Some(point) = self.fighters[idx].position.take() {
            self.grid.vacate(point);
        }
        let (id, name, faction) = (
            self.fighters[idx].id,
            self.fighters[idx].name.clone(),
            self.fighters[idx].faction.clone(),
        );
        self.log.push(
            self.turn,
            BattleEventKind::Died { fighter: id },
            format!("{} falls", name),
        );

        let mut survivors = self
            .fighters
            .iter_mut()
            .filter(|f| f.is_alive() && f.faction == faction);
        let (first, second) = (survivors.next(), survivors.next());
        if let (Some(survivor), None) = (first, second) {
            if survivor.apply_effect(EffectKind::BerserkRage) {
                let (survivor_id, survivor_name) = (survivor.id, survivor.name.clone());
                self.log.push(
                    self.turn,
                    BattleEventKind::BerserkTriggered {
                        fighter: survivor_id,
                    },
                    format!("{} flies into a berserk rage", survivor_name),
                );
            }
        }
    }

    /// Take one step along the cheapest path toward the target. Holds in
    /// place when no path exists or the next cell got taken this round.
    fn advance_toward(&mut self, idx: usize, target: FighterId) {
        let Some(target_idx) = self.index_of(target) else {
            return;
        };
        let (Some(from), Some(to)) = (
            self.fighters[idx].position,
            self.fighters[target_idx].position,
        ) else {
            return;
        };
        let path = find_path(&self.grid, from, to);
        if path.len() < 2 {
            return;
        }
        let step = path[1];
        if self.grid.move_occupant(from, step).is_err() {
            return;
        }
        let fighter = &mut self.fighters[idx];
        fighter.position = Some(step);
        let (id, name) = (fighter.id, fighter.name.clone());
        self.log.push(
            self.turn,
            BattleEventKind::Moved {
                fighter: id,
                x: step.x,
                y: step.y,
            },
            format!("{} moves to ({}, {})", name, step.x, step.y),
        );
    }

    /// End the battle when at most one faction still has living members
    fn check_convergence(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let mut living = self.fighters.iter().filter(|f| f.is_alive());
        let Some(first) = living.next() else {
            self.outcome = Some(BattleOutcome::Draw);
            return;
        };
        if living.all(|f| f.faction == first.faction) {
            self.outcome = Some(BattleOutcome::Winner(first.faction.clone()));
        }
    }

    fn index_of(&self, id: FighterId) -> Option<usize> {
        self.fighters.iter().position(|f| f.id == id)
    }

    pub fn turn_number(&self) -> Turn {
        self.turn
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    /// Winning faction, if the battle has concluded with one
    pub fn winner(&self) -> Option<&Faction> {
        match self.outcome.as_ref()? {
            BattleOutcome::Winner(faction) => Some(faction),
            BattleOutcome::Draw => None,
        }
    }

    pub fn fighter(&self, id: FighterId) -> Result<&Fighter> {
        self.fighters
            .iter()
            .find(|f| f.id == id)
            .ok_or(ArenaError::FighterNotFound(id))
    }

    pub fn living_fighters(&self) -> impl Iterator<Item = &Fighter> {
        self.fighters.iter().filter(|f| f.is_alive())
    }

    pub fn grid(&self) -> &BattleGrid {
        &self.grid
    }

    pub fn events(&self) -> &BattleEventLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, faction: &str, policy: TargetingPolicy) -> RoleSpec {
        RoleSpec {
            name: name.to_string(),
            faction: faction.to_string(),
            level: 3,
            weapon: Some("long sword".to_string()),
            armor: Some("leather armor".to_string()),
            shield: None,
            ammunition: 0,
            policy,
        }
    }

    fn small_battle(seed: u64) -> Battle {
        Battle::new(&BattleConfig {
            width: 6,
            height: 6,
            seed,
            ..BattleConfig::default()
        })
    }

    #[test]
    fn test_spawn_places_and_logs() {
        let mut battle = small_battle(1);
        let id = battle
            .spawn(&role("Alice", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        let fighter = battle.fighter(id).unwrap();
        let point = fighter.position.unwrap();
        assert_eq!(battle.grid().occupant_at(point), Some(id));
        assert!(battle
            .events()
            .iter()
            .any(|e| matches!(e.kind, BattleEventKind::Spawned { fighter } if fighter == id)));
    }

    #[test]
    fn test_spawn_unknown_equipment() {
        let mut battle = small_battle(1);
        let mut bad = role("Alice", "Red", TargetingPolicy::RandomAttack);
        bad.weapon = Some("lightsaber".to_string());
        assert!(matches!(
            battle.spawn(&bad),
            Err(ArenaError::UnknownEquipment(_))
        ));
    }

    #[test]
    fn test_spawn_grid_full() {
        let mut battle = Battle::new(&BattleConfig {
            width: 1,
            height: 1,
            ..BattleConfig::default()
        });
        battle
            .spawn(&role("Alice", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        assert!(matches!(
            battle.spawn(&role("Bob", "Blue", TargetingPolicy::RandomAttack)),
            Err(ArenaError::GridFull)
        ));
    }

    #[test]
    fn test_turn_order_descending_health() {
        let mut battle = small_battle(3);
        let a = battle
            .spawn(&role("A", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        let b = battle
            .spawn(&role("B", "Blue", TargetingPolicy::RandomAttack))
            .unwrap();
        let c = battle
            .spawn(&role("C", "Blue", TargetingPolicy::RandomAttack))
            .unwrap();
        for (id, health) in [(a, 7), (b, 20), (c, 7)] {
            let idx = battle.index_of(id).unwrap();
            battle.fighters[idx].health = health;
        }
        let order: Vec<FighterId> = battle
            .turn_order()
            .into_iter()
            .map(|i| battle.fighters[i].id)
            .collect();
        // Strongest first; the 7-hp tie keeps roster order
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn test_turn_order_skips_dead() {
        let mut battle = small_battle(3);
        let a = battle
            .spawn(&role("A", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        battle
            .spawn(&role("B", "Blue", TargetingPolicy::RandomAttack))
            .unwrap();
        let idx = battle.index_of(a).unwrap();
        battle.fighters[idx].health = 0;
        assert_eq!(battle.turn_order().len(), 1);
    }

    #[test]
    fn test_battle_terminates_with_outcome() {
        let mut battle = small_battle(7);
        battle
            .spawn(&role("Alice", "Red", TargetingPolicy::GreatestThreat))
            .unwrap();
        battle
            .spawn(&role("Bob", "Blue", TargetingPolicy::LowestHealth))
            .unwrap();
        let outcome = battle.run();
        assert!(battle.turn_number() <= 100);
        match outcome {
            BattleOutcome::Winner(faction) => {
                assert!(faction == Faction::new("Red") || faction == Faction::new("Blue"));
                assert!(battle.living_fighters().all(|f| f.faction == faction));
            }
            BattleOutcome::Draw => {
                assert_eq!(battle.turn_number(), 100);
            }
        }
        assert!(matches!(
            battle.events().iter().last().map(|e| &e.kind),
            Some(BattleEventKind::BattleEnded { .. })
        ));
    }

    #[test]
    fn test_zero_turn_limit_is_a_draw() {
        let mut battle = Battle::new(&BattleConfig {
            turn_limit: 0,
            ..BattleConfig::default()
        });
        battle
            .spawn(&role("Alice", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        battle
            .spawn(&role("Bob", "Blue", TargetingPolicy::RandomAttack))
            .unwrap();
        assert_eq!(battle.run(), BattleOutcome::Draw);
    }

    #[test]
    fn test_lone_faction_wins_immediately() {
        let mut battle = small_battle(9);
        battle
            .spawn(&role("Alice", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        assert_eq!(battle.run(), BattleOutcome::Winner(Faction::new("Red")));
        assert_eq!(battle.winner(), Some(&Faction::new("Red")));
        assert_eq!(battle.turn_number(), 0);
    }

    #[test]
    fn test_attack_on_dead_target_refused() {
        let mut battle = small_battle(11);
        let a = battle
            .spawn(&role("Alice", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        let b = battle
            .spawn(&role("Bob", "Blue", TargetingPolicy::RandomAttack))
            .unwrap();
        let b_idx = battle.index_of(b).unwrap();
        battle.fighters[b_idx].health = 0;
        let health_before = battle.fighters[b_idx].health;

        let a_idx = battle.index_of(a).unwrap();
        battle.resolve_attack(a_idx, b);
        assert_eq!(battle.fighters[b_idx].health, health_before);
        assert!(battle
            .events()
            .iter()
            .any(|e| matches!(e.kind, BattleEventKind::AttackRefused { attacker } if attacker == a)));
    }

    #[test]
    fn test_death_vacates_cell_and_triggers_berserk() {
        let mut battle = small_battle(13);
        let a = battle
            .spawn(&role("A", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        let b = battle
            .spawn(&role("B", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        battle
            .spawn(&role("C", "Blue", TargetingPolicy::RandomAttack))
            .unwrap();

        let a_idx = battle.index_of(a).unwrap();
        let point = battle.fighters[a_idx].position.unwrap();
        battle.fighters[a_idx].health = 0;
        battle.handle_death(a_idx);

        assert!(!battle.grid().is_occupied(point));
        assert!(battle.fighters[a_idx].position.is_none());
        let survivor = battle.fighter(b).unwrap();
        assert!(survivor.has_engaged_effect(EffectKind::BerserkRage));
        assert!(battle
            .events()
            .iter()
            .any(|e| matches!(e.kind, BattleEventKind::BerserkTriggered { fighter } if fighter == b)));
    }

    #[test]
    fn test_berserk_not_triggered_with_two_survivors() {
        let mut battle = small_battle(13);
        let a = battle
            .spawn(&role("A", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        battle
            .spawn(&role("B", "Red", TargetingPolicy::RandomAttack))
            .unwrap();
        battle
            .spawn(&role("C", "Red", TargetingPolicy::RandomAttack))
            .unwrap();

        let a_idx = battle.index_of(a).unwrap();
        battle.fighters[a_idx].health = 0;
        battle.handle_death(a_idx);
        assert!(!battle
            .events()
            .iter()
            .any(|e| matches!(e.kind, BattleEventKind::BerserkTriggered { .. })));
    }

    #[test]
    fn test_ranged_attack_consumes_ammo() {
        let mut battle = Battle::new(&BattleConfig {
            width: 8,
            height: 8,
            seed: 17,
            ..BattleConfig::default()
        });
        let mut archer = role("Robin", "Red", TargetingPolicy::GreatestThreat);
        archer.weapon = Some("bow".to_string());
        archer.ammunition = 3;
        let a = battle.spawn(&archer).unwrap();
        let b = battle
            .spawn(&role("Bob", "Blue", TargetingPolicy::RandomAttack))
            .unwrap();

        // Force a distance greater than one
        let a_idx = battle.index_of(a).unwrap();
        let b_idx = battle.index_of(b).unwrap();
        let from = battle.fighters[a_idx].position.unwrap();
        let to = battle.fighters[b_idx].position.unwrap();
        if battle.grid.distance(from, to).unwrap() <= 1 {
            let far = battle.grid.get(0, 0).unwrap();
            let near = battle.grid.get(7, 7).unwrap();
            battle.grid.vacate(from);
            battle.grid.vacate(to);
            battle.grid.occupy(a, far).unwrap();
            battle.grid.occupy(b, near).unwrap();
            battle.fighters[a_idx].position = Some(far);
            battle.fighters[b_idx].position = Some(near);
        }

        battle.resolve_attack(a_idx, b);
        let distance = battle
            .grid
            .distance(
                battle.fighters[a_idx].position.unwrap(),
                battle.fighters[b_idx].position.unwrap(),
            )
            .unwrap();
        if distance <= 5 {
            assert_eq!(battle.fighters[a_idx].ammo, 2);
        } else {
            // Out of range: refused, quiver untouched
            assert_eq!(battle.fighters[a_idx].ammo, 3);
        }
    }

    #[test]
    fn test_same_seed_same_story() {
        let run = |seed: u64| {
            let mut battle = small_battle(seed);
            battle
                .spawn(&role("Alice", "Red", TargetingPolicy::GreatestThreat))
                .unwrap();
            battle
                .spawn(&role("Bob", "Blue", TargetingPolicy::LowestHealth))
                .unwrap();
            let outcome = battle.run();
            let story: Vec<String> = battle.events().iter().map(|e| e.description.clone()).collect();
            (outcome, story)
        };
        let (outcome_a, story_a) = run(99);
        let (outcome_b, story_b) = run(99);
        assert_eq!(outcome_a, outcome_b);
        assert_eq!(story_a, story_b);
    }
}
