//! Append-only battle event log
//!
//! Every mutating operation in the engine emits one record. The log is
//! ordered and never rewritten; renderers and loggers consume it as-is.

use serde::{Deserialize, Serialize};

use crate::core::types::{Faction, FighterId, Turn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEventKind {
    BattleStarted,
    Spawned { fighter: FighterId },
    Moved { fighter: FighterId, x: i32, y: i32 },
    Attacked { attacker: FighterId, target: FighterId, damage: i32 },
    Missed { attacker: FighterId, target: FighterId },
    AttackRefused { attacker: FighterId },
    EffectApplied { fighter: FighterId, effect: String },
    EffectExpired { fighter: FighterId, effect: String },
    Healed { fighter: FighterId, amount: i32 },
    Died { fighter: FighterId },
    BerserkTriggered { fighter: FighterId },
    BattleEnded { winner: Option<Faction> },
}

/// One record in the battle log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEvent {
    pub turn: Turn,
    pub kind: BattleEventKind,
    pub description: String,
}

/// Ordered log of everything that happened in one battle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleEventLog {
    events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn, kind: BattleEventKind, description: String) {
        self.events.push(BattleEvent {
            turn,
            kind,
            description,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
