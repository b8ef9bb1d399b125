//! Battle orchestration: event log, targeting policies, and the turn engine

pub mod ai;
pub mod engine;
pub mod events;

pub use ai::{TargetingPolicy, TurnAction};
pub use engine::{Battle, BattleConfig, BattleOutcome, RoleSpec};
pub use events::{BattleEvent, BattleEventKind, BattleEventLog};
