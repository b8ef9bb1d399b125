//! Arena - Turn-Based Tactical Battle Simulator

pub mod battle;
pub mod combat;
pub mod core;
pub mod map;
