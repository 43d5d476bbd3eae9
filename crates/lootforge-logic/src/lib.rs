//! Pure generation logic for Lootforge.
//!
//! This crate contains every piece of game content generation that is
//! independent of rendering, input, or transport. Functions take plain data
//! plus a seeded [`rng::GameRng`] and return plain data, so a fixed seed
//! always reproduces its output.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`character`] | Stat blocks, enemy templates and level scaling, player creation |
//! | [`combat`] | Damage formula, critical hits, status effect procs, fight simulation |
//! | [`config`] | Tuning constants and input range limits (serde, all defaulted) |
//! | [`dungeon`] | Ring-of-rooms layout, corridors, traps, spawn points, walls |
//! | [`error`] | `GenError` for rejected inputs and bad tuning |
//! | [`ids`] | Per-generator monotonic ID allocation |
//! | [`loot`] | Rarity rolls, item naming, stat scaling, sell value |
//! | [`render`] | ASCII map and statistics report for a dungeon |
//! | [`rng`] | Portable seeded RNG and sampling helpers |
//! | [`run`] | Whole dungeon-run simulation (fights, rewards, drops) |
//! | [`validation`] | Structural checks over a generated dungeon |

pub mod character;
pub mod combat;
pub mod config;
pub mod dungeon;
pub mod error;
pub mod ids;
pub mod loot;
pub mod render;
pub mod rng;
pub mod run;
pub mod validation;

pub use error::{GenError, Result};
