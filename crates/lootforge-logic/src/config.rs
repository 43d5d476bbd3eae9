//! Tuning constants and input limits.
//!
//! Every knob the generators read lives here. All structs default to the
//! shipped balance and deserialize with `#[serde(default)]`, so a config
//! file only needs the values it changes.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Highest level any formula is sized for; `limits.max_level` may not exceed it.
pub const LEVEL_CAP: u32 = 10_000;

/// Highest `limits.max_item_count` / `limits.max_dungeon_count`.
pub const COUNT_CAP: u32 = 1_000;

/// Most rooms a layout may ask for.
pub const ROOM_CAP: u32 = 64;

/// Most traps per level a layout may ask for.
pub const TRAPS_PER_LEVEL_CAP: f64 = 10.0;

/// Dungeon layout knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonTuning {
    /// Rooms at level 0 (spawn room included); one more every two levels.
    pub base_rooms: u32,
    pub max_rooms: u32,
    /// Radius of the room ring around the spawn room.
    pub room_distance: f64,
    pub distance_jitter: f64,
    pub spawn_room_size: f64,
    pub room_min_size: f64,
    pub room_size_jitter: f64,
    pub treasure_chance: f64,
    pub traps_per_level: f64,
    pub trap_base_damage: u32,
    pub trap_damage_per_level: u32,
    /// Fraction of the room extent traps may be placed in.
    pub trap_spread: f64,
    pub spawn_spread: f64,
    pub corridor_width: f64,
    pub wall_thickness: f64,
    pub wall_height: f64,
    pub boss_cooldown_ms: u32,
    pub spawn_cooldown_ms: u32,
}

impl Default for DungeonTuning {
    fn default() -> Self {
        Self {
            base_rooms: 3,
            max_rooms: 8,
            room_distance: 25.0,
            distance_jitter: 10.0,
            spawn_room_size: 15.0,
            room_min_size: 10.0,
            room_size_jitter: 8.0,
            treasure_chance: 0.2,
            traps_per_level: 1.5,
            trap_base_damage: 10,
            trap_damage_per_level: 5,
            trap_spread: 0.8,
            spawn_spread: 0.7,
            corridor_width: 3.0,
            wall_thickness: 1.0,
            wall_height: 4.0,
            boss_cooldown_ms: 60_000,
            spawn_cooldown_ms: 30_000,
        }
    }
}

/// Loot drop knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTuning {
    /// Chance an enemy drops an item when defeated.
    pub drop_chance: f64,
}

impl Default for LootTuning {
    fn default() -> Self {
        Self { drop_chance: 0.6 }
    }
}

/// Damage formula knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub max_rounds: u32,
    pub strength_scale: f64,
    pub intelligence_scale: f64,
    pub vitality_resistance: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            crit_chance: 0.1,
            crit_multiplier: 2.0,
            max_rounds: 100,
            strength_scale: 0.5,
            intelligence_scale: 0.7,
            vitality_resistance: 0.3,
        }
    }
}

/// Accepted ranges for caller-supplied integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_level: u32,
    pub max_level: u32,
    pub max_item_count: u32,
    pub max_dungeon_count: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 100,
            max_item_count: 50,
            max_dungeon_count: 20,
        }
    }
}

impl Limits {
    /// Reject a level outside `[min_level, max_level]`. Levels above
    /// [`LEVEL_CAP`] are rejected even if `max_level` was never validated.
    pub fn check_level(&self, field: &'static str, value: i64) -> Result<u32> {
        let max = self.max_level.min(LEVEL_CAP);
        if value < self.min_level as i64 || value > max as i64 {
            return Err(GenError::LevelOutOfRange {
                field,
                value,
                min: self.min_level,
                max,
            });
        }
        Ok(value as u32)
    }

    /// Reject an item count outside `[1, max_item_count]`.
    pub fn check_item_count(&self, value: i64) -> Result<u32> {
        check_count(value, self.max_item_count)
    }

    /// Reject a dungeon count outside `[1, max_dungeon_count]`.
    pub fn check_dungeon_count(&self, value: i64) -> Result<u32> {
        check_count(value, self.max_dungeon_count)
    }
}

fn check_count(value: i64, max: u32) -> Result<u32> {
    let max = max.min(COUNT_CAP);
    if value < 1 || value > max as i64 {
        return Err(GenError::CountOutOfRange { value, max });
    }
    Ok(value as u32)
}

/// Everything a generator session reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootforgeConfig {
    pub dungeon: DungeonTuning,
    pub loot: LootTuning,
    pub combat: CombatTuning,
    pub limits: Limits,
}

impl LootforgeConfig {
    /// Reject tuning the generators cannot work with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.dungeon;
        if !(1..=ROOM_CAP).contains(&d.max_rooms) {
            return Err(GenError::InvalidTuning(format!(
                "dungeon.max_rooms must be within [1, {}], got {}",
                ROOM_CAP, d.max_rooms
            )));
        }
        if d.base_rooms < 1 {
            return Err(GenError::InvalidTuning("dungeon.base_rooms must be >= 1".into()));
        }
        for (name, v) in [
            ("dungeon.room_distance", d.room_distance),
            ("dungeon.spawn_room_size", d.spawn_room_size),
            ("dungeon.room_min_size", d.room_min_size),
            ("dungeon.corridor_width", d.corridor_width),
            ("dungeon.wall_thickness", d.wall_thickness),
            ("dungeon.wall_height", d.wall_height),
        ] {
            if !(v > 0.0) {
                return Err(GenError::InvalidTuning(format!("{} must be > 0, got {}", name, v)));
            }
        }
        for (name, v) in [
            ("dungeon.distance_jitter", d.distance_jitter),
            ("dungeon.room_size_jitter", d.room_size_jitter),
        ] {
            if !(v >= 0.0) {
                return Err(GenError::InvalidTuning(format!("{} must be >= 0, got {}", name, v)));
            }
        }
        if !(0.0..=TRAPS_PER_LEVEL_CAP).contains(&d.traps_per_level) {
            return Err(GenError::InvalidTuning(format!(
                "dungeon.traps_per_level must be within [0, {}], got {}",
                TRAPS_PER_LEVEL_CAP, d.traps_per_level
            )));
        }
        for (name, v) in [
            ("dungeon.treasure_chance", d.treasure_chance),
            ("dungeon.trap_spread", d.trap_spread),
            ("dungeon.spawn_spread", d.spawn_spread),
            ("loot.drop_chance", self.loot.drop_chance),
            ("combat.crit_chance", self.combat.crit_chance),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(GenError::InvalidTuning(format!(
                    "{} must be within [0, 1], got {}",
                    name, v
                )));
            }
        }
        if self.combat.max_rounds == 0 {
            return Err(GenError::InvalidTuning("combat.max_rounds must be >= 1".into()));
        }
        if !(self.combat.crit_multiplier >= 1.0) {
            return Err(GenError::InvalidTuning(
                "combat.crit_multiplier must be >= 1".into(),
            ));
        }
        let l = &self.limits;
        if l.min_level < 1 || l.min_level > l.max_level {
            return Err(GenError::InvalidTuning(format!(
                "limits.min_level..max_level is empty: {}..{}",
                l.min_level, l.max_level
            )));
        }
        if l.max_level > LEVEL_CAP {
            return Err(GenError::InvalidTuning(format!(
                "limits.max_level must be <= {}, got {}",
                LEVEL_CAP, l.max_level
            )));
        }
        for (name, v) in [
            ("limits.max_item_count", l.max_item_count),
            ("limits.max_dungeon_count", l.max_dungeon_count),
        ] {
            if !(1..=COUNT_CAP).contains(&v) {
                return Err(GenError::InvalidTuning(format!(
                    "{} must be within [1, {}], got {}",
                    name, COUNT_CAP, v
                )));
            }
        }
        Ok(())
    }
}
