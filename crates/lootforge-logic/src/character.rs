//! Stat blocks, enemies, and the player character.
//!
//! Enemies come from fixed per-kind templates scaled linearly with level.
//! The player starts from a flat baseline and gains +2 to every stat per
//! level past the first.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::combat::{StatusEffect, StatusEffectKind};
use crate::config::LEVEL_CAP;
use crate::error::{GenError, Result};
use crate::ids::IdAllocator;
use crate::loot::LootItem;

/// Core attribute block shared by players and enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub vitality: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            intelligence: 10,
            vitality: 10,
        }
    }
}

/// Enemy kinds. Demons are bosses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EnemyKind {
    Zombie,
    Skeleton,
    Orc,
    Demon,
}

/// Unscaled level-1 numbers for an enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub health: u32,
    pub damage: u32,
    pub experience: u32,
    pub gold: u32,
}

impl EnemyKind {
    /// Kinds that populate ordinary rooms.
    pub const REGULAR: [EnemyKind; 3] = [EnemyKind::Zombie, EnemyKind::Skeleton, EnemyKind::Orc];

    pub fn template(self) -> EnemyTemplate {
        match self {
            Self::Zombie => EnemyTemplate {
                health: 50,
                damage: 10,
                experience: 20,
                gold: 5,
            },
            Self::Skeleton => EnemyTemplate {
                health: 40,
                damage: 15,
                experience: 25,
                gold: 8,
            },
            Self::Orc => EnemyTemplate {
                health: 80,
                damage: 20,
                experience: 35,
                gold: 12,
            },
            Self::Demon => EnemyTemplate {
                health: 200,
                damage: 40,
                experience: 100,
                gold: 50,
            },
        }
    }

    pub fn is_boss(self) -> bool {
        self == Self::Demon
    }

    /// Parse a kind name, case-insensitive.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| GenError::UnknownEnemyKind(name.to_string()))
    }

    pub fn all() -> impl Iterator<Item = EnemyKind> {
        Self::iter()
    }
}

/// Template multiplier: +30% per level above the first.
pub fn level_multiplier(level: u32) -> f64 {
    1.0 + (level.max(1) - 1) as f64 * 0.3
}

/// An enemy instance ready to fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub damage: u32,
    pub stats: Stats,
    pub experience: u32,
    pub gold_reward: u32,
}

/// Builds enemies and numbers them `enemy_{n}`.
#[derive(Debug, Default)]
pub struct EnemyFactory {
    ids: IdAllocator,
}

impl EnemyFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels outside `1..=LEVEL_CAP` are clamped.
    pub fn create(&mut self, kind: EnemyKind, level: u32) -> Enemy {
        let level = level.clamp(1, LEVEL_CAP);
        let t = kind.template();
        let m = level_multiplier(level);
        let health = (t.health as f64 * m) as i32;

        Enemy {
            id: self.ids.next("enemy"),
            kind,
            level,
            health,
            max_health: health,
            damage: (t.damage as f64 * m) as u32,
            stats: Stats {
                strength: 8 + level * 2,
                dexterity: 6 + level,
                intelligence: 5 + level,
                vitality: 10 + level * 2,
            },
            experience: (t.experience as f64 * m) as u32,
            gold_reward: (t.gold as f64 * m) as u32,
        }
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub stats: Stats,
    pub gold: u32,
    pub experience: u32,
    pub status_effects: Vec<StatusEffect>,
    pub inventory: Vec<LootItem>,
}

impl Player {
    /// Levels outside `1..=LEVEL_CAP` are clamped.
    pub fn new(name: &str, level: u32) -> Self {
        let level = level.clamp(1, LEVEL_CAP);
        let gained = level - 1;
        let health = 100 + gained as i32 * 20;
        let mana = 50 + gained as i32 * 10;
        let stat = 10 + gained * 2;

        Self {
            id: "player_1".to_string(),
            name: name.to_string(),
            level,
            health,
            max_health: health,
            mana,
            max_mana: mana,
            stats: Stats {
                strength: stat,
                dexterity: stat,
                intelligence: stat,
                vitality: stat,
            },
            gold: 100 * level,
            experience: 0,
            status_effects: Vec::new(),
            inventory: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Attach a status effect. A new effect of the same kind replaces the old one.
    pub fn apply_status(&mut self, effect: StatusEffect) {
        self.status_effects.retain(|e| e.kind != effect.kind);
        self.status_effects.push(effect);
    }

    /// Advance status effects by `elapsed_ms`.
    ///
    /// Burn and poison deal `value` each time an effect crosses a whole
    /// second of its own lifetime, heal restores `value` the same way up to
    /// max health; control effects (freeze, stun, slow, shield) only count
    /// down. Ticking in small steps adds up to the same total as one large
    /// step. Expired effects are removed. Returns the net health change.
    pub fn tick_status(&mut self, elapsed_ms: u32) -> i32 {
        let mut delta = 0i32;
        for effect in &mut self.status_effects {
            let active_ms = elapsed_ms.min(effect.duration_ms);
            let seconds_before = effect.elapsed_ms / 1000;
            effect.elapsed_ms = effect.elapsed_ms.saturating_add(active_ms);
            effect.duration_ms -= active_ms;
            let seconds_after = effect.elapsed_ms / 1000;

            // Rounded cumulative totals keep fractional values from drifting.
            let total = |seconds: u32| (effect.value * f64::from(seconds)).round() as i32;
            let amount = total(seconds_after).saturating_sub(total(seconds_before));
            match effect.kind {
                StatusEffectKind::Burn | StatusEffectKind::Poison => delta = delta.saturating_sub(amount),
                StatusEffectKind::Heal => delta = delta.saturating_add(amount),
                _ => {}
            }
        }
        self.status_effects.retain(|e| e.duration_ms > 0);

        let before = self.health;
        self.health = self.health.saturating_add(delta).clamp(0, self.max_health);
        self.health - before
    }

    pub fn has_status(&self, kind: StatusEffectKind) -> bool {
        self.status_effects.iter().any(|e| e.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(kind: StatusEffectKind, duration_ms: u32, value: f64) -> StatusEffect {
        StatusEffect {
            id: "status_1".into(),
            kind,
            duration_ms,
            value,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn test_level_one_enemy_matches_template() {
        let mut factory = EnemyFactory::new();
        for kind in EnemyKind::all() {
            let e = factory.create(kind, 1);
            let t = kind.template();
            assert_eq!(e.health, t.health as i32);
            assert_eq!(e.max_health, e.health);
            assert_eq!(e.damage, t.damage);
            assert_eq!(e.experience, t.experience);
            assert_eq!(e.gold_reward, t.gold);
        }
    }

    #[test]
    fn test_enemy_scaling() {
        let mut factory = EnemyFactory::new();
        // level 5 → multiplier 2.2
        let orc = factory.create(EnemyKind::Orc, 5);
        assert_eq!(orc.health, 176);
        assert_eq!(orc.damage, 44);
        assert_eq!(orc.experience, 77);
        assert_eq!(orc.gold_reward, 26);
        assert_eq!(
            orc.stats,
            Stats {
                strength: 18,
                dexterity: 11,
                intelligence: 10,
                vitality: 20,
            }
        );
    }

    #[test]
    fn test_enemy_ids_monotonic() {
        let mut factory = EnemyFactory::new();
        assert_eq!(factory.create(EnemyKind::Zombie, 1).id, "enemy_1");
        assert_eq!(factory.create(EnemyKind::Demon, 3).id, "enemy_2");
    }

    #[test]
    fn test_enemy_kind_parse() {
        assert_eq!(EnemyKind::parse("orc"), Ok(EnemyKind::Orc));
        assert_eq!(EnemyKind::parse("Demon"), Ok(EnemyKind::Demon));
        assert_eq!(
            EnemyKind::parse("dragon"),
            Err(GenError::UnknownEnemyKind("dragon".into()))
        );
        assert_eq!(EnemyKind::Skeleton.to_string(), "skeleton");
    }

    #[test]
    fn test_player_creation() {
        let p = Player::new("Hero", 1);
        assert_eq!(p.health, 100);
        assert_eq!(p.mana, 50);
        assert_eq!(p.stats, Stats::default());
        assert_eq!(p.gold, 100);

        let p = Player::new("Hero", 10);
        assert_eq!(p.health, 280);
        assert_eq!(p.max_mana, 140);
        assert_eq!(p.stats.strength, 28);
        assert_eq!(p.gold, 1000);
    }

    #[test]
    fn test_huge_levels_are_clamped() {
        let p = Player::new("Hero", 500_000_000);
        assert_eq!(p.level, LEVEL_CAP);
        assert_eq!(p.health, 100 + (LEVEL_CAP as i32 - 1) * 20);
        assert_eq!(p.gold, 100 * LEVEL_CAP);

        let e = EnemyFactory::new().create(EnemyKind::Demon, u32::MAX);
        assert_eq!(e.level, LEVEL_CAP);
        assert!(e.health > 0);
    }

    #[test]
    fn test_burn_ticks_and_expires() {
        let mut p = Player::new("Hero", 1);
        p.apply_status(effect(StatusEffectKind::Burn, 3000, 4.0));
        assert_eq!(p.tick_status(1000), -4);
        assert_eq!(p.health, 96);
        // only 2s remain even though 5s elapse
        assert_eq!(p.tick_status(5000), -8);
        assert!(p.status_effects.is_empty());
    }

    #[test]
    fn test_short_ticks_match_one_long_tick() {
        for value in [2.0, 2.5] {
            let mut stepped = Player::new("Hero", 1);
            let mut single = Player::new("Hero", 1);
            stepped.apply_status(effect(StatusEffectKind::Burn, 5000, value));
            single.apply_status(effect(StatusEffectKind::Burn, 5000, value));

            let stepped_total: i32 = (0..50).map(|_| stepped.tick_status(100)).sum();
            let single_total = single.tick_status(5000);
            assert_eq!(stepped_total, single_total);
            assert_eq!(stepped.health, single.health);
            assert!(stepped.status_effects.is_empty());
        }

        let mut p = Player::new("Hero", 1);
        p.apply_status(effect(StatusEffectKind::Poison, 5000, 2.0));
        assert_eq!(p.tick_status(999), 0);
        assert_eq!(p.tick_status(1), -2);
        let total: i32 = (0..40).map(|_| p.tick_status(100)).sum();
        assert_eq!(total, -8);
        assert_eq!(p.health, 90);
    }

    #[test]
    fn test_heal_capped_at_max() {
        let mut p = Player::new("Hero", 1);
        p.health = 95;
        p.apply_status(effect(StatusEffectKind::Heal, 10_000, 10.0));
        assert_eq!(p.tick_status(2000), 5);
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn test_same_kind_replaces() {
        let mut p = Player::new("Hero", 1);
        p.apply_status(effect(StatusEffectKind::Slow, 4000, 0.5));
        p.apply_status(effect(StatusEffectKind::Slow, 1000, 0.5));
        assert_eq!(p.status_effects.len(), 1);
        assert_eq!(p.status_effects[0].duration_ms, 1000);
        assert_eq!(p.tick_status(1000), 0);
        assert!(!p.has_status(StatusEffectKind::Slow));
    }

    #[test]
    fn test_player_json_field_names() {
        let json = serde_json::to_value(Player::new("Hero", 2)).unwrap();
        assert_eq!(json["maxHealth"], 120);
        assert_eq!(json["statusEffects"], serde_json::json!([]));
        let mut factory = EnemyFactory::new();
        let json = serde_json::to_value(factory.create(EnemyKind::Orc, 1)).unwrap();
        assert_eq!(json["type"], "orc");
        assert_eq!(json["goldReward"], 12);
    }
}
