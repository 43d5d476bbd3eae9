//! Damage formula and fight simulation.
//!
//! Damage = base + attacker stat bonus - defender resistance, floored at 1,
//! doubled on a critical hit. Elemental hits may proc a status effect.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::character::{Enemy, Player, Stats};
use crate::config::CombatTuning;
use crate::ids::IdAllocator;
use crate::rng::GameRng;

/// Damage element.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DamageType {
    Physical,
    Fire,
    Ice,
    Lightning,
    Poison,
    Arcane,
}

impl DamageType {
    pub fn is_spell(self) -> bool {
        matches!(self, Self::Fire | Self::Ice | Self::Lightning | Self::Arcane)
    }
}

/// Status effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusEffectKind {
    Burn,
    Freeze,
    Poison,
    Stun,
    Slow,
    Heal,
    Shield,
}

/// A timed effect on a combatant. `value` is per-second damage or healing
/// for burn/poison/heal and a strength factor for the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StatusEffectKind,
    #[serde(rename = "duration")]
    pub duration_ms: u32,
    pub value: f64,
    /// Time already ticked, so damage lands on whole-second boundaries.
    #[serde(skip)]
    pub elapsed_ms: u32,
}

/// One resolved hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageResult {
    pub damage: u32,
    pub damage_type: DamageType,
    pub is_critical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_effect: Option<StatusEffect>,
}

/// One exchange of blows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatRound {
    pub round: u32,
    pub player_attack: DamageResult,
    pub enemy_health: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enemy_attack: Option<DamageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_health: Option<i32>,
}

/// Result of a full fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatOutcome {
    pub victory: bool,
    pub rounds: u32,
    pub final_player_health: i32,
    pub final_enemy_health: i32,
    pub combat_log: Vec<CombatRound>,
}

/// Status procs: (damage type, chance, effect, duration ms).
const PROCS: [(DamageType, f64, StatusEffectKind, u32); 4] = [
    (DamageType::Fire, 0.3, StatusEffectKind::Burn, 5000),
    (DamageType::Ice, 0.4, StatusEffectKind::Slow, 4000),
    (DamageType::Lightning, 0.2, StatusEffectKind::Stun, 2000),
    (DamageType::Poison, 0.5, StatusEffectKind::Poison, 10000),
];

/// Resolves hits and fights. Owns the `status_{n}` counter.
#[derive(Debug, Default)]
pub struct CombatSystem {
    tuning: CombatTuning,
    ids: IdAllocator,
}

impl CombatSystem {
    pub fn new(tuning: CombatTuning) -> Self {
        Self {
            tuning,
            ids: IdAllocator::new(),
        }
    }

    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// Damage before the crit roll: base plus stat bonus minus resistance, at least 1.
    pub fn raw_damage(
        &self,
        base: u32,
        damage_type: DamageType,
        attacker: &Stats,
        defender: &Stats,
    ) -> f64 {
        let t = &self.tuning;
        let mut total = base as f64;
        if damage_type == DamageType::Physical {
            total += attacker.strength as f64 * t.strength_scale;
        } else if damage_type.is_spell() {
            total += attacker.intelligence as f64 * t.intelligence_scale;
        }
        let resistance = defender.vitality as f64 * t.vitality_resistance;
        (total - resistance).max(1.0)
    }

    /// Resolve one hit, rolling for a critical and a status proc.
    pub fn calculate_damage(
        &mut self,
        base: u32,
        damage_type: DamageType,
        attacker: &Stats,
        defender: &Stats,
        rng: &mut GameRng,
    ) -> DamageResult {
        let mut total = self.raw_damage(base, damage_type, attacker, defender);

        let is_critical = rng.chance(self.tuning.crit_chance);
        if is_critical {
            total *= self.tuning.crit_multiplier;
        }

        let status_effect = PROCS
            .iter()
            .find(|(ty, ..)| *ty == damage_type)
            .and_then(|&(_, chance, kind, duration_ms)| {
                if !rng.chance(chance) {
                    return None;
                }
                let value = match kind {
                    StatusEffectKind::Burn => total * 0.1,
                    StatusEffectKind::Poison => total * 0.05,
                    StatusEffectKind::Slow => 0.5,
                    _ => 0.0,
                };
                Some(StatusEffect {
                    id: self.ids.next("status"),
                    kind,
                    duration_ms,
                    value,
                    elapsed_ms: 0,
                })
            });

        DamageResult {
            damage: total as u32,
            damage_type,
            is_critical,
            status_effect,
        }
    }

    /// Fight until one side drops or the round cap is hit. The player
    /// always swings first; the enemy answers only if it survived.
    pub fn simulate_combat(
        &mut self,
        player: &Player,
        enemy: &Enemy,
        rng: &mut GameRng,
    ) -> CombatOutcome {
        let mut player_health = player.health;
        let mut enemy_health = enemy.health;
        let mut round = 0;
        let mut log = Vec::new();
        let player_base = 20 + player.level * 5;

        while player_health > 0 && enemy_health > 0 && round < self.tuning.max_rounds {
            round += 1;

            let player_attack = self.calculate_damage(
                player_base,
                DamageType::Physical,
                &player.stats,
                &enemy.stats,
                rng,
            );
            enemy_health -= player_attack.damage as i32;

            let mut record = CombatRound {
                round,
                player_attack,
                enemy_health: enemy_health.max(0),
                enemy_attack: None,
                player_health: None,
            };

            if enemy_health > 0 {
                let enemy_attack = self.calculate_damage(
                    enemy.damage,
                    DamageType::Physical,
                    &enemy.stats,
                    &player.stats,
                    rng,
                );
                player_health -= enemy_attack.damage as i32;
                record.enemy_attack = Some(enemy_attack);
                record.player_health = Some(player_health.max(0));
            }

            log.push(record);
        }

        let victory = player_health > 0;
        log::debug!(
            "{} vs {} ({}): {} after {} rounds",
            player.name,
            enemy.kind,
            enemy.id,
            if victory { "victory" } else { "defeat" },
            round
        );

        CombatOutcome {
            victory,
            rounds: round,
            final_player_health: player_health.max(0),
            final_enemy_health: enemy_health.max(0),
            combat_log: log,
        }
    }
}
