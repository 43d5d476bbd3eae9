//! Whole-run simulation: a player fights through a dungeon's worth of
//! enemies, collecting rewards and loot until they win or fall.

use serde::{Deserialize, Serialize};

use crate::character::{Enemy, EnemyFactory, EnemyKind, Player};
use crate::combat::{CombatOutcome, CombatSystem};
use crate::config::LootforgeConfig;
use crate::error::Result;
use crate::loot::{LootGenerator, LootItem};
use crate::rng::GameRng;

/// Dungeon level from which the final enemy of a run is a demon.
pub const BOSS_MIN_LEVEL: u32 = 5;

/// One enemy the player beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefeatedEnemy {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub level: u32,
    pub combat_rounds: u32,
}

/// Outcome of a dungeon run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub enemies_defeated: usize,
    pub enemy_details: Vec<DefeatedEnemy>,
    pub loot_collected: Vec<LootItem>,
    pub final_stats: Player,
    pub total_gold: u32,
    pub total_experience: u32,
}

/// A single fight with both combatants as they were going in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEncounter {
    pub player: Player,
    pub enemy: Enemy,
    pub combat: CombatOutcome,
}

/// Enemy lineup for a run: `3 + level` regulars, the last replaced by a
/// demon from [`BOSS_MIN_LEVEL`] on.
fn lineup(dungeon_level: u32, rng: &mut GameRng) -> Vec<EnemyKind> {
    let count = 3 + dungeon_level as usize;
    (0..count)
        .map(|i| {
            if i == count - 1 && dungeon_level >= BOSS_MIN_LEVEL {
                EnemyKind::Demon
            } else {
                *rng.pick(&EnemyKind::REGULAR)
            }
        })
        .collect()
}

/// Fight through a dungeon. Health carries over between fights; there is
/// no healing. The run ends at the first defeat.
pub fn simulate_dungeon_run(
    player_level: i64,
    dungeon_level: i64,
    config: &LootforgeConfig,
    rng: &mut GameRng,
) -> Result<RunReport> {
    let player_level = config.limits.check_level("player_level", player_level)?;
    let dungeon_level = config.limits.check_level("dungeon_level", dungeon_level)?;

    let mut player = Player::new("Hero", player_level);
    let mut enemies = EnemyFactory::new();
    let mut combat = CombatSystem::new(config.combat.clone());
    let mut loot = LootGenerator::new(config.loot.clone());

    let mut defeated = Vec::new();
    let mut collected = Vec::new();

    for kind in lineup(dungeon_level, rng) {
        let enemy = enemies.create(kind, dungeon_level);
        let outcome = combat.simulate_combat(&player, &enemy, rng);

        if !outcome.victory {
            player.health = 0;
            log::info!(
                "Run failed: level {} player fell to {} after {} win(s)",
                player_level,
                kind,
                defeated.len()
            );
            return Ok(RunReport {
                success: false,
                reason: Some(format!("Defeated by {}", kind)),
                enemies_defeated: defeated.len(),
                enemy_details: defeated,
                loot_collected: collected,
                total_gold: player.gold,
                total_experience: player.experience,
                final_stats: player,
            });
        }

        player.health = outcome.final_player_health;
        player.experience = player.experience.saturating_add(enemy.experience);
        player.gold = player.gold.saturating_add(enemy.gold_reward);
        defeated.push(DefeatedEnemy {
            kind,
            level: enemy.level,
            combat_rounds: outcome.rounds,
        });

        if let Some(item) = loot.roll_drop(dungeon_level, rng) {
            player.inventory.push(item.clone());
            collected.push(item);
        }
    }

    log::info!(
        "Run cleared: level {} dungeon, {} enemies, {} item(s), {} health left",
        dungeon_level,
        defeated.len(),
        collected.len(),
        player.health
    );

    Ok(RunReport {
        success: true,
        reason: None,
        enemies_defeated: defeated.len(),
        enemy_details: defeated,
        loot_collected: collected,
        total_gold: player.gold,
        total_experience: player.experience,
        final_stats: player,
    })
}

/// Build a fresh player and enemy and fight them once.
pub fn simulate_combat_encounter(
    player_level: i64,
    enemy_level: i64,
    kind: EnemyKind,
    config: &LootforgeConfig,
    rng: &mut GameRng,
) -> Result<CombatEncounter> {
    let player_level = config.limits.check_level("player_level", player_level)?;
    let enemy_level = config.limits.check_level("enemy_level", enemy_level)?;

    let player = Player::new("Hero", player_level);
    let enemy = EnemyFactory::new().create(kind, enemy_level);
    let combat = CombatSystem::new(config.combat.clone()).simulate_combat(&player, &enemy, rng);

    Ok(CombatEncounter {
        player,
        enemy,
        combat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LEVEL_CAP;
    use crate::error::GenError;

    fn run(player_level: i64, dungeon_level: i64, seed: u64) -> RunReport {
        simulate_dungeon_run(
            player_level,
            dungeon_level,
            &LootforgeConfig::default(),
            &mut GameRng::seeded(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_lineup_size_and_boss() {
        let mut rng = GameRng::seeded(1);
        let low = lineup(4, &mut rng);
        assert_eq!(low.len(), 7);
        assert!(low.iter().all(|k| !k.is_boss()));

        let high = lineup(5, &mut rng);
        assert_eq!(high.len(), 8);
        assert_eq!(high.last(), Some(&EnemyKind::Demon));
        assert!(high[..7].iter().all(|k| !k.is_boss()));
    }

    #[test]
    fn test_overleveled_player_clears_run() {
        let report = run(100, 1, 3);
        assert!(report.success);
        assert!(report.reason.is_none());
        assert_eq!(report.enemies_defeated, 4);
        assert_eq!(report.enemy_details.len(), 4);
        assert!(report.enemy_details.iter().all(|e| e.level == 1));
        assert_eq!(report.final_stats.inventory, report.loot_collected);
        assert!(report.final_stats.health > 0);

        let xp: u32 = report
            .enemy_details
            .iter()
            .map(|e| e.kind.template().experience)
            .sum();
        let gold: u32 = report
            .enemy_details
            .iter()
            .map(|e| e.kind.template().gold)
            .sum();
        assert_eq!(report.total_experience, xp);
        assert_eq!(report.total_gold, 100 * 100 + gold);
    }

    #[test]
    fn test_boss_fought_last_from_level_five() {
        let report = run(100, 5, 9);
        assert!(report.success);
        assert_eq!(report.enemies_defeated, 8);
        assert_eq!(report.enemy_details.last().unwrap().kind, EnemyKind::Demon);
    }

    #[test]
    fn test_underleveled_player_is_defeated() {
        let report = run(1, 20, 5);
        assert!(!report.success);
        assert_eq!(report.enemies_defeated, 0);
        let reason = report.reason.unwrap();
        assert!(reason.starts_with("Defeated by "), "{}", reason);
        assert_eq!(report.final_stats.health, 0);
        assert_eq!(report.total_gold, 100);
    }

    #[test]
    fn test_run_is_reproducible() {
        assert_eq!(run(8, 6, 77), run(8, 6, 77));
    }

    #[test]
    fn test_run_rejects_bad_levels() {
        let config = LootforgeConfig::default();
        let mut rng = GameRng::seeded(1);
        let err = simulate_dungeon_run(0, 3, &config, &mut rng).unwrap_err();
        assert_eq!(err.kind(), "LevelOutOfRange");
        assert!(simulate_dungeon_run(3, 101, &config, &mut rng).is_err());
    }

    #[test]
    fn test_run_report_json() {
        let json = serde_json::to_value(run(100, 2, 1)).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("reason").is_none());
        assert_eq!(json["enemiesDefeated"], 5);
        assert!(json["enemyDetails"][0]["combatRounds"].is_u64());
        assert!(json["enemyDetails"][0]["type"].is_string());
        assert!(json["finalStats"]["maxHealth"].is_i64());
        assert!(json["totalGold"].is_u64());
    }

    #[test]
    fn test_levels_past_cap_are_rejected_without_validation() {
        let mut config = LootforgeConfig::default();
        config.limits.max_level = 1_000_000_000;
        let mut rng = GameRng::seeded(2);

        let err = simulate_combat_encounter(500_000_000, 1, EnemyKind::Orc, &config, &mut rng)
            .unwrap_err();
        assert_eq!(err.kind(), "LevelOutOfRange");

        let cap = i64::from(LEVEL_CAP);
        let enc = simulate_combat_encounter(cap, cap, EnemyKind::Demon, &config, &mut rng).unwrap();
        assert_eq!(enc.player.level, LEVEL_CAP);
        assert!(enc.player.health > 0);
    }

    #[test]
    fn test_combat_encounter() {
        let config = LootforgeConfig::default();
        let mut rng = GameRng::seeded(4);
        let enc = simulate_combat_encounter(5, 5, EnemyKind::Orc, &config, &mut rng).unwrap();
        assert_eq!(enc.enemy.kind, EnemyKind::Orc);
        assert_eq!(enc.enemy.level, 5);
        assert_eq!(enc.player.level, 5);
        assert_eq!(enc.combat.combat_log.len(), enc.combat.rounds as usize);

        let err = simulate_combat_encounter(5, 0, EnemyKind::Orc, &config, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GenError::LevelOutOfRange {
                field: "enemy_level",
                ..
            }
        ));
    }
}
