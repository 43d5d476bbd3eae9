//! Lootforge Headless Generation Harness
//!
//! Sweeps levels and seeds through every generator and checks the
//! invariants that unit tests only sample. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p lootforge-simtest
//!   cargo run -p lootforge-simtest -- --verbose

use std::collections::BTreeMap;

use lootforge_logic::character::{level_multiplier, EnemyFactory, EnemyKind, Player};
use lootforge_logic::combat::{CombatSystem, DamageType};
use lootforge_logic::config::LootforgeConfig;
use lootforge_logic::dungeon::{room_count, trap_count, DungeonGenerator, RoomKind};
use lootforge_logic::loot::{ItemKind, LootGenerator, Rarity};
use lootforge_logic::render::render_ascii;
use lootforge_logic::rng::GameRng;
use lootforge_logic::run::simulate_dungeon_run;
use lootforge_logic::validation::{validate_all, Severity};
use strum::IntoEnumIterator;

const SEEDS_PER_LEVEL: u64 = 5;
const LOOT_SAMPLES: usize = 20_000;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    println!("=== Lootforge Generation Harness ===\n");

    let config = LootforgeConfig::default();
    let mut results = Vec::new();

    // 1. Dungeon sweep over every level
    results.extend(validate_dungeon_sweep(&config, verbose));

    // 2. Loot rarity and kind distribution
    results.extend(validate_loot_distribution(&config, verbose));

    // 3. Combat formula and procs
    results.extend(validate_combat(&config, verbose));

    // 4. Enemy level scaling
    results.extend(validate_enemy_scaling(verbose));

    // 5. Full dungeon runs
    results.extend(validate_runs(&config, verbose));

    // 6. Seed determinism
    results.extend(validate_determinism(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Dungeon Sweep ────────────────────────────────────────────────────

fn validate_dungeon_sweep(config: &LootforgeConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Dungeon Sweep ---");
    let mut results = Vec::new();
    let limits = &config.limits;
    let tuning = &config.dungeon;

    let mut generated = 0;
    let mut errors = Vec::new();
    let mut warnings = 0;
    let mut wrong_counts = Vec::new();
    let mut bad_special_rooms = Vec::new();

    for level in limits.min_level..=limits.max_level {
        for seed in 0..SEEDS_PER_LEVEL {
            let mut rng = GameRng::seeded(seed);
            let d = DungeonGenerator::new(tuning.clone()).generate(level, &mut rng);
            generated += 1;

            for finding in validate_all(&d) {
                match finding.severity {
                    Severity::Error => errors.push(format!(
                        "L{} s{}: [{}] {}",
                        level, seed, finding.category, finding.message
                    )),
                    Severity::Warning => warnings += 1,
                }
            }

            if d.rooms.len() != room_count(level, tuning) as usize
                || d.traps.len() != trap_count(level, tuning) as usize
            {
                wrong_counts.push(format!("L{} s{}", level, seed));
            }

            let spawns = d.rooms.iter().filter(|r| r.kind == RoomKind::Spawn).count();
            let bosses = d.rooms.iter().filter(|r| r.kind == RoomKind::Boss).count();
            let expected_bosses = usize::from(d.rooms.len() > 1);
            if spawns != 1 || bosses != expected_bosses {
                bad_special_rooms.push(format!("L{} s{}", level, seed));
            }
        }
    }

    results.push(TestResult {
        name: "dungeon_sweep_no_errors".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} dungeons, {} warnings", generated, warnings)
        } else {
            format!("{} errors, first: {}", errors.len(), errors[0])
        },
    });

    results.push(TestResult {
        name: "dungeon_sweep_counts".into(),
        passed: wrong_counts.is_empty(),
        detail: if wrong_counts.is_empty() {
            "room and trap counts follow level scaling".into()
        } else {
            format!("mismatched counts: {}", wrong_counts.join(", "))
        },
    });

    results.push(TestResult {
        name: "dungeon_sweep_special_rooms".into(),
        passed: bad_special_rooms.is_empty(),
        detail: if bad_special_rooms.is_empty() {
            "one spawn room, one boss room".into()
        } else {
            format!("bad special rooms: {}", bad_special_rooms.join(", "))
        },
    });

    let sample = DungeonGenerator::new(tuning.clone()).generate(5, &mut GameRng::seeded(1));
    let ascii = render_ascii(&sample);
    results.push(TestResult {
        name: "dungeon_ascii_render".into(),
        passed: ascii.contains('S') && ascii.contains('B'),
        detail: format!("{} lines rendered", ascii.lines().count()),
    });

    if verbose {
        println!("  Room / trap counts by level:");
        for level in [1, 2, 5, 10, 20, 50, 100] {
            println!(
                "    L{:3}: {} rooms, {:3} traps",
                level,
                room_count(level, tuning),
                trap_count(level, tuning)
            );
        }
    }

    results
}

// ── 2. Loot Distribution ────────────────────────────────────────────────

fn validate_loot_distribution(config: &LootforgeConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Loot Distribution ---");
    let mut results = Vec::new();
    let mut rng = GameRng::seeded(7);

    // Rarity frequencies track the weight table
    let mut rarity_counts: BTreeMap<Rarity, usize> = BTreeMap::new();
    for _ in 0..LOOT_SAMPLES {
        *rarity_counts.entry(Rarity::roll(&mut rng)).or_default() += 1;
    }
    let mut off = Vec::new();
    for rarity in Rarity::iter() {
        let observed = *rarity_counts.get(&rarity).unwrap_or(&0) as f64 / LOOT_SAMPLES as f64;
        let expected = rarity.weight() as f64 / 100.0;
        if (observed - expected).abs() > 0.02 {
            off.push(format!("{} {:.3} vs {:.3}", rarity, observed, expected));
        }
    }
    results.push(TestResult {
        name: "loot_rarity_weights".into(),
        passed: off.is_empty(),
        detail: if off.is_empty() {
            format!("{} rolls within 2% of weights", LOOT_SAMPLES)
        } else {
            off.join(", ")
        },
    });

    // Kind frequencies and per-kind shape
    let mut loot = LootGenerator::new(config.loot.clone());
    let mut kind_counts: BTreeMap<ItemKind, usize> = BTreeMap::new();
    let mut malformed = Vec::new();
    for _ in 0..LOOT_SAMPLES {
        let item = loot.generate_item(Rarity::Common, None, 10, &mut rng);
        *kind_counts.entry(item.kind).or_default() += 1;
        let ok = match item.kind {
            ItemKind::Weapon => item.stats.damage.is_some() && item.effect.is_none(),
            ItemKind::Armor => item.stats.defense.is_some() && item.effect.is_none(),
            ItemKind::Potion | ItemKind::Scroll => item.stats.is_empty() && item.effect.is_some(),
        };
        if !ok && malformed.len() < 3 {
            malformed.push(item.name.clone());
        }
    }
    let weapon_share = *kind_counts.get(&ItemKind::Weapon).unwrap_or(&0) as f64 / LOOT_SAMPLES as f64;
    let scroll_share = *kind_counts.get(&ItemKind::Scroll).unwrap_or(&0) as f64 / LOOT_SAMPLES as f64;
    results.push(TestResult {
        name: "loot_kind_weights".into(),
        passed: (weapon_share - 0.35).abs() < 0.02 && (scroll_share - 0.10).abs() < 0.02,
        detail: format!("weapon {:.3}, scroll {:.3}", weapon_share, scroll_share),
    });
    results.push(TestResult {
        name: "loot_item_shape".into(),
        passed: malformed.is_empty(),
        detail: if malformed.is_empty() {
            "equipment has stats, consumables have effects".into()
        } else {
            format!("malformed: {}", malformed.join(", "))
        },
    });

    // Value climbs with rarity for the same weapon level
    let values: Vec<u32> = Rarity::iter()
        .map(|r| {
            loot.generate_item(r, Some(ItemKind::Weapon), 10, &mut rng)
                .stats
                .damage
                .unwrap_or(0)
        })
        .collect();
    results.push(TestResult {
        name: "loot_damage_scales_with_rarity".into(),
        passed: values.windows(2).all(|w| w[0] < w[1]),
        detail: format!("weapon damage by tier: {:?}", values),
    });

    // Drops happen at roughly the configured rate
    let drops = (0..LOOT_SAMPLES)
        .filter(|_| loot.roll_drop(5, &mut rng).is_some())
        .count() as f64
        / LOOT_SAMPLES as f64;
    results.push(TestResult {
        name: "loot_drop_rate".into(),
        passed: (drops - config.loot.drop_chance).abs() < 0.02,
        detail: format!("{:.3} observed vs {:.2}", drops, config.loot.drop_chance),
    });

    if verbose {
        println!("  Rarity counts:");
        for (rarity, n) in &rarity_counts {
            println!("    {:10}: {}", rarity, n);
        }
    }

    results
}

// ── 3. Combat ───────────────────────────────────────────────────────────

fn validate_combat(config: &LootforgeConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Combat ---");
    let mut results = Vec::new();
    let mut combat = CombatSystem::new(config.combat.clone());
    let mut rng = GameRng::seeded(13);
    let player = Player::new("Hero", 5);
    let enemy = EnemyFactory::new().create(EnemyKind::Orc, 5);

    let n = 20_000;
    let hits: Vec<_> = (0..n)
        .map(|_| {
            combat.calculate_damage(
                20,
                DamageType::Fire,
                &player.stats,
                &enemy.stats,
                &mut rng,
            )
        })
        .collect();

    let crit_rate = hits.iter().filter(|h| h.is_critical).count() as f64 / n as f64;
    results.push(TestResult {
        name: "combat_crit_rate".into(),
        passed: (crit_rate - config.combat.crit_chance).abs() < 0.02,
        detail: format!("{:.3} observed vs {:.2}", crit_rate, config.combat.crit_chance),
    });

    let burn_rate = hits.iter().filter(|h| h.status_effect.is_some()).count() as f64 / n as f64;
    results.push(TestResult {
        name: "combat_fire_burn_proc".into(),
        passed: (burn_rate - 0.3).abs() < 0.02,
        detail: format!("{:.3} burn procs vs 0.30", burn_rate),
    });

    let floor_ok = (0..100).all(|_| {
        combat
            .calculate_damage(0, DamageType::Poison, &enemy.stats, &player.stats, &mut rng)
            .damage
            >= 1
    });
    results.push(TestResult {
        name: "combat_damage_floor".into(),
        passed: floor_ok,
        detail: "zero-base poison hits still deal at least 1".into(),
    });

    let capped = (0..200).all(|_| {
        combat.simulate_combat(&player, &enemy, &mut rng).rounds <= config.combat.max_rounds
    });
    results.push(TestResult {
        name: "combat_round_cap".into(),
        passed: capped,
        detail: format!("every fight ends within {} rounds", config.combat.max_rounds),
    });

    results
}

// ── 4. Enemy Scaling ────────────────────────────────────────────────────

fn validate_enemy_scaling(verbose: bool) -> Vec<TestResult> {
    println!("--- Enemy Scaling ---");
    let mut results = Vec::new();
    let mut factory = EnemyFactory::new();

    let mut non_monotonic = Vec::new();
    for kind in EnemyKind::all() {
        let healths: Vec<i32> = (1..=100).map(|l| factory.create(kind, l).health).collect();
        if !healths.windows(2).all(|w| w[0] < w[1]) {
            non_monotonic.push(kind.to_string());
        }
    }
    results.push(TestResult {
        name: "enemy_health_monotonic".into(),
        passed: non_monotonic.is_empty(),
        detail: if non_monotonic.is_empty() {
            "health strictly rises with level for every kind".into()
        } else {
            format!("non-monotonic: {}", non_monotonic.join(", "))
        },
    });

    let demon = factory.create(EnemyKind::Demon, 1);
    let strongest_regular = EnemyKind::REGULAR
        .iter()
        .map(|&k| factory.create(k, 1).health)
        .max()
        .unwrap_or(0);
    results.push(TestResult {
        name: "enemy_demon_is_boss".into(),
        passed: EnemyKind::Demon.is_boss() && demon.health > strongest_regular,
        detail: format!("demon {} hp vs best regular {} hp", demon.health, strongest_regular),
    });

    if verbose {
        println!("  Level multipliers:");
        for level in [1, 5, 10, 50, 100] {
            println!("    L{:3}: x{:.1}", level, level_multiplier(level));
        }
    }

    results
}

// ── 5. Dungeon Runs ─────────────────────────────────────────────────────

fn validate_runs(config: &LootforgeConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Dungeon Runs ---");
    let mut results = Vec::new();

    let mut failures = Vec::new();
    for seed in 0..20 {
        match simulate_dungeon_run(100, 10, config, &mut GameRng::seeded(seed)) {
            Ok(report) if report.success && report.enemies_defeated == 13 => {}
            Ok(report) => failures.push(format!("seed {}: {:?}", seed, report.reason)),
            Err(e) => failures.push(format!("seed {}: {}", seed, e)),
        }
    }
    results.push(TestResult {
        name: "run_overleveled_clears".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            "level 100 hero clears level 10 dungeon on 20 seeds".into()
        } else {
            failures.join("; ")
        },
    });

    let defeats = (0..20)
        .filter_map(|seed| simulate_dungeon_run(1, 30, config, &mut GameRng::seeded(seed)).ok())
        .filter(|r| !r.success && r.reason.is_some())
        .count();
    results.push(TestResult {
        name: "run_underleveled_falls".into(),
        passed: defeats == 20,
        detail: format!("{}/20 level 1 runs into level 30 end in defeat", defeats),
    });

    let rejected = simulate_dungeon_run(0, 1, config, &mut GameRng::seeded(0)).is_err();
    results.push(TestResult {
        name: "run_rejects_level_zero".into(),
        passed: rejected,
        detail: "player level 0 is out of range".into(),
    });

    if verbose {
        println!("  Win rate, equal player and dungeon level (50 seeds):");
        for level in [1, 3, 5, 10, 20] {
            let wins = (0..50)
                .filter_map(|s| {
                    simulate_dungeon_run(level, level, config, &mut GameRng::seeded(s)).ok()
                })
                .filter(|r| r.success)
                .count();
            println!("    L{:2}: {}/50", level, wins);
        }
    }

    results
}

// ── 6. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(config: &LootforgeConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    let dungeon_json = |seed: u64| {
        let d = DungeonGenerator::new(config.dungeon.clone())
            .generate(12, &mut GameRng::seeded(seed));
        serde_json::to_string(&d).unwrap_or_default()
    };
    let a = dungeon_json(99);
    results.push(TestResult {
        name: "determinism_dungeon".into(),
        passed: !a.is_empty() && a == dungeon_json(99) && a != dungeon_json(100),
        detail: format!("{} bytes, identical for equal seeds", a.len()),
    });

    let run_json = |seed: u64| {
        simulate_dungeon_run(10, 6, config, &mut GameRng::seeded(seed))
            .ok()
            .and_then(|r| serde_json::to_string(&r).ok())
            .unwrap_or_default()
    };
    let r = run_json(5);
    results.push(TestResult {
        name: "determinism_run".into(),
        passed: !r.is_empty() && r == run_json(5),
        detail: format!("{} bytes, identical for equal seeds", r.len()),
    });

    results
}
