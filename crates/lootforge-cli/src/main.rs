//! Lootforge command-line generator.
//!
//! Usage:
//!   lootforge dungeon --level 10 --visualize --stats
//!   lootforge dungeon --level 5 --count 3 --export dungeon.json --seed 42
//!   lootforge loot --level 5 --count 3 --rarity epic
//!   lootforge combat --player-level 5 --enemy-level 5 --enemy-type orc
//!   lootforge run --player-level 10 --dungeon-level 5
//!
//! JSON goes to stdout. Failures print `{"error": ..., "type": ...}` to
//! stderr and exit with status 1.

mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lootforge_logic::character::EnemyKind;
use lootforge_logic::config::LootforgeConfig;
use lootforge_logic::dungeon::{Dungeon, DungeonGenerator};
use lootforge_logic::loot::{ItemKind, LootGenerator, LootItem, Rarity};
use lootforge_logic::render::{render_ascii, DungeonStats};
use lootforge_logic::rng::GameRng;
use lootforge_logic::run::{simulate_combat_encounter, simulate_dungeon_run};
use lootforge_logic::validation::ensure_valid;
use lootforge_logic::GenError;
use serde::Serialize;

use cli::{Cli, Cmd, CombatArgs, DungeonArgs, LootArgs, RunArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e.downcast_ref::<GenError>().map_or("Error", GenError::kind);
            let body = serde_json::json!({ "error": format!("{:#}", e), "type": kind });
            eprintln!("{}", body);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.cmd {
        Cmd::Dungeon(args) => dungeon(args, &config, cli.compact),
        Cmd::Loot(args) => loot(args, &config, cli.compact),
        Cmd::Combat(args) => combat(args, &config, cli.compact),
        Cmd::Run(args) => dungeon_run(args, &config, cli.compact),
    }
}

fn load_config(path: Option<&Path>) -> Result<LootforgeConfig> {
    let config: LootforgeConfig = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config: {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parse config: {}", path.display()))?
        }
        None => LootforgeConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}

fn emit<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    println!("{}", to_json(value, compact)?);
    Ok(())
}

/// `dungeon.json` → `dungeon_2.json`. A missing extension becomes `.json`.
fn numbered(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".to_string());
    path.with_file_name(format!("{}_{}.{}", stem, n, ext))
}

/// Generate the requested dungeons. A batch draws one seed per dungeon from
/// the `--seed` stream, so each dungeon's recorded seed regenerates it alone.
fn generate_dungeons(args: &DungeonArgs, config: &LootforgeConfig) -> Result<Vec<Dungeon>> {
    let level = config.limits.check_level("level", args.level)?;
    let count = config.limits.check_dungeon_count(args.count)?;
    let mut rng = GameRng::from_option(args.seed);
    let mut generator = DungeonGenerator::new(config.dungeon.clone());

    let dungeons: Vec<Dungeon> = if count == 1 {
        vec![generator.generate(level, &mut rng)]
    } else {
        (0..count)
            .map(|_| generator.generate(level, &mut GameRng::seeded(rng.derive_seed())))
            .collect()
    };

    if args.validate {
        for (i, d) in dungeons.iter().enumerate() {
            ensure_valid(d).with_context(|| format!("dungeon {} of {}", i + 1, count))?;
        }
    }
    Ok(dungeons)
}

/// One dungeon prints as an object, several as an array.
fn dungeons_json(dungeons: &[Dungeon], compact: bool) -> Result<String> {
    match dungeons {
        [single] => to_json(single, compact),
        many => to_json(&many, compact),
    }
}

fn dungeon(args: &DungeonArgs, config: &LootforgeConfig, compact: bool) -> Result<()> {
    let dungeons = generate_dungeons(args, config)?;
    let count = dungeons.len();

    let report_mode = args.visualize || args.stats || args.export.is_some();
    if !report_mode {
        println!("{}", dungeons_json(&dungeons, compact)?);
        return Ok(());
    }

    for (i, d) in dungeons.iter().enumerate() {
        let n = i as u32 + 1;
        if count > 1 {
            println!("\n{}", "#".repeat(60));
            println!("Generating dungeon {} of {}", n, count);
            println!("{}", "#".repeat(60));
        }
        if args.stats || count > 1 {
            print!("{}", DungeonStats::from(d));
        }
        if args.visualize {
            println!("{}", render_ascii(d));
        }
        if let Some(path) = &args.export {
            let path = if count > 1 {
                numbered(path, n)
            } else {
                path.clone()
            };
            fs::write(&path, to_json(d, compact)?)
                .with_context(|| format!("write dungeon: {}", path.display()))?;
            log::info!("Exported level {} dungeon to {}", d.level, path.display());
            println!("Dungeon exported to {}", path.display());
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct LootOutput {
    items: Vec<LootItem>,
}

fn loot(args: &LootArgs, config: &LootforgeConfig, compact: bool) -> Result<()> {
    let level = config.limits.check_level("level", args.level)?;
    let rarity = Rarity::parse(&args.rarity)?;
    let kind = args.item_type.as_deref().map(ItemKind::parse).transpose()?;
    let mut rng = GameRng::from_option(args.seed);

    let items = LootGenerator::new(config.loot.clone()).generate_batch(
        args.count,
        rarity,
        kind,
        level,
        &config.limits,
        &mut rng,
    )?;
    emit(&LootOutput { items }, compact)
}

fn combat(args: &CombatArgs, config: &LootforgeConfig, compact: bool) -> Result<()> {
    let kind = EnemyKind::parse(&args.enemy_type)?;
    let mut rng = GameRng::from_option(args.seed);
    let encounter = simulate_combat_encounter(
        args.player_level,
        args.enemy_level,
        kind,
        config,
        &mut rng,
    )?;
    emit(&encounter, compact)
}

fn dungeon_run(args: &RunArgs, config: &LootforgeConfig, compact: bool) -> Result<()> {
    let mut rng = GameRng::from_option(args.seed);
    let report = simulate_dungeon_run(args.player_level, args.dungeon_level, config, &mut rng)?;
    emit(&report, compact)
}
