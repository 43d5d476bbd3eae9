use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lootforge", version, about = "Procedural dungeon, loot, and combat generator")]
pub struct Cli {
    /// Tuning overrides (TOML). Missing keys keep their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long, global = true)]
    pub compact: bool,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Generate dungeon layouts
    Dungeon(DungeonArgs),
    /// Generate loot items
    Loot(LootArgs),
    /// Simulate a single fight
    Combat(CombatArgs),
    /// Simulate a full dungeon run
    Run(RunArgs),
}

#[derive(Args)]
pub struct DungeonArgs {
    /// Dungeon difficulty level
    #[arg(short, long, default_value_t = 1)]
    pub level: i64,

    /// Number of dungeons to generate
    #[arg(short, long, default_value_t = 1)]
    pub count: i64,

    /// Seed for reproducible generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print an ASCII map
    #[arg(long)]
    pub visualize: bool,

    /// Print per-kind statistics
    #[arg(short, long)]
    pub stats: bool,

    /// Write JSON to this file (numbered when --count > 1)
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Run structural checks and fail on errors
    #[arg(long)]
    pub validate: bool,
}

#[derive(Args)]
pub struct LootArgs {
    /// Item level used for stat scaling
    #[arg(short, long, default_value_t = 1)]
    pub level: i64,

    /// Number of items
    #[arg(short, long, default_value_t = 1)]
    pub count: i64,

    /// common, uncommon, rare, epic, or legendary
    #[arg(short, long, default_value = "common")]
    pub rarity: String,

    /// weapon, armor, potion, or scroll (rolled when omitted)
    #[arg(short = 't', long = "item-type")]
    pub item_type: Option<String>,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct CombatArgs {
    #[arg(long, default_value_t = 1)]
    pub player_level: i64,

    #[arg(long, default_value_t = 1)]
    pub enemy_level: i64,

    /// zombie, skeleton, orc, or demon
    #[arg(long, default_value = "zombie")]
    pub enemy_type: String,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct RunArgs {
    #[arg(long, default_value_t = 1)]
    pub player_level: i64,

    #[arg(long, default_value_t = 1)]
    pub dungeon_level: i64,

    #[arg(long)]
    pub seed: Option<u64>,
}
