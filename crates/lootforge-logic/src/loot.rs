//! Loot generation: rarity rolls, naming, stat scaling, and value.
//!
//! Rarity drives a single multiplier applied to every rolled stat and a
//! flat sell value. Item level adds a linear term before the multiplier.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::config::{Limits, LootTuning, LEVEL_CAP};
use crate::error::{GenError, Result};
use crate::ids::IdAllocator;
use crate::rng::GameRng;

/// Item quality tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Stat multiplier for this tier.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Uncommon => 1.5,
            Self::Rare => 2.0,
            Self::Epic => 3.0,
            Self::Legendary => 5.0,
        }
    }

    /// Base sell value before stats.
    pub fn sell_value(self) -> u32 {
        match self {
            Self::Common => 10,
            Self::Uncommon => 25,
            Self::Rare => 50,
            Self::Epic => 100,
            Self::Legendary => 250,
        }
    }

    /// Drop weight in percent. Weights sum to 100.
    pub fn weight(self) -> u32 {
        match self {
            Self::Common => 50,
            Self::Uncommon => 30,
            Self::Rare => 15,
            Self::Epic => 4,
            Self::Legendary => 1,
        }
    }

    /// Weighted roll over all tiers.
    pub fn roll(rng: &mut GameRng) -> Self {
        Self::from_roll(rng.unit())
    }

    /// Map a uniform `[0, 1)` sample onto the cumulative weight table.
    pub fn from_roll(roll: f64) -> Self {
        RARITY_THRESHOLDS
            .iter()
            .find(|(upper, _)| roll < *upper)
            .map_or(Self::Legendary, |&(_, rarity)| rarity)
    }

    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| GenError::UnknownRarity(name.to_string()))
    }
}

/// Exclusive upper bound of each tier's roll band; anything above is legendary.
const RARITY_THRESHOLDS: [(f64, Rarity); 4] = [
    (0.5, Rarity::Common),
    (0.8, Rarity::Uncommon),
    (0.95, Rarity::Rare),
    (0.99, Rarity::Epic),
];

/// Item category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ItemKind {
    Weapon,
    Armor,
    Potion,
    Scroll,
}

impl ItemKind {
    /// Roll a kind: 35% weapon, 35% armor, 20% potion, 10% scroll.
    pub fn roll(rng: &mut GameRng) -> Self {
        let roll = rng.unit() * 100.0;
        if roll < 35.0 {
            Self::Weapon
        } else if roll < 70.0 {
            Self::Armor
        } else if roll < 90.0 {
            Self::Potion
        } else {
            Self::Scroll
        }
    }

    pub fn is_consumable(self) -> bool {
        matches!(self, Self::Potion | Self::Scroll)
    }

    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| GenError::UnknownItemKind(name.to_string()))
    }

    fn prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Weapon => WEAPON_PREFIXES,
            Self::Armor => ARMOR_PREFIXES,
            Self::Potion => POTION_PREFIXES,
            Self::Scroll => SCROLL_PREFIXES,
        }
    }

    fn bases(self) -> &'static [&'static str] {
        match self {
            Self::Weapon => WEAPON_BASES,
            Self::Armor => ARMOR_BASES,
            Self::Potion => POTION_BASES,
            Self::Scroll => SCROLL_BASES,
        }
    }
}

static WEAPON_PREFIXES: &[&str] = &[
    "Sharp", "Keen", "Brutal", "Swift", "Deadly", "Ancient", "Cursed", "Blessed", "Vengeful",
    "Divine",
];
static ARMOR_PREFIXES: &[&str] = &[
    "Sturdy",
    "Light",
    "Heavy",
    "Reinforced",
    "Magical",
    "Dragon",
    "Shadow",
    "Holy",
    "Ethereal",
    "Titan",
];
static POTION_PREFIXES: &[&str] = &["Minor", "Lesser", "Greater", "Major", "Superior", "Divine"];
static SCROLL_PREFIXES: &[&str] = &["Scroll of", "Tome of", "Grimoire of", "Codex of"];

static WEAPON_BASES: &[&str] = &[
    "Sword", "Axe", "Bow", "Staff", "Dagger", "Mace", "Spear", "Hammer", "Wand",
];
static ARMOR_BASES: &[&str] = &[
    "Helmet",
    "Chestplate",
    "Boots",
    "Gauntlets",
    "Shield",
    "Cloak",
    "Belt",
    "Ring",
];
static POTION_BASES: &[&str] = &[
    "Health Potion",
    "Mana Potion",
    "Strength Elixir",
    "Defense Tonic",
    "Speed Draught",
];
static SCROLL_BASES: &[&str] = &[
    "Fireball",
    "Lightning",
    "Ice Storm",
    "Healing",
    "Teleportation",
    "Summoning",
];

/// Rolled stat lines. Absent lines are omitted from JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crit_chance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
}

impl ItemStats {
    pub fn total(&self) -> u32 {
        [self.damage, self.crit_chance, self.defense, self.health]
            .iter()
            .flatten()
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// A generated item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub rarity: Rarity,
    pub stats: ItemStats,
    pub value: u32,
    pub effect: Option<String>,
}

/// Sell value: tier base plus two gold per stat point.
pub fn item_value(rarity: Rarity, stats: &ItemStats) -> u32 {
    rarity.sell_value() + stats.total() * 2
}

/// Stats for `kind` at `level` (at most `LEVEL_CAP`). Consumables have none.
pub fn roll_stats(kind: ItemKind, rarity: Rarity, level: u32, rng: &mut GameRng) -> ItemStats {
    let m = rarity.multiplier();
    let level = f64::from(level.min(LEVEL_CAP));
    let mut stats = ItemStats::default();
    match kind {
        ItemKind::Weapon => {
            stats.damage = Some(((10.0 + level * 2.0) * m) as u32);
            if rng.chance(0.5) {
                stats.crit_chance = Some((5.0 * m) as u32);
            }
        }
        ItemKind::Armor => {
            stats.defense = Some(((8.0 + level * 1.5) * m) as u32);
            if rng.chance(0.5) {
                stats.health = Some((20.0 * m) as u32);
            }
        }
        ItemKind::Potion | ItemKind::Scroll => {}
    }
    stats
}

/// Effect text for consumables; `None` for equipment.
pub fn consumable_effect(kind: ItemKind, base: &str) -> Option<String> {
    match kind {
        ItemKind::Potion => {
            let text = if base.contains("Health") {
                "Restores health over time"
            } else if base.contains("Mana") {
                "Restores mana over time"
            } else if base.contains("Strength") {
                "Temporarily increases strength"
            } else if base.contains("Defense") {
                "Temporarily increases defense"
            } else {
                "Increases movement speed"
            };
            Some(text.to_string())
        }
        ItemKind::Scroll => Some(format!("Casts {} spell", base)),
        ItemKind::Weapon | ItemKind::Armor => None,
    }
}

/// Item generator. Owns the `item_{n}` counter.
#[derive(Debug, Default)]
pub struct LootGenerator {
    tuning: LootTuning,
    ids: IdAllocator,
}

impl LootGenerator {
    pub fn new(tuning: LootTuning) -> Self {
        Self {
            tuning,
            ids: IdAllocator::new(),
        }
    }

    /// Generate one item. A `None` kind is rolled with the kind weights.
    pub fn generate_item(
        &mut self,
        rarity: Rarity,
        kind: Option<ItemKind>,
        level: u32,
        rng: &mut GameRng,
    ) -> LootItem {
        let kind = kind.unwrap_or_else(|| ItemKind::roll(rng));
        let prefix = *rng.pick(kind.prefixes());
        let base = *rng.pick(kind.bases());
        let stats = roll_stats(kind, rarity, level, rng);

        LootItem {
            id: self.ids.next("item"),
            name: format!("{} {}", prefix, base),
            kind,
            rarity,
            value: item_value(rarity, &stats),
            stats,
            effect: consumable_effect(kind, base),
        }
    }

    /// Generate `count` items of one rarity, rejecting counts outside the limits.
    pub fn generate_batch(
        &mut self,
        count: i64,
        rarity: Rarity,
        kind: Option<ItemKind>,
        level: u32,
        limits: &Limits,
        rng: &mut GameRng,
    ) -> Result<Vec<LootItem>> {
        let count = limits.check_item_count(count)?;
        let items: Vec<LootItem> = (0..count)
            .map(|_| self.generate_item(rarity, kind, level, rng))
            .collect();
        log::info!(
            "Generated {} {} item(s) at level {}",
            items.len(),
            rarity,
            level
        );
        Ok(items)
    }

    /// Roll the drop chance, then a weighted rarity. `None` when nothing drops.
    pub fn roll_drop(&mut self, level: u32, rng: &mut GameRng) -> Option<LootItem> {
        if !rng.chance(self.tuning.drop_chance) {
            return None;
        }
        let rarity = Rarity::roll(rng);
        Some(self.generate_item(rarity, None, level, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_rarity_thresholds() {
        assert_eq!(Rarity::from_roll(0.0), Rarity::Common);
        assert_eq!(Rarity::from_roll(0.49), Rarity::Common);
        assert_eq!(Rarity::from_roll(0.5), Rarity::Uncommon);
        assert_eq!(Rarity::from_roll(0.79), Rarity::Uncommon);
        assert_eq!(Rarity::from_roll(0.8), Rarity::Rare);
        assert_eq!(Rarity::from_roll(0.949), Rarity::Rare);
        assert_eq!(Rarity::from_roll(0.96), Rarity::Epic);
        assert_eq!(Rarity::from_roll(0.995), Rarity::Legendary);
        assert_eq!(Rarity::from_roll(0.99999), Rarity::Legendary);
    }

    #[test]
    fn test_rarity_band_edges_are_exact() {
        assert_eq!(Rarity::from_roll(0.9499), Rarity::Rare);
        assert_eq!(Rarity::from_roll(0.95), Rarity::Epic);
        assert_eq!(Rarity::from_roll(0.9899), Rarity::Epic);
        assert_eq!(Rarity::from_roll(0.99), Rarity::Legendary);

        // bands agree with the percentage weights
        let mut cumulative = 0;
        for (&(upper, rarity), weight) in RARITY_THRESHOLDS
            .iter()
            .zip(Rarity::iter().map(Rarity::weight))
        {
            cumulative += weight;
            assert_eq!(upper, f64::from(cumulative) / 100.0, "{}", rarity);
        }
    }

    #[test]
    fn test_weights_sum_to_100() {
        let total: u32 = Rarity::iter().map(Rarity::weight).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_rarity_distribution_matches_weights() {
        let mut rng = GameRng::seeded(1234);
        let n = 100_000;
        let mut counts = [0u32; 5];
        for _ in 0..n {
            counts[Rarity::roll(&mut rng) as usize] += 1;
        }
        for rarity in Rarity::iter() {
            let observed = counts[rarity as usize] as f64 / n as f64 * 100.0;
            let expected = rarity.weight() as f64;
            assert!(
                (observed - expected).abs() < 1.0,
                "{}: observed {:.2}% expected {}%",
                rarity,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_weapon_stats_scale() {
        let mut rng = GameRng::seeded(1);
        let stats = roll_stats(ItemKind::Weapon, Rarity::Rare, 5, &mut rng);
        assert_eq!(stats.damage, Some(40));
        assert!(stats.crit_chance.is_none() || stats.crit_chance == Some(10));
        assert!(stats.defense.is_none());
    }

    #[test]
    fn test_armor_stats_scale() {
        let mut rng = GameRng::seeded(2);
        let stats = roll_stats(ItemKind::Armor, Rarity::Legendary, 4, &mut rng);
        assert_eq!(stats.defense, Some(70));
        assert!(stats.health.is_none() || stats.health == Some(100));
    }

    #[test]
    fn test_consumables_have_no_stats() {
        let mut rng = GameRng::seeded(3);
        assert!(roll_stats(ItemKind::Potion, Rarity::Epic, 9, &mut rng).is_empty());
        assert!(roll_stats(ItemKind::Scroll, Rarity::Epic, 9, &mut rng).is_empty());
    }

    #[test]
    fn test_value_formula() {
        let stats = ItemStats {
            damage: Some(40),
            crit_chance: Some(10),
            ..Default::default()
        };
        assert_eq!(item_value(Rarity::Rare, &stats), 50 + 100);
        assert_eq!(item_value(Rarity::Common, &ItemStats::default()), 10);
    }

    #[test]
    fn test_effects() {
        assert_eq!(
            consumable_effect(ItemKind::Potion, "Mana Potion").as_deref(),
            Some("Restores mana over time")
        );
        assert_eq!(
            consumable_effect(ItemKind::Potion, "Speed Draught").as_deref(),
            Some("Increases movement speed")
        );
        assert_eq!(
            consumable_effect(ItemKind::Scroll, "Ice Storm").as_deref(),
            Some("Casts Ice Storm spell")
        );
        assert_eq!(consumable_effect(ItemKind::Weapon, "Sword"), None);
    }

    #[test]
    fn test_generate_item_forced_kind() {
        let mut gen = LootGenerator::default();
        let mut rng = GameRng::seeded(10);
        for _ in 0..50 {
            let item = gen.generate_item(Rarity::Uncommon, Some(ItemKind::Scroll), 3, &mut rng);
            assert_eq!(item.kind, ItemKind::Scroll);
            assert!(item.effect.as_deref().unwrap().starts_with("Casts "));
            assert!(SCROLL_PREFIXES.iter().any(|p| item.name.starts_with(p)));
            assert_eq!(item.value, Rarity::Uncommon.sell_value());
        }
    }

    #[test]
    fn test_ids_unique_and_ordered() {
        let mut gen = LootGenerator::default();
        let mut rng = GameRng::seeded(11);
        let items = gen
            .generate_batch(5, Rarity::Common, None, 1, &Limits::default(), &mut rng)
            .unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["item_1", "item_2", "item_3", "item_4", "item_5"]);
    }

    #[test]
    fn test_batch_rejects_bad_count() {
        let mut gen = LootGenerator::default();
        let mut rng = GameRng::seeded(12);
        let limits = Limits::default();
        assert!(gen
            .generate_batch(0, Rarity::Common, None, 1, &limits, &mut rng)
            .is_err());
        assert!(gen
            .generate_batch(51, Rarity::Common, None, 1, &limits, &mut rng)
            .is_err());
    }

    #[test]
    fn test_drop_chance_extremes() {
        let mut rng = GameRng::seeded(13);
        let mut never = LootGenerator::new(LootTuning { drop_chance: 0.0 });
        assert!((0..100).all(|_| never.roll_drop(1, &mut rng).is_none()));
        let mut always = LootGenerator::new(LootTuning { drop_chance: 1.0 });
        assert!((0..100).all(|_| always.roll_drop(1, &mut rng).is_some()));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Rarity::parse("LEGENDARY"), Ok(Rarity::Legendary));
        assert_eq!(ItemKind::parse("armor"), Ok(ItemKind::Armor));
        assert!(matches!(Rarity::parse("mythic"), Err(GenError::UnknownRarity(_))));
        assert!(matches!(ItemKind::parse("ring"), Err(GenError::UnknownItemKind(_))));
    }

    #[test]
    fn test_json_shape() {
        let mut gen = LootGenerator::default();
        let mut rng = GameRng::seeded(14);
        let item = gen.generate_item(Rarity::Epic, Some(ItemKind::Armor), 2, &mut rng);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "armor");
        assert_eq!(json["rarity"], "epic");
        assert_eq!(json["stats"]["defense"], 33);
        assert!(json["stats"].get("damage").is_none());
        assert!(json["effect"].is_null());
    }
}
