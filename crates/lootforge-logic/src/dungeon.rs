//! Dungeon layout generation.
//!
//! Layout is a ring: the spawn room sits at the origin and the remaining
//! rooms are spaced evenly by angle around it, each joined to its
//! predecessor by a corridor, with a closing corridor back to spawn. The
//! last room on the ring is always the boss room.
//!
//! Coordinates are world units on the XZ floor plane; `y` is up. Rooms and
//! walls are centered on their `x`/`z`.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::character::EnemyKind;
use crate::config::{DungeonTuning, Limits, LEVEL_CAP};
use crate::error::Result;
use crate::ids::IdAllocator;
use crate::rng::GameRng;

/// Point in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Point on the floor plane.
    pub fn floor(x: f64, z: f64) -> Self {
        Self { x, y: 0.0, z }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoomKind {
    Normal,
    Treasure,
    Boss,
    Spawn,
}

impl RoomKind {
    /// Map glyph used by the ASCII renderer.
    pub fn glyph(self) -> char {
        match self {
            Self::Spawn => 'S',
            Self::Boss => 'B',
            Self::Treasure => 'T',
            Self::Normal => '#',
        }
    }
}

/// Axis-aligned room. `width` spans X, `height` spans Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub x: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub kind: RoomKind,
}

impl Room {
    pub fn min_x(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn min_z(&self) -> f64 {
        self.z - self.height / 2.0
    }

    pub fn max_z(&self) -> f64 {
        self.z + self.height / 2.0
    }

    pub fn center(&self) -> Position {
        Position::floor(self.x, self.z)
    }

    /// Whether a floor point lies inside the room (edges included).
    pub fn contains(&self, p: &Position) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.z >= self.min_z() && p.z <= self.max_z()
    }
}

/// Straight corridor between two room centers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub start: Position,
    pub end: Position,
    pub width: f64,
}

impl Corridor {
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dz = self.end.z - self.start.z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrapKind {
    Spike,
    Fire,
    Arrow,
    Poison,
}

impl TrapKind {
    pub const ALL: [TrapKind; 4] = [Self::Spike, Self::Fire, Self::Arrow, Self::Poison];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trap {
    pub id: String,
    pub room_id: u32,
    pub position: Position,
    #[serde(rename = "type")]
    pub kind: TrapKind,
    pub damage: u32,
    pub triggered: bool,
}

/// Where enemies appear, and how often they respawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub id: String,
    pub room_id: u32,
    pub position: Position,
    pub enemy_type: EnemyKind,
    #[serde(rename = "cooldown")]
    pub cooldown_ms: u32,
    pub last_spawn: u64,
}

/// Box wall segment. `width` spans X, `depth` spans Z, `height` is Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonMetadata {
    pub num_rooms: usize,
    pub num_traps: usize,
    pub num_spawn_points: usize,
}

/// A complete generated level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dungeon {
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u64>,
    pub rooms: Vec<Room>,
    pub corridors: Vec<Corridor>,
    pub traps: Vec<Trap>,
    #[serde(rename = "spawnPoints")]
    pub spawn_points: Vec<SpawnPoint>,
    pub walls: Vec<Wall>,
    pub metadata: DungeonMetadata,
}

impl Dungeon {
    pub fn spawn_room(&self) -> Option<&Room> {
        self.rooms.iter().find(|r| r.kind == RoomKind::Spawn)
    }

    pub fn boss_room(&self) -> Option<&Room> {
        self.rooms.iter().find(|r| r.kind == RoomKind::Boss)
    }

    /// First room containing `p`, if any.
    pub fn room_at(&self, p: &Position) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(p))
    }

    /// Bounding box of all rooms as `(min_x, min_z, max_x, max_z)`.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.rooms.is_empty() {
            return None;
        }
        let mut b = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for r in &self.rooms {
            b.0 = b.0.min(r.min_x());
            b.1 = b.1.min(r.min_z());
            b.2 = b.2.max(r.max_x());
            b.3 = b.3.max(r.max_z());
        }
        Some(b)
    }
}

/// Rooms for a level: one more every two levels, capped.
pub fn room_count(level: u32, tuning: &DungeonTuning) -> u32 {
    tuning
        .base_rooms
        .saturating_add(level / 2)
        .min(tuning.max_rooms)
        .max(1)
}

/// Traps for a level.
pub fn trap_count(level: u32, tuning: &DungeonTuning) -> u32 {
    (level as f64 * tuning.traps_per_level) as u32
}

/// Builds dungeons. Owns the trap and spawn point counters, so IDs keep
/// increasing across dungeons produced by the same generator.
#[derive(Debug, Default)]
pub struct DungeonGenerator {
    tuning: DungeonTuning,
    ids: IdAllocator,
}

impl DungeonGenerator {
    pub fn new(tuning: DungeonTuning) -> Self {
        Self {
            tuning,
            ids: IdAllocator::new(),
        }
    }

    pub fn tuning(&self) -> &DungeonTuning {
        &self.tuning
    }

    /// Generate a full dungeon for `level`.
    ///
    /// `level` is not checked against `Limits` here (see `generate_dungeon`);
    /// it is only clamped to `1..=LEVEL_CAP`. `seed` is recorded only when
    /// `rng` is a seeded stream nothing has been drawn from yet, so a
    /// recorded seed always regenerates this exact dungeon.
    pub fn generate(&mut self, level: u32, rng: &mut GameRng) -> Dungeon {
        let requested = level;
        let level = level.clamp(1, LEVEL_CAP);
        if level != requested {
            log::warn!("Dungeon level {} clamped to {}", requested, level);
        }
        let seed = rng.replay_seed();

        let rooms = self.place_rooms(level, rng);
        let corridors = self.connect_rooms(&rooms);

        let traps: Vec<Trap> = (0..trap_count(level, &self.tuning))
            .map(|_| {
                let room = rng.pick(&rooms);
                self.create_trap(room, level, rng)
            })
            .collect();

        let mut spawn_points = Vec::new();
        for room in rooms.iter().filter(|r| r.kind != RoomKind::Spawn) {
            let is_boss = room.kind == RoomKind::Boss;
            let count = if is_boss {
                1
            } else {
                2 + rng.range_inclusive(0, 2)
            };
            for _ in 0..count {
                spawn_points.push(self.create_spawn_point(room, is_boss, rng));
            }
        }

        let walls: Vec<Wall> = rooms
            .iter()
            .flat_map(|r| room_walls(r, &self.tuning))
            .collect();

        let metadata = DungeonMetadata {
            num_rooms: rooms.len(),
            num_traps: traps.len(),
            num_spawn_points: spawn_points.len(),
        };

        log::info!(
            "Generated level {} dungeon: {} rooms, {} corridors, {} traps, {} spawn points",
            level,
            metadata.num_rooms,
            corridors.len(),
            metadata.num_traps,
            metadata.num_spawn_points
        );

        Dungeon {
            level,
            seed,
            rooms,
            corridors,
            traps,
            spawn_points,
            walls,
            metadata,
        }
    }

    fn place_rooms(&self, level: u32, rng: &mut GameRng) -> Vec<Room> {
        let t = &self.tuning;
        let num_rooms = room_count(level, t);
        let mut rooms = Vec::with_capacity(num_rooms as usize);

        rooms.push(Room {
            id: 0,
            x: 0.0,
            z: 0.0,
            width: t.spawn_room_size,
            height: t.spawn_room_size,
            kind: RoomKind::Spawn,
        });

        for i in 1..num_rooms {
            let angle = i as f64 / num_rooms as f64 * TAU;
            let distance = t.room_distance + rng.unit() * t.distance_jitter;
            let kind = if i == num_rooms - 1 {
                RoomKind::Boss
            } else if rng.chance(t.treasure_chance) {
                RoomKind::Treasure
            } else {
                RoomKind::Normal
            };
            let width = t.room_min_size + rng.unit() * t.room_size_jitter;
            let height = t.room_min_size + rng.unit() * t.room_size_jitter;

            let room = Room {
                id: i,
                x: angle.cos() * distance,
                z: angle.sin() * distance,
                width,
                height,
                kind,
            };
            log::debug!(
                "room {} ({}) at ({:.1}, {:.1}) size {:.1}x{:.1}",
                room.id,
                room.kind,
                room.x,
                room.z,
                room.width,
                room.height
            );
            rooms.push(room);
        }
        rooms
    }

    /// Chain each room to its predecessor, then close the loop back to spawn.
    fn connect_rooms(&self, rooms: &[Room]) -> Vec<Corridor> {
        let width = self.tuning.corridor_width;
        let mut corridors: Vec<Corridor> = rooms
            .windows(2)
            .map(|pair| Corridor {
                start: pair[0].center(),
                end: pair[1].center(),
                width,
            })
            .collect();

        if let (Some(first), Some(last)) = (rooms.first(), rooms.last()) {
            if rooms.len() > 1 {
                corridors.push(Corridor {
                    start: last.center(),
                    end: first.center(),
                    width,
                });
            }
        }
        corridors
    }

    fn create_trap(&mut self, room: &Room, level: u32, rng: &mut GameRng) -> Trap {
        let t = &self.tuning;
        let kind = *rng.pick(&TrapKind::ALL);
        let dx = rng.centered(room.width * t.trap_spread);
        let dz = rng.centered(room.height * t.trap_spread);
        let damage = t
            .trap_base_damage
            .saturating_add(level.saturating_mul(t.trap_damage_per_level));

        Trap {
            id: self.ids.next("trap"),
            room_id: room.id,
            position: Position::floor(room.x + dx, room.z + dz),
            kind,
            damage,
            triggered: false,
        }
    }

    fn create_spawn_point(&mut self, room: &Room, is_boss: bool, rng: &mut GameRng) -> SpawnPoint {
        let t = &self.tuning;
        let enemy_type = if is_boss {
            EnemyKind::Demon
        } else {
            *rng.pick(&EnemyKind::REGULAR)
        };
        let dx = rng.centered(room.width * t.spawn_spread);
        let dz = rng.centered(room.height * t.spawn_spread);

        SpawnPoint {
            id: self.ids.next("spawn"),
            room_id: room.id,
            position: Position::floor(room.x + dx, room.z + dz),
            enemy_type,
            cooldown_ms: if is_boss {
                t.boss_cooldown_ms
            } else {
                t.spawn_cooldown_ms
            },
            last_spawn: 0,
        }
    }
}

/// The four walls boxing in a room: north, south, east, west.
///
/// North/south walls run the full width plus both corners; east/west walls
/// fill the gap between them.
pub fn room_walls(room: &Room, tuning: &DungeonTuning) -> [Wall; 4] {
    let thick = tuning.wall_thickness;
    let h = tuning.wall_height;
    let span = room.width + thick * 2.0;
    [
        Wall {
            x: room.x,
            z: room.z - room.height / 2.0 - thick / 2.0,
            width: span,
            height: h,
            depth: thick,
        },
        Wall {
            x: room.x,
            z: room.z + room.height / 2.0 + thick / 2.0,
            width: span,
            height: h,
            depth: thick,
        },
        Wall {
            x: room.x + room.width / 2.0 + thick / 2.0,
            z: room.z,
            width: thick,
            height: h,
            depth: room.height,
        },
        Wall {
            x: room.x - room.width / 2.0 - thick / 2.0,
            z: room.z,
            width: thick,
            height: h,
            depth: room.height,
        },
    ]
}

/// Range-check `level`, then generate with a fresh generator.
pub fn generate_dungeon(
    level: i64,
    seed: Option<u64>,
    tuning: &DungeonTuning,
    limits: &Limits,
) -> Result<Dungeon> {
    let level = limits.check_level("level", level)?;
    let mut rng = GameRng::from_option(seed);
    Ok(DungeonGenerator::new(tuning.clone()).generate(level, &mut rng))
}
