//! Structural validation for generated dungeons.
//!
//! Pure functions that take a [`Dungeon`] and return findings. Nothing here
//! mutates or repairs; callers decide whether warnings matter.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::character::EnemyKind;
use crate::dungeon::{Dungeon, Position, RoomKind};
use crate::error::{GenError, Result};

/// A single validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

fn error(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Error,
        message,
    }
}

fn warning(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Warning,
        message,
    }
}

// ── A. Required content ─────────────────────────────────────────────────

/// At least one room, and exactly one spawn room.
pub fn check_required_rooms(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if d.rooms.is_empty() {
        errors.push(error("structure", "Dungeon must have at least one room".into()));
        return errors;
    }
    match d.rooms.iter().filter(|r| r.kind == RoomKind::Spawn).count() {
        0 => errors.push(error("structure", "Dungeon must have a spawn room".into())),
        1 => {}
        n => errors.push(error(
            "structure",
            format!("Dungeon has {} spawn rooms, expected 1", n),
        )),
    }
    if d.rooms.len() > 1 && d.boss_room().is_none() {
        errors.push(warning("structure", "Multi-room dungeon has no boss room".into()));
    }
    errors
}

/// Metadata counts agree with the vectors they describe.
pub fn check_metadata(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let m = &d.metadata;
    let pairs = [
        ("room", m.num_rooms, d.rooms.len()),
        ("trap", m.num_traps, d.traps.len()),
        ("spawn point", m.num_spawn_points, d.spawn_points.len()),
    ];
    for (what, claimed, actual) in pairs {
        if claimed != actual {
            errors.push(error(
                "metadata",
                format!(
                    "Metadata {} count doesn't match actual {}s: {} vs {}",
                    what, what, claimed, actual
                ),
            ));
        }
    }
    errors
}

// ── B. Geometry ─────────────────────────────────────────────────────────

/// No room has zero or negative size.
pub fn check_room_dimensions(d: &Dungeon) -> Vec<ValidationError> {
    d.rooms
        .iter()
        .filter(|r| !(r.width > 0.0 && r.height > 0.0))
        .map(|r| {
            error(
                "geometry",
                format!(
                    "Room #{} has non-positive dimensions: {}×{}",
                    r.id, r.width, r.height
                ),
            )
        })
        .collect()
}

/// Four walls per room.
pub fn check_walls(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if d.walls.len() != d.rooms.len() * 4 {
        errors.push(warning(
            "geometry",
            format!(
                "Expected {} walls for {} rooms, found {}",
                d.rooms.len() * 4,
                d.rooms.len(),
                d.walls.len()
            ),
        ));
    }
    errors
}

fn check_placed(
    d: &Dungeon,
    what: &str,
    id: &str,
    room_id: u32,
    pos: &Position,
) -> Option<ValidationError> {
    match d.rooms.iter().find(|r| r.id == room_id) {
        None => Some(error(
            "placement",
            format!("{} {} references non-existent room #{}", what, id, room_id),
        )),
        Some(room) if !room.contains(pos) => Some(error(
            "placement",
            format!(
                "{} {} at ({:.1}, {:.1}) lies outside room #{}",
                what, id, pos.x, pos.z, room_id
            ),
        )),
        Some(_) => None,
    }
}

/// Traps and spawn points sit inside the room they belong to.
pub fn check_placements(d: &Dungeon) -> Vec<ValidationError> {
    let traps = d
        .traps
        .iter()
        .filter_map(|t| check_placed(d, "Trap", &t.id, t.room_id, &t.position));
    let spawns = d
        .spawn_points
        .iter()
        .filter_map(|s| check_placed(d, "Spawn point", &s.id, s.room_id, &s.position));
    traps.chain(spawns).collect()
}

// ── C. Identity & consistency ───────────────────────────────────────────

/// Trap and spawn point IDs are unique.
pub fn check_unique_ids(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let ids = d
        .traps
        .iter()
        .map(|t| &t.id)
        .chain(d.spawn_points.iter().map(|s| &s.id));
    for id in ids {
        if !seen.insert(id) {
            errors.push(error("identity", format!("Duplicate ID {}", id)));
        }
    }
    errors
}

/// Demons only spawn in the boss room, and the boss room only spawns demons.
pub fn check_spawn_kinds(d: &Dungeon) -> Vec<ValidationError> {
    let kinds: HashMap<u32, RoomKind> = d.rooms.iter().map(|r| (r.id, r.kind)).collect();
    let mut errors = Vec::new();
    for sp in &d.spawn_points {
        let Some(&kind) = kinds.get(&sp.room_id) else {
            continue; // reported by check_placements
        };
        let boss_room = kind == RoomKind::Boss;
        if boss_room != (sp.enemy_type == EnemyKind::Demon) {
            errors.push(warning(
                "spawns",
                format!(
                    "Spawn point {} spawns {} in a {} room",
                    sp.id, sp.enemy_type, kind
                ),
            ));
        }
        if kind == RoomKind::Spawn {
            errors.push(warning(
                "spawns",
                format!("Spawn point {} is inside the player spawn room", sp.id),
            ));
        }
    }
    errors
}

// ── D. Connectivity ─────────────────────────────────────────────────────

/// Every room is reachable from the spawn room through corridors.
///
/// Corridor endpoints are matched to the room whose center they sit on.
pub fn check_connectivity(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(spawn) = d.spawn_room() else {
        return errors; // reported by check_required_rooms
    };

    let room_at_center = |p: &Position| {
        d.rooms
            .iter()
            .find(|r| (r.x - p.x).abs() < 1e-6 && (r.z - p.z).abs() < 1e-6)
            .map(|r| r.id)
    };

    let mut adj: HashMap<u32, Vec<u32>> = HashMap::new();
    for (i, c) in d.corridors.iter().enumerate() {
        match (room_at_center(&c.start), room_at_center(&c.end)) {
            (Some(a), Some(b)) => {
                adj.entry(a).or_default().push(b);
                adj.entry(b).or_default().push(a);
            }
            _ => errors.push(warning(
                "connectivity",
                format!("Corridor #{} does not join two room centers", i),
            )),
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(spawn.id);
    queue.push_back(spawn.id);
    while let Some(current) = queue.pop_front() {
        if let Some(neighbors) = adj.get(&current) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    let unreached: Vec<u32> = d
        .rooms
        .iter()
        .map(|r| r.id)
        .filter(|id| !visited.contains(id))
        .collect();
    if !unreached.is_empty() {
        errors.push(error(
            "connectivity",
            format!(
                "{} of {} rooms unreachable from spawn (e.g. room #{})",
                unreached.len(),
                d.rooms.len(),
                unreached[0]
            ),
        ));
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Run every check and return the combined findings.
pub fn validate_all(d: &Dungeon) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_required_rooms(d));
    all.extend(check_metadata(d));
    all.extend(check_room_dimensions(d));
    all.extend(check_walls(d));
    all.extend(check_placements(d));
    all.extend(check_unique_ids(d));
    all.extend(check_spawn_kinds(d));
    all.extend(check_connectivity(d));
    all
}

/// Fail on the first error-severity finding; log warnings.
pub fn ensure_valid(d: &Dungeon) -> Result<()> {
    let findings = validate_all(d);
    for w in findings.iter().filter(|f| f.severity == Severity::Warning) {
        log::warn!("[{}] {}", w.category, w.message);
    }
    match findings.into_iter().find(|f| f.severity == Severity::Error) {
        Some(e) => Err(GenError::InvalidDungeon(e.message)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::DungeonGenerator;
    use crate::rng::GameRng;

    fn dungeon() -> Dungeon {
        DungeonGenerator::default().generate(6, &mut GameRng::seeded(99))
    }

    fn errors_only(v: Vec<ValidationError>) -> Vec<ValidationError> {
        v.into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect()
    }

    #[test]
    fn test_generated_dungeon_is_clean() {
        for level in 1..=20 {
            for seed in 0..5 {
                let d = DungeonGenerator::default().generate(level, &mut GameRng::seeded(seed));
                let findings = validate_all(&d);
                assert!(findings.is_empty(), "level {} seed {}: {:?}", level, seed, findings);
            }
        }
    }

    #[test]
    fn test_missing_spawn_room() {
        let mut d = dungeon();
        d.rooms[0].kind = RoomKind::Normal;
        let errs = errors_only(check_required_rooms(&d));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("spawn room"));
        assert!(ensure_valid(&d).is_err());
    }

    #[test]
    fn test_empty_dungeon() {
        let mut d = dungeon();
        d.rooms.clear();
        let errs = check_required_rooms(&d);
        assert_eq!(errs[0].message, "Dungeon must have at least one room");
    }

    #[test]
    fn test_metadata_mismatch() {
        let mut d = dungeon();
        d.metadata.num_traps += 1;
        let errs = check_metadata(&d);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].category, "metadata");
    }

    #[test]
    fn test_bad_dimensions() {
        let mut d = dungeon();
        d.rooms[1].width = 0.0;
        assert_eq!(check_room_dimensions(&d).len(), 1);
    }

    #[test]
    fn test_trap_outside_room() {
        let mut d = dungeon();
        d.traps[0].position.x += 1000.0;
        let errs = check_placements(&d);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("outside"));
    }

    #[test]
    fn test_spawn_point_bad_room_reference() {
        let mut d = dungeon();
        d.spawn_points[0].room_id = 999;
        let errs = check_placements(&d);
        assert!(errs.iter().any(|e| e.message.contains("non-existent room #999")));
    }

    #[test]
    fn test_duplicate_ids() {
        let mut d = dungeon();
        let dup = d.traps[0].clone();
        d.traps.push(dup);
        assert_eq!(check_unique_ids(&d).len(), 1);
    }

    #[test]
    fn test_demon_outside_boss_room_warns() {
        let mut d = dungeon();
        let idx = d
            .spawn_points
            .iter()
            .position(|sp| sp.enemy_type != EnemyKind::Demon)
            .unwrap();
        d.spawn_points[idx].enemy_type = EnemyKind::Demon;
        let findings = check_spawn_kinds(&d);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(ensure_valid(&d).is_ok());
    }

    #[test]
    fn test_broken_corridor_disconnects() {
        let mut d = dungeon();
        // remove both corridors touching room 2 (2→3 and 1→2)
        d.corridors.remove(2);
        d.corridors.remove(1);
        let errs = errors_only(check_connectivity(&d));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("unreachable"));
    }

    #[test]
    fn test_ring_survives_one_cut() {
        let mut d = dungeon();
        d.corridors.remove(1);
        assert!(check_connectivity(&d).is_empty());
    }
}
