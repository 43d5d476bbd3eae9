//! Text output for dungeons: an ASCII floor plan and a statistics report.

use std::collections::BTreeMap;
use std::fmt;

use crate::character::EnemyKind;
use crate::dungeon::{Dungeon, RoomKind, TrapKind};

/// Grid cells per world unit.
const SCALE: f64 = 0.5;
/// Blank cells around the plan on every side.
const MARGIN: i64 = 2;

struct Grid {
    cells: Vec<Vec<char>>,
    width: i64,
    height: i64,
}

impl Grid {
    fn new(width: i64, height: i64) -> Self {
        Self {
            cells: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    fn get(&self, x: i64, z: i64) -> Option<char> {
        if x < 0 || z < 0 || x >= self.width || z >= self.height {
            return None;
        }
        Some(self.cells[z as usize][x as usize])
    }

    fn set(&mut self, x: i64, z: i64, c: char) {
        if self.get(x, z).is_some() {
            self.cells[z as usize][x as usize] = c;
        }
    }

    fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.iter().map(|row| row.iter().collect())
    }
}

/// Render the floor plan as text.
///
/// Legend: `S` spawn room, `B` boss room, `T` treasure room, `#` normal
/// room, `.` corridor, `X` trap, `E` enemy spawn point. Rooms never
/// overwrite each other, traps overwrite anything, spawn points only
/// overwrite blank, corridor, or normal-room cells.
pub fn render_ascii(d: &Dungeon) -> String {
    let Some((min_x, min_z, max_x, max_z)) = d.bounds() else {
        return format!("Dungeon Level {} - (empty)\n", d.level);
    };
    let to_cell = |x: f64, z: f64| {
        (
            ((x - min_x) * SCALE) as i64 + MARGIN,
            ((z - min_z) * SCALE) as i64 + MARGIN,
        )
    };

    let width = ((max_x - min_x) * SCALE) as i64 + MARGIN * 2;
    let height = ((max_z - min_z) * SCALE) as i64 + MARGIN * 2;
    let mut grid = Grid::new(width, height);

    for room in &d.rooms {
        let (rx, rz) = to_cell(room.x, room.z);
        let rw = ((room.width * SCALE) as i64).max(1);
        let rh = ((room.height * SCALE) as i64).max(1);
        let glyph = room.kind.glyph();
        for z in (rz - rh / 2).max(0)..(rz + rh / 2).min(height) {
            for x in (rx - rw / 2).max(0)..(rx + rw / 2).min(width) {
                if grid.get(x, z) == Some(' ') {
                    grid.set(x, z, glyph);
                }
            }
        }
    }

    for c in &d.corridors {
        let (sx, sz) = to_cell(c.start.x, c.start.z);
        let (ex, ez) = to_cell(c.end.x, c.end.z);
        let (dx, dz) = (ex - sx, ez - sz);
        let steps = dx.abs().max(dz.abs());
        if steps == 0 {
            continue;
        }
        for i in 0..=steps {
            let x = (sx as f64 + (dx * i) as f64 / steps as f64) as i64;
            let z = (sz as f64 + (dz * i) as f64 / steps as f64) as i64;
            if grid.get(x, z) == Some(' ') {
                grid.set(x, z, '.');
            }
        }
    }

    for trap in &d.traps {
        let (x, z) = to_cell(trap.position.x, trap.position.z);
        grid.set(x, z, 'X');
    }

    for sp in &d.spawn_points {
        let (x, z) = to_cell(sp.position.x, sp.position.z);
        if matches!(grid.get(x, z), Some(' ' | '.' | '#')) {
            grid.set(x, z, 'E');
        }
    }

    let rule = "=".repeat(width as usize);
    let mut out = vec![
        String::new(),
        rule.clone(),
        format!("Dungeon Level {} - Layout Visualization", d.level),
        rule.clone(),
        String::new(),
        "Legend:".to_string(),
        "  S = Spawn Room (player start)".to_string(),
        "  B = Boss Room".to_string(),
        "  T = Treasure Room".to_string(),
        "  # = Normal Room".to_string(),
        "  . = Corridor".to_string(),
        "  X = Trap".to_string(),
        "  E = Enemy Spawn Point".to_string(),
        String::new(),
        format!(
            "Stats: {} rooms, {} traps, {} spawn points",
            d.metadata.num_rooms, d.metadata.num_traps, d.metadata.num_spawn_points
        ),
        rule.clone(),
        String::new(),
    ];
    out.extend(grid.rows());
    out.push(String::new());
    out.push(rule);
    out.push(String::new());
    out.join("\n")
}

/// Per-kind tallies for a dungeon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonStats {
    pub level: u32,
    pub rooms: BTreeMap<RoomKind, usize>,
    pub traps: BTreeMap<TrapKind, usize>,
    pub enemies: BTreeMap<EnemyKind, usize>,
    pub total_rooms: usize,
    pub total_traps: usize,
    pub total_spawn_points: usize,
    pub corridors: usize,
    pub walls: usize,
}

impl From<&Dungeon> for DungeonStats {
    fn from(d: &Dungeon) -> Self {
        let mut rooms = BTreeMap::new();
        for r in &d.rooms {
            *rooms.entry(r.kind).or_insert(0) += 1;
        }
        let mut traps = BTreeMap::new();
        for t in &d.traps {
            *traps.entry(t.kind).or_insert(0) += 1;
        }
        let mut enemies = BTreeMap::new();
        for sp in &d.spawn_points {
            *enemies.entry(sp.enemy_type).or_insert(0) += 1;
        }
        Self {
            level: d.level,
            rooms,
            traps,
            enemies,
            total_rooms: d.metadata.num_rooms,
            total_traps: d.metadata.num_traps,
            total_spawn_points: d.metadata.num_spawn_points,
            corridors: d.corridors.len(),
            walls: d.walls.len(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_tally<K: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    tally: &BTreeMap<K, usize>,
) -> fmt::Result {
    // sorted by name, not by enum order
    let mut named: Vec<(String, usize)> = tally
        .iter()
        .map(|(k, &n)| (capitalize(&k.to_string()), n))
        .collect();
    named.sort();
    for (name, n) in named {
        writeln!(f, "  {}: {}", name, n)?;
    }
    Ok(())
}

impl fmt::Display for DungeonStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Dungeon Level {} - Statistics", self.level)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "\nRooms:")?;
        writeln!(f, "  Total: {}", self.total_rooms)?;
        write_tally(f, &self.rooms)?;
        writeln!(f, "\nTraps: {}", self.total_traps)?;
        write_tally(f, &self.traps)?;
        writeln!(f, "\nEnemy Spawn Points: {}", self.total_spawn_points)?;
        write_tally(f, &self.enemies)?;
        writeln!(f, "\nCorridors: {}", self.corridors)?;
        writeln!(f, "Walls: {}", self.walls)?;
        writeln!(f, "\n{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{DungeonGenerator, DungeonMetadata, Position, Room, SpawnPoint};
    use crate::rng::GameRng;

    fn dungeon(level: u32) -> Dungeon {
        DungeonGenerator::default().generate(level, &mut GameRng::seeded(7))
    }

    fn grid_rows(text: &str) -> Vec<Vec<char>> {
        text.lines()
            .skip_while(|l| !l.starts_with("Stats:"))
            .skip(3)
            .take_while(|l| !l.is_empty())
            .map(|l| l.chars().collect())
            .collect()
    }

    fn room(id: u32, x: f64, z: f64, size: f64, kind: RoomKind) -> Room {
        Room {
            id,
            x,
            z,
            width: size,
            height: size,
            kind,
        }
    }

    fn spawn_at(room_id: u32, x: f64, z: f64) -> SpawnPoint {
        SpawnPoint {
            id: format!("spawn_{}", room_id),
            room_id,
            position: Position::floor(x, z),
            enemy_type: EnemyKind::Orc,
            cooldown_ms: 30_000,
            last_spawn: 0,
        }
    }

    #[test]
    fn test_ascii_contains_glyphs() {
        let text = render_ascii(&dungeon(6));
        assert!(text.contains("Dungeon Level 6 - Layout Visualization"));
        assert!(text.contains('S'));
        assert!(text.contains('B'));
        assert!(text.contains('.'));
        assert!(text.contains('X'));
    }

    #[test]
    fn test_ascii_rows_have_uniform_width() {
        let d = dungeon(10);
        let text = render_ascii(&d);
        let (min_x, _, max_x, _) = d.bounds().unwrap();
        let width = ((max_x - min_x) * SCALE) as usize + 4;
        let rows = grid_rows(&text);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.len() == width));
    }

    #[test]
    fn test_spawn_points_keep_special_room_glyphs() {
        let rooms = vec![
            room(0, 0.0, 0.0, 15.0, RoomKind::Spawn),
            room(1, 40.0, 0.0, 12.0, RoomKind::Boss),
            room(2, 0.0, 40.0, 12.0, RoomKind::Treasure),
            room(3, 40.0, 40.0, 12.0, RoomKind::Normal),
        ];
        // one spawn point at each room center, plus one on open floor
        let mut spawn_points: Vec<SpawnPoint> =
            rooms.iter().map(|r| spawn_at(r.id, r.x, r.z)).collect();
        spawn_points.push(spawn_at(9, 20.0, 20.0));
        let d = Dungeon {
            level: 1,
            seed: None,
            metadata: DungeonMetadata {
                num_rooms: rooms.len(),
                num_traps: 0,
                num_spawn_points: spawn_points.len(),
            },
            rooms,
            corridors: Vec::new(),
            traps: Vec::new(),
            spawn_points,
            walls: Vec::new(),
        };

        let rows = grid_rows(&render_ascii(&d));
        let (min_x, min_z, _, _) = d.bounds().unwrap();
        let glyph_at = |x: f64, z: f64| {
            let cx = ((x - min_x) * SCALE) as i64 + MARGIN;
            let cz = ((z - min_z) * SCALE) as i64 + MARGIN;
            rows[cz as usize][cx as usize]
        };
        assert_eq!(glyph_at(0.0, 0.0), 'S');
        assert_eq!(glyph_at(40.0, 0.0), 'B');
        assert_eq!(glyph_at(0.0, 40.0), 'T');
        assert_eq!(glyph_at(40.0, 40.0), 'E');
        assert_eq!(glyph_at(20.0, 20.0), 'E');
        assert_eq!(rows.iter().flatten().filter(|&&c| c == 'E').count(), 2);
    }

    #[test]
    fn test_spawn_room_at_grid_center_line() {
        let d = dungeon(1);
        let text = render_ascii(&d);
        // 15-unit spawn room spans 6 cells
        assert!(text.lines().any(|l| l.contains("SSSSSS")));
    }

    #[test]
    fn test_stats_counts() {
        let d = dungeon(8);
        let stats = DungeonStats::from(&d);
        assert_eq!(stats.rooms.values().sum::<usize>(), d.rooms.len());
        assert_eq!(stats.traps.values().sum::<usize>(), d.traps.len());
        assert_eq!(stats.enemies.values().sum::<usize>(), d.spawn_points.len());
        assert_eq!(stats.rooms[&RoomKind::Spawn], 1);
        assert_eq!(stats.enemies[&EnemyKind::Demon], 1);
        assert_eq!(stats.walls, d.rooms.len() * 4);
    }

    #[test]
    fn test_stats_report_text() {
        let report = DungeonStats::from(&dungeon(3)).to_string();
        assert!(report.contains("Dungeon Level 3 - Statistics"));
        assert!(report.contains("  Spawn: 1"));
        assert!(report.contains("  Boss: 1"));
        assert!(report.contains("Corridors: 4"));
        assert!(report.contains("Walls: 16"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("zombie"), "Zombie");
        assert_eq!(capitalize(""), "");
    }
}
