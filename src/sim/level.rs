/// Level loader.
///
/// ## Sources (priority order):
///   1. The file named by `[general] level` in config.toml
///   2. Built-in embedded level
///
/// ## Level file format (`.txt`):
///   Line 1 (optional): `# Level Name` (hash, space, name)
///   Remaining lines: map rows, all the same width
///
/// ## Default legend:
///   'L' / 'R' = table halves     'C' = chair
///   'K' = ibrik                  '#' = floor
///   'P' = Player spawn           'E' = Enemy spawn
///   ' ' = Empty
///
/// Extra symbols come from the `[legend]` table in config.toml.
///
/// ## Setup sequence
///   1. Build the grid (fails on ragged rows / unknown symbols).
///   2. Create the player, at a `P` marker if there is one,
///      otherwise at the configured position.
///   3. For each enemy marker: create the body centered on the cell,
///      add it to the enemy collection, clear the marker.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::collection::Collection;
use crate::domain::collision::{self, WorldBounds};
use crate::domain::entity::{Enemy, Entity, EntityId, EntityKind};
use crate::domain::grid::TileGrid;
use crate::error::LevelError;
use crate::sim::world::WorldState;

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Build a fresh world from a level definition.
pub fn load_level(def: &LevelDef, config: &GameConfig) -> Result<WorldState, LevelError> {
    let (mut grid, spawns) = TileGrid::build(&def.rows, &config.legend, config.world.cell)?;

    let gravity = config.physics.gravity;
    let mut player: Option<Entity> = None;
    let mut enemies = Collection::new();
    let mut next_id = 1;

    for marker in &spawns {
        match marker.kind {
            EntityKind::Player => {
                if player.is_some() {
                    return Err(LevelError::DuplicatePlayer { row: marker.row, col: marker.col });
                }
                let (x, y) = marker.position_for(config.player.width, config.player.height);
                player = Some(Entity::new(
                    EntityId(0), EntityKind::Player,
                    x, y, config.player.width, config.player.height,
                    EntityKind::Player.behavior(gravity),
                ));
            }
            EntityKind::Enemy => {
                let (x, y) = marker.position_for(config.enemy.width, config.enemy.height);
                let body = Entity::new(
                    EntityId(next_id), EntityKind::Enemy,
                    x, y, config.enemy.width, config.enemy.height,
                    EntityKind::Enemy.behavior(gravity),
                );
                next_id += 1;
                enemies.add(Enemy::new(body));
            }
        }
        grid.clear_cell(marker.row, marker.col)?;
    }

    let mut player = player.unwrap_or_else(|| {
        Entity::new(
            EntityId(0), EntityKind::Player,
            config.player.x, config.player.y,
            config.player.width, config.player.height,
            EntityKind::Player.behavior(gravity),
        )
    });

    let bounds = WorldBounds {
        width: config.world.width.unwrap_or_else(|| grid.pixel_width()),
        height: config.world.height.unwrap_or_else(|| grid.pixel_height()),
    };

    // Bodies larger than a cell, or a configured position inside the
    // floor, would otherwise start buried in terrain.
    place(&mut player, &grid, &bounds)?;
    let mut blocked = Ok(());
    enemies.update(|enemy| {
        if blocked.is_ok() {
            blocked = place(&mut enemy.body, &grid, &bounds);
        }
    });
    blocked?;

    log::info!(
        "loaded level {:?}: {}x{} cells, {} enemies, gravity {}",
        def.name, grid.rows(), grid.cols(), enemies.len(),
        if gravity { "on" } else { "off" },
    );

    Ok(WorldState {
        level_name: def.name.clone(),
        grid,
        bounds,
        player,
        enemies,
        physics: config.physics.clone(),
        game_over: false,
        tick: 0,
    })
}

fn place(body: &mut Entity, grid: &TileGrid, bounds: &WorldBounds) -> Result<(), LevelError> {
    let (x, y) = (body.x, body.y);
    if !collision::settle(body, grid, bounds) {
        return Err(LevelError::SpawnBlocked { kind: body.kind, x, y });
    }
    if body.y != y {
        log::debug!("{:?} {:?} moved from y={y} to y={} to clear terrain", body.kind, body.id, body.y);
    }
    Ok(())
}

/// Discard all entities and rebuild the level from its definition.
pub fn restart_level(world: &mut WorldState, def: &LevelDef, config: &GameConfig) -> Result<(), LevelError> {
    *world = load_level(def, config)?;
    Ok(())
}

/// The configured level file, or the embedded level.
pub fn resolve_level(config: &GameConfig) -> Result<LevelDef, LevelError> {
    match &config.level_path {
        Some(path) => load_level_file(path),
        None => Ok(embedded_level()),
    }
}

pub fn load_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fallback = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok(parse_level(&content, &fallback))
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content. Row widths are validated
/// later by `TileGrid::build`, not padded here.
pub fn parse_level(content: &str, fallback_name: &str) -> LevelDef {
    let mut name = String::new();
    let mut rows: Vec<String> = vec![];

    for (i, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if i == 0 && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if name.is_empty() {
        name = fallback_name.to_string();
    }

    LevelDef { name, rows }
}

/// Distinguish `# Level Name` from map rows such as `########` or `#C  E#`.
/// A name line is a hash, a space, then text containing a letter.
fn is_name_line(line: &str) -> bool {
    line.strip_prefix("# ")
        .map_or(false, |name| name.chars().any(|c| c.is_alphabetic()))
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

pub fn embedded_level() -> LevelDef {
    make_embedded("Dining Room", &[
        "                          ",
        "                          ",
        "                          ",
        " C    LRC  K   CLRC E     ",
        "##########################",
    ])
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;
    use crate::sim::clock::FrameTime;
    use crate::error::GridError;

    fn def(rows: &[&str]) -> LevelDef {
        make_embedded("test", rows)
    }

    #[test]
    fn furniture_row_spawns_exactly_one_enemy() {
        let config = GameConfig::default();
        let world = load_level(&def(&[" C    LRC  K   CLRC E     "]), &config).unwrap();
        assert_eq!(world.enemies.len(), 1);
        assert!(world.grid.cell_at(0, 20).unwrap().is_empty());
        assert_eq!(world.grid.cell_at(0, 1).unwrap(), &Tile::Solid("chair".into()));
        assert_eq!(world.grid.cells().filter(|(t, _, _)| t.spawn_kind().is_some()).count(), 0);

        let enemy = world.enemies.iter().next().unwrap();
        // Cell (0, 20) is centered at (1640, 40); enemy is 80x80.
        assert_eq!((enemy.body.x, enemy.body.y), (1600.0, 0.0));
        assert_eq!(enemy.body.id, EntityId(1));
    }

    #[test]
    fn player_defaults_to_configured_position() {
        let config = GameConfig::default();
        let world = load_level(&def(&["    ", "    ", "    ", "    ", "####"]), &config).unwrap();
        assert_eq!((world.player.x, world.player.y), (200.0, 200.0));
        assert_eq!((world.player.width, world.player.height), (80.0, 60.0));
        assert!(world.player.behavior.gravity);
    }

    #[test]
    fn player_marker_overrides_position() {
        let config = GameConfig::default();
        let world = load_level(&def(&["  P ", "####"]), &config).unwrap();
        assert_eq!((world.player.x, world.player.y), (160.0, 10.0));
        assert!(world.grid.cell_at(0, 2).unwrap().is_empty());
    }

    #[test]
    fn two_player_markers_is_an_error() {
        let config = GameConfig::default();
        let err = load_level(&def(&["P  P"]), &config).err().unwrap();
        assert!(matches!(err, LevelError::DuplicatePlayer { row: 0, col: 3 }));
    }

    #[test]
    fn enemies_are_collected_in_row_major_order() {
        let config = GameConfig::default();
        let world = load_level(&def(&["  E ", "E  E"]), &config).unwrap();
        let cells: Vec<_> = world.enemies.iter().map(|e| (e.body.x, e.body.y, e.body.id)).collect();
        assert_eq!(cells, vec![
            (160.0, 0.0, EntityId(1)),
            (0.0, 80.0, EntityId(2)),
            (240.0, 80.0, EntityId(3)),
        ]);
    }

    #[test]
    fn configuration_errors_abort_setup() {
        let config = GameConfig::default();
        let ragged = load_level(&def(&["   ", "  "]), &config).err().unwrap();
        assert!(matches!(ragged, LevelError::Grid(GridError::RaggedRow { .. })));
        let unknown = load_level(&def(&["  Q"]), &config).err().unwrap();
        assert!(matches!(unknown, LevelError::Grid(GridError::UnmappedSymbol { symbol: 'Q', .. })));
    }

    #[test]
    fn gravity_comes_from_config() {
        let mut config = GameConfig::default();
        config.physics.gravity = false;
        let world = load_level(&def(&[" E "]), &config).unwrap();
        assert!(!world.player.behavior.gravity);
        assert!(!world.enemies.iter().next().unwrap().body.behavior.gravity);
    }

    #[test]
    fn world_size_defaults_to_grid() {
        let mut config = GameConfig::default();
        let world = load_level(&def(&["   ", "   "]), &config).unwrap();
        assert_eq!((world.bounds.width, world.bounds.height), (240.0, 160.0));
        config.world.width = Some(2000.0);
        let world = load_level(&def(&["   ", "   "]), &config).unwrap();
        assert_eq!(world.bounds.width, 2000.0);
    }

    #[test]
    fn embedded_level_starts_clean() {
        let config = GameConfig::default();
        let world = load_level(&embedded_level(), &config).unwrap();
        assert_eq!(world.enemies.len(), 1);
        let enemy = world.enemies.iter().next().unwrap();
        assert!(collision::is_grounded(&enemy.body, &world.grid));
        assert!(!collision::overlaps_solid(&world.player, &world.grid));
    }

    #[test]
    fn restart_rebuilds_entities() {
        let config = GameConfig::default();
        let level = embedded_level();
        let mut world = load_level(&level, &config).unwrap();
        world.player.x = 1234.0;
        world.game_over = true;
        restart_level(&mut world, &level, &config).unwrap();
        assert_eq!(world.player.x, 200.0);
        assert!(!world.game_over);
        assert_eq!(world.enemies.len(), 1);
    }

    #[test]
    fn parse_reads_name_and_rows() {
        let level = parse_level("# Kitchen\n C  \n####\n\n", "fallback");
        assert_eq!(level.name, "Kitchen");
        assert_eq!(level.rows, vec![" C  ".to_string(), "####".to_string()]);

        let unnamed = parse_level("####\r\n", "attic");
        assert_eq!(unnamed.name, "attic");
        assert_eq!(unnamed.rows, vec!["####".to_string()]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_level_file(Path::new("/nonexistent/level.txt")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }

    #[test]
    fn shipped_level_loads_with_shipped_legend() {
        let config = GameConfig::from_toml_str(include_str!("../../config.toml")).unwrap();
        let level = parse_level(include_str!("../../levels/kitchen.txt"), "kitchen");
        assert_eq!(level.name, "Kitchen");
        let world = load_level(&level, &config).unwrap();
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.grid.cell_at(1, 6).unwrap(), &Tile::Solid("bench".into()));
        // `P` at row 2, column 2.
        assert_eq!((world.player.x, world.player.y), (160.0, 170.0));
    }

    #[test]
    fn hash_row_with_letters_is_not_a_name() {
        let level = parse_level("#C  E#\n######\n", "arena");
        assert_eq!(level.name, "arena");
        assert_eq!(level.rows, vec!["#C  E#".to_string(), "######".to_string()]);

        let named = parse_level("# Arena 2\n#C  E#\n", "arena");
        assert_eq!(named.name, "Arena 2");
        assert_eq!(named.rows.len(), 1);
    }

    #[test]
    fn configured_player_is_lifted_out_of_the_floor() {
        // Default position (200, 200) puts the 80x60 player below a 240px world.
        let config = GameConfig::default();
        let mut world = load_level(&def(&["     ", "     ", "#####"]), &config).unwrap();
        assert!(!collision::overlaps_solid(&world.player, &world.grid));
        assert_eq!(world.player.bottom(), 160.0);
        assert!(world.player_supported());

        for i in 0..30u64 {
            crate::sim::step::step(&mut world, Default::default(), FrameTime::new(i * 16, 0.016));
            assert!(!collision::overlaps_solid(&world.player, &world.grid));
        }
    }

    #[test]
    fn tall_enemy_is_lifted_onto_the_floor() {
        let mut config = GameConfig::default();
        config.enemy.height = 100.0;
        let mut world = load_level(&def(&["     ", "  E  ", "#####"]), &config).unwrap();
        let body = &world.enemies.iter().next().unwrap().body;
        assert_eq!((body.y, body.bottom()), (60.0, 160.0));
        assert!(!collision::overlaps_solid(body, &world.grid));

        for i in 0..30u64 {
            crate::sim::step::step(&mut world, Default::default(), FrameTime::new(i * 16, 0.016));
            let body = &world.enemies.iter().next().unwrap().body;
            assert!(!collision::overlaps_solid(body, &world.grid));
        }
    }

    #[test]
    fn spawn_without_headroom_is_an_error() {
        let mut config = GameConfig::default();
        config.enemy.height = 200.0;
        let err = load_level(&def(&["  E  ", "#####"]), &config).err().unwrap();
        assert!(matches!(err, LevelError::SpawnBlocked { kind: EntityKind::Enemy, .. }));
    }
}
