/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Everything a level needs at setup (gravity, sizes, legend, key bindings)
/// comes from here instead of shared mutable state.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::entity::EntityKind;
use crate::domain::grid::{CellSize, Legend, SymbolKind};
use crate::error::ConfigError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub keys: KeyBindings,
    pub legend: Legend,
    pub tick_rate_ms: u64,
    pub level_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Side view (true) or top-down (false).
    pub gravity: bool,
    pub gravity_accel: f64,   // px/s²
    pub move_amount: f64,     // px/s, also the enemy patrol speed
    pub jump_velocity: f64,   // px/s
    pub max_frame_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// World size in pixels; `None` = size of the level grid.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub cell: CellSize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    enemy: TomlEnemy,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    legend: BTreeMap<String, TomlSymbol>,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: bool,
    #[serde(default = "default_gravity_accel")]
    gravity_accel: f64,
    #[serde(default = "default_move_amount")]
    move_amount: f64,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f64,
    #[serde(default = "default_max_frame")]
    max_frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default = "default_cell")]
    cell_width: f64,
    #[serde(default = "default_cell")]
    cell_height: f64,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_player_x")]
    x: f64,
    #[serde(default = "default_player_y")]
    y: f64,
    #[serde(default = "default_player_width")]
    width: f64,
    #[serde(default = "default_player_height")]
    height: f64,
}

#[derive(Deserialize, Debug)]
struct TomlEnemy {
    #[serde(default = "default_cell")]
    width: f64,
    #[serde(default = "default_cell")]
    height: f64,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_up")]
    up: Vec<String>,
    #[serde(default = "default_down")]
    down: Vec<String>,
    #[serde(default = "default_left")]
    left: Vec<String>,
    #[serde(default = "default_right")]
    right: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    level: Option<String>,
}

/// `C = { terrain = "chair" }` or `E = { entity = "enemy" }`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "lowercase")]
enum TomlSymbol {
    Terrain(String),
    Entity(EntityKind),
}

// ── Defaults ──

fn default_gravity() -> bool { true }
fn default_gravity_accel() -> f64 { 1260.0 } // 21 px per frame² at 60fps
fn default_move_amount() -> f64 { 400.0 }
fn default_jump_velocity() -> f64 { 700.0 }
fn default_max_frame() -> u64 { 250 }
fn default_cell() -> f64 { 80.0 }
fn default_player_x() -> f64 { 200.0 }
fn default_player_y() -> f64 { 200.0 }
fn default_player_width() -> f64 { 80.0 }
fn default_player_height() -> f64 { 60.0 }
fn default_tick_rate() -> u64 { 16 }

fn default_up() -> Vec<String> { vec!["up".into(), "w".into()] }
fn default_down() -> Vec<String> { vec!["down".into(), "s".into()] }
fn default_left() -> Vec<String> { vec!["left".into(), "a".into()] }
fn default_right() -> Vec<String> { vec!["right".into(), "d".into()] }

/// Furniture terrain plus player/enemy spawn markers.
pub fn default_legend() -> Legend {
    Legend::new()
        .terrain('L', "table-left")
        .terrain('R', "table-right")
        .terrain('C', "chair")
        .terrain('K', "ibrik")
        .terrain('#', "floor")
        .entity('P', EntityKind::Player)
        .entity('E', EntityKind::Enemy)
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            gravity_accel: default_gravity_accel(),
            move_amount: default_move_amount(),
            jump_velocity: default_jump_velocity(),
            max_frame_ms: default_max_frame(),
        }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            width: None,
            height: None,
            cell_width: default_cell(),
            cell_height: default_cell(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            x: default_player_x(),
            y: default_player_y(),
            width: default_player_width(),
            height: default_player_height(),
        }
    }
}

impl Default for TomlEnemy {
    fn default() -> Self {
        TomlEnemy { width: default_cell(), height: default_cell() }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            up: default_up(),
            down: default_down(),
            left: default_left(),
            right: default_right(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { tick_rate_ms: default_tick_rate(), level: None }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        // An empty document always parses.
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        for dir in &search_dirs {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            match std::fs::read_to_string(&path) {
                Ok(text) => match GameConfig::from_toml_str(&text) {
                    Ok(mut cfg) => {
                        log::info!("loaded {}", path.display());
                        // Relative level paths are relative to the config file.
                        if let Some(level) = cfg.level_path.take() {
                            cfg.level_path = Some(if level.is_absolute() { level } else { dir.join(level) });
                        }
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("{e}; using default settings");
                        return GameConfig::default();
                    }
                },
                Err(e) => log::warn!("could not read {}: {e}", path.display()),
            }
        }
        GameConfig::default()
    }

    /// Parse a config document. Missing sections and keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        let mut extra = Vec::with_capacity(toml_cfg.legend.len());
        for (key, symbol) in &toml_cfg.legend {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(ConfigError::BadLegendKey(key.clone())),
            };
            let kind = match symbol.clone() {
                TomlSymbol::Terrain(name) => SymbolKind::Terrain(name),
                TomlSymbol::Entity(kind) => SymbolKind::Entity(kind),
            };
            extra.push((ch, kind));
        }
        let cfg = GameConfig::from_toml(toml_cfg, &extra);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Every size must be a positive, finite number of pixels.
    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("world.cell_width", self.world.cell.width),
            ("world.cell_height", self.world.cell.height),
            ("player.width", self.player.width),
            ("player.height", self.player.height),
            ("enemy.width", self.enemy.width),
            ("enemy.height", self.enemy.height),
        ];
        let optional = [("world.width", self.world.width), ("world.height", self.world.height)];
        let sizes = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(key, v)| v.map(|value| (key, value))));

        for (key, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { key, value });
            }
        }
        Ok(())
    }

    fn from_toml(t: TomlConfig, extra_legend: &[(char, SymbolKind)]) -> Self {
        let mut legend = default_legend();
        for (ch, kind) in extra_legend {
            legend.insert(*ch, kind.clone());
        }

        GameConfig {
            physics: PhysicsConfig {
                gravity: t.physics.gravity,
                gravity_accel: t.physics.gravity_accel,
                move_amount: t.physics.move_amount,
                jump_velocity: t.physics.jump_velocity,
                max_frame_ms: t.physics.max_frame_ms,
            },
            world: WorldConfig {
                width: t.world.width,
                height: t.world.height,
                cell: CellSize { width: t.world.cell_width, height: t.world.cell_height },
            },
            player: PlayerConfig {
                x: t.player.x,
                y: t.player.y,
                width: t.player.width,
                height: t.player.height,
            },
            enemy: EnemyConfig { width: t.enemy.width, height: t.enemy.height },
            keys: KeyBindings {
                up: t.keys.up,
                down: t.keys.down,
                left: t.keys.left,
                right: t.keys.right,
            },
            legend,
            tick_rate_ms: t.general.tick_rate_ms,
            level_path: t.general.level.map(PathBuf::from),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert!(cfg.physics.gravity);
        assert_eq!(cfg.physics.move_amount, 400.0);
        assert_eq!(cfg.player, PlayerConfig { x: 200.0, y: 200.0, width: 80.0, height: 60.0 });
        assert_eq!(cfg.world.cell, CellSize { width: 80.0, height: 80.0 });
        assert_eq!(cfg.world.width, None);
        assert_eq!(cfg.keys.left, vec!["left".to_string(), "a".to_string()]);
        assert_eq!(cfg.legend.get('E'), Some(&SymbolKind::Entity(EntityKind::Enemy)));
        assert_eq!(cfg.legend.get('C'), Some(&SymbolKind::Terrain("chair".into())));
        assert_eq!(cfg.level_path, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[physics]\ngravity = false\n\n[world]\nwidth = 2000.0\n\n[general]\nlevel = \"levels/one.txt\"\n",
        )
        .unwrap();
        assert!(!cfg.physics.gravity);
        assert_eq!(cfg.physics.jump_velocity, 700.0);
        assert_eq!(cfg.world.width, Some(2000.0));
        assert_eq!(cfg.world.height, None);
        assert_eq!(cfg.level_path, Some(PathBuf::from("levels/one.txt")));
    }

    #[test]
    fn legend_entries_extend_the_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[legend]\nB = { terrain = \"barrel\" }\nG = { entity = \"enemy\" }\n",
        )
        .unwrap();
        assert_eq!(cfg.legend.get('B'), Some(&SymbolKind::Terrain("barrel".into())));
        assert_eq!(cfg.legend.get('G'), Some(&SymbolKind::Entity(EntityKind::Enemy)));
        assert!(cfg.legend.get('L').is_some());
    }

    #[test]
    fn multi_character_legend_key_is_rejected() {
        let err = GameConfig::from_toml_str("[legend]\nAB = { terrain = \"x\" }\n").unwrap_err();
        assert!(matches!(err, ConfigError::BadLegendKey(k) if k == "AB"));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = GameConfig::from_toml_str("[physics\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = GameConfig::from_toml_str(include_str!("../config.toml")).unwrap();
        let defaults = GameConfig::default();
        assert_eq!(cfg.physics, defaults.physics);
        assert_eq!(cfg.player, defaults.player);
        assert_eq!(cfg.keys, defaults.keys);
        assert_eq!(cfg.legend.get('B'), Some(&SymbolKind::Terrain("bench".into())));
    }

    #[test]
    fn sizes_must_be_positive() {
        let err = GameConfig::from_toml_str("[world]\ncell_width = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { key: "world.cell_width", .. }));

        let err = GameConfig::from_toml_str("[enemy]\nheight = -80.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { key: "enemy.height", .. }));

        let err = GameConfig::from_toml_str("[world]\nwidth = nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { key: "world.width", .. }));

        assert!(GameConfig::from_toml_str("[world]\nwidth = 2000.0\n").is_ok());
    }
}
