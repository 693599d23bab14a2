/// WorldState: the complete snapshot of a running level.
///
/// ## Ownership
///
///   - `grid`   : terrain only. Spawn markers were cleared during setup.
///   - `player` : singleton body, owned here.
///   - `enemies`: insertion-ordered; order is spawn order (row-major).
///
/// Renderers get read-only access to all of it. Only `sim::step` mutates
/// bodies, and only `sim::level` rebuilds the whole thing.

use crate::config::PhysicsConfig;
use crate::domain::collection::Collection;
use crate::domain::collision::{self, WorldBounds};
use crate::domain::entity::{Enemy, Entity, EntityId};
use crate::domain::grid::TileGrid;

pub struct WorldState {
    pub level_name: String,
    pub grid: TileGrid,
    pub bounds: WorldBounds,
    pub player: Entity,
    pub enemies: Collection<Enemy>,
    pub physics: PhysicsConfig,
    /// Set once the game-over signal has fired.
    pub game_over: bool,
    pub tick: u64,
}

impl WorldState {
    /// Player rests on terrain or on the world floor.
    pub fn player_supported(&self) -> bool {
        collision::is_grounded(&self.player, &self.grid)
            || (self.player.behavior.stay_in_world && self.bounds.on_floor(&self.player))
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.body.id == id)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::domain::entity::EntityId;
    use crate::sim::level::{load_level, LevelDef};

    fn level(rows: &[&str]) -> LevelDef {
        LevelDef { name: "test".into(), rows: rows.iter().map(|s| s.to_string()).collect() }
    }

    #[test]
    fn enemies_are_found_by_id() {
        let world = load_level(&level(&["E  E"]), &GameConfig::default()).unwrap();
        assert_eq!(world.enemy(EntityId(2)).map(|e| e.body.x), Some(240.0));
        assert!(world.enemy(EntityId(9)).is_none());
    }

    #[test]
    fn world_floor_supports_the_player() {
        let mut world = load_level(&level(&["    "; 5]), &GameConfig::default()).unwrap();
        assert!(!world.player_supported());
        world.player.y = world.bounds.height - world.player.height;
        assert!(world.player_supported());
        world.player.behavior.stay_in_world = false;
        assert!(!world.player_supported());
    }
}
