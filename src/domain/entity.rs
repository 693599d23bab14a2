/// Entities: Player and Enemy share one body record.
/// Behavior differences live in `Behavior` flags carried as data,
/// so there is no per-kind class state to mutate.

use serde::Deserialize;

use super::patrol::PatrolState;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Enemy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn opposite(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// -1.0 for left, 1.0 for right.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Capability flags.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Behavior {
    /// Vertical velocity accumulates gravity every frame.
    pub gravity: bool,
    /// Clamped into the world rectangle after tile resolution.
    pub stay_in_world: bool,
    /// Patrols on its own instead of reading input.
    pub continuous_movement: bool,
}

impl EntityKind {
    /// Default flags for a kind. `gravity` is a per-level setting.
    pub fn behavior(self, gravity: bool) -> Behavior {
        match self {
            EntityKind::Player => Behavior {
                gravity,
                stay_in_world: true,
                continuous_movement: false,
            },
            EntityKind::Enemy => Behavior {
                gravity,
                stay_in_world: true,
                continuous_movement: true,
            },
        }
    }
}

/// Direction state sampled from the Input collaborator once per frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Directions {
    /// -1, 0 or 1 along x. Opposing keys cancel.
    pub fn horizontal(&self) -> f64 {
        (self.right as i8 - self.left as i8) as f64
    }

    /// -1, 0 or 1 along y (down is positive).
    pub fn vertical(&self) -> f64 {
        (self.down as i8 - self.up as i8) as f64
    }
}

/// Axis-aligned body in world pixels. `(x, y)` is the top-left corner.
/// Velocity is in pixels per second.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dx: f64,
    pub dy: f64,
    pub behavior: Behavior,
}

impl Entity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        x: f64, y: f64,
        width: f64, height: f64,
        behavior: Behavior,
    ) -> Self {
        Entity { id, kind, x, y, width, height, dx: 0.0, dy: 0.0, behavior }
    }

    pub fn left(&self) -> f64 { self.x }
    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn top(&self) -> f64 { self.y }
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Strict bounding-box overlap. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// An enemy: body + patrol state + contact memory for game-over onset.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Entity,
    pub patrol: PatrolState,
    /// Was this enemy overlapping the player at the end of the last frame?
    pub touching_player: bool,
}

impl Enemy {
    pub fn new(body: Entity) -> Self {
        Enemy { body, patrol: PatrolState::new(), touching_player: false }
    }
}
