/// Enemy patrol: two-state direction machine with a debounce gate.
///
/// States: `Facing::Right` (initial) and `Facing::Left`. No idle, no terminal.
///
/// Reversal triggers:
///   1. **LostGround**: gravity-affected, not resting on solid terrain,
///      and not standing on the world floor.
///   2. **HitWall**: the resolver cut horizontal movement short.
///   3. **WorldEdge**: confined to the world and the box has reached the
///      edge it is heading toward.
///
/// Every trigger goes through the same gate: a reversal is accepted only if
/// more than `width` milliseconds (the enemy's own pixel width) have passed
/// since the previous one. This keeps an enemy straddling an edge from
/// flipping every frame.

use super::collision::{self, Contact, WorldBounds};
use super::entity::{Entity, Facing};
use super::grid::TileGrid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PatrolTrigger {
    LostGround,
    HitWall,
    WorldEdge,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatrolState {
    pub facing: Facing,
    /// Clock reading of the last accepted reversal; `None` until the first.
    pub last_reversal_ms: Option<u64>,
}

impl Default for PatrolState {
    fn default() -> Self {
        Self::new()
    }
}

impl PatrolState {
    pub fn new() -> Self {
        PatrolState { facing: Facing::Right, last_reversal_ms: None }
    }

    /// Has the debounce window closed?
    pub fn can_reverse(&self, now_ms: u64, width: f64) -> bool {
        match self.last_reversal_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) as f64 > width,
        }
    }

    /// Flip direction if the gate allows it. Returns whether it flipped.
    pub fn request_reversal(&mut self, now_ms: u64, width: f64) -> bool {
        if !self.can_reverse(now_ms, width) {
            return false;
        }
        self.facing = self.facing.opposite();
        self.last_reversal_ms = Some(now_ms);
        true
    }

    /// Canonical patrol velocity for the current facing.
    pub fn velocity(&self, move_amount: f64) -> f64 {
        self.facing.sign() * move_amount
    }
}

// ── Trigger evaluation ──

/// Triggers read from where the body ended the previous frame.
pub fn pre_move_trigger(
    body: &Entity,
    facing: Facing,
    grid: &TileGrid,
    bounds: &WorldBounds,
) -> Option<PatrolTrigger> {
    if body.behavior.gravity
        && !collision::is_grounded(body, grid)
        && !bounds.on_floor(body)
    {
        return Some(PatrolTrigger::LostGround);
    }
    if body.behavior.stay_in_world && heading_into_edge(body, facing, bounds) {
        return Some(PatrolTrigger::WorldEdge);
    }
    None
}

/// Trigger read from this frame's resolution.
pub fn post_move_trigger(contact: &Contact) -> Option<PatrolTrigger> {
    contact.horizontal().then_some(PatrolTrigger::HitWall)
}

fn heading_into_edge(body: &Entity, facing: Facing, bounds: &WorldBounds) -> bool {
    match facing {
        Facing::Left => body.left() <= collision::EPSILON,
        Facing::Right => body.right() >= bounds.width - collision::EPSILON,
    }
}

/// Route `trigger` through the gate. On acceptance the body's horizontal
/// velocity is reset to the new facing's patrol speed.
pub fn apply_trigger(
    state: &mut PatrolState,
    body: &mut Entity,
    now_ms: u64,
    move_amount: f64,
) -> bool {
    if !state.request_reversal(now_ms, body.width) {
        return false;
    }
    body.dx = state.velocity(move_amount);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{EntityId, EntityKind};
    use crate::domain::grid::{CellSize, Legend};

    fn grid_from(rows: &[&str]) -> TileGrid {
        let legend = Legend::new().terrain('#', "block");
        TileGrid::build(rows, &legend, CellSize { width: 10.0, height: 10.0 }).unwrap().0
    }

    fn enemy_body(x: f64, y: f64) -> Entity {
        Entity::new(EntityId(7), EntityKind::Enemy, x, y, 10.0, 10.0, EntityKind::Enemy.behavior(true))
    }

    #[test]
    fn starts_moving_right_with_open_gate() {
        let s = PatrolState::new();
        assert_eq!(s.facing, Facing::Right);
        assert!(s.can_reverse(0, 80.0));
        assert_eq!(s.velocity(400.0), 400.0);
    }

    #[test]
    fn second_trigger_inside_window_is_ignored() {
        let mut s = PatrolState::new();
        assert!(s.request_reversal(1_000, 80.0));
        assert_eq!(s.facing, Facing::Left);
        assert!(!s.request_reversal(1_050, 80.0));
        assert!(!s.request_reversal(1_080, 80.0)); // not strictly greater
        assert_eq!(s.facing, Facing::Left);
        assert_eq!(s.last_reversal_ms, Some(1_000));
        assert!(s.request_reversal(1_081, 80.0));
        assert_eq!(s.facing, Facing::Right);
    }

    #[test]
    fn flips_toggle_between_two_states() {
        let mut s = PatrolState::new();
        for i in 1..=4u64 {
            assert!(s.request_reversal(i * 1_000, 10.0));
        }
        assert_eq!(s.facing, Facing::Right);
    }

    #[test]
    fn accepted_trigger_resets_velocity() {
        let mut s = PatrolState::new();
        let mut b = enemy_body(0.0, 0.0);
        b.dx = 0.0;
        assert!(apply_trigger(&mut s, &mut b, 500, 400.0));
        assert_eq!(b.dx, -400.0);
        b.dx = 3.0;
        assert!(!apply_trigger(&mut s, &mut b, 505, 400.0));
        assert_eq!(b.dx, 3.0);
    }

    #[test]
    fn airborne_enemy_has_lost_ground() {
        let grid = grid_from(&["   ", "   ", "###"]);
        let world = WorldBounds { width: 30.0, height: 100.0 };
        let b = enemy_body(0.0, 0.0);
        assert_eq!(pre_move_trigger(&b, Facing::Right, &grid, &world), Some(PatrolTrigger::LostGround));
        let standing = enemy_body(0.0, 10.0);
        assert_eq!(pre_move_trigger(&standing, Facing::Right, &grid, &world), None);
    }

    #[test]
    fn world_floor_counts_as_ground() {
        let grid = grid_from(&["   "]);
        let world = WorldBounds { width: 30.0, height: 40.0 };
        let b = enemy_body(10.0, 30.0);
        assert_eq!(pre_move_trigger(&b, Facing::Right, &grid, &world), None);
    }

    #[test]
    fn without_gravity_ground_is_irrelevant() {
        let grid = grid_from(&["   "]);
        let world = WorldBounds { width: 30.0, height: 40.0 };
        let mut b = enemy_body(10.0, 0.0);
        b.behavior.gravity = false;
        assert_eq!(pre_move_trigger(&b, Facing::Right, &grid, &world), None);
    }

    #[test]
    fn world_edge_only_when_heading_into_it() {
        let grid = grid_from(&["   ", "###"]);
        let world = WorldBounds { width: 30.0, height: 20.0 };
        let at_right = enemy_body(20.0, 0.0);
        assert_eq!(pre_move_trigger(&at_right, Facing::Right, &grid, &world), Some(PatrolTrigger::WorldEdge));
        assert_eq!(pre_move_trigger(&at_right, Facing::Left, &grid, &world), None);
        let at_left = enemy_body(0.0, 0.0);
        assert_eq!(pre_move_trigger(&at_left, Facing::Left, &grid, &world), Some(PatrolTrigger::WorldEdge));
    }

    #[test]
    fn horizontal_contact_is_a_wall_hit() {
        let c = Contact { right: true, ..Contact::default() };
        assert_eq!(post_move_trigger(&c), Some(PatrolTrigger::HitWall));
        let landed = Contact { bottom: true, ..Contact::default() };
        assert_eq!(post_move_trigger(&landed), None);
    }
}
