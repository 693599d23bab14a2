/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Player velocity from input (+ gravity)
///   2. Player collision resolution
///   3. For each enemy, in spawn order:
///        a. Patrol triggers from last frame's position (ground loss, world edge)
///        b. Patrol velocity + gravity
///        c. Collision resolution
///        d. Wall-contact trigger from this frame's resolution
///        e. Player contact → game-over on onset
///
/// Both patrol checks in (a) and (d) share one debounce gate, so an enemy
/// reverses at most once per `width` milliseconds however many triggers fire.
/// Enemies never read each other's state.

use crate::config::PhysicsConfig;
use crate::domain::collision::{self, WorldBounds};
use crate::domain::entity::{Directions, Enemy};
use crate::domain::grid::TileGrid;
use crate::domain::patrol::{self, PatrolTrigger};
use super::clock::FrameTime;
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: Directions, time: FrameTime) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_player(world, input, time.dt);
    resolve_enemies(world, time, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, input: Directions, dt: f64) {
    let supported = world.player_supported();
    let physics = &world.physics;
    let player = &mut world.player;

    player.dx = input.horizontal() * physics.move_amount;
    if player.behavior.gravity {
        if input.up && supported {
            player.dy = -physics.jump_velocity;
        }
        player.dy += physics.gravity_accel * dt;
    } else {
        player.dy = input.vertical() * physics.move_amount;
    }

    collision::resolve(player, &world.grid, &world.bounds, dt);
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, time: FrameTime, events: &mut Vec<GameEvent>) {
    let WorldState {
        ref grid, ref bounds, ref player, ref mut enemies, ref physics, ref mut game_over, ..
    } = *world;
    let mut signalled = false;

    enemies.update(|enemy| {
        update_enemy(enemy, grid, bounds, physics, time, events);

        // Game-over fires on overlap onset only, and at most once per frame.
        let touching = enemy.body.overlaps(player);
        if touching && !enemy.touching_player && !signalled {
            signalled = true;
            *game_over = true;
            log::info!("game over: enemy {:?} caught the player", enemy.body.id);
            events.push(GameEvent::GameOver { enemy: enemy.body.id });
        }
        enemy.touching_player = touching;
    });
}

fn update_enemy(
    enemy: &mut Enemy,
    grid: &TileGrid,
    bounds: &WorldBounds,
    physics: &PhysicsConfig,
    time: FrameTime,
    events: &mut Vec<GameEvent>,
) {
    let patrolling = enemy.body.behavior.continuous_movement;

    if patrolling {
        if let Some(trigger) = patrol::pre_move_trigger(&enemy.body, enemy.patrol.facing, grid, bounds) {
            reverse(enemy, trigger, time.now_ms, physics.move_amount, events);
        }
        enemy.body.dx = enemy.patrol.velocity(physics.move_amount);
    }
    if enemy.body.behavior.gravity {
        enemy.body.dy += physics.gravity_accel * time.dt;
    }

    let contact = collision::resolve(&mut enemy.body, grid, bounds, time.dt);

    if patrolling {
        if let Some(trigger) = patrol::post_move_trigger(&contact) {
            reverse(enemy, trigger, time.now_ms, physics.move_amount, events);
        }
    }
}

fn reverse(
    enemy: &mut Enemy,
    trigger: PatrolTrigger,
    now_ms: u64,
    move_amount: f64,
    events: &mut Vec<GameEvent>,
) {
    if patrol::apply_trigger(&mut enemy.patrol, &mut enemy.body, now_ms, move_amount) {
        log::debug!(
            "enemy {:?} reversed ({:?}) now facing {:?}",
            enemy.body.id, trigger, enemy.patrol.facing,
        );
        events.push(GameEvent::EnemyReversed {
            id: enemy.body.id,
            trigger,
            facing: enemy.patrol.facing,
        });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
