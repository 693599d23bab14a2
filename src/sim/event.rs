/// Events emitted during a simulation step.
/// The frame loop logs them and treats `GameOver` as the game-over signal.

use crate::domain::entity::{EntityId, Facing};
use crate::domain::patrol::PatrolTrigger;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    EnemyReversed { id: EntityId, trigger: PatrolTrigger, facing: Facing },
    /// Player and enemy bounding boxes started overlapping.
    GameOver { enemy: EntityId },
}
