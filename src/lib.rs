/// Tile Patrol: per-frame collision and patrol simulation for a 2D
/// tile platformer. Rendering and asset handling live elsewhere; this
/// crate owns the grid, the bodies, and the rules that move them.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;
pub mod ui;
