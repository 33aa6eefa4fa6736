//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One discrete tick per `advance` call
//! - Seeded RNG only
//! - Stable iteration order (spawn order for obstacles, fire order for bullets)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use state::{
    Action, Bullet, Dino, GameEvent, GameState, Obstacle, ObstacleKind, Particle, Phase,
};
pub use tick::{StepOutcome, advance};
