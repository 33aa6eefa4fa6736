//! Dino Fighter - a side-scrolling arcade runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `rl`: Gym-style environment wrapper and tabular Q-learning agent
//! - `persistence`: Versioned JSON save/load for trained policies
//!
//! Rendering and real-time input are host concerns; the crate exposes
//! read-only snapshots of the simulation for hosts to draw from.

pub mod persistence;
pub mod rl;
pub mod sim;

pub use rl::{DinoEnv, Environment, QTable};
pub use sim::{Action, GameState, Phase};

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (world units; one unit = one pixel in the
    /// reference renderer)
    pub const ARENA_WIDTH: f32 = 700.0;
    pub const ARENA_HEIGHT: f32 = 350.0;

    /// Ground line. Screen coordinates: y grows downward, so "up" is
    /// negative velocity.
    pub const GROUND_Y: f32 = 250.0;

    /// Obstacles are culled once they scroll past this x
    pub const LEFT_CULL_X: f32 = -50.0;

    /// Dino defaults
    pub const DINO_X: f32 = 50.0;
    pub const DINO_W: f32 = 40.0;
    pub const DINO_H: f32 = 40.0;
    pub const DINO_MAX_HP: u8 = 3;
    /// Downward acceleration per tick while airborne
    pub const GRAVITY: f32 = 2.0;
    /// Velocity set on jump (negative = upward)
    pub const JUMP_IMPULSE: f32 = -25.0;
    /// Velocity set on fast drop
    pub const DROP_VELOCITY: f32 = 20.0;
    /// Ticks of damage immunity after taking a hit
    pub const INVINCIBILITY_TICKS: u32 = 45;

    /// Bullet defaults
    pub const BULLET_W: f32 = 15.0;
    pub const BULLET_H: f32 = 6.0;
    pub const BULLET_SPEED: f32 = 15.0;
    /// Vertical offset of the muzzle below the dino's top edge
    pub const MUZZLE_OFFSET_Y: f32 = 15.0;
    /// Maximum simultaneously live bullets
    pub const MAX_BULLETS: usize = 3;

    /// Chance a spawn roll produces an obstacle once the timer is due
    pub const SPAWN_CHANCE: f64 = 0.6;
    /// Random x-jitter added to the spawn edge
    pub const SPAWN_JITTER_MAX: f32 = 50.0;

    /// Score awarded for shooting down a shootable obstacle
    pub const SHOOT_DOWN_SCORE: u64 = 5;

    /// Maximum particles kept alive at once
    pub const MAX_PARTICLES: usize = 256;
}
