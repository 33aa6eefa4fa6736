//! Game state and core simulation types
//!
//! All state that must be persisted for replay/determinism lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Player action for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    /// Keep running, do nothing special
    #[default]
    Idle,
    /// Launch upward (ignored while airborne)
    Jump,
    /// Fire a bullet from the muzzle (ignored at the bullet cap)
    Shoot,
    /// Slam back toward the ground (ignored while grounded)
    Drop,
}

impl Action {
    /// All actions, indexable by the RL agent
    pub const ALL: [Action; 4] = [Action::Idle, Action::Jump, Action::Shoot, Action::Drop];

    /// Stable numeric code (RL action space index)
    pub fn index(self) -> usize {
        match self {
            Action::Idle => 0,
            Action::Jump => 1,
            Action::Shoot => 2,
            Action::Drop => 3,
        }
    }
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen; sim ignores ticks until a start signal
    Waiting,
    /// Active gameplay
    Running,
    /// Dino is out of hit points; terminal until restart
    Over,
}

/// The player-controlled dinosaur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dino {
    pub pos: Vec2,
    /// Vertical velocity; positive is downward (screen coordinates)
    pub vel_y: f32,
    pub airborne: bool,
    pub(crate) hp: u8,
    pub(crate) invincibility: u32,
}

impl Default for Dino {
    fn default() -> Self {
        Self {
            pos: Vec2::new(DINO_X, GROUND_Y),
            vel_y: 0.0,
            airborne: false,
            hp: DINO_MAX_HP,
            invincibility: 0,
        }
    }
}

impl Dino {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(DINO_W, DINO_H))
    }

    /// Current hit points; mutation goes through `take_damage`/`heal` only
    pub fn hp(&self) -> u8 {
        self.hp
    }

    /// Ticks of damage immunity remaining
    pub fn invincibility(&self) -> u32 {
        self.invincibility
    }

    /// Set the launch impulse; no double-jumps
    pub fn jump(&mut self) {
        if !self.airborne {
            self.vel_y = JUMP_IMPULSE;
        }
    }

    /// Slam downward; only meaningful mid-air
    pub fn fast_drop(&mut self) {
        if self.airborne {
            self.vel_y = DROP_VELOCITY;
        }
    }

    /// Integrate one tick of vertical motion and count down immunity
    pub fn integrate(&mut self) {
        self.pos.y += self.vel_y;
        if self.pos.y < GROUND_Y {
            self.vel_y += GRAVITY;
            self.airborne = true;
        } else {
            self.pos.y = GROUND_Y;
            self.vel_y = 0.0;
            self.airborne = false;
        }

        if self.invincibility > 0 {
            self.invincibility -= 1;
        }
    }

    /// Damage contract: one point of damage, only outside the immunity
    /// window. Returns whether damage was applied.
    pub fn take_damage(&mut self) -> bool {
        if self.invincibility == 0 {
            self.hp = self.hp.saturating_sub(1);
            self.invincibility = INVINCIBILITY_TICKS;
            true
        } else {
            false
        }
    }

    /// Heal one point, capped at max. Returns whether anything healed.
    pub fn heal(&mut self) -> bool {
        if self.hp < DINO_MAX_HP {
            self.hp += 1;
            true
        } else {
            false
        }
    }
}

/// Closed set of obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Ground hazard; absorbs bullets without dying (a shield)
    Cactus,
    /// Mid-altitude flyer
    Bird,
    /// Fast low flyer
    Bat,
    /// Touch to consume; heals one HP when below max
    HealthPack,
}

impl ObstacleKind {
    /// Per-kind movement/collision parameters: (width, height, base speed,
    /// shootable). The single dispatch point for kind behavior.
    pub fn params(self) -> (f32, f32, f32, bool) {
        match self {
            ObstacleKind::Cactus => (25.0, 45.0, 7.0, false),
            ObstacleKind::Bird => (35.0, 25.0, 9.0, true),
            ObstacleKind::Bat => (30.0, 20.0, 11.0, true),
            ObstacleKind::HealthPack => (30.0, 30.0, 9.0, false),
        }
    }

    pub fn shootable(self) -> bool {
        self.params().3
    }

    /// Stable numeric code for the RL observation (0 is reserved for
    /// "no obstacle ahead")
    pub fn code(self) -> u8 {
        match self {
            ObstacleKind::HealthPack => 1,
            ObstacleKind::Cactus => 2,
            ObstacleKind::Bird => 3,
            ObstacleKind::Bat => 4,
        }
    }
}

/// A scrolling obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Base leftward speed, scaled by the difficulty multiplier each tick
    pub speed: f32,
}

impl Obstacle {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A fired bullet, travelling rightward at fixed speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
}

impl Bullet {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(BULLET_W, BULLET_H))
    }
}

/// A particle for visual effects (not gameplay-affecting, but drawn from
/// the session RNG so replays look identical too)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks of life remaining
    pub life: u32,
    pub size: f32,
    /// Kind code for color lookup in the renderer
    pub tint: u8,
}

/// Side effects of a tick, drained by the host for sound and screen juice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A shootable obstacle was destroyed by a bullet
    ObstacleShot { kind: ObstacleKind, at: Vec2 },
    /// A bullet was absorbed by a non-shootable obstacle
    ShotBlocked { at: Vec2 },
    /// The dino took a point of damage
    DinoHurt { at: Vec2 },
    /// A health pack was consumed and actually healed
    Healed { at: Vec2 },
    /// Hit points reached zero this tick
    GameOver,
}

fn detached_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Session RNG; every random draw in the sim goes through here.
    /// Not serialized: a restored snapshot must be reseeded via `reset`.
    #[serde(skip, default = "detached_rng")]
    pub(crate) rng: Pcg32,
    pub phase: Phase,
    /// Ticks advanced since the last reset
    pub time_ticks: u64,
    pub score: u64,
    /// Accumulates one per tick; spawn happens when it exceeds the current
    /// spawn interval, carrying the remainder
    pub spawn_timer: u32,
    pub dino: Dino,
    /// Obstacles in spawn order (collision resolution depends on it)
    pub obstacles: Vec<Obstacle>,
    /// Live bullets in fire order
    pub bullets: Vec<Bullet>,
    /// Visual particles
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Events emitted by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh session in `Waiting`
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Waiting,
            time_ticks: 0,
            score: 0,
            spawn_timer: 0,
            dino: Dino::default(),
            obstacles: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Reinitialize every entity container and counter. `None` keeps the
    /// current seed, so `reset(None)` replays the same session.
    pub fn reset(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or(self.seed);
        *self = Self::new(seed);
    }

    /// Leave the title screen
    pub fn start(&mut self) {
        if self.phase == Phase::Waiting {
            self.phase = Phase::Running;
        }
    }

    /// Restart after a game over: full reset straight into `Running`
    pub fn restart(&mut self) {
        self.reset(None);
        self.phase = Phase::Running;
    }

    /// Difficulty multiplier applied to all obstacle speeds; pure function
    /// of score
    pub fn difficulty(&self) -> f32 {
        1.0 + self.score as f32 / 600.0
    }

    /// Ticks between spawn attempts, shrinking with score down to a floor
    pub fn spawn_interval(&self) -> u32 {
        ((60 - (self.score / 15) as i64).max(20)) as u32
    }

    /// Bullets still available to fire
    pub fn bullets_left(&self) -> usize {
        MAX_BULLETS - self.bullets.len()
    }

    /// Nearest obstacle whose leading edge is ahead of the dino, if any
    pub fn nearest_obstacle_ahead(&self) -> Option<&Obstacle> {
        self.obstacles
            .iter()
            .filter(|o| o.pos.x > self.dino.pos.x)
            .min_by(|a, b| {
                a.pos
                    .x
                    .partial_cmp(&b.pos.x)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
