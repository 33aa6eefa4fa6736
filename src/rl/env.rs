//! Gym-style environment adapter
//!
//! Maps the simulation's state to a fixed-size numeric observation and a
//! scalar reward. The adapter never reaches into the sim beyond the
//! read-only snapshot accessors plus `reset`/`advance`.

use crate::sim::{Action, GameState, advance};

/// Reward for surviving one tick
pub const REWARD_ALIVE: f32 = 1.0;
/// Reward on the tick the session ends
pub const REWARD_DEATH: f32 = -10.0;

/// Distance reported when no obstacle is ahead of the dino
pub const NO_OBSTACLE_DIST: f32 = 999.0;

/// A turn-based environment: apply one action, get the next observation,
/// the immediate reward and a done flag.
pub trait Environment {
    type State;
    type Action;

    /// Reinitialize the episode; a fixed seed reproduces it exactly
    fn reset(&mut self, seed: Option<u64>) -> Self::State;

    /// Perform one time/action step
    fn step(&mut self, action: Self::Action) -> (Self::State, f32, bool);

    /// The action that does nothing
    fn no_action(&self) -> Self::Action;
}

/// Fixed-size observation summarizing what the agent can see
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Dino's vertical position (screen coordinates)
    pub dino_y: f32,
    pub hp: f32,
    /// Bullets still available to fire
    pub ammo: f32,
    /// Horizontal gap to the nearest obstacle ahead, [`NO_OBSTACLE_DIST`]
    /// when the field is clear
    pub obstacle_dist: f32,
    /// Kind code of that obstacle, 0 when none
    pub obstacle_kind: f32,
}

impl Observation {
    pub fn encode(state: &GameState) -> Self {
        let (obstacle_dist, obstacle_kind) = match state.nearest_obstacle_ahead() {
            Some(o) => (o.pos.x - state.dino.pos.x, o.kind.code() as f32),
            None => (NO_OBSTACLE_DIST, 0.0),
        };
        Self {
            dino_y: state.dino.pos.y,
            hp: state.dino.hp as f32,
            ammo: state.bullets_left() as f32,
            obstacle_dist,
            obstacle_kind,
        }
    }

    pub fn to_array(self) -> [f32; 5] {
        [
            self.dino_y,
            self.hp,
            self.ammo,
            self.obstacle_dist,
            self.obstacle_kind,
        ]
    }
}

/// The Dino Fighter environment: one sim session driven turn by turn
#[derive(Debug, Clone)]
pub struct DinoEnv {
    state: GameState,
}

impl DinoEnv {
    pub fn new(seed: u64) -> Self {
        let mut state = GameState::new(seed);
        state.start();
        Self { state }
    }

    /// Read-only view of the underlying session, for hosts that render
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }
}

impl Environment for DinoEnv {
    type State = Observation;
    type Action = Action;

    fn reset(&mut self, seed: Option<u64>) -> Observation {
        self.state.reset(seed);
        // Trainers skip the waiting screen
        self.state.start();
        Observation::encode(&self.state)
    }

    fn step(&mut self, action: Action) -> (Observation, f32, bool) {
        let outcome = advance(&mut self.state, action);
        let done = outcome.is_over;
        let reward = if done { REWARD_DEATH } else { REWARD_ALIVE };
        (Observation::encode(&self.state), reward, done)
    }

    fn no_action(&self) -> Action {
        Action::Idle
    }
}
