//! Tabular Q-learning over a discretized observation
//!
//! The observation is bucketed into a small state index and learned with
//! the classic Bellman update. Exploration is epsilon-greedy with a
//! linear decay. Hyperparameters are deliberately plain defaults.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::env::{Environment, Observation};
use crate::consts::GROUND_Y;
use crate::sim::Action;

const ACTION_COUNT: usize = Action::ALL.len();

const AIR_BUCKETS: usize = 3;
const HP_BUCKETS: usize = 4;
const AMMO_BUCKETS: usize = 4;
const DIST_BUCKETS: usize = 6;
const KIND_BUCKETS: usize = 5;

/// Size of the discretized state space
pub const STATE_COUNT: usize =
    AIR_BUCKETS * HP_BUCKETS * AMMO_BUCKETS * DIST_BUCKETS * KIND_BUCKETS;

/// Bucket an observation into a table index
pub fn state_index(obs: &Observation) -> usize {
    // Altitude: grounded, low hop, high in the air
    let air = if obs.dino_y >= GROUND_Y {
        0
    } else if obs.dino_y > 180.0 {
        1
    } else {
        2
    };
    let hp = (obs.hp as usize).min(HP_BUCKETS - 1);
    let ammo = (obs.ammo as usize).min(AMMO_BUCKETS - 1);
    let dist = match obs.obstacle_dist {
        d if d < 40.0 => 0,
        d if d < 80.0 => 1,
        d if d < 140.0 => 2,
        d if d < 220.0 => 3,
        d if d < 320.0 => 4,
        _ => 5,
    };
    let kind = (obs.obstacle_kind as usize).min(KIND_BUCKETS - 1);

    (((air * HP_BUCKETS + hp) * AMMO_BUCKETS + ammo) * DIST_BUCKETS + dist) * KIND_BUCKETS + kind
}

/// Action-value table, one row per discretized state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    q: Vec<[f32; ACTION_COUNT]>,
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

impl QTable {
    pub fn new() -> Self {
        Self {
            q: vec![[0.0; ACTION_COUNT]; STATE_COUNT],
        }
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Greedy action for a state; ties break toward the lowest action index
    pub fn best_action(&self, state: usize) -> Action {
        let row = &self.q[state];
        let mut best = 0;
        for (i, &v) in row.iter().enumerate() {
            if v > row[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// Highest action value for a state
    pub fn max_value(&self, state: usize) -> f32 {
        self.q[state].iter().copied().fold(f32::MIN, f32::max)
    }

    pub fn value(&self, state: usize, action: Action) -> f32 {
        self.q[state][action.index()]
    }

    /// One Bellman backup:
    /// `Q[s,a] += alpha * (reward + gamma * max Q[s',.] - Q[s,a])`
    pub fn update(
        &mut self,
        state: usize,
        action: Action,
        reward: f32,
        next_state: usize,
        alpha: f32,
        gamma: f32,
    ) {
        let target = reward + gamma * self.max_value(next_state);
        let cell = &mut self.q[state][action.index()];
        *cell += alpha * (target - *cell);
    }
}

/// Training hyperparameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QConfig {
    /// Learning rate
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_min: f32,
    /// Linear epsilon decrement per episode
    pub epsilon_decay: f32,
    /// Hard per-episode tick cap (truncation)
    pub max_episode_ticks: u32,
    /// Rolling window used for progress reports and best-table tracking
    pub report_window: usize,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.99,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.001,
            max_episode_ticks: 3000,
            report_window: 500,
        }
    }
}

/// Episode driver: runs epsilon-greedy episodes against an environment
/// and keeps the best table seen on the rolling window.
pub struct Trainer {
    config: QConfig,
    rng: Pcg32,
}

impl Trainer {
    pub fn new(config: QConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Train for the given number of episodes. Episode seeds are drawn
    /// from the trainer's own RNG, so a fixed trainer seed reproduces the
    /// whole run. Returns the table that scored the best rolling average,
    /// not necessarily the final one.
    pub fn train<E>(&mut self, env: &mut E, episodes: u32) -> QTable
    where
        E: Environment<State = Observation, Action = Action>,
    {
        let mut table = QTable::new();
        let mut best = table.clone();
        let mut best_avg = f32::MIN;
        let mut epsilon = self.config.epsilon_start;
        let mut recent: VecDeque<f32> = VecDeque::with_capacity(self.config.report_window);

        for episode in 0..episodes {
            let total = self.run_episode(env, &mut table, epsilon);

            if recent.len() == self.config.report_window {
                recent.pop_front();
            }
            recent.push_back(total);

            if recent.len() == self.config.report_window {
                let avg = recent.iter().sum::<f32>() / recent.len() as f32;
                if avg > best_avg {
                    best_avg = avg;
                    best = table.clone();
                    log::debug!(
                        "new best rolling average {avg:.1} at episode {}",
                        episode + 1
                    );
                }
            }

            if (episode + 1) % 100 == 0 {
                let avg = recent.iter().sum::<f32>() / recent.len().max(1) as f32;
                log::info!(
                    "episode {}/{episodes}, epsilon {epsilon:.3}, rolling reward {avg:.1}",
                    episode + 1
                );
            }

            epsilon = (epsilon - self.config.epsilon_decay).max(self.config.epsilon_min);
        }

        if best_avg == f32::MIN {
            // Never filled the window; the final table is all we have
            best = table;
        }
        best
    }

    /// One learning episode; returns the total reward collected
    fn run_episode<E>(&mut self, env: &mut E, table: &mut QTable, epsilon: f32) -> f32
    where
        E: Environment<State = Observation, Action = Action>,
    {
        let obs = env.reset(Some(self.rng.random()));
        let mut state = state_index(&obs);
        let mut total = 0.0;

        for _ in 0..self.config.max_episode_ticks {
            let action = if self.rng.random::<f32>() < epsilon {
                Action::ALL[self.rng.random_range(0..ACTION_COUNT)]
            } else {
                table.best_action(state)
            };

            let (next_obs, reward, done) = env.step(action);
            let next_state = state_index(&next_obs);
            table.update(
                state,
                action,
                reward,
                next_state,
                self.config.alpha,
                self.config.gamma,
            );

            total += reward;
            state = next_state;
            if done {
                break;
            }
        }

        total
    }

    /// Run greedy episodes with a frozen table; returns the mean total
    /// reward
    pub fn evaluate<E>(&mut self, env: &mut E, table: &QTable, episodes: u32) -> f32
    where
        E: Environment<State = Observation, Action = Action>,
    {
        let mut sum = 0.0;
        for _ in 0..episodes {
            let obs = env.reset(Some(self.rng.random()));
            let mut state = state_index(&obs);
            for _ in 0..self.config.max_episode_ticks {
                let (next_obs, reward, done) = env.step(table.best_action(state));
                sum += reward;
                state = state_index(&next_obs);
                if done {
                    break;
                }
            }
        }
        sum / episodes as f32
    }
}
