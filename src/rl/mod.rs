//! Reinforcement-learning wrapper around the simulation
//!
//! `env` adapts the sim to a gym-style reset/step interface with a
//! fixed-size observation; `agent` is a small tabular Q-learner over a
//! discretized version of that observation.

pub mod agent;
pub mod env;

pub use agent::{QConfig, QTable, Trainer};
pub use env::{DinoEnv, Environment, Observation, REWARD_ALIVE, REWARD_DEATH};
