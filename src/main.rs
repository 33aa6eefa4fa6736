//! Dino Fighter headless entry point
//!
//! Drives the deterministic sim without a renderer:
//! - `demo [seed]` plays one episode with a scripted heuristic
//! - `train [episodes] [policy-file]` trains a Q-table and saves it
//! - `eval [policy-file] [episodes]` replays a saved policy greedily

use std::path::Path;
use std::process::ExitCode;

use dino_fighter::persistence::{load_qtable, save_qtable};
use dino_fighter::rl::{DinoEnv, Environment, QConfig, Trainer};
use dino_fighter::sim::{Action, ObstacleKind};

const DEFAULT_POLICY_FILE: &str = "dino_policy.json";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("demo") | None => {
            let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
            demo(seed);
            ExitCode::SUCCESS
        }
        Some("train") => {
            let episodes = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(2000);
            let path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_POLICY_FILE);
            train(episodes, Path::new(path))
        }
        Some("eval") => {
            let path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_POLICY_FILE);
            let episodes = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
            eval(Path::new(path), episodes)
        }
        Some(other) => {
            eprintln!("unknown mode `{other}`");
            eprintln!("usage: dino-fighter [demo [seed] | train [episodes] [file] | eval [file] [episodes]]");
            ExitCode::FAILURE
        }
    }
}

/// Scripted policy: jump over ground hazards, shoot at flyers
fn heuristic(env: &DinoEnv) -> Action {
    let state = env.state();
    let Some(obstacle) = state.nearest_obstacle_ahead() else {
        return Action::Idle;
    };
    let gap = obstacle.pos.x - state.dino.pos.x;

    match obstacle.kind {
        ObstacleKind::Cactus if gap < 80.0 && !state.dino.airborne => Action::Jump,
        ObstacleKind::Bird | ObstacleKind::Bat if gap < 200.0 && state.bullets_left() > 0 => {
            Action::Shoot
        }
        // Drift into health packs, drop back down past flyers
        ObstacleKind::HealthPack => Action::Idle,
        _ if state.dino.airborne && gap < 40.0 => Action::Drop,
        _ => Action::Idle,
    }
}

fn demo(seed: u64) {
    log::info!("demo episode, seed {seed}");
    let mut env = DinoEnv::new(seed);
    let mut ticks = 0u64;
    loop {
        let action = heuristic(&env);
        let (_, _, done) = env.step(action);
        ticks += 1;
        if done || ticks >= 100_000 {
            break;
        }
    }
    let state = env.state();
    println!(
        "survived {ticks} ticks, score {}, difficulty x{:.2}",
        state.score,
        state.difficulty()
    );
}

fn train(episodes: u32, path: &Path) -> ExitCode {
    log::info!("training for {episodes} episodes");
    let mut env = DinoEnv::new(0);
    let mut trainer = Trainer::new(QConfig::default(), 42);
    let table = trainer.train(&mut env, episodes);

    let mean = trainer.evaluate(&mut env, &table, 20);
    println!("trained over {episodes} episodes, greedy mean reward {mean:.1}");

    match save_qtable(path, &table) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("failed to save policy: {e}");
            ExitCode::FAILURE
        }
    }
}

fn eval(path: &Path, episodes: u32) -> ExitCode {
    let table = match load_qtable(path) {
        Ok(t) => t,
        Err(e) => {
            log::error!("failed to load policy: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut env = DinoEnv::new(0);
    let mut trainer = Trainer::new(QConfig::default(), 1);
    let mean = trainer.evaluate(&mut env, &table, episodes);
    println!("greedy mean reward over {episodes} episodes: {mean:.1}");
    ExitCode::SUCCESS
}
