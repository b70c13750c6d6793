use std::{error::Error, fs, path::Path};

use boost_rl::{
    algo::{QTableAgent, QTableAgentConfig},
    env::DiscreteActionSpace,
    gym::BoostGame,
    trainer::{Trainer, TrainerConfig},
};

const NUM_EPISODES: u32 = 100;
const TOTAL_STEPS: u32 = 20;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/out");
    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(0);

    let env = BoostGame::seeded(TOTAL_STEPS, seed)?;
    let agent_config = QTableAgentConfig {
        actions: env.actions(),
        ..Default::default()
    };
    let agent = QTableAgent::seeded(agent_config, seed.wrapping_add(1))?;
    let config = TrainerConfig {
        episodes: NUM_EPISODES,
        epsilon_decay: 0.99,
    };
    let mut trainer = Trainer::new(env, agent, config)?;

    println!("Starting RL agent training...");
    let report = trainer.train()?;

    fs::create_dir_all(path)?;
    let mut wtr = csv::Writer::from_path(path.join("episodes.csv"))?;
    wtr.write_record(["episode", "steps", "total_reward", "epsilon"])?;
    for e in &report.episodes {
        println!(
            "Episode {} finished with total reward: {} and epsilon: {:.3}",
            e.episode, e.total_reward, e.epsilon
        );
        wtr.write_record(&[
            e.episode.to_string(),
            e.steps.to_string(),
            e.total_reward.to_string(),
            e.epsilon.to_string(),
        ])?;
    }
    wtr.flush()?;

    println!("Training completed. Learned Q-Table:");
    print!("{}", trainer.agent().table_report());
    println!("RL training done.");

    Ok(())
}
