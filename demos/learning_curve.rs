//! Headless training run that exports per-episode metrics to CSV.

use std::{error::Error, fs};

use gridquest::{
    agent::QTrainer,
    config::Config,
    world::{GridWorld, Pos},
};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        obstacles: [(3, 3), (3, 4), (3, 5), (6, 4), (6, 5), (6, 6)]
            .map(Pos::from)
            .to_vec(),
        traps: vec![Pos::new(5, 5)],
        episodes: 2000,
        ..Default::default()
    };

    let mut world = GridWorld::new(&config)?;
    let mut trainer = QTrainer::new(&config)?;

    fs::create_dir_all("demos/out")?;
    let mut wtr = csv::Writer::from_path("demos/out/learning_curve.csv")?;
    wtr.write_record(["episode", "epsilon", "reward", "steps"])?;

    for episode in 0..config.episodes {
        let epsilon = trainer.epsilon();
        trainer.go(&mut world);

        let row = world.report.take();
        wtr.write_record([
            episode.to_string(),
            format!("{epsilon:.4}"),
            row[0].to_string(),
            row[1].to_string(),
        ])?;
    }
    wtr.flush()?;

    let rollout = trainer.replay(&world);
    println!(
        "replay: {:?} in {} steps, score {}",
        rollout.outcome,
        rollout.path.len() - 1,
        rollout.score
    );

    Ok(())
}
