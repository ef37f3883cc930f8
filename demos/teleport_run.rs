//! A sparser world with two randomly placed teleport pairs. Watch the agent
//! learn whether a shortcut is worth the pad penalty.

use std::{error::Error, thread, time::Duration};

use gridquest::{
    agent::QTrainer,
    config::Config,
    viz::{self, Update},
    world::{GridWorld, Pos},
};

const RENDER_EVERY: u32 = 50;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        starts: vec![Pos::new(0, 0)],
        goal: Pos::new(9, 9),
        obstacles: [
            (2, 2),
            (2, 3),
            (2, 4),
            (5, 4),
            (5, 5),
            (6, 5),
            (7, 2),
            (7, 3),
            (3, 7),
            (4, 7),
        ]
        .map(Pos::from)
        .to_vec(),
        traps: vec![Pos::new(9, 0), Pos::new(0, 9)],
        teleport_pairs: 2,
        episodes: 1500,
        ..Default::default()
    };

    let mut world = GridWorld::new(&config)?;
    let mut trainer = QTrainer::new(&config)?;

    let (handle, tx) = viz::init(world.layout(), world.report.keys(), config.episodes);

    for episode in 0..config.episodes {
        let epsilon = trainer.epsilon();

        if episode % RENDER_EVERY == 0 {
            trainer.go_traced(&mut world, |pos, hint| {
                let _ = tx.send(Update::Step { pos, hint });
            });
        } else {
            trainer.go(&mut world);
        }

        let data = world.report.take();
        let update = Update::Episode {
            episode,
            epsilon,
            data,
        };
        if tx.send(update).is_err() {
            return Ok(());
        }
    }

    let rollout = trainer.replay(&world);
    for &pos in &rollout.path {
        if tx.send(Update::Step { pos, hint: None }).is_err() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(200));
    }
    let _ = tx.send(Update::Rollout(rollout));

    handle.join().expect("viz thread panicked")?;
    Ok(())
}
