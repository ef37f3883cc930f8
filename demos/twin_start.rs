//! Two agents with different start corners share one value table, chosen at
//! random per episode. They do not interact, they only compete for table
//! capacity. After training, both greedy paths are compared and the shorter
//! one is replayed.

use std::{error::Error, thread, time::Duration};

use gridquest::{
    agent::{QTrainer, RolloutOutcome},
    config::Config,
    viz::{self, Update},
    world::{GridWorld, Pos},
};

const RENDER_EVERY: u32 = 50;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        starts: vec![Pos::new(0, 0), Pos::new(0, 9)],
        goal: Pos::new(9, 4),
        obstacles: [
            (4, 0),
            (4, 1),
            (4, 2),
            (4, 3),
            (5, 6),
            (5, 7),
            (5, 8),
            (5, 9),
        ]
        .map(Pos::from)
        .to_vec(),
        traps: vec![Pos::new(9, 0), Pos::new(9, 9)],
        episodes: 2000,
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

    let rollouts = world
        .starts()
        .to_vec()
        .into_iter()
        .map(|start| (start, trainer.replay_from(&world, start)))
        .collect::<Vec<_>>();

    for (start, rollout) in &rollouts {
        log::info!(
            "agent from {start}: {:?}, {} steps, score {}",
            rollout.outcome,
            rollout.path.len() - 1,
            rollout.score
        );
    }

    let (_, best) = rollouts
        .into_iter()
        .min_by_key(|(_, r)| {
            if r.outcome == RolloutOutcome::ReachedGoal {
                r.path.len()
            } else {
                usize::MAX
            }
        })
        .expect("at least one start is configured");

    for &pos in &best.path {
        if tx.send(Update::Step { pos, hint: None }).is_err() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(200));
    }
    let _ = tx.send(Update::Rollout(best));

    handle.join().expect("viz thread panicked")?;
    Ok(())
}
