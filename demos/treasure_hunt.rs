//! The classic 10x10 world: a wall maze, three traps, two treasure cells,
//! and a goal in the far corner.

use std::{error::Error, thread, time::Duration};

use gridquest::{
    agent::QTrainer,
    config::Config,
    viz::{self, Update},
    world::{GridWorld, Pos},
};

const RENDER_EVERY: u32 = 50;

const OBSTACLES: [(i32, i32); 39] = [
    (0, 1),
    (1, 1),
    (2, 1),
    (4, 1),
    (5, 1),
    (7, 1),
    (8, 1),
    (9, 1),
    (2, 3),
    (1, 3),
    (2, 2),
    (0, 5),
    (1, 5),
    (2, 5),
    (0, 7),
    (0, 6),
    (1, 7),
    (1, 8),
    (3, 5),
    (4, 3),
    (5, 3),
    (6, 3),
    (4, 4),
    (6, 5),
    (5, 6),
    (4, 7),
    (3, 8),
    (3, 9),
    (8, 6),
    (8, 2),
    (9, 6),
    (5, 8),
    (4, 8),
    (7, 8),
    (5, 0),
    (8, 7),
    (7, 7),
    (8, 3),
    (8, 4),
];

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        starts: vec![Pos::new(0, 0)],
        goal: Pos::new(9, 9),
        obstacles: OBSTACLES.iter().copied().map(Pos::from).collect(),
        traps: vec![Pos::new(0, 9), Pos::new(9, 0), Pos::new(4, 9)],
        treasures: vec![Pos::new(8, 8), Pos::new(2, 6)],
        ..Default::default()
    };

    let mut world = GridWorld::new(&config)?;
    let mut trainer = QTrainer::new(&config)?;

    let (handle, tx) = viz::init(world.layout(), world.report.keys(), config.episodes);

    for episode in 0..config.episodes {
        let epsilon = trainer.epsilon();

        // render only every Nth episode to keep training fast
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
            // viz quit, abort the run
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
