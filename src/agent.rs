use std::collections::HashSet;

use crate::{
    config::{Config, ConfigError},
    decay,
    exploration::{Choice, EpsilonGreedy},
    table::QTable,
    world::{Action, GridWorld, Pos},
};

const GOAL_SCORE: i32 = 1000;
const TRAP_SCORE: i32 = -50;
const WARP_SCORE: i32 = -5;
const TREASURE_SCORE: i32 = 100;

/// How a greedy rollout ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutOutcome {
    ReachedGoal,
    /// The greedy action was a no-op, the agent cannot make progress
    Stuck,
    /// The next position was already visited, truncated to avoid cycling
    Looped,
    OutOfSteps,
}

/// A greedy trace through the learned table, for display and comparison
///
/// The score is recomputed from replay side effects and never feeds back into
/// the table.
#[derive(Debug, Clone)]
pub struct Rollout {
    pub path: Vec<Pos>,
    pub score: i32,
    pub treasures: Vec<Pos>,
    pub outcome: RolloutOutcome,
}

/// A tabular Q-learning agent over a [`GridWorld`]
///
/// Owns the value table and runs bounded-length training episodes with
/// epsilon greedy action selection and the off-policy temporal-difference
/// update. After training, [`replay_from`](QTrainer::replay_from) extracts
/// the greedy trajectory. With several configured starts, episodes alternate
/// between them at random against this one shared table.
pub struct QTrainer {
    table: QTable,
    exploration: EpsilonGreedy<decay::Geometric>,
    alpha: f32,
    gamma: f32,
    max_steps: u32,
    episode: u32,
}

impl QTrainer {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let schedule =
            decay::Geometric::new(config.epsilon_decay, config.epsilon_start, config.epsilon_min)
                .map_err(ConfigError::Epsilon)?;

        Ok(Self {
            table: QTable::new(config.grid_size),
            exploration: EpsilonGreedy::new(schedule),
            alpha: config.alpha,
            gamma: config.gamma,
            max_steps: config.max_steps,
            episode: 0,
        })
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Epsilon threshold for the upcoming episode
    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon(self.episode)
    }

    fn act(&self, world: &GridWorld, state: Pos) -> Action {
        match self.exploration.choose(self.episode) {
            Choice::Explore => world.random_action(),
            Choice::Exploit => self.table.best_action(state),
        }
    }

    /// Off-policy TD update: the bootstrap term is the max over actions at
    /// the next position, 0 at the terminal goal
    fn learn(&mut self, state: Pos, action: Action, reward: f32, next: Option<Pos>) {
        let q = self.table.get(state, action);
        let max_next = next.map_or(0.0, |pos| self.table.max(pos));
        let target = reward + self.gamma * max_next;
        self.table.set(state, action, q + self.alpha * (target - q));
    }

    /// Run one training episode
    pub fn go(&mut self, world: &mut GridWorld) {
        self.go_traced(world, |_, _| {});
    }

    /// Run one training episode, invoking `on_step` with the agent position
    /// and the current best-action hint after every step
    ///
    /// The observer exists for rendering. It sees every state the plain
    /// [`go`](QTrainer::go) would produce and draws nothing from the RNG, so
    /// tracing an episode never alters the learning trajectory.
    pub fn go_traced(
        &mut self,
        world: &mut GridWorld,
        mut on_step: impl FnMut(Pos, Option<Action>),
    ) {
        if self.episode % 100 == 0 {
            log::info!("episode {}, epsilon {:.3}", self.episode, self.epsilon());
        }

        let mut state = world.reset();
        for _ in 0..self.max_steps {
            let action = self.act(world, state);
            let (next, reward) = world.step(action);
            self.learn(state, action, reward, next);

            let shown = next.unwrap_or(world.goal());
            on_step(shown, Some(self.table.best_action(shown)));

            match next {
                Some(pos) => state = pos,
                None => break,
            }
        }

        self.episode += 1;
    }

    /// Greedy rollout from the world's first start
    pub fn replay(&self, world: &GridWorld) -> Rollout {
        self.replay_from(world, world.starts()[0])
    }

    /// Trace the greedy policy from `start` until the goal, the step budget,
    /// a no-op move, or a revisited position
    ///
    /// A stuck or looped rollout is a valid terminal outcome, reported to the
    /// caller rather than treated as an error.
    pub fn replay_from(&self, world: &GridWorld, start: Pos) -> Rollout {
        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        let mut treasures = Vec::new();
        let mut score = 0;
        let mut outcome = RolloutOutcome::OutOfSteps;
        let mut pos = start;

        for _ in 0..self.max_steps {
            let action = self.table.best_action(pos);
            let moved = world.apply(pos, action);
            let next = world.resolve_teleport(moved);

            if next == pos {
                outcome = RolloutOutcome::Stuck;
                break;
            }
            if !visited.insert(next) {
                outcome = RolloutOutcome::Looped;
                break;
            }
            path.push(next);

            if world.is_warp(moved) {
                score += WARP_SCORE;
                log::debug!("teleported {moved} -> {next}");
            }
            if world.is_trap(next) {
                score += TRAP_SCORE;
                log::warn!("stepped into trap at {next}");
            }
            if world.is_treasure(next) && !treasures.contains(&next) {
                treasures.push(next);
                score += TREASURE_SCORE;
                log::info!("collected treasure at {next}");
            }

            pos = next;
            if pos == world.goal() {
                outcome = RolloutOutcome::ReachedGoal;
                score += GOAL_SCORE;
                break;
            }
        }

        match outcome {
            RolloutOutcome::ReachedGoal => log::info!(
                "goal reached in {} steps, score {score}, {} treasures",
                path.len() - 1,
                treasures.len()
            ),
            RolloutOutcome::Stuck => log::warn!("agent is stuck at {pos}, trajectory incomplete"),
            RolloutOutcome::Looped => log::warn!("cycle detected at {pos}, trajectory truncated"),
            RolloutOutcome::OutOfSteps => log::warn!("step budget exhausted at {pos}"),
        }

        Rollout {
            path,
            score,
            treasures,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train(config: &Config) -> (QTrainer, GridWorld) {
        let mut world = GridWorld::new(config).unwrap();
        let mut trainer = QTrainer::new(config).unwrap();
        for _ in 0..config.episodes {
            trainer.go(&mut world);
        }
        (trainer, world)
    }

    #[test]
    fn update_converges_geometrically() {
        let config = Config::default();
        let mut trainer = QTrainer::new(&config).unwrap();

        // repeated identical self-transition converges toward r / (1 - gamma)
        let state = Pos::new(3, 3);
        let reward = 10.0;
        let target = reward / (1.0 - 0.95);

        let mut gap = (trainer.table.get(state, Action::Up) - target).abs();
        for _ in 0..50 {
            trainer.learn(state, Action::Up, reward, Some(state));
            let next_gap = (trainer.table.get(state, Action::Up) - target).abs();
            assert!(next_gap < gap, "Gap shrinks every update");
            gap = next_gap;
        }
    }

    #[test]
    fn learns_manhattan_optimal_path_on_empty_grid() {
        let config = Config {
            episodes: 3000,
            ..Default::default()
        };
        let (trainer, world) = train(&config);

        let rollout = trainer.replay(&world);
        assert_eq!(rollout.outcome, RolloutOutcome::ReachedGoal);
        assert_eq!(rollout.path.len() - 1, 18, "Manhattan distance on 10x10");
        assert_eq!(rollout.score, GOAL_SCORE);
    }

    #[test]
    fn teleport_on_the_optimal_path_shortens_the_replay() {
        let config = Config {
            episodes: 3000,
            ..Default::default()
        };
        let pair = (Pos::new(0, 1), Pos::new(8, 8));
        let mut world = GridWorld::with_teleports(&config, &[pair]).unwrap();
        let mut trainer = QTrainer::new(&config).unwrap();
        for _ in 0..config.episodes {
            trainer.go(&mut world);
        }

        let rollout = trainer.replay(&world);
        assert_eq!(rollout.outcome, RolloutOutcome::ReachedGoal);
        assert!(
            rollout.path.len() - 1 < 18,
            "Shortcut beats the Manhattan distance, got {} steps",
            rollout.path.len() - 1
        );
        assert_eq!(rollout.score, GOAL_SCORE + WARP_SCORE);
    }

    #[test]
    fn replay_stops_when_greedy_action_is_a_noop() {
        let config = Config::default();
        let world = GridWorld::new(&config).unwrap();
        let trainer = QTrainer::new(&config).unwrap();

        // all-zero table prefers Up, which bumps at the top edge
        let rollout = trainer.replay(&world);
        assert_eq!(rollout.outcome, RolloutOutcome::Stuck);
        assert_eq!(rollout.path, vec![Pos::new(0, 0)]);
    }

    #[test]
    fn replay_truncates_cycles_and_never_repeats_a_position() {
        let config = Config::default();
        let world = GridWorld::new(&config).unwrap();
        let mut trainer = QTrainer::new(&config).unwrap();

        trainer.table.set(Pos::new(0, 0), Action::Right, 5.0);
        trainer.table.set(Pos::new(1, 0), Action::Left, 5.0);

        let rollout = trainer.replay(&world);
        assert_eq!(rollout.outcome, RolloutOutcome::Looped);

        let mut seen = HashSet::new();
        assert!(
            rollout.path.iter().all(|p| seen.insert(*p)),
            "No repeated positions in {:?}",
            rollout.path
        );
    }

    #[test]
    fn replay_scores_traps_and_treasures() {
        let config = Config {
            grid_size: 3,
            starts: vec![Pos::new(0, 0)],
            goal: Pos::new(2, 0),
            traps: vec![Pos::new(1, 0)],
            treasures: vec![Pos::new(1, 1)],
            ..Default::default()
        };
        let world = GridWorld::new(&config).unwrap();
        let mut trainer = QTrainer::new(&config).unwrap();

        // forced route: right through the trap, onto the goal
        trainer.table.set(Pos::new(0, 0), Action::Right, 5.0);
        trainer.table.set(Pos::new(1, 0), Action::Right, 5.0);

        let rollout = trainer.replay(&world);
        assert_eq!(rollout.outcome, RolloutOutcome::ReachedGoal);
        assert_eq!(rollout.score, GOAL_SCORE + TRAP_SCORE);
        assert!(rollout.treasures.is_empty());

        // detour through the treasure instead
        let mut trainer = QTrainer::new(&config).unwrap();
        trainer.table.set(Pos::new(0, 0), Action::Down, 5.0);
        trainer.table.set(Pos::new(0, 1), Action::Right, 5.0);
        trainer.table.set(Pos::new(1, 1), Action::Up, 5.0);

        // (1, 0) is the trap, keep moving right to the goal
        trainer.table.set(Pos::new(1, 0), Action::Right, 5.0);

        let rollout = trainer.replay(&world);
        assert_eq!(rollout.outcome, RolloutOutcome::ReachedGoal);
        assert_eq!(rollout.treasures, vec![Pos::new(1, 1)]);
        assert_eq!(rollout.score, GOAL_SCORE + TREASURE_SCORE + TRAP_SCORE);
    }

    #[test]
    fn shared_table_serves_both_starts() {
        let config = Config {
            grid_size: 6,
            starts: vec![Pos::new(0, 0), Pos::new(5, 0)],
            goal: Pos::new(5, 5),
            episodes: 3000,
            ..Default::default()
        };
        let (trainer, world) = train(&config);

        for &start in world.starts() {
            let rollout = trainer.replay_from(&world, start);
            assert_eq!(
                rollout.outcome,
                RolloutOutcome::ReachedGoal,
                "Start {start} reaches the goal"
            );
        }
    }
}
