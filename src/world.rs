use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use rand::{seq::IteratorRandom, seq::SliceRandom, thread_rng, Rng};
use strum::{EnumIter, IntoEnumIterator, VariantArray};

use crate::{
    config::{Config, ConfigError},
    report::Report,
};

/// Grid coordinates, `x` to the right and `y` downward
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four movement directions
///
/// Discriminants index the value table, and the variant order is the
/// tie-break order for greedy action selection.
#[derive(EnumIter, VariantArray, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }
}

const GOAL_BASE: f32 = 1000.0;
const TREASURE_BASE: f32 = 100.0;
const TREASURE_STEP_COST: f32 = 0.5;
const WARP_PENALTY: f32 = -5.0;
const TRAP_PENALTY: f32 = -500.0;
const OBSTACLE_PENALTY: f32 = -100.0;
const STEP_COST: f32 = -1.0;

/// Total rejection samples allowed while placing teleport pairs
const TELEPORT_SAMPLE_BUDGET: u32 = 10_000;

/// Static layout snapshot handed to a renderer
#[derive(Debug, Clone)]
pub struct WorldLayout {
    pub size: usize,
    pub starts: Vec<Pos>,
    pub goal: Pos,
    pub obstacles: Vec<Pos>,
    pub traps: Vec<Pos>,
    pub treasures: Vec<Pos>,
    pub teleports: Vec<(Pos, Pos)>,
}

/// A fixed grid world with obstacles, traps, a goal, and optional treasure
/// cells and teleport pairs
///
/// The layout is immutable for the lifetime of a run. The struct also tracks
/// one agent's episode state (`pos`, step count) and a [`Report`] of
/// per-episode metrics.
pub struct GridWorld {
    size: usize,
    starts: Vec<Pos>,
    goal: Pos,
    obstacles: HashSet<Pos>,
    traps: HashSet<Pos>,
    treasures: HashSet<Pos>,
    /// Both directions of every teleport pair
    warps: HashMap<Pos, Pos>,
    pairs: Vec<(Pos, Pos)>,
    pos: Pos,
    steps: u32,
    pub report: Report,
}

impl GridWorld {
    /// Build a world from a validated config, placing the requested number of
    /// teleport pairs by bounded rejection sampling
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let reserved = reserved_cells(config);
        let free = config.grid_size.pow(2) - reserved.len();
        if free < config.teleport_pairs * 2 {
            return Err(ConfigError::TeleportSpace {
                pairs: config.teleport_pairs,
                free,
            });
        }

        let pairs = sample_teleports(config, &reserved)?;
        Ok(Self::assemble(config, pairs))
    }

    /// Build a world with explicitly placed teleport pairs instead of random
    /// ones
    pub fn with_teleports(config: &Config, pairs: &[(Pos, Pos)]) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut taken = reserved_cells(config);
        for &(a, b) in pairs {
            for pos in [a, b] {
                if !config.in_bounds(pos) || !taken.insert(pos) {
                    return Err(ConfigError::TeleportCell { pos });
                }
            }
        }

        Ok(Self::assemble(config, pairs.to_vec()))
    }

    fn assemble(config: &Config, pairs: Vec<(Pos, Pos)>) -> Self {
        let mut warps = HashMap::with_capacity(pairs.len() * 2);
        for &(a, b) in &pairs {
            warps.insert(a, b);
            warps.insert(b, a);
            log::info!("teleport pair {a} <-> {b}");
        }

        Self {
            size: config.grid_size,
            starts: config.starts.clone(),
            goal: config.goal,
            obstacles: config.obstacles.iter().copied().collect(),
            traps: config.traps.iter().copied().collect(),
            treasures: config.treasures.iter().copied().collect(),
            warps,
            pairs,
            pos: config.starts[0],
            steps: 0,
            report: Report::new(vec!["reward", "steps"]),
        }
    }

    /// True iff `pos` is inside the grid and not an obstacle
    pub fn is_valid(&self, pos: Pos) -> bool {
        let size = self.size as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size && !self.obstacles.contains(&pos)
    }

    /// Apply an action's displacement, bumping in place if the destination is
    /// off-grid or an obstacle
    pub fn apply(&self, pos: Pos, action: Action) -> Pos {
        let (dx, dy) = action.delta();
        let next = Pos::new(pos.x + dx, pos.y + dy);
        if self.is_valid(next) {
            next
        } else {
            pos
        }
    }

    /// Swap to the paired endpoint if `pos` is half of a teleport pair
    pub fn resolve_teleport(&self, pos: Pos) -> Pos {
        self.warps.get(&pos).copied().unwrap_or(pos)
    }

    /// Reward for standing on `pos` after `steps` completed steps
    ///
    /// Evaluated on post-teleport positions. The goal reward shrinks with
    /// trajectory length and may go negative for very long episodes.
    pub fn reward_at(&self, pos: Pos, steps: u32) -> f32 {
        if pos == self.goal {
            GOAL_BASE - steps as f32
        } else if self.treasures.contains(&pos) {
            TREASURE_BASE - TREASURE_STEP_COST * steps as f32
        } else if self.warps.contains_key(&pos) {
            WARP_PENALTY
        } else if self.traps.contains(&pos) {
            TRAP_PENALTY
        } else if self.obstacles.contains(&pos) {
            // unreachable after apply(), kept as a defensive case
            OBSTACLE_PENALTY
        } else {
            STEP_COST
        }
    }

    /// Start a fresh episode from one of the configured starts
    pub fn reset(&mut self) -> Pos {
        self.pos = *self
            .starts
            .choose(&mut thread_rng())
            .expect("config guarantees at least one start");
        self.steps = 0;
        self.pos
    }

    /// Move the agent, resolving teleports and computing the reward
    ///
    /// **Returns** `(next_state, reward)`, with `None` once the goal is
    /// reached
    pub fn step(&mut self, action: Action) -> (Option<Pos>, f32) {
        let next = self.resolve_teleport(self.apply(self.pos, action));
        let reward = self.reward_at(next, self.steps);
        self.steps += 1;
        self.pos = next;

        self.report.add("steps", 1.0);
        self.report.add("reward", reward as f64);

        if next == self.goal {
            (None, reward)
        } else {
            (Some(next), reward)
        }
    }

    pub fn random_action(&self) -> Action {
        Action::iter()
            .choose(&mut thread_rng())
            .expect("there is always at least one action")
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn starts(&self) -> &[Pos] {
        &self.starts
    }

    pub fn is_trap(&self, pos: Pos) -> bool {
        self.traps.contains(&pos)
    }

    pub fn is_treasure(&self, pos: Pos) -> bool {
        self.treasures.contains(&pos)
    }

    pub fn is_warp(&self, pos: Pos) -> bool {
        self.warps.contains_key(&pos)
    }

    /// Snapshot of the static layout for the renderer collaborator
    pub fn layout(&self) -> WorldLayout {
        WorldLayout {
            size: self.size,
            starts: self.starts.clone(),
            goal: self.goal,
            obstacles: self.obstacles.iter().copied().collect(),
            traps: self.traps.iter().copied().collect(),
            treasures: self.treasures.iter().copied().collect(),
            teleports: self.pairs.clone(),
        }
    }
}

/// Cells that teleport pads may not occupy
fn reserved_cells(config: &Config) -> HashSet<Pos> {
    config
        .starts
        .iter()
        .chain([&config.goal])
        .chain(&config.obstacles)
        .chain(&config.traps)
        .chain(&config.treasures)
        .copied()
        .collect()
}

fn sample_teleports(
    config: &Config,
    reserved: &HashSet<Pos>,
) -> Result<Vec<(Pos, Pos)>, ConfigError> {
    let mut rng = thread_rng();
    let mut taken = reserved.clone();
    let mut attempts = 0;
    let mut pairs = Vec::with_capacity(config.teleport_pairs);

    while pairs.len() < config.teleport_pairs {
        let a = sample_free(&mut rng, config.grid_size, &taken, &mut attempts)?;
        taken.insert(a);
        let b = sample_free(&mut rng, config.grid_size, &taken, &mut attempts)?;
        taken.insert(b);
        pairs.push((a, b));
    }

    Ok(pairs)
}

fn sample_free(
    rng: &mut impl Rng,
    size: usize,
    taken: &HashSet<Pos>,
    attempts: &mut u32,
) -> Result<Pos, ConfigError> {
    loop {
        if *attempts >= TELEPORT_SAMPLE_BUDGET {
            return Err(ConfigError::TeleportPlacement {
                attempts: TELEPORT_SAMPLE_BUDGET,
            });
        }
        *attempts += 1;

        let pos = Pos::new(rng.gen_range(0..size as i32), rng.gen_range(0..size as i32));
        if !taken.contains(&pos) {
            return Ok(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        Config {
            grid_size: 4,
            starts: vec![Pos::new(0, 0)],
            goal: Pos::new(3, 3),
            obstacles: vec![Pos::new(1, 0), Pos::new(2, 2)],
            ..Default::default()
        }
    }

    #[test]
    fn apply_never_leaves_valid_cells() {
        let world = GridWorld::new(&small_config()).unwrap();

        for x in 0..4 {
            for y in 0..4 {
                let pos = Pos::new(x, y);
                if !world.is_valid(pos) {
                    continue;
                }
                for action in Action::iter() {
                    let next = world.apply(pos, action);
                    assert!(world.is_valid(next), "{pos} + {action:?} -> {next}");
                }
            }
        }
    }

    #[test]
    fn apply_bumps_in_place() {
        let world = GridWorld::new(&small_config()).unwrap();

        let origin = Pos::new(0, 0);
        assert_eq!(world.apply(origin, Action::Up), origin, "Off-grid bump");
        assert_eq!(
            world.apply(origin, Action::Right),
            origin,
            "Obstacle at (1, 0) bump"
        );
        assert_eq!(
            world.apply(origin, Action::Down),
            Pos::new(0, 1),
            "Open cell move"
        );
    }

    #[test]
    fn teleport_is_involutive() {
        let pair = (Pos::new(1, 1), Pos::new(3, 0));
        let world = GridWorld::with_teleports(&small_config(), &[pair]).unwrap();

        assert_eq!(world.resolve_teleport(pair.0), pair.1);
        assert_eq!(world.resolve_teleport(pair.1), pair.0);
        assert_eq!(
            world.resolve_teleport(Pos::new(0, 2)),
            Pos::new(0, 2),
            "Non-pad cells resolve to themselves"
        );
    }

    #[test]
    fn teleport_endpoints_must_be_free_and_distinct() {
        let config = small_config();

        let on_obstacle = [(Pos::new(1, 0), Pos::new(0, 2))];
        assert!(matches!(
            GridWorld::with_teleports(&config, &on_obstacle),
            Err(ConfigError::TeleportCell { .. })
        ));

        let shared = [
            (Pos::new(0, 2), Pos::new(1, 2)),
            (Pos::new(1, 2), Pos::new(0, 3)),
        ];
        assert!(matches!(
            GridWorld::with_teleports(&config, &shared),
            Err(ConfigError::TeleportCell { .. })
        ));
    }

    #[test]
    fn teleport_placement_requires_free_cells() {
        let config = Config {
            grid_size: 2,
            starts: vec![Pos::new(0, 0)],
            goal: Pos::new(1, 1),
            teleport_pairs: 2,
            ..Default::default()
        };
        let err = GridWorld::new(&config).map(|_| ()).unwrap_err();
        assert_eq!(err, ConfigError::TeleportSpace { pairs: 2, free: 2 });
    }

    #[test]
    fn reward_layers() {
        let config = Config {
            grid_size: 6,
            starts: vec![Pos::new(0, 0)],
            goal: Pos::new(5, 5),
            obstacles: vec![Pos::new(2, 0)],
            traps: vec![Pos::new(0, 5)],
            treasures: vec![Pos::new(4, 4)],
            ..Default::default()
        };
        let pad = (Pos::new(1, 3), Pos::new(4, 1));
        let world = GridWorld::with_teleports(&config, &[pad]).unwrap();

        assert_eq!(world.reward_at(Pos::new(5, 5), 30), 970.0, "Goal");
        assert_eq!(world.reward_at(Pos::new(4, 4), 10), 95.0, "Treasure");
        assert_eq!(world.reward_at(pad.0, 7), -5.0, "Teleport pad");
        assert_eq!(world.reward_at(pad.1, 7), -5.0, "Both endpoints");
        assert_eq!(world.reward_at(Pos::new(0, 5), 3), -500.0, "Trap");
        assert_eq!(world.reward_at(Pos::new(2, 0), 3), -100.0, "Obstacle");
        assert_eq!(world.reward_at(Pos::new(3, 3), 3), -1.0, "Step cost");

        // purity: same arguments, same result
        assert_eq!(world.reward_at(pad.0, 7), world.reward_at(pad.0, 7));
    }

    #[test]
    fn goal_reward_is_not_clamped() {
        let world = GridWorld::new(&small_config()).unwrap();
        assert_eq!(world.reward_at(Pos::new(3, 3), 1200), -200.0);
    }

    #[test]
    fn step_consumes_budget_on_bump() {
        let mut world = GridWorld::new(&small_config()).unwrap();
        world.reset();

        let (next, reward) = world.step(Action::Up);
        assert_eq!(next, Some(Pos::new(0, 0)), "Bump leaves position unchanged");
        assert_eq!(reward, -1.0);
        assert_eq!(world.report["steps"], 1.0, "Bump still consumes a step");
    }

    #[test]
    fn reaching_the_goal_is_terminal() {
        let config = Config {
            starts: vec![Pos::new(9, 8)],
            ..Default::default()
        };
        let mut world = GridWorld::new(&config).unwrap();
        world.reset();

        let (next, reward) = world.step(Action::Down);
        assert_eq!(next, None, "Goal state is terminal");
        assert_eq!(reward, 1000.0);
    }

    #[test]
    fn step_resolves_teleports_before_reward() {
        let pair = (Pos::new(0, 1), Pos::new(3, 1));
        let mut world = GridWorld::with_teleports(&small_config(), &[pair]).unwrap();
        world.reset();

        let (next, reward) = world.step(Action::Down);
        assert_eq!(next, Some(pair.1), "Stepping onto a pad relocates");
        assert_eq!(reward, -5.0, "Reward sees the post-teleport position");
    }
}
