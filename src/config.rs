use thiserror::Error;

use crate::world::Pos;

/// Everything a run needs: world layout, reward layers, and learning
/// hyperparameters
///
/// The [`Default`] carries the classic 10x10 scenario constants. Construct
/// with struct update syntax and let [`GridWorld`](crate::world::GridWorld)
/// and [`QTrainer`](crate::agent::QTrainer) validate on construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Episode start positions, one chosen uniformly per episode
    pub starts: Vec<Pos>,
    pub goal: Pos,
    pub obstacles: Vec<Pos>,
    pub traps: Vec<Pos>,
    /// Optional treasure reward layer, empty for most worlds
    pub treasures: Vec<Pos>,
    /// Number of teleport pairs to place by rejection sampling
    pub teleport_pairs: usize,
    /// Learning rate
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_min: f32,
    /// Multiplicative per-episode decay applied to epsilon
    pub epsilon_decay: f32,
    pub episodes: u32,
    /// Step budget per episode and per replay
    pub max_steps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: 10,
            starts: vec![Pos::new(0, 0)],
            goal: Pos::new(9, 9),
            obstacles: Vec::new(),
            traps: Vec::new(),
            treasures: Vec::new(),
            teleport_pairs: 0,
            alpha: 0.2,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.998,
            episodes: 1000,
            max_steps: 200,
        }
    }
}

impl Config {
    /// Fail fast on a malformed world or hyperparameters outside their
    /// intervals
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.starts.is_empty() {
            return Err(ConfigError::NoStart);
        }

        let fields = [
            ("start", self.starts.as_slice()),
            ("goal", std::slice::from_ref(&self.goal)),
            ("obstacle", self.obstacles.as_slice()),
            ("trap", self.traps.as_slice()),
            ("treasure", self.treasures.as_slice()),
        ];
        for (field, cells) in fields {
            if let Some(&pos) = cells.iter().find(|p| !self.in_bounds(**p)) {
                return Err(ConfigError::OutOfBounds { field, pos });
            }
        }

        for &pos in self.starts.iter().chain([&self.goal]) {
            let field = if pos == self.goal { "goal" } else { "start" };
            if self.obstacles.contains(&pos) || self.traps.contains(&pos) {
                return Err(ConfigError::BlockedCell { field, pos });
            }
        }

        check_interval("alpha", self.alpha, "(0, 1]", self.alpha > 0.0 && self.alpha <= 1.0)?;
        check_interval("gamma", self.gamma, "[0, 1)", self.gamma >= 0.0 && self.gamma < 1.0)?;
        check_interval(
            "epsilon_start",
            self.epsilon_start,
            "[0, 1]",
            (0.0..=1.0).contains(&self.epsilon_start),
        )?;
        check_interval(
            "epsilon_min",
            self.epsilon_min,
            "[0, epsilon_start]",
            self.epsilon_min >= 0.0 && self.epsilon_min <= self.epsilon_start,
        )?;
        check_interval(
            "epsilon_decay",
            self.epsilon_decay,
            "(0, 1]",
            self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0,
        )?;

        if self.max_steps == 0 {
            return Err(ConfigError::NoBudget);
        }

        Ok(())
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        let size = self.grid_size as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }
}

fn check_interval(
    name: &'static str,
    value: f32,
    interval: &'static str,
    ok: bool,
) -> Result<(), ConfigError> {
    ok.then_some(())
        .ok_or(ConfigError::Hyperparameter { name, value, interval })
}

/// Construction-time validation failure
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid size {0} is too small, need at least 2")]
    GridTooSmall(usize),

    #[error("at least one start position is required")]
    NoStart,

    #[error("{field} position {pos} is outside the grid")]
    OutOfBounds { field: &'static str, pos: Pos },

    #[error("{field} position {pos} is inside an obstacle or trap")]
    BlockedCell { field: &'static str, pos: Pos },

    #[error("invalid value for `{name}`: {value} is not in {interval}")]
    Hyperparameter {
        name: &'static str,
        value: f32,
        interval: &'static str,
    },

    #[error("`max_steps` must be at least 1")]
    NoBudget,

    #[error("cannot place {pairs} teleport pairs with only {free} free cells")]
    TeleportSpace { pairs: usize, free: usize },

    #[error("gave up placing teleport pairs after {attempts} samples")]
    TeleportPlacement { attempts: u32 },

    #[error("teleport endpoint {pos} is out of bounds or already occupied")]
    TeleportCell { pos: Pos },

    #[error("invalid epsilon schedule: {0}")]
    Epsilon(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alpha, 0.2);
        assert_eq!(config.gamma, 0.95);
        assert_eq!(config.max_steps, 200);
    }

    #[test]
    fn rejects_blocked_goal() {
        let config = Config {
            obstacles: vec![Pos::new(9, 9)],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BlockedCell {
                field: "goal",
                pos: Pos::new(9, 9)
            })
        );
    }

    #[test]
    fn rejects_out_of_bounds_trap() {
        let config = Config {
            traps: vec![Pos::new(10, 3)],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfBounds {
                field: "trap",
                pos: Pos::new(10, 3)
            })
        );
    }

    #[test]
    fn rejects_bad_hyperparameters() {
        let config = Config {
            alpha: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Hyperparameter { name: "alpha", .. })
        ));

        let config = Config {
            epsilon_min: 0.5,
            epsilon_start: 0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Hyperparameter {
                name: "epsilon_min",
                ..
            })
        ));
    }
}
