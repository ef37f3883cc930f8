/// Q-learning trainer and greedy policy replay
pub mod agent;

/// Run configuration and validation
pub mod config;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Exploration policies
pub mod exploration;

/// Per-episode metric reports
pub mod report;

/// Dense state-action value table
pub mod table;

/// The grid world environment
pub mod world;

/// Terminal visualization
#[cfg(feature = "viz")]
pub mod viz;
