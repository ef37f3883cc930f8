use rand::{thread_rng, Rng};

use crate::decay::Decay;

/// Exploration policy result
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with a time-decaying epsilon threshold
///
/// Epsilon is evaluated once per episode, so rendering or skipping frames
/// never shifts the schedule.
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Epsilon threshold for the given episode
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Invoke epsilon greedy policy for the given episode
    pub fn choose(&self, episode: u32) -> Choice {
        if thread_rng().gen::<f32>() > self.epsilon(episode) {
            Choice::Exploit
        } else {
            Choice::Explore
        }
    }
}
