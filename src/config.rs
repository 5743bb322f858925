//! Search configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{EXPLORATION, RAVE_K, SEARCH_TIME_MS};

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown move policy '{0}' (expected best, robust or worst)")]
    UnknownPolicy(String),
}

/// When the driver stops iterating.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Budget {
    /// Wall-clock thinking time per move.
    Time(Duration),
    /// Fixed number of iterations, for reproducible runs.
    Iterations(u32),
}

impl Budget {
    /// Whether the budget is used up after `iterations` runs taking `elapsed`.
    #[inline]
    pub fn exhausted(&self, iterations: u32, elapsed: Duration) -> bool {
        match *self {
            Budget::Time(limit) => elapsed >= limit,
            Budget::Iterations(limit) => iterations >= limit,
        }
    }
}

/// How the move is picked from the root children once search ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FinalMovePolicy {
    /// Highest mean from the mover's point of view.
    Best,
    /// Most visited.
    #[default]
    Robust,
    /// Lowest mean from the mover's point of view (diagnostics only).
    Worst,
}

impl FromStr for FinalMovePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "best" => Ok(FinalMovePolicy::Best),
            "robust" => Ok(FinalMovePolicy::Robust),
            "worst" => Ok(FinalMovePolicy::Worst),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for FinalMovePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            FinalMovePolicy::Best => "best",
            FinalMovePolicy::Robust => "robust",
            FinalMovePolicy::Worst => "worst",
        })
    }
}

/// Parameters of one MCTS player.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    pub budget: Budget,
    /// UCB1 exploration constant.
    pub exploration: f64,
    /// RAVE equivalence parameter `k`; `None` disables RAVE.
    pub rave: Option<f64>,
    pub policy: FinalMovePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget: Budget::Time(Duration::from_millis(SEARCH_TIME_MS)),
            exploration: EXPLORATION,
            rave: Some(RAVE_K),
            policy: FinalMovePolicy::Robust,
        }
    }
}

impl SearchConfig {
    /// Default configuration with a fixed iteration budget.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            budget: Budget::Iterations(iterations),
            ..Self::default()
        }
    }
}
