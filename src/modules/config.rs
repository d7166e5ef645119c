use std::fmt;

/// Default grid width.
pub const DEFAULT_WIDTH: i32 = 10;
/// Default grid height.
pub const DEFAULT_HEIGHT: i32 = 10;
/// Mutation cells placed on every reset.
pub const DEFAULT_MUTATIONS: usize = 8;
/// Reward charged for every non-terminal tick.
pub const DEFAULT_TICK_COST: f64 = 0.05;
/// Reward granted for each repaired mutation.
pub const DEFAULT_REPAIR_REWARD: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    pub width: i32,
    pub height: i32,
    pub mutations: usize,
    pub tick_cost: f64,
    pub repair_reward: f64,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mutations: DEFAULT_MUTATIONS,
            tick_cost: DEFAULT_TICK_COST,
            repair_reward: DEFAULT_REPAIR_REWARD,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of cells a mutation may occupy (everything but the origin).
    pub fn placeable_cells(&self) -> usize {
        (self.width.max(0) as usize)
            .saturating_mul(self.height.max(0) as usize)
            .saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.width == 1 && self.height == 1 {
            return Err(ConfigError::NoRoomToMove);
        }
        if self.mutations == 0 {
            return Err(ConfigError::NoMutations);
        }
        if self.mutations > self.placeable_cells() {
            return Err(ConfigError::TooManyMutations {
                requested: self.mutations,
                available: self.placeable_cells(),
            });
        }
        if !self.tick_cost.is_finite() || !self.repair_reward.is_finite() {
            return Err(ConfigError::NonFiniteReward);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    EmptyGrid { width: i32, height: i32 },
    NoRoomToMove,
    NoMutations,
    TooManyMutations { requested: usize, available: usize },
    NonFiniteReward,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGrid { width, height } => write!(
                f,
                "grid must be at least 1x1 (got {}x{})",
                width, height
            ),
            ConfigError::NoRoomToMove => write!(f, "a 1x1 grid leaves the agent nowhere to go"),
            ConfigError::NoMutations => write!(f, "mutation count must be at least 1"),
            ConfigError::TooManyMutations {
                requested,
                available,
            } => write!(
                f,
                "cannot place {} mutation(s): only {} non-origin cell(s) available",
                requested, available
            ),
            ConfigError::NonFiniteReward => {
                write!(f, "tick cost and repair reward must be finite numbers")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
