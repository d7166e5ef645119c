pub mod modules;

pub use modules::cell::CellKind;
pub use modules::client::{DEFAULT_SERVER_URL, SimClient};
pub use modules::config::{
    ConfigError, DEFAULT_HEIGHT, DEFAULT_MUTATIONS, DEFAULT_REPAIR_REWARD, DEFAULT_TICK_COST,
    DEFAULT_WIDTH, SimConfig,
};
pub use modules::engine::{Engine, Event, Mode, RULES, Rule, TickResult, move_toward};
pub use modules::server::{DEFAULT_BIND, ServerHandle, SimServer};
pub use modules::session::{Session, SharedSession};
pub use modules::stats::{EpisodeSummary, RuleStats, RunStats, play_episode, record_events};
pub use modules::view::{Coord, StateSnapshot};
pub use modules::world::{Grid, Position, World, create_grid};
