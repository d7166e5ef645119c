use std::sync::{Arc, Mutex};

use tracing::info;

use crate::modules::config::{ConfigError, SimConfig};
use crate::modules::engine::{Engine, TickResult};
use crate::modules::stats::RuleStats;
use crate::modules::view::StateSnapshot;

pub type SharedSession = Arc<Mutex<Session>>;

/// The one live simulation. Every read and write goes through this object; hosts
/// that serve it from several threads wrap it in [`SharedSession`].
#[derive(Debug)]
pub struct Session {
    engine: Engine,
    episode: u64,
    rules: RuleStats,
}

impl Session {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_engine(Engine::new(config)))
    }

    pub fn from_engine(engine: Engine) -> Self {
        Self {
            engine,
            episode: 1,
            rules: RuleStats::default(),
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn rule_stats(&self) -> &RuleStats {
        &self.rules
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.engine.snapshot()
    }

    pub fn tick(&mut self) -> (TickResult, StateSnapshot) {
        let result = self.engine.step();
        for event in &result.events {
            self.rules.record(event);
        }
        if result.advanced && self.engine.repair_complete() {
            info!(
                episode = self.episode,
                steps = self.engine.steps(),
                reward = self.engine.reward(),
                explore = self.rules.explore_count,
                discoveries = self.rules.discoveries,
                "episode complete"
            );
        }
        (result, self.engine.snapshot())
    }

    pub fn reset(&mut self) -> StateSnapshot {
        self.engine.reset();
        self.episode = self.episode.saturating_add(1);
        self.rules = RuleStats::default();
        info!(
            episode = self.episode,
            mutations = self.engine.world().mutations_left(),
            "session reset"
        );
        self.engine.snapshot()
    }
}
