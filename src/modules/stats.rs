use serde::{Deserialize, Serialize};

use crate::modules::engine::{Engine, Event, Rule};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStats {
    pub return_to_base_count: u64,
    pub repair_count: u64,
    pub head_to_target_count: u64,
    pub explore_count: u64,
    pub discoveries: u64,
    pub pickups: u64,
}

impl RuleStats {
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::AgentMoved { rule, .. } => match rule {
                Rule::ReturnToBase => {
                    self.return_to_base_count = self.return_to_base_count.saturating_add(1)
                }
                Rule::Repair => self.repair_count = self.repair_count.saturating_add(1),
                Rule::HeadToTarget => {
                    self.head_to_target_count = self.head_to_target_count.saturating_add(1)
                }
                Rule::Explore => self.explore_count = self.explore_count.saturating_add(1),
                Rule::Terminal | Rule::Discover | Rule::Pickup => {}
            },
            Event::MutationDiscovered { .. } => {
                self.discoveries = self.discoveries.saturating_add(1)
            }
            Event::DnaPickedUp { .. } => self.pickups = self.pickups.saturating_add(1),
            Event::TickStarted { .. }
            | Event::TickCompleted { .. }
            | Event::MutationRepaired { .. }
            | Event::RepairCompleted { .. } => {}
        }
    }
}

pub fn record_events<'a>(stats: &mut RuleStats, events: impl Iterator<Item = &'a Event>) {
    for event in events {
        stats.record(event);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u64,
    pub steps: u64,
    pub reward: f64,
    pub completed: bool,
    pub mutations_left: usize,
    pub rules: RuleStats,
}

/// Tick `engine` until every mutation is repaired or `max_ticks` is reached.
pub fn play_episode(engine: &mut Engine, episode: u64, max_ticks: u64) -> EpisodeSummary {
    let mut rules = RuleStats::default();
    while !engine.repair_complete() && engine.steps() < max_ticks {
        let tick = engine.step();
        record_events(&mut rules, tick.events.iter());
    }
    EpisodeSummary {
        episode,
        steps: engine.steps(),
        reward: engine.reward(),
        completed: engine.repair_complete(),
        mutations_left: engine.world().mutations_left(),
        rules,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub episodes: Vec<EpisodeSummary>,
}

impl RunStats {
    pub fn push(&mut self, summary: EpisodeSummary) {
        self.episodes.push(summary);
    }

    pub fn completed(&self) -> usize {
        self.episodes.iter().filter(|e| e.completed).count()
    }

    pub fn mean_steps(&self) -> f64 {
        self.mean(|e| e.steps as f64)
    }

    pub fn mean_reward(&self) -> f64 {
        self.mean(|e| e.reward)
    }

    fn mean(&self, f: impl Fn(&EpisodeSummary) -> f64) -> f64 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        self.episodes.iter().map(f).sum::<f64>() / self.episodes.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::SimConfig;

    #[test]
    fn episode_runs_to_completion() {
        let mut engine = Engine::new(SimConfig::default().with_seed(31));
        let summary = play_episode(&mut engine, 1, 100_000);

        assert!(summary.completed);
        assert_eq!(summary.mutations_left, 0);
        assert_eq!(summary.rules.repair_count, 8);
        assert_eq!(summary.rules.pickups, 8);
        assert!(summary.rules.discoveries >= 8);
        let moves = summary.rules.return_to_base_count
            + summary.rules.repair_count
            + summary.rules.head_to_target_count
            + summary.rules.explore_count;
        assert_eq!(moves, summary.steps);
        let expected = 8.0 * 10.0 - 0.05 * summary.steps as f64;
        assert!((summary.reward - expected).abs() < 1e-6);
    }

    #[test]
    fn episode_stops_at_tick_cap() {
        let mut engine = Engine::new(SimConfig::default().with_seed(31));
        let summary = play_episode(&mut engine, 1, 3);
        assert_eq!(summary.steps, 3);
        assert!(!summary.completed);
    }

    #[test]
    fn run_stats_average_episodes() {
        let mut stats = RunStats::default();
        assert_eq!(stats.mean_steps(), 0.0);

        let mut engine = Engine::new(SimConfig::default().with_seed(2));
        for episode in 1..=3 {
            engine.reset();
            stats.push(play_episode(&mut engine, episode, 100_000));
        }
        assert_eq!(stats.completed(), 3);
        let total: u64 = stats.episodes.iter().map(|e| e.steps).sum();
        assert!((stats.mean_steps() - total as f64 / 3.0).abs() < 1e-9);
    }
}
