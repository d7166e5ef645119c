use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::modules::cell::CellKind;
use crate::modules::config::SimConfig;
use crate::modules::view::StateSnapshot;
use crate::modules::world::{Position, World};

/// What the agent is currently trying to do. Descriptive only; the rules never
/// read it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    ToBase,
    Search,
    ToMutation,
}

impl Mode {
    pub const fn label(self) -> &'static str {
        match self {
            Mode::ToBase => "to_base",
            Mode::Search => "search",
            Mode::ToMutation => "to_mutation",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    TickStarted {
        tick: u64,
    },
    MutationDiscovered {
        position: Position,
    },
    DnaPickedUp {
        position: Position,
    },
    MutationRepaired {
        position: Position,
        remaining: usize,
        reward: f64,
    },
    AgentMoved {
        from: Position,
        to: Position,
        rule: Rule,
    },
    RepairCompleted {
        tick: u64,
        reward: f64,
    },
    TickCompleted {
        tick: u64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickResult {
    pub tick: u64,
    /// False when the world was already repaired and nothing changed.
    pub advanced: bool,
    pub events: Vec<Event>,
}

/// Behaviour rules, evaluated in this order on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    Terminal,
    Discover,
    ReturnToBase,
    Pickup,
    Repair,
    HeadToTarget,
    Explore,
}

impl Rule {
    pub const fn label(self) -> &'static str {
        match self {
            Rule::Terminal => "terminal",
            Rule::Discover => "discover",
            Rule::ReturnToBase => "return_to_base",
            Rule::Pickup => "pickup",
            Rule::Repair => "repair",
            Rule::HeadToTarget => "head_to_target",
            Rule::Explore => "explore",
        }
    }
}

pub const RULES: [Rule; 7] = [
    Rule::Terminal,
    Rule::Discover,
    Rule::ReturnToBase,
    Rule::Pickup,
    Rule::Repair,
    Rule::HeadToTarget,
    Rule::Explore,
];

enum Decision {
    Continue,
    MoveTo(Position),
}

/// Greedy Manhattan step: close the x gap first, then y.
pub fn move_toward(from: Position, target: Position) -> Position {
    if target.x > from.x {
        return from.offset(1, 0);
    }
    if target.x < from.x {
        return from.offset(-1, 0);
    }
    if target.y > from.y {
        return from.offset(0, 1);
    }
    if target.y < from.y {
        return from.offset(0, -1);
    }
    from
}

#[derive(Debug)]
pub struct Engine {
    config: SimConfig,
    rng: StdRng,
    world: World,
    carrying_dna: bool,
    repair_complete: bool,
    steps: u64,
    reward: f64,
    mode: Mode,
}

impl Engine {
    pub fn new(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: SimConfig, mut rng: StdRng) -> Self {
        let world = World::generate(config.width, config.height, config.mutations, &mut rng);
        Self::assemble(config, rng, world)
    }

    /// Run against a fixed layout instead of a generated one. Resets still draw a
    /// fresh layout from `config`.
    pub fn with_world(config: SimConfig, world: World, rng: StdRng) -> Self {
        Self::assemble(config, rng, world)
    }

    fn assemble(config: SimConfig, rng: StdRng, world: World) -> Self {
        let repair_complete = world.is_repair_complete();
        Self {
            config,
            rng,
            world,
            carrying_dna: false,
            repair_complete,
            steps: 0,
            reward: 0.0,
            mode: Mode::ToBase,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn carrying_dna(&self) -> bool {
        self.carrying_dna
    }

    pub fn repair_complete(&self) -> bool {
        self.repair_complete
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from_engine(self)
    }

    /// Replace the world with a fresh layout and put the agent back at base.
    pub fn reset(&mut self) {
        self.world = World::generate(
            self.config.width,
            self.config.height,
            self.config.mutations,
            &mut self.rng,
        );
        self.carrying_dna = false;
        self.repair_complete = self.world.is_repair_complete();
        self.steps = 0;
        self.reward = 0.0;
        self.mode = Mode::ToBase;
        debug!(
            mutations = self.world.mutations_left(),
            width = self.config.width,
            height = self.config.height,
            "world reset"
        );
    }

    /// Advance one tick. Once every mutation is repaired this is a no-op.
    pub fn step(&mut self) -> TickResult {
        if self.repair_complete {
            return TickResult {
                tick: self.steps,
                advanced: false,
                events: Vec::new(),
            };
        }

        let tick = self.steps + 1;
        let mut events = vec![Event::TickStarted { tick }];
        let from = self.world.agent();
        let (to, rule) = self.choose_move(&mut events);

        self.world.place_agent(to);
        self.steps = tick;
        self.reward -= self.config.tick_cost;
        events.push(Event::AgentMoved { from, to, rule });

        debug!(
            tick,
            rule = rule.label(),
            from_x = from.x,
            from_y = from.y,
            to_x = to.x,
            to_y = to.y,
            carrying = self.carrying_dna,
            reward = self.reward,
            "agent moved"
        );

        if self.repair_complete {
            info!(tick, reward = self.reward, "all mutations repaired");
            events.push(Event::RepairCompleted {
                tick,
                reward: self.reward,
            });
        }
        events.push(Event::TickCompleted { tick });

        TickResult {
            tick,
            advanced: true,
            events,
        }
    }

    fn choose_move(&mut self, events: &mut Vec<Event>) -> (Position, Rule) {
        for rule in RULES {
            if let Decision::MoveTo(target) = self.apply_rule(rule, events) {
                return (target, rule);
            }
        }
        // Explore always decides; kept total for the type checker.
        (self.world.agent(), Rule::Explore)
    }

    fn apply_rule(&mut self, rule: Rule, events: &mut Vec<Event>) -> Decision {
        let here = self.world.agent();
        let at_base = here == Position::origin();

        match rule {
            Rule::Terminal => {
                if self.repair_complete {
                    return Decision::MoveTo(here);
                }
                Decision::Continue
            }
            Rule::Discover => {
                if self.world.cell(here) == Some(CellKind::Mutation) && self.world.discover(here)
                {
                    events.push(Event::MutationDiscovered { position: here });
                }
                Decision::Continue
            }
            Rule::ReturnToBase => {
                if !self.carrying_dna && !at_base {
                    self.mode = Mode::ToBase;
                    return Decision::MoveTo(move_toward(here, Position::origin()));
                }
                Decision::Continue
            }
            Rule::Pickup => {
                if !self.carrying_dna && at_base {
                    self.carrying_dna = true;
                    self.mode = Mode::Search;
                    events.push(Event::DnaPickedUp { position: here });
                }
                Decision::Continue
            }
            Rule::Repair => {
                if !self.carrying_dna || !self.world.is_discovered(here) {
                    return Decision::Continue;
                }
                if self.world.repair_at(here.x, here.y) {
                    self.carrying_dna = false;
                    self.reward += self.config.repair_reward;
                    let remaining = self.world.mutations_left();
                    if remaining == 0 {
                        self.repair_complete = true;
                    }
                    info!(x = here.x, y = here.y, remaining, "mutation repaired");
                    events.push(Event::MutationRepaired {
                        position: here,
                        remaining,
                        reward: self.config.repair_reward,
                    });
                }
                self.mode = Mode::ToBase;
                Decision::MoveTo(move_toward(here, Position::origin()))
            }
            Rule::HeadToTarget => {
                if !self.carrying_dna {
                    return Decision::Continue;
                }
                // BTreeSet iterates in (x, y) order and min_by_key keeps the first
                // minimum, so ties go to the lexicographically smallest target.
                match self
                    .world
                    .discovered()
                    .iter()
                    .copied()
                    .min_by_key(|pos| pos.manhattan(here))
                {
                    Some(target) => {
                        self.mode = Mode::ToMutation;
                        Decision::MoveTo(move_toward(here, target))
                    }
                    None => Decision::Continue,
                }
            }
            Rule::Explore => {
                self.mode = Mode::Search;
                let neighbors = self.world.neighbors(here.x, here.y);
                let unexplored: Vec<Position> = neighbors
                    .iter()
                    .copied()
                    .filter(|p| !self.world.has_visited(*p))
                    .collect();
                let pool = if unexplored.is_empty() {
                    &neighbors
                } else {
                    &unexplored
                };
                Decision::MoveTo(pool.choose(&mut self.rng).copied().unwrap_or(here))
            }
        }
    }
}
