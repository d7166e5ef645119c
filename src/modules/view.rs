use serde::{Deserialize, Serialize};

use crate::modules::cell::CellKind;
use crate::modules::engine::{Engine, Mode};
use crate::modules::world::Position;

/// Coordinates travel as `[x, y]` pairs.
pub type Coord = [i32; 2];

/// Full simulation state as served over HTTP. Key names follow the public
/// document format, so they are camelCase rather than Rust field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Rows of cell labels, indexed `grid[y][x]`.
    pub grid: Vec<Vec<CellKind>>,
    pub agent: Coord,
    pub steps: u64,
    pub mutations_left: usize,
    pub mutation_positions: Vec<Coord>,
    pub visited: Vec<Coord>,
    #[serde(rename = "carryingDNA")]
    pub carrying_dna: bool,
    pub repair_complete: bool,
    pub reward: f64,
    pub mode: Mode,
    pub discovered_mutations: Vec<Coord>,
}

fn coords<'a>(positions: impl Iterator<Item = &'a Position>) -> Vec<Coord> {
    positions.map(|p| p.as_pair()).collect()
}

impl StateSnapshot {
    pub fn from_engine(engine: &Engine) -> Self {
        let world = engine.world();
        Self {
            grid: world.grid().clone(),
            agent: world.agent().as_pair(),
            steps: engine.steps(),
            mutations_left: world.mutations_left(),
            mutation_positions: coords(world.mutation_positions().iter()),
            visited: coords(world.visited().iter()),
            carrying_dna: engine.carrying_dna(),
            repair_complete: engine.repair_complete(),
            reward: engine.reward(),
            mode: engine.mode(),
            discovered_mutations: coords(world.discovered().iter()),
        }
    }

    pub fn agent_position(&self) -> Position {
        Position::new(self.agent[0], self.agent[1])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::modules::config::SimConfig;

    #[test]
    fn serializes_with_public_key_names() {
        let engine = Engine::new(SimConfig::default().with_seed(5));
        let value = serde_json::to_value(engine.snapshot()).unwrap();
        let obj = value.as_object().unwrap();

        for key in [
            "grid",
            "agent",
            "steps",
            "mutationsLeft",
            "mutationPositions",
            "visited",
            "carryingDNA",
            "repairComplete",
            "reward",
            "mode",
            "discoveredMutations",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj.len(), 11);
        assert_eq!(value["agent"], serde_json::json!([0, 0]));
        assert_eq!(value["mode"], Value::from("to_base"));
        assert_eq!(value["grid"][0][0], Value::from("dna_source"));
        assert_eq!(value["mutationsLeft"], Value::from(8));
        assert_eq!(value["visited"], serde_json::json!([[0, 0]]));
        assert_eq!(value["carryingDNA"], Value::Bool(false));
    }

    #[test]
    fn mutation_positions_match_grid_cells() {
        let engine = Engine::new(SimConfig::default().with_seed(9));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.mutation_positions.len(), snapshot.mutations_left);
        for [x, y] in &snapshot.mutation_positions {
            assert_eq!(snapshot.grid[*y as usize][*x as usize], CellKind::Mutation);
        }
        let mut sorted = snapshot.mutation_positions.clone();
        sorted.sort();
        assert_eq!(sorted, snapshot.mutation_positions);
    }

    #[test]
    fn parses_back_from_json() {
        let mut engine = Engine::new(SimConfig::default().with_seed(13));
        engine.step();
        let snapshot = engine.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: StateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.agent_position(), engine.world().agent());
        assert_eq!(parsed.mode, Mode::Search);
        assert!(parsed.carrying_dna);
    }
}
