use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Empty,
    Mutation,
    DnaSource,
}

impl CellKind {
    pub const fn label(self) -> &'static str {
        match self {
            CellKind::Empty => "empty",
            CellKind::Mutation => "mutation",
            CellKind::DnaSource => "dna_source",
        }
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Empty
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CellKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "empty" => Ok(CellKind::Empty),
            "mutation" => Ok(CellKind::Mutation),
            "dna_source" => Ok(CellKind::DnaSource),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_wire_names() {
        for kind in [CellKind::Empty, CellKind::Mutation, CellKind::DnaSource] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.label()));
            assert_eq!(kind.label().parse::<CellKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!("wall".parse::<CellKind>().is_err());
    }
}
