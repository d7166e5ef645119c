use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::modules::cell::CellKind;

/// Grid coordinate. Ordering is lexicographic on `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }

    pub const fn as_pair(self) -> [i32; 2] {
        [self.x, self.y]
    }
}

/// West, east, north, south. Fixed so seeded runs stay reproducible.
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub type Grid = Vec<Vec<CellKind>>;

/// Build a `height` x `width` grid (indexed `grid[y][x]`) with the DNA source at the
/// origin and `mutation_count` distinct mutation cells elsewhere.
///
/// Mutations are drawn without replacement from the non-origin cells, so the call
/// finishes in bounded time. A count larger than the number of non-origin cells is
/// clamped.
pub fn create_grid<R: Rng + ?Sized>(
    width: i32,
    height: i32,
    mutation_count: usize,
    rng: &mut R,
) -> (Grid, BTreeSet<Position>) {
    let w = width.max(0) as usize;
    let h = height.max(0) as usize;
    let mut grid = vec![vec![CellKind::Empty; w]; h];
    let mut mutations = BTreeSet::new();
    if w == 0 || h == 0 {
        return (grid, mutations);
    }

    let placeable = w * h - 1;
    let count = mutation_count.min(placeable);
    // Cell index 0 is the origin; sample from 1..w*h.
    for idx in index::sample(rng, placeable, count).into_iter() {
        let cell = idx + 1;
        let pos = Position::new((cell % w) as i32, (cell / w) as i32);
        grid[pos.y as usize][pos.x as usize] = CellKind::Mutation;
        mutations.insert(pos);
    }
    grid[0][0] = CellKind::DnaSource;

    (grid, mutations)
}

#[derive(Debug, Clone)]
pub struct World {
    width: i32,
    height: i32,
    grid: Grid,
    remaining: BTreeSet<Position>,
    discovered: BTreeSet<Position>,
    visited: BTreeSet<Position>,
    agent: Position,
}

impl World {
    pub fn generate<R: Rng + ?Sized>(
        width: i32,
        height: i32,
        mutation_count: usize,
        rng: &mut R,
    ) -> Self {
        let (grid, remaining) = create_grid(width, height, mutation_count, rng);
        Self::from_parts(width, height, grid, remaining)
    }

    /// Assemble a world from an explicit layout. The origin is forced to be the DNA
    /// source and the mutation registry is read back from the grid.
    pub fn from_grid(mut grid: Grid) -> Self {
        let height = grid.len() as i32;
        let width = grid.first().map(|row| row.len()).unwrap_or(0) as i32;
        if let Some(cell) = grid.first_mut().and_then(|row| row.first_mut()) {
            *cell = CellKind::DnaSource;
        }
        let remaining = grid
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| **cell == CellKind::Mutation)
                    .map(move |(x, _)| Position::new(x as i32, y as i32))
            })
            .collect();
        Self::from_parts(width, height, grid, remaining)
    }

    fn from_parts(width: i32, height: i32, grid: Grid, remaining: BTreeSet<Position>) -> Self {
        let mut visited = BTreeSet::new();
        visited.insert(Position::origin());
        Self {
            width,
            height,
            grid,
            remaining,
            discovered: BTreeSet::new(),
            visited,
            agent: Position::origin(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        0 <= x && x < self.width && 0 <= y && y < self.height
    }

    pub fn cell(&self, pos: Position) -> Option<CellKind> {
        if !self.is_valid(pos.x, pos.y) {
            return None;
        }
        Some(self.grid[pos.y as usize][pos.x as usize])
    }

    pub fn neighbors(&self, x: i32, y: i32) -> Vec<Position> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(dx, dy)| Position::new(x + dx, y + dy))
            .filter(|p| self.is_valid(p.x, p.y))
            .collect()
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    /// Move the agent and record the cell as visited.
    pub(crate) fn place_agent(&mut self, pos: Position) {
        self.agent = pos;
        self.visited.insert(pos);
    }

    pub fn visited(&self) -> &BTreeSet<Position> {
        &self.visited
    }

    pub fn has_visited(&self, pos: Position) -> bool {
        self.visited.contains(&pos)
    }

    pub fn mutation_positions(&self) -> &BTreeSet<Position> {
        &self.remaining
    }

    pub fn discovered(&self) -> &BTreeSet<Position> {
        &self.discovered
    }

    pub fn is_discovered(&self, pos: Position) -> bool {
        self.discovered.contains(&pos)
    }

    /// Mark a mutation cell as known. Returns true only the first time.
    pub fn discover(&mut self, pos: Position) -> bool {
        if self.cell(pos) != Some(CellKind::Mutation) {
            return false;
        }
        self.discovered.insert(pos)
    }

    /// Clear a mutation cell. Returns false if nothing was there to repair.
    pub fn repair_at(&mut self, x: i32, y: i32) -> bool {
        let pos = Position::new(x, y);
        if !self.remaining.remove(&pos) {
            return false;
        }
        self.discovered.remove(&pos);
        self.grid[y as usize][x as usize] = CellKind::Empty;
        true
    }

    pub fn mutations_left(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_repair_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn count(grid: &Grid, kind: CellKind) -> usize {
        grid.iter().flatten().filter(|c| **c == kind).count()
    }

    #[test]
    fn grid_has_single_source_and_exact_mutations() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let (grid, mutations) = create_grid(10, 10, 8, &mut rng);
            assert_eq!(grid.len(), 10);
            assert!(grid.iter().all(|row| row.len() == 10));
            assert_eq!(grid[0][0], CellKind::DnaSource);
            assert_eq!(count(&grid, CellKind::DnaSource), 1);
            assert_eq!(count(&grid, CellKind::Mutation), 8);
            assert_eq!(count(&grid, CellKind::Empty), 100 - 9);
            assert_eq!(mutations.len(), 8);
            assert!(!mutations.contains(&Position::origin()));
            for pos in &mutations {
                assert_eq!(grid[pos.y as usize][pos.x as usize], CellKind::Mutation);
            }
        }
    }

    #[test]
    fn grid_can_fill_every_non_origin_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let (grid, mutations) = create_grid(3, 2, 5, &mut rng);
        assert_eq!(mutations.len(), 5);
        assert_eq!(count(&grid, CellKind::Empty), 0);

        let (_, clamped) = create_grid(3, 2, 50, &mut rng);
        assert_eq!(clamped.len(), 5);
    }

    #[test]
    fn placements_vary_between_draws() {
        let mut rng = StdRng::seed_from_u64(99);
        let first = create_grid(10, 10, 8, &mut rng).1;
        let differs = (0..20).any(|_| create_grid(10, 10, 8, &mut rng).1 != first);
        assert!(differs);
    }

    #[test]
    fn bounds_checks() {
        let world = World::from_grid(vec![vec![CellKind::Empty; 4]; 3]);
        assert!(world.is_valid(0, 0));
        assert!(world.is_valid(3, 2));
        assert!(!world.is_valid(4, 0));
        assert!(!world.is_valid(0, 3));
        assert!(!world.is_valid(-1, 0));
        assert_eq!(world.cell(Position::new(5, 5)), None);
    }

    #[test]
    fn neighbors_are_ordered_west_east_north_south() {
        let world = World::from_grid(vec![vec![CellKind::Empty; 3]; 3]);
        assert_eq!(
            world.neighbors(1, 1),
            vec![
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );
        assert_eq!(
            world.neighbors(0, 0),
            vec![Position::new(1, 0), Position::new(0, 1)]
        );
        assert_eq!(
            world.neighbors(2, 2),
            vec![Position::new(1, 2), Position::new(2, 1)]
        );
    }

    #[test]
    fn repair_updates_every_registry() {
        let mut grid = vec![vec![CellKind::Empty; 3]; 3];
        grid[1][2] = CellKind::Mutation;
        grid[2][0] = CellKind::Mutation;
        let mut world = World::from_grid(grid);
        let target = Position::new(2, 1);

        assert_eq!(world.mutations_left(), 2);
        assert!(world.discover(target));
        assert!(!world.discover(target));
        assert!(world.repair_at(2, 1));

        assert_eq!(world.mutations_left(), 1);
        assert!(!world.is_discovered(target));
        assert!(!world.mutation_positions().contains(&target));
        assert_eq!(world.cell(target), Some(CellKind::Empty));
        assert!(!world.is_repair_complete());

        assert!(!world.repair_at(2, 1));
        assert_eq!(world.mutations_left(), 1);
        assert!(world.repair_at(0, 2));
        assert!(world.is_repair_complete());
    }

    #[test]
    fn discovery_ignores_non_mutation_cells() {
        let mut world = World::from_grid(vec![vec![CellKind::Empty; 2]; 2]);
        assert!(!world.discover(Position::origin()));
        assert!(!world.discover(Position::new(1, 1)));
        assert!(world.discovered().is_empty());
    }

    #[test]
    fn from_grid_forces_origin_source() {
        let mut grid = vec![vec![CellKind::Empty; 2]; 2];
        grid[0][0] = CellKind::Mutation;
        let world = World::from_grid(grid);
        assert_eq!(world.cell(Position::origin()), Some(CellKind::DnaSource));
        assert_eq!(world.mutations_left(), 0);
        assert_eq!(world.visited().len(), 1);
        assert!(world.has_visited(Position::origin()));
    }
}
