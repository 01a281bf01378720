//! Random wall placement with a retry loop that only accepts mazes whose
//! search reaches the bottom row.
//!
//! Every cell rolls a left wall with probability `1 - p_top` and a top wall
//! with probability `p_top`. A top wall is skipped when the cell above is
//! already walled on its top, left and right; that would close it off
//! completely. Enclosed cells can still appear through other combinations,
//! which is fine: the retry loop only cares that the bottom is reachable.

use rand::Rng;
use tracing::{debug, info};

use crate::error::MazeError;
use crate::grid::{Grid, Layout, Walls};
use crate::search::search;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct MazeGenerator {
    layout: Layout,
    max_attempts: usize,
}

impl Default for MazeGenerator {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

impl MazeGenerator {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Generates mazes until one has a route from the entry to the bottom
    /// row. The returned grid is reset: all cells empty except the entry.
    pub fn generate(&self, rng: &mut impl Rng) -> Result<Grid, MazeError> {
        for attempt in 1..=self.max_attempts {
            let mut grid = random_maze(&self.layout, rng);
            let entry = grid.entry();
            let strike = search(&mut grid, entry);
            if strike.row == self.layout.bottom_row() {
                info!(attempt, strike_col = strike.col, "generated maze");
                grid.reset();
                return Ok(grid);
            }
            debug!(attempt, strike_row = strike.row, "maze has no route to the bottom");
        }
        Err(MazeError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// One unchecked roll of walls. May have no route to the bottom.
pub fn random_maze(layout: &Layout, rng: &mut impl Rng) -> Grid {
    let width = layout.width;
    let mut walls: Vec<Walls> = Vec::with_capacity(width * layout.height);
    for row in 0..layout.height {
        for col in 0..width {
            let encloses_above = row > 0 && {
                let above = walls[(row - 1) * width + col];
                let above_right_left = col + 1 < width && walls[(row - 1) * width + col + 1].left;
                above.top && above.left && above_right_left
            };
            let top = !encloses_above && rng.gen::<f64>() < layout.p_top;
            let left = rng.gen::<f64>() < 1.0 - layout.p_top;
            walls.push(Walls { top, left });
        }
    }
    Grid::from_walls(*layout, walls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellState, Dir, Pos};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    /// Plain flood fill over open edges, independent of the frontier search.
    fn reaches_bottom(grid: &Grid) -> bool {
        let (width, height) = grid.dimensions();
        let mut seen = vec![vec![false; width]; height];
        let mut queue = VecDeque::new();
        let entry = grid.entry();
        seen[entry.row][entry.col] = true;
        queue.push_back(entry);
        while let Some(pos) = queue.pop_front() {
            if pos.row == height - 1 {
                return true;
            }
            for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
                if !grid.can_move(pos, dir) {
                    continue;
                }
                if let Some(next) = grid.neighbor(pos, dir) {
                    if !seen[next.row][next.col] {
                        seen[next.row][next.col] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        false
    }

    #[test]
    fn test_generated_maze_reaches_bottom() {
        let mut rng = StdRng::seed_from_u64(7);
        let generator = MazeGenerator::default();
        for _ in 0..3 {
            let grid = generator.generate(&mut rng).expect("maze generation failed");
            assert_eq!(grid.dimensions(), (64, 128));
            assert!(reaches_bottom(&grid), "generated maze has no route down");
        }
    }

    #[test]
    fn test_generated_maze_is_reset() {
        let mut rng = StdRng::seed_from_u64(99);
        let grid = MazeGenerator::default()
            .generate(&mut rng)
            .expect("maze generation failed");
        assert_eq!(grid.state(Pos::new(0, 32)), CellState::Start);
        assert_eq!(grid.count(|s| *s == CellState::Start), 1);
        assert_eq!(grid.count(|s| *s == CellState::Empty), 64 * 128 - 1);
    }

    #[test]
    fn test_small_layouts_are_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        let generator = MazeGenerator::new(Layout::new(6, 10).unwrap());
        for _ in 0..20 {
            let grid = generator.generate(&mut rng).expect("maze generation failed");
            assert!(reaches_bottom(&grid));
        }
    }

    #[test]
    fn test_avoids_closing_the_cell_above() {
        let layout = Layout::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5 {
            let grid = random_maze(&layout, &mut rng);
            for row in 1..layout.height {
                for col in 0..layout.width - 1 {
                    let above = grid.walls(Pos::new(row - 1, col));
                    let above_right = grid.walls(Pos::new(row - 1, col + 1));
                    if above.top && above.left && above_right.left {
                        assert!(
                            !grid.walls(Pos::new(row, col)).top,
                            "cell ({}, {col}) sealed from all sides",
                            row - 1
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_wall_density_tracks_p_top() {
        let layout = Layout::default();
        let mut rng = StdRng::seed_from_u64(5);
        let grid = random_maze(&layout, &mut rng);
        let cells = (layout.width * layout.height) as f64;
        let tops = grid.iter().filter(|(_, c)| c.walls.top).count() as f64 / cells;
        let lefts = grid.iter().filter(|(_, c)| c.walls.left).count() as f64 / cells;

        // The guard only ever removes top walls.
        assert!(tops <= layout.p_top + 0.03, "top density {tops}");
        assert!(tops > layout.p_top - 0.1, "top density {tops}");
        assert!((lefts - (1.0 - layout.p_top)).abs() < 0.03, "left density {lefts}");
    }

    #[test]
    fn test_single_attempt_surfaces_exhaustion() {
        // On a 1x2 layout the only edge down is walled with probability p_top,
        // so across enough seeds a single attempt both succeeds and fails.
        let layout = Layout::new(1, 2).unwrap();
        let generator = MazeGenerator::new(layout).with_max_attempts(1);
        assert_eq!(generator.max_attempts(), 1);

        let outcomes: Vec<Result<Grid, MazeError>> = (0..64)
            .map(|seed| generator.generate(&mut StdRng::seed_from_u64(seed)))
            .collect();
        assert!(outcomes.iter().any(|r| r.is_ok()));
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(MazeError::GenerationExhausted { attempts: 1 }))));
        for grid in outcomes.into_iter().flatten() {
            assert!(reaches_bottom(&grid));
        }
    }

    #[test]
    fn test_zero_attempts_clamps_to_one() {
        let generator = MazeGenerator::default().with_max_attempts(0);
        assert_eq!(generator.max_attempts(), 1);
    }
}
