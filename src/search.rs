//! Frontier search from the entry cell.
//!
//! Every round expands the whole current frontier by one edge. Newly reached
//! cells become [`CellState::Path`] with a back-pointer to the cell that
//! admitted them, so the grid ends up holding a predecessor tree rooted at
//! the entry. The deepest frontier cell of each round is the round's strike
//! candidate; the search stops once the candidate sits on the bottom row or
//! there is nothing left to expand.

use crate::grid::{CellState, Dir, Grid, Pos};
use crate::trace::Step;

/// Brightness of a cell on `row` while the deepest known row is
/// `strike_row`: full at the strike, fading to zero over a quarter of the
/// grid height.
pub fn brightness(strike_row: usize, row: usize, height: usize) -> f32 {
    let distance = strike_row as f32 - row as f32;
    (1.0 - 4.0 * distance / height as f32).clamp(0.0, 1.0)
}

/// Resumable frontier search. Each [`PathSearch::step`] runs one round.
#[derive(Debug, Clone)]
pub struct PathSearch {
    frontier: Vec<Pos>,
    strike: Pos,
    rounds: usize,
    finished: bool,
}

impl PathSearch {
    pub fn new(source: Pos) -> Self {
        Self {
            frontier: vec![source],
            strike: source,
            rounds: 0,
            finished: false,
        }
    }

    /// Deepest cell found so far; the final strike point once finished.
    pub fn strike_point(&self) -> Pos {
        self.strike
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Runs one round and returns its strike candidate, or `None` once the
    /// search has ended.
    pub fn step(&mut self, grid: &mut Grid) -> Option<Pos> {
        if self.finished {
            return None;
        }

        // Ties on the deepest row go to the earliest frontier entry.
        let mut candidate = self.frontier[0];
        for &pos in &self.frontier[1..] {
            if pos.row > candidate.row {
                candidate = pos;
            }
        }
        self.strike = candidate;

        let height = grid.height();
        let mut next_frontier = Vec::new();
        for &pos in &self.frontier {
            for dir in Dir::SEARCH_ORDER {
                if !grid.can_move(pos, dir) {
                    continue;
                }
                let Some(next) = grid.neighbor(pos, dir) else {
                    continue;
                };
                // Claiming the cell right away means the first admitter wins.
                if grid.state(next) != CellState::Empty {
                    continue;
                }
                grid.set_state(
                    next,
                    CellState::Path {
                        weight: brightness(candidate.row, next.row, height),
                        next: pos,
                    },
                );
                next_frontier.push(next);
            }
        }

        self.rounds += 1;
        tracing::trace!(
            round = self.rounds,
            strike_row = candidate.row,
            admitted = next_frontier.len(),
            "search round"
        );
        self.frontier = next_frontier;
        self.finished = self.frontier.is_empty() || candidate.row == grid.layout().bottom_row();
        Some(candidate)
    }
}

impl Step for PathSearch {
    fn step(&mut self, grid: &mut Grid) -> Option<Pos> {
        PathSearch::step(self, grid)
    }
}

/// Runs a full search from `source` and returns the strike point.
pub fn search(grid: &mut Grid, source: Pos) -> Pos {
    // The last round's candidate is the strike point.
    PathSearch::new(source).over(grid).last().unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, Layout, Walls};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn open_grid(width: usize, height: usize) -> Grid {
        Grid::from_fn(Layout::new(width, height).unwrap(), |_| Walls::OPEN)
    }

    fn random_grid(seed: u64, width: usize, height: usize) -> Grid {
        let mut rng = StdRng::seed_from_u64(seed);
        Grid::from_fn(Layout::new(width, height).unwrap(), |_| Walls {
            top: rng.gen_bool(0.4),
            left: rng.gen_bool(0.5),
        })
    }

    #[test]
    fn test_open_grid_reaches_bottom() {
        let mut grid = open_grid(4, 4);
        let entry = grid.entry();
        assert_eq!(entry, Pos::new(0, 2));

        let mut search = PathSearch::new(entry);
        let mut candidate_rows = Vec::new();
        while let Some(candidate) = search.step(&mut grid) {
            candidate_rows.push(candidate.row);
        }

        // Each round reports the deepest cell of the frontier it started
        // from, so row 3 is admitted in round three and reported in round
        // four, which ends the search.
        assert_eq!(candidate_rows, vec![0, 1, 2, 3]);
        assert_eq!(search.strike_point(), Pos::new(3, 2));
        assert_eq!(grid.state(entry), CellState::Start);

        // Everything within four steps of the entry has been reached. The
        // far corner is five steps away and the search stops before it.
        for (pos, cell) in grid.iter() {
            let distance = pos.row + pos.col.abs_diff(entry.col);
            match distance {
                0 => assert_eq!(cell.state, CellState::Start),
                1..=4 => assert!(
                    matches!(cell.state, CellState::Path { .. }),
                    "{pos:?} should be on the path"
                ),
                _ => assert_eq!(cell.state, CellState::Empty, "{pos:?}"),
            }
        }
    }

    #[test]
    fn test_first_admission_wins() {
        let mut grid = open_grid(4, 4);
        search(&mut grid, Pos::new(0, 2));

        // (3, 1) is reachable from (3, 2) and (2, 1) in the same round; (3, 2)
        // comes first in the frontier.
        assert_eq!(grid.state(Pos::new(3, 1)).next(), Some(Pos::new(3, 2)));
        // (1, 3) is reachable from (1, 2) and (0, 3); (1, 2) expands first.
        assert_eq!(grid.state(Pos::new(1, 3)).next(), Some(Pos::new(1, 2)));
    }

    #[test]
    fn test_weights_follow_round_candidate() {
        let mut grid = open_grid(4, 4);
        search(&mut grid, Pos::new(0, 2));

        // Admitted in round 4 with the candidate on row 3.
        assert_eq!(grid.state(Pos::new(3, 3)).weight(), Some(1.0));
        assert_eq!(grid.state(Pos::new(2, 0)).weight(), Some(0.0));
        // Admitted one row below the candidate; clamped to full brightness.
        assert_eq!(grid.state(Pos::new(3, 2)).weight(), Some(1.0));
        // Admitted in round 2 with the candidate on row 1.
        assert_eq!(grid.state(Pos::new(0, 0)).weight(), Some(0.0));
    }

    #[test]
    fn test_sealed_entry_row_strikes_row_zero() {
        let layout = Layout::new(4, 4).unwrap();
        let mut grid = Grid::from_fn(layout, |pos| Walls {
            top: pos.row == 1,
            left: false,
        });

        let entry = grid.entry();
        let strike = search(&mut grid, entry);
        assert_eq!(strike.row, 0);
        for (pos, cell) in grid.iter().filter(|(pos, _)| pos.row > 0) {
            assert_eq!(cell.state, CellState::Empty, "{pos:?}");
        }
    }

    #[test]
    fn test_walled_in_entry_stops_after_one_round() {
        let layout = Layout::new(4, 4).unwrap();
        let mut grid = Grid::from_fn(layout, |pos| Walls {
            top: pos == Pos::new(1, 2),
            left: pos == Pos::new(0, 2) || pos == Pos::new(0, 3),
        });
        let entry = grid.entry();

        let mut search = PathSearch::new(entry);
        assert_eq!(search.step(&mut grid), Some(entry));
        assert!(search.is_finished());
        assert_eq!(search.step(&mut grid), None);
        assert_eq!(search.rounds(), 1);
        assert_eq!(search.strike_point(), entry);
        assert_eq!(grid.count(|s| matches!(s, CellState::Path { .. })), 0);
    }

    #[test]
    fn test_back_pointers_lead_to_entry() {
        for seed in 0..8 {
            let mut grid = random_grid(seed, 16, 24);
            let entry = grid.entry();
            search(&mut grid, entry);

            assert_eq!(grid.state(entry), CellState::Start);
            let reached = grid.count(|s| matches!(s, CellState::Path { .. }));
            for (start, cell) in grid.iter() {
                let Some(mut cursor) = cell.state.next() else {
                    continue;
                };
                let mut hops = 1;
                while cursor != entry {
                    cursor = grid
                        .state(cursor)
                        .next()
                        .unwrap_or_else(|| panic!("chain from {start:?} broke at {cursor:?}"));
                    hops += 1;
                    assert!(hops <= reached, "chain from {start:?} loops");
                }
            }
        }
    }

    #[test]
    fn test_search_matches_manual_stepping() {
        for seed in 0..8 {
            let mut stepped = random_grid(seed, 12, 16);
            let mut driven = stepped.clone();
            let entry = stepped.entry();

            let mut manual = PathSearch::new(entry);
            while manual.step(&mut stepped).is_some() {}
            let candidates: Vec<Pos> = PathSearch::new(entry).over(&mut driven.clone()).collect();

            assert_eq!(search(&mut driven, entry), manual.strike_point());
            assert_eq!(candidates.last(), Some(&manual.strike_point()));
            assert_eq!(candidates.len(), manual.rounds());
            let a: Vec<Cell> = stepped.iter().map(|(_, c)| *c).collect();
            let b: Vec<Cell> = driven.iter().map(|(_, c)| *c).collect();
            assert_eq!(a, b, "seed {seed}");
        }
    }

    #[test]
    fn test_brightness_fades_over_quarter_height() {
        let height = 128;
        assert_eq!(brightness(100, 100, height), 1.0);
        assert_eq!(brightness(100, 101, height), 1.0);
        assert_eq!(brightness(100, 100 - 32, height), 0.0);
        assert_eq!(brightness(100, 0, height), 0.0);

        let mut last = brightness(100, 100, height);
        for distance in 1..32 {
            let weight = brightness(100, 100 - distance, height);
            assert!(weight < last, "weight must drop at distance {distance}");
            assert!((0.0..=1.0).contains(&weight));
            last = weight;
        }
    }
}
