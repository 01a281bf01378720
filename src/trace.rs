//! Walks from the strike point back to the entry along the search's
//! back-pointers.

use crate::grid::{CellState, Grid, Pos};

/// Number of cells the strike pass converts between checkpoints.
pub const STRIKE_BATCH: usize = 10;

/// A resumable stage that mutates the grid one step at a time.
pub trait Step {
    /// Advances by one step, returning the step's coordinate, or `None` once
    /// the stage is exhausted.
    fn step(&mut self, grid: &mut Grid) -> Option<Pos>;

    /// Drives the stage as an iterator over `grid`.
    fn over(self, grid: &mut Grid) -> Steps<'_, Self>
    where
        Self: Sized,
    {
        Steps {
            grid,
            stage: self,
        }
    }
}

/// Iterator returned by [`Step::over`].
pub struct Steps<'g, S> {
    grid: &'g mut Grid,
    stage: S,
}

impl<S: Step> Iterator for Steps<'_, S> {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        self.stage.step(self.grid)
    }
}

/// Converts the route from `Path` to `Strike`, reporting a checkpoint every
/// [`STRIKE_BATCH`] cells and once more where the walk stops.
#[derive(Debug, Clone)]
pub struct StrikeTrace {
    cursor: Pos,
    converted: usize,
    finished: bool,
}

impl StrikeTrace {
    pub fn new(strike: Pos) -> Self {
        Self {
            cursor: strike,
            converted: 0,
            finished: false,
        }
    }

    pub fn converted(&self) -> usize {
        self.converted
    }
}

impl Step for StrikeTrace {
    fn step(&mut self, grid: &mut Grid) -> Option<Pos> {
        while !self.finished {
            match grid.state(self.cursor) {
                CellState::Path { next, .. } => {
                    let here = self.cursor;
                    grid.set_state(here, CellState::Strike { next });
                    self.converted += 1;
                    self.cursor = next;
                    if self.converted % STRIKE_BATCH == 0 {
                        return Some(here);
                    }
                }
                _ => {
                    self.finished = true;
                    if self.converted % STRIKE_BATCH != 0 {
                        return Some(self.cursor);
                    }
                }
            }
        }
        None
    }
}

/// Converts the struck route to `Flash`, one cell per step.
#[derive(Debug, Clone)]
pub struct FlashTrace {
    cursor: Pos,
    finished: bool,
}

impl FlashTrace {
    pub fn new(strike: Pos) -> Self {
        Self {
            cursor: strike,
            finished: false,
        }
    }
}

impl Step for FlashTrace {
    fn step(&mut self, grid: &mut Grid) -> Option<Pos> {
        if self.finished {
            return None;
        }
        match grid.state(self.cursor) {
            CellState::Strike { next } => {
                let here = self.cursor;
                grid.set_state(here, CellState::Flash);
                self.cursor = next;
                Some(here)
            }
            _ => {
                self.finished = true;
                None
            }
        }
    }
}

pub fn trace_strike(grid: &mut Grid, strike: Pos) -> Steps<'_, StrikeTrace> {
    StrikeTrace::new(strike).over(grid)
}

pub fn trace_flash(grid: &mut Grid, strike: Pos) -> Steps<'_, FlashTrace> {
    FlashTrace::new(strike).over(grid)
}
