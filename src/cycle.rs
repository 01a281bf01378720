//! The endless strike loop.
//!
//! One cycle emits `Start` once, then one `Path` per search round, one
//! `Strike` per strike checkpoint and one `Flash` per flashed cell. When the
//! flash runs out the grid is reset and the next call starts over. The
//! walls never change between cycles.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::error::MazeError;
use crate::grid::{Grid, Pos};
use crate::maze::MazeGenerator;
use crate::search::PathSearch;
use crate::trace::{FlashTrace, Step, StrikeTrace};

const START_DELAY_MS: u64 = 200;
const PATH_DELAY_MS: u64 = 20;
const STRIKE_DELAY_MS: u64 = 0;
const FLASH_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Path,
    Strike,
    Flash,
}

impl Phase {
    /// Suggested minimum spacing between the step that produced this phase
    /// and the next call to [`LightningCycle::advance`].
    pub fn delay(self) -> Duration {
        let ms = match self {
            Phase::Start => START_DELAY_MS,
            Phase::Path => PATH_DELAY_MS,
            Phase::Strike => STRIKE_DELAY_MS,
            Phase::Flash => FLASH_DELAY_MS,
        };
        Duration::from_millis(ms)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Path => "path",
            Phase::Strike => "strike",
            Phase::Flash => "flash",
        }
    }
}

/// What the next `advance` call will drive.
#[derive(Debug, Clone)]
enum Stage {
    Pending,
    Searching(PathSearch),
    Striking { trace: StrikeTrace, strike: Pos },
    Flashing(FlashTrace),
}

#[derive(Debug, Clone)]
pub struct LightningCycle {
    grid: Grid,
    stage: Stage,
    phase: Phase,
    strike: Option<Pos>,
    cycles: u64,
    advances: u64,
}

impl LightningCycle {
    /// Generates a maze on the default layout and parks the cycle at `Start`.
    pub fn new(rng: &mut impl Rng) -> Result<Self, MazeError> {
        Self::generate(&MazeGenerator::default(), rng)
    }

    pub fn generate(generator: &MazeGenerator, rng: &mut impl Rng) -> Result<Self, MazeError> {
        Ok(Self::from_grid(generator.generate(rng)?))
    }

    /// Runs the cycle over an existing grid. Its cell state is reset first.
    pub fn from_grid(mut grid: Grid) -> Self {
        grid.reset();
        Self {
            grid,
            stage: Stage::Pending,
            phase: Phase::Start,
            strike: None,
            cycles: 0,
            advances: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Phase produced by the most recent `advance`, `Start` before the first.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Strike point of the current cycle, once the search has finished.
    pub fn strike_point(&self) -> Option<Pos> {
        self.strike
    }

    /// Completed cycles, counted at each reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn advances(&self) -> u64 {
        self.advances
    }

    /// How long the host should wait before the next `advance`.
    pub fn next_delay(&self) -> Duration {
        if self.advances == 0 {
            Duration::ZERO
        } else {
            self.phase.delay()
        }
    }

    /// Performs exactly one visible step and returns its phase. A stage
    /// that has nothing left hands over to the next one within the same
    /// call.
    pub fn advance(&mut self) -> Phase {
        self.advances += 1;
        loop {
            let next = match &mut self.stage {
                Stage::Pending => {
                    self.stage = Stage::Searching(PathSearch::new(self.grid.entry()));
                    return self.emit(Phase::Start);
                }
                Stage::Searching(search) => {
                    if search.step(&mut self.grid).is_some() {
                        return self.emit(Phase::Path);
                    }
                    let strike = search.strike_point();
                    debug!(
                        row = strike.row,
                        col = strike.col,
                        rounds = search.rounds(),
                        "search finished"
                    );
                    self.strike = Some(strike);
                    Stage::Striking {
                        trace: StrikeTrace::new(strike),
                        strike,
                    }
                }
                Stage::Striking { trace, strike } => {
                    if trace.step(&mut self.grid).is_some() {
                        return self.emit(Phase::Strike);
                    }
                    Stage::Flashing(FlashTrace::new(*strike))
                }
                Stage::Flashing(trace) => {
                    if trace.step(&mut self.grid).is_some() {
                        return self.emit(Phase::Flash);
                    }
                    self.grid.reset();
                    self.cycles += 1;
                    self.strike = None;
                    debug!(cycles = self.cycles, "cycle complete, grid reset");
                    Stage::Pending
                }
            };
            self.stage = next;
        }
    }

    fn emit(&mut self, phase: Phase) -> Phase {
        self.phase = phase;
        phase
    }
}
