//! Lightning over a random maze.
//!
//! A [`MazeGenerator`] builds a [`Grid`] of walled cells that is guaranteed to
//! have a route from the entry cell on the top row down to the bottom row.
//! [`LightningCycle`] then replays the same animation forever: a frontier
//! search floods the maze from the entry, the deepest branch is traced back
//! as the strike, the strike flashes, and the grid resets.
//!
//! Rendering is left to the caller. Between calls to
//! [`LightningCycle::advance`] the grid can be read cell by cell.

pub mod config;
pub mod cycle;
pub mod error;
pub mod grid;
pub mod maze;
pub mod search;
pub mod trace;

pub use config::Settings;
pub use cycle::{LightningCycle, Phase};
pub use error::MazeError;
pub use grid::{Cell, CellState, Dir, Grid, Layout, Pos, Walls};
pub use maze::MazeGenerator;
pub use search::{search, PathSearch};
pub use trace::{trace_flash, trace_strike, FlashTrace, Step, StrikeTrace};

/// Columns in the shipped maze.
pub const MAZE_WIDTH: usize = 64;
/// Rows in the shipped maze.
pub const MAZE_HEIGHT: usize = 128;
