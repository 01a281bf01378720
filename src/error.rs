use thiserror::Error;

/// Errors raised while building a maze.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    /// Dimensions that cannot hold a strike (zero-sized or a single row).
    #[error("invalid layout: {0}")]
    InvalidLayout(&'static str),
    /// Every attempt produced a maze with no route to the bottom row.
    #[error("could not generate a valid maze after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}
