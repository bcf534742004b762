use crate::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
    #[error("Invalid board configuration: {rows}x{cols} with {mines} mines")]
    InvalidDimensions { rows: u32, cols: u32, mines: u32 },
}
