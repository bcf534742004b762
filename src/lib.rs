pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod position;
pub mod snapshot;

pub use board::{Board, Cell};
pub use config::{max_custom_mines, number_color, BoardConfig, Difficulty, Rgb};
pub use error::GameError;
pub use game::Game;
pub use position::Position;
pub use snapshot::MoveSnapshot;
