use crate::{GameError, MoveSnapshot, Position};
use itertools::iproduct;
use ndarray::Array2;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    is_mine: bool,
    is_revealed: bool,
    is_flagged: bool,
    adjacent_mines: u8,
}

impl Cell {
    fn new(position: Position) -> Self {
        Self {
            position,
            is_mine: false,
            is_revealed: false,
            is_flagged: false,
            adjacent_mines: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub fn is_revealed(&self) -> bool {
        self.is_revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub(crate) fn set_mine(&mut self, mine: bool) {
        self.is_mine = mine;
    }

    pub(crate) fn set_revealed(&mut self, revealed: bool) {
        self.is_revealed = revealed;
    }

    pub(crate) fn set_flagged(&mut self, flagged: bool) {
        self.is_flagged = flagged;
    }

    pub(crate) fn set_adjacent_mines(&mut self, count: u8) {
        self.adjacent_mines = count;
    }

    /// Copies every mutable field back from a saved snapshot copy. The
    /// position is identity and stays untouched.
    pub(crate) fn restore_from(&mut self, saved: &Cell) {
        self.is_mine = saved.is_mine;
        self.is_revealed = saved.is_revealed;
        self.is_flagged = saved.is_flagged;
        self.adjacent_mines = saved.adjacent_mines;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    cells: Array2<Cell>,
    rows: u32,
    cols: u32,
    total_mines: u32,
}

impl Board {
    /// Builds a mine-free board. Mines are placed later, on the first
    /// reveal, so the first click can be kept safe.
    ///
    /// The mine count must leave room outside the worst-case first-click
    /// safe zone of `min(rows,3) * min(cols,3)` cells, otherwise the
    /// rejection-sampling placement could never finish.
    pub fn new(rows: u32, cols: u32, mines: u32) -> Result<Self, GameError> {
        let total_cells = rows as u64 * cols as u64;
        let max_safe_zone = (rows.min(3) * cols.min(3)) as u64;

        if rows == 0 || cols == 0 || mines == 0 || mines as u64 + max_safe_zone > total_cells {
            return Err(GameError::InvalidDimensions { rows, cols, mines });
        }
        Ok(Self::build(rows, cols, mines))
    }

    /// Builds a board with mines already at the given positions and
    /// adjacency counts computed, for deterministic setups and tests.
    pub fn with_mines_at(rows: u32, cols: u32, mines: &[Position]) -> Result<Self, GameError> {
        let mut board = Self::new(rows, cols, mines.len() as u32)?;
        for &pos in mines {
            if !board.is_within_bounds(pos) {
                return Err(GameError::OutOfBounds(pos));
            }
            let cell = &mut board.cells[Self::index(pos)];
            if cell.is_mine() {
                // A duplicate position means the layout does not hold the
                // advertised number of mines.
                return Err(GameError::InvalidDimensions {
                    rows,
                    cols,
                    mines: mines.len() as u32,
                });
            }
            cell.set_mine(true);
        }
        board.recount_adjacent_mines();
        Ok(board)
    }

    fn build(rows: u32, cols: u32, mines: u32) -> Self {
        let cells = Array2::from_shape_fn((rows as usize, cols as usize), |(r, c)| {
            Cell::new(Position::new(r as i32, c as i32))
        });
        Board {
            cells,
            rows,
            cols,
            total_mines: mines,
        }
    }

    /// Fresh, empty board with the same already-validated configuration.
    pub(crate) fn cleared(&self) -> Self {
        Self::build(self.rows, self.cols, self.total_mines)
    }

    // Index into the grid; only valid for in-bounds positions.
    fn index(pos: Position) -> [usize; 2] {
        [pos.row as usize, pos.col as usize]
    }

    /// Places `total_mines` mines by rejection sampling, keeping the safe
    /// cell and its clipped 8-neighborhood mine-free, then recounts every
    /// non-mine cell's adjacent mines.
    pub(crate) fn place_mines(&mut self, safe: Position, rng: &mut impl Rng) {
        let safe_zone: HashSet<Position> = safe
            .neighbors()
            .filter(|p| self.is_within_bounds(*p))
            .chain(std::iter::once(safe))
            .collect();

        let mut mines_placed = 0;
        while mines_placed < self.total_mines {
            let pos = Position::new(
                rng.gen_range(0..self.rows) as i32,
                rng.gen_range(0..self.cols) as i32,
            );
            if safe_zone.contains(&pos) || self.cells[Self::index(pos)].is_mine() {
                continue;
            }
            self.cells[Self::index(pos)].set_mine(true);
            mines_placed += 1;
        }

        self.recount_adjacent_mines();
    }

    fn recount_adjacent_mines(&mut self) {
        for pos in self.iter_positions() {
            if self.cells[Self::index(pos)].is_mine() {
                continue;
            }
            let count = self.count_adjacent_mines(pos);
            self.cells[Self::index(pos)].set_adjacent_mines(count);
        }
    }

    pub fn count_adjacent_mines(&self, pos: Position) -> u8 {
        pos.neighbors()
            .filter(|p| self.is_within_bounds(*p))
            .filter(|p| self.cells[Self::index(*p)].is_mine())
            .count() as u8
    }

    /// Breadth-first reveal set starting at `origin`: the origin plus, from
    /// every zero-count cell, its unrevealed, unflagged neighbors. Each
    /// visited cell is recorded into `snapshot` before any mutation happens
    /// anywhere; the caller applies the actual reveals afterwards.
    pub(crate) fn cells_to_reveal(
        &self,
        origin: Position,
        snapshot: &mut MoveSnapshot,
    ) -> Vec<Position> {
        let mut to_reveal = Vec::new();
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();

        if self.is_within_bounds(origin) {
            let cell = &self.cells[Self::index(origin)];
            if !cell.is_revealed() && !cell.is_flagged() {
                queue.push_back(origin);
                visited.insert(origin);
            }
        }

        while let Some(pos) = queue.pop_front() {
            let cell = &self.cells[Self::index(pos)];
            snapshot.record_cell(cell);
            to_reveal.push(pos);

            // Numbered cells are revealed but stop the expansion.
            if cell.adjacent_mines() != 0 {
                continue;
            }

            for neighbor in pos.neighbors() {
                if !self.is_within_bounds(neighbor) || visited.contains(&neighbor) {
                    continue;
                }
                let next = &self.cells[Self::index(neighbor)];
                if next.is_revealed() || next.is_flagged() {
                    continue;
                }
                queue.push_back(neighbor);
                visited.insert(neighbor);
            }
        }

        to_reveal
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.rows as i32 && pos.col >= 0 && pos.col < self.cols as i32
    }

    pub fn cell(&self, pos: Position) -> Result<&Cell, GameError> {
        if !self.is_within_bounds(pos) {
            return Err(GameError::OutOfBounds(pos));
        }
        Ok(&self.cells[Self::index(pos)])
    }

    pub(crate) fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        if self.is_within_bounds(pos) {
            Some(&mut self.cells[Self::index(pos)])
        } else {
            None
        }
    }

    /// Row-major iteration over every position of the board.
    pub fn iter_positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.rows as i32, 0..self.cols as i32).map(|(row, col)| Position::new(row, col))
    }

    pub(crate) fn iter_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn total_mines(&self) -> u32 {
        self.total_mines
    }
}
