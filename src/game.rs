use crate::{Board, Cell, GameError, MoveSnapshot, Position};

/// The game engine: a board plus the undo machinery. Every command is a
/// soft refusal (`false`) when it is not allowed in the current state; hard
/// errors exist only for construction and out-of-bounds queries.
pub struct Game {
    board: Board,
    flags_placed: u32,
    game_over: bool,
    game_won: bool,
    first_move: bool,
    undo_stack: Vec<MoveSnapshot>,
    // Fatal reveals are terminal and never snapshotted; the one position is
    // remembered here so they can still be undone.
    last_mine: Option<Position>,
}

impl Game {
    pub fn new(rows: u32, cols: u32, mines: u32) -> Result<Self, GameError> {
        Ok(Self::over_board(Board::new(rows, cols, mines)?, true))
    }

    /// Wraps a board whose mines are already laid out, e.g. one built with
    /// [`Board::with_mines_at`]. The first-click placement step is skipped.
    pub fn with_board(board: Board) -> Self {
        Self::over_board(board, false)
    }

    fn over_board(board: Board, first_move: bool) -> Self {
        Self {
            board,
            flags_placed: 0,
            game_over: false,
            game_won: false,
            first_move,
            undo_stack: Vec::new(),
            last_mine: None,
        }
    }

    /// Reveals a cell. Refused when the game is over, the position is
    /// invalid, or the cell is already revealed or flagged.
    ///
    /// A mine reveal ends the game and is recorded only in the fatal-mine
    /// slot. A safe reveal snapshots the flood-fill region before mutating
    /// it; the first reveal of a game additionally pushes a snapshot of the
    /// whole pre-placement board, so "mines appeared" and "cells were
    /// revealed" stay separately undoable.
    pub fn reveal(&mut self, pos: Position) -> bool {
        if self.game_over || !self.board.is_within_bounds(pos) {
            return false;
        }
        let cell = match self.board.cell(pos) {
            Ok(cell) => cell,
            Err(_) => return false,
        };
        if cell.is_revealed() || cell.is_flagged() {
            return false;
        }

        if cell.is_mine() {
            self.last_mine = Some(pos);
            if let Some(cell) = self.board.cell_mut(pos) {
                cell.set_revealed(true);
            }
            self.game_over = true;
            return true;
        }

        if self.first_move {
            let mut initial = self.snapshot();
            for cell in self.board.iter_cells() {
                initial.record_cell(cell);
            }
            self.undo_stack.push(initial);

            self.board.place_mines(pos, &mut rand::thread_rng());
            self.first_move = false;
        }

        let mut snapshot = self.snapshot();
        let to_reveal = self.board.cells_to_reveal(pos, &mut snapshot);
        for pos in to_reveal {
            if let Some(cell) = self.board.cell_mut(pos) {
                cell.set_revealed(true);
            }
        }
        self.undo_stack.push(snapshot);

        self.check_win_condition();
        true
    }

    /// Toggles a flag. Refused when the game is over, the position is
    /// invalid, the cell is revealed, or adding a flag would exceed the mine
    /// count; removing a flag is always allowed.
    pub fn toggle_flag(&mut self, pos: Position) -> bool {
        if self.game_over || !self.board.is_within_bounds(pos) {
            return false;
        }
        let cell = match self.board.cell(pos) {
            Ok(cell) => cell,
            Err(_) => return false,
        };
        if cell.is_revealed() {
            return false;
        }
        let was_flagged = cell.is_flagged();
        if !was_flagged && self.flags_placed >= self.board.total_mines() {
            return false;
        }

        let mut snapshot = self.snapshot();
        snapshot.record_cell(cell);

        if let Some(cell) = self.board.cell_mut(pos) {
            cell.set_flagged(!was_flagged);
        }
        if was_flagged {
            self.flags_placed -= 1;
        } else {
            self.flags_placed += 1;
        }
        self.undo_stack.push(snapshot);

        self.check_win_condition();
        true
    }

    /// Reverses the most recent move. A loss by mine reveal is undone
    /// through the fatal-mine slot first and does not consume a stack
    /// entry; otherwise the newest snapshot is popped and replayed.
    pub fn undo(&mut self) -> bool {
        if self.game_over && !self.game_won {
            if let Some(pos) = self.last_mine.take() {
                if let Some(cell) = self.board.cell_mut(pos) {
                    cell.set_revealed(false);
                }
                self.game_over = false;
                return true;
            }
        }

        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: MoveSnapshot) {
        self.game_over = snapshot.game_over();
        self.game_won = snapshot.game_won();
        self.flags_placed = snapshot.flags_placed();
        self.first_move = snapshot.first_move();

        for saved in snapshot.cells() {
            if let Some(cell) = self.board.cell_mut(saved.position()) {
                cell.restore_from(saved);
            }
        }
    }

    fn snapshot(&self) -> MoveSnapshot {
        MoveSnapshot::new(
            self.game_over,
            self.game_won,
            self.flags_placed,
            self.first_move,
        )
    }

    fn check_win_condition(&mut self) {
        // No mines exist before the first reveal places them; the flagging
        // win path would be vacuously satisfiable on the pristine board.
        if self.first_move {
            return;
        }

        let mut all_non_mines_revealed = true;
        let mut all_mines_flagged = true;
        let mut no_incorrect_flags = true;

        for cell in self.board.iter_cells() {
            if cell.is_mine() {
                if !cell.is_flagged() {
                    all_mines_flagged = false;
                }
            } else {
                if !cell.is_revealed() {
                    all_non_mines_revealed = false;
                }
                if cell.is_flagged() {
                    no_incorrect_flags = false;
                }
            }
        }

        if all_non_mines_revealed || (all_mines_flagged && no_incorrect_flags) {
            self.game_won = true;
            self.game_over = true;
        }
    }

    /// Starts a fresh game with the current configuration.
    pub fn reset(&mut self) {
        let board = self.board.cleared();
        self.install(board);
    }

    /// Starts a fresh game with new dimensions; the current game is left
    /// untouched if they are invalid.
    pub fn reset_with(&mut self, rows: u32, cols: u32, mines: u32) -> Result<(), GameError> {
        let board = Board::new(rows, cols, mines)?;
        self.install(board);
        Ok(())
    }

    fn install(&mut self, board: Board) {
        self.board = board;
        self.flags_placed = 0;
        self.game_over = false;
        self.game_won = false;
        self.first_move = true;
        self.undo_stack.clear();
        self.last_mine = None;
    }

    pub fn cell(&self, pos: Position) -> Result<&Cell, GameError> {
        self.board.cell(pos)
    }

    pub fn rows(&self) -> u32 {
        self.board.rows()
    }

    pub fn cols(&self) -> u32 {
        self.board.cols()
    }

    pub fn total_mines(&self) -> u32 {
        self.board.total_mines()
    }

    pub fn flags_placed(&self) -> u32 {
        self.flags_placed
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_game_won(&self) -> bool {
        self.game_won
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}
