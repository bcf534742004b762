use minesweeper_undo::{BoardConfig, Difficulty, Game, GameError, Position};
use std::io::{self, Write};

enum Command {
    Reveal(Position),
    Flag(Position),
    Undo,
    NewGame,
    Quit,
}

fn main() {
    match run_game() {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn run_game() -> Result<(), GameError> {
    let config = choose_difficulty().config();
    let mut game = Game::new(config.rows, config.cols, config.mines)?;

    loop {
        print_board(&game);
        println!("Flags: {}/{}", game.flags_placed(), game.total_mines());
        if game.is_game_over() {
            if game.is_game_won() {
                println!("Congratulations! You won!");
            } else {
                println!("Game Over! ('u' takes back the fatal click)");
            }
        }

        let Some(command) = get_user_input() else {
            continue;
        };

        match command {
            Command::Reveal(pos) => {
                if !game.reveal(pos) {
                    println!("Can't reveal that cell");
                }
            }
            Command::Flag(pos) => {
                if !game.toggle_flag(pos) {
                    println!("Can't flag that cell");
                }
            }
            Command::Undo => {
                if !game.undo() {
                    println!("Nothing to undo");
                }
            }
            Command::NewGame => game.reset(),
            Command::Quit => break,
        }
    }

    Ok(())
}

fn choose_difficulty() -> Difficulty {
    loop {
        print!("Difficulty ([b]eginner / [i]ntermediate / [e]xpert / [c]ustom): ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return Difficulty::Beginner;
        }

        match input.trim() {
            "b" | "" => return Difficulty::Beginner,
            "i" => return Difficulty::Intermediate,
            "e" => return Difficulty::Expert,
            "c" => {
                if let Some(difficulty) = read_custom() {
                    return difficulty;
                }
            }
            _ => println!("Unknown difficulty"),
        }
    }
}

fn read_custom() -> Option<Difficulty> {
    print!("Custom game (rows cols mines): ");
    io::stdout().flush().ok()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).ok()?;
    let mut parts = input.split_whitespace();

    let config = BoardConfig {
        rows: parts.next()?.parse().ok()?,
        cols: parts.next()?.parse().ok()?,
        mines: parts.next()?.parse().ok()?,
    };

    if !config.is_valid_custom() {
        println!("Custom settings out of range");
        return None;
    }

    Some(Difficulty::Custom(config))
}

fn print_board(game: &Game) {
    // Print column numbers
    print!("   ");
    for col in 0..game.cols() {
        print!("{:2} ", col);
    }
    println!();

    // Print rows
    for row in 0..game.rows() {
        print!("{:2} ", row);
        for col in 0..game.cols() {
            let pos = Position::new(row as i32, col as i32);
            match game.cell(pos) {
                Ok(cell) if cell.is_flagged() => print!(" ⚑ "),
                Ok(cell) if !cell.is_revealed() => print!(" □ "),
                Ok(cell) if cell.is_mine() => print!(" * "),
                Ok(cell) if cell.adjacent_mines() == 0 => print!("   "),
                Ok(cell) => print!(" {} ", cell.adjacent_mines()),
                Err(_) => print!(" ? "),
            }
        }
        println!();
    }
}

fn get_user_input() -> Option<Command> {
    print!("Enter command (r row col / f row col / u / n / q): ");
    io::stdout().flush().ok()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).ok()?;
    let mut parts = input.split_whitespace();

    match parts.next()? {
        "u" => Some(Command::Undo),
        "n" => Some(Command::NewGame),
        "q" => Some(Command::Quit),
        action @ ("r" | "f") => {
            let row = parts.next()?.parse().ok()?;
            let col = parts.next()?.parse().ok()?;
            let pos = Position::new(row, col);

            if action == "r" {
                Some(Command::Reveal(pos))
            } else {
                Some(Command::Flag(pos))
            }
        }
        _ => {
            println!("Unknown command. Use 'r'/'f' with coordinates, 'u', 'n' or 'q'");
            None
        }
    }
}
