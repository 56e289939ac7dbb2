// Entry point: parses the command line, builds the board, and hands it to
// one of the two front-ends.

use std::error::Error;

use clap::{Parser, ValueEnum};

// Module declarations
mod msw_board; // Core board model
mod msw_cli;   // Text command loop
mod msw_color; // Cross-platform color matching utilities
mod msw_ui;    // Mouse-driven TUI front-end

use msw_board::{Board, Difficulty};

/// A terminal-based classic Minesweeper game
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 9)]
    width: usize,

    /// Board height in cells
    #[arg(long, default_value_t = 9)]
    height: usize,

    /// Number of mines
    #[arg(long, default_value_t = 10)]
    mines: usize,

    /// Preset overriding width/height/mines
    #[arg(long, value_enum)]
    difficulty: Option<Preset>,

    /// Start the mouse-driven TUI instead of the text command loop
    #[arg(long)]
    tui: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
    TooHard,
}

impl Preset {
    fn difficulty(self) -> Difficulty {
        match self {
            Preset::Beginner => Difficulty::Beginner,
            Preset::Intermediate => Difficulty::Intermediate,
            Preset::Expert => Difficulty::Expert,
            Preset::TooHard => Difficulty::TooHard,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let difficulty = match args.difficulty {
        Some(preset) => preset.difficulty(),
        None => Difficulty::Custom(args.width, args.height, args.mines),
    };
    if args.tui {
        msw_ui::run(difficulty)
    } else {
        let mut board = Board::from_difficulty(difficulty)?;
        msw_cli::run(&mut board)?;
        Ok(())
    }
}
