// Plain text front-end: a line-oriented command loop over stdin/stdout.
// Commands: r x y (reveal), f x y (flag), h (help), q (quit).
// Coordinates are 0-indexed, x is column, y is row.

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::msw_board::{Board, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reveal(usize, usize),
    Flag(usize, usize),
    Help,
    Quit,
}

/// Malformed command line, reported to the user without ending the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCommand(pub String);

impl fmt::Display for InvalidCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid command: {}", self.0)
    }
}

impl std::error::Error for InvalidCommand {}

/// Parse one line of input. Verbs are case-insensitive and accept the long
/// forms (reveal/flag/help/quit/exit) next to the single-letter ones.
pub fn parse_command(input: &str) -> Result<Command, InvalidCommand> {
    let mut parts = input.split_whitespace();
    let verb = match parts.next() {
        Some(v) => v.to_ascii_lowercase(),
        None => return Err(InvalidCommand("empty input".to_string())),
    };
    match verb.as_str() {
        "h" | "help" => no_args(parts, Command::Help),
        "q" | "quit" | "exit" => no_args(parts, Command::Quit),
        "r" | "reveal" => {
            let (x, y) = coord_args(parts)?;
            Ok(Command::Reveal(x, y))
        }
        "f" | "flag" => {
            let (x, y) = coord_args(parts)?;
            Ok(Command::Flag(x, y))
        }
        _ => Err(InvalidCommand(format!(
            "unknown command '{}', type 'h' for help",
            verb
        ))),
    }
}

fn no_args<'a, I>(mut parts: I, cmd: Command) -> Result<Command, InvalidCommand>
where
    I: Iterator<Item = &'a str>,
{
    match parts.next() {
        None => Ok(cmd),
        Some(extra) => Err(InvalidCommand(format!("unexpected argument '{}'", extra))),
    }
}

fn coord_args<'a, I>(mut parts: I) -> Result<(usize, usize), InvalidCommand>
where
    I: Iterator<Item = &'a str>,
{
    let x = parts
        .next()
        .ok_or_else(|| InvalidCommand("use: r x y or f x y".to_string()))?;
    let y = parts
        .next()
        .ok_or_else(|| InvalidCommand("use: r x y or f x y".to_string()))?;
    if parts.next().is_some() {
        return Err(InvalidCommand("use: r x y or f x y".to_string()));
    }
    let x = x
        .parse()
        .map_err(|_| InvalidCommand("x and y must be non-negative integers".to_string()))?;
    let y = y
        .parse()
        .map_err(|_| InvalidCommand("x and y must be non-negative integers".to_string()))?;
    Ok((x, y))
}

/// Run the command loop against real stdin/stdout.
pub fn run(board: &mut Board) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_loop(board, stdin.lock(), stdout.lock())
}

/// The loop itself, generic over the streams so tests can drive it with
/// in-memory buffers. Invalid commands and positions are reported and the
/// loop continues; only quit, EOF, or the end of the game leave it.
pub fn run_loop<R: BufRead, W: Write>(
    board: &mut Board,
    mut input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(
        out,
        "minswpr - type 'h' for help. Coordinates are 0-indexed (x y)."
    )?;
    let mut line = String::new();
    loop {
        writeln!(out)?;
        write!(out, "{}", board.render())?;
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let cmd = match parse_command(trimmed) {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };
        match cmd {
            Command::Quit => {
                writeln!(out, "Bye!")?;
                return Ok(());
            }
            Command::Help => print_help(&mut out)?,
            Command::Flag(x, y) => {
                if let Err(e) = board.toggle_flag(x, y) {
                    writeln!(out, "{}", e)?;
                }
            }
            Command::Reveal(x, y) => {
                if let Err(e) = board.reveal(x, y) {
                    writeln!(out, "{}", e)?;
                    continue;
                }
                match board.state() {
                    GameState::Lost => {
                        writeln!(out)?;
                        write!(out, "{}", board.render_revealed())?;
                        writeln!(out, "Boom! You hit a mine.")?;
                        return Ok(());
                    }
                    GameState::Won => {
                        writeln!(out)?;
                        write!(out, "{}", board.render_revealed())?;
                        writeln!(out, "You win! All safe cells revealed.")?;
                        return Ok(());
                    }
                    GameState::InProgress => {}
                }
            }
        }
    }
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  r x y   reveal cell (x,y)")?;
    writeln!(out, "  f x y   flag/unflag cell (x,y)")?;
    writeln!(out, "  h       help")?;
    writeln!(out, "  q       quit")
}
