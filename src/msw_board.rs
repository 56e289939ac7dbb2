// Core board model: mine placement, reveal propagation, win/loss evaluation.
// Both front-ends drive the game exclusively through this module.

use rand::prelude::*;
use std::fmt;

/// Difficulty presets and custom settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,                    // 9x9, 10 mines
    Intermediate,                // 16x16, 40 mines
    Expert,                      // 30x16, 99 mines
    TooHard,                     // 30x24, 180 mines
    Custom(usize, usize, usize), // width, height, mines
}

impl Difficulty {
    /// Get game dimensions (width, height, mine count) for this difficulty
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Beginner => (9, 9, 10),
            Difficulty::Intermediate => (16, 16, 40),
            Difficulty::Expert => (30, 16, 99),
            Difficulty::TooHard => (30, 24, 180),
            Difficulty::Custom(w, h, n) => (*w, *h, *n),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Expert => "Expert",
            Difficulty::TooHard => "Too hard",
            Difficulty::Custom(_, _, _) => "Custom",
        }
    }
}

/// Errors reported by board operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Coordinates outside the grid
    InvalidPosition { x: usize, y: usize },
    /// Rejected construction parameters (zero dimensions, too many mines)
    InvalidConfig(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidPosition { x, y } => {
                write!(f, "position ({}, {}) is outside the board", x, y)
            }
            BoardError::InvalidConfig(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BoardError {}

/// Visible state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
}

/// A single cell on the minesweeper board
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub mine: bool,      // Contains a mine
    pub adj: u8,         // Adjacent mine count (0-8)
    pub state: CellState,
}

/// Overall game progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameState::InProgress)
    }
}

/// Main game state
///
/// The mine layout does not exist until the first reveal; placement then
/// avoids the revealed cell and its neighbors so the first move is always
/// safe. Once the game is won or lost, reveal and flag become no-ops.
#[derive(Clone)]
pub struct Board {
    w: usize,
    h: usize,
    mines: usize,
    cells: Vec<Cell>, // row-major, index = y * w + x
    mines_placed: bool,
    revealed_count: usize,
    state: GameState,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl Board {
    /// Create a new board with an empty mine layout.
    /// Mines are placed on first reveal to guarantee a safe first click.
    pub fn new(width: usize, height: usize, mines: usize) -> Result<Board, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidConfig(
                "width and height must be positive".to_string(),
            ));
        }
        if mines >= width * height {
            return Err(BoardError::InvalidConfig(format!(
                "mines must be at most {}",
                width * height - 1
            )));
        }
        Ok(Board {
            w: width,
            h: height,
            mines,
            cells: vec![
                Cell {
                    mine: false,
                    adj: 0,
                    state: CellState::Hidden,
                };
                width * height
            ],
            mines_placed: false,
            revealed_count: 0,
            state: GameState::InProgress,
        })
    }

    pub fn from_difficulty(d: Difficulty) -> Result<Board, BoardError> {
        let (w, h, n) = d.params();
        Board::new(w, h, n)
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// Number of flagged cells.
    pub fn flag_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.state == CellState::Flagged)
            .count()
    }

    /// Mine counter display value (total mines - flagged cells).
    /// Can be negative if the player places too many flags.
    pub fn remaining_mines(&self) -> isize {
        self.mines as isize - self.flag_count() as isize
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.w && y < self.h
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(8);
        for ny in y.saturating_sub(1)..=(y + 1).min(self.h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(self.w - 1) {
                if nx == x && ny == y {
                    continue;
                }
                out.push((nx, ny));
            }
        }
        out
    }

    /// Randomly place mines, excluding the first-revealed cell and its
    /// neighbors. When the board is too small to honor the full exclusion
    /// zone, only the revealed cell itself is excluded.
    fn place_mines<R: Rng>(&mut self, rng: &mut R, safe_x: usize, safe_y: usize) {
        let n = self.w * self.h;
        let safe = self.index(safe_x, safe_y);
        let mut excluded = vec![false; n];
        excluded[safe] = true;
        for (nx, ny) in self.neighbors(safe_x, safe_y) {
            excluded[self.index(nx, ny)] = true;
        }
        let mut candidates: Vec<usize> = (0..n).filter(|&i| !excluded[i]).collect();
        if candidates.len() < self.mines {
            candidates = (0..n).filter(|&i| i != safe).collect();
        }
        for &i in candidates.choose_multiple(rng, self.mines) {
            self.cells[i].mine = true;
        }
        self.compute_adjacency();
        self.mines_placed = true;
    }

    fn compute_adjacency(&mut self) {
        for y in 0..self.h {
            for x in 0..self.w {
                let i = self.index(x, y);
                if self.cells[i].mine {
                    continue;
                }
                let adj = self
                    .neighbors(x, y)
                    .into_iter()
                    .filter(|&(nx, ny)| self.cells[self.index(nx, ny)].mine)
                    .count();
                self.cells[i].adj = adj as u8;
            }
        }
    }

    /// Reveal a cell at (x, y).
    /// - First reveal places mines (the clicked cell is never a mine)
    /// - Revealing a mine loses the game
    /// - Revealing a zero-adjacency cell flood-fills its region
    /// - No-op on flagged or already revealed cells, and after the game ends
    pub fn reveal(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        if !self.in_bounds(x, y) {
            return Err(BoardError::InvalidPosition { x, y });
        }
        if self.state.is_over() {
            return Ok(());
        }
        let i = self.index(x, y);
        if self.cells[i].state != CellState::Hidden {
            return Ok(());
        }
        if !self.mines_placed {
            self.place_mines(&mut thread_rng(), x, y);
        }
        self.cells[i].state = CellState::Revealed;
        self.revealed_count += 1;
        if self.cells[i].mine {
            self.state = GameState::Lost;
            return Ok(());
        }
        if self.cells[i].adj == 0 {
            self.flood_reveal(x, y);
        }
        if self.revealed_count == self.w * self.h - self.mines {
            self.state = GameState::Won;
            // flag whatever is left so the final render shows all mines marked
            for cell in self.cells.iter_mut() {
                if cell.mine && cell.state == CellState::Hidden {
                    cell.state = CellState::Flagged;
                }
            }
        }
        Ok(())
    }

    // Iterative flood fill over the connected zero region and its non-zero
    // border. An explicit work stack keeps large boards off the call stack.
    // Flagged cells are never crossed, revealed cells never revisited.
    fn flood_reveal(&mut self, x: usize, y: usize) {
        let mut stack = vec![(x, y)];
        while let Some((cx, cy)) = stack.pop() {
            for (nx, ny) in self.neighbors(cx, cy) {
                let i = self.index(nx, ny);
                if self.cells[i].state != CellState::Hidden || self.cells[i].mine {
                    continue;
                }
                self.cells[i].state = CellState::Revealed;
                self.revealed_count += 1;
                if self.cells[i].adj == 0 {
                    stack.push((nx, ny));
                }
            }
        }
    }

    /// Toggle the flag on a hidden cell.
    /// No-op on revealed cells and after the game ends.
    pub fn toggle_flag(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        if !self.in_bounds(x, y) {
            return Err(BoardError::InvalidPosition { x, y });
        }
        if self.state.is_over() {
            return Ok(());
        }
        let i = self.index(x, y);
        self.cells[i].state = match self.cells[i].state {
            CellState::Hidden => CellState::Flagged,
            CellState::Flagged => CellState::Hidden,
            CellState::Revealed => CellState::Revealed,
        };
        Ok(())
    }

    /// Chord a revealed number cell: when its neighbors carry exactly `adj`
    /// flags, reveal every unflagged hidden neighbor. A misplaced flag can
    /// therefore lose the game. No-op on hidden, flagged, or zero cells,
    /// when the flag count does not match, and after the game ends.
    pub fn chord(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        if !self.in_bounds(x, y) {
            return Err(BoardError::InvalidPosition { x, y });
        }
        if self.state.is_over() {
            return Ok(());
        }
        let i = self.index(x, y);
        if self.cells[i].state != CellState::Revealed || self.cells[i].adj == 0 {
            return Ok(());
        }
        let neighbors = self.neighbors(x, y);
        let flagged = neighbors
            .iter()
            .filter(|&&(nx, ny)| self.cells[self.index(nx, ny)].state == CellState::Flagged)
            .count();
        if flagged != self.cells[i].adj as usize {
            return Ok(());
        }
        // reveal skips flagged cells and stops mutating once the game ends
        for (nx, ny) in neighbors {
            self.reveal(nx, ny)?;
        }
        Ok(())
    }

    /// Textual grid view of the current state, recomputed on every call.
    pub fn render(&self) -> String {
        self.render_with(false)
    }

    /// Like `render`, but shows the full mine layout (end-of-game view).
    pub fn render_revealed(&self) -> String {
        self.render_with(true)
    }

    fn render_with(&self, reveal_all: bool) -> String {
        let mut out = String::with_capacity((self.w * 3 + 4) * (self.h + 1));
        out.push_str("  ");
        for x in 0..self.w {
            out.push_str(&format!("{:>3}", x));
        }
        out.push('\n');
        for y in 0..self.h {
            out.push_str(&format!("{:2}", y));
            for x in 0..self.w {
                let cell = &self.cells[self.index(x, y)];
                let ch = if reveal_all || cell.state == CellState::Revealed {
                    match (cell.mine, cell.adj) {
                        (true, _) => '*',
                        (false, 0) => '.',
                        (false, n) => (b'0' + n) as char,
                    }
                } else if cell.state == CellState::Flagged {
                    'F'
                } else {
                    '#'
                };
                out.push_str(&format!("{:>3}", ch));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
impl Board {
    /// Test-only constructor with a fixed mine layout.
    fn with_mines(width: usize, height: usize, mines: &[(usize, usize)]) -> Board {
        let mut board = Board::new(width, height, mines.len()).unwrap();
        for &(x, y) in mines {
            let i = board.index(x, y);
            board.cells[i].mine = true;
        }
        board.compute_adjacency();
        board.mines_placed = true;
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_board_first_reveal_wins() {
        let mut board = Board::new(3, 3, 0).unwrap();
        board.reveal(0, 0).unwrap();
        assert_eq!(board.revealed_count(), 9);
        assert_eq!(board.state(), GameState::Won);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(board.cell(x, y).unwrap().state, CellState::Revealed);
            }
        }
    }

    #[test]
    fn zero_region_reveals_border_exactly_once() {
        // mine at the right end of a 7x1 strip: reveal(0,0) floods the zero
        // cells (0,0)..(1,0) and stops at the bordering '1' cell (2,0)
        let mut board = Board::with_mines(7, 1, &[(3, 0)]);
        board.reveal(0, 0).unwrap();
        assert_eq!(board.state(), GameState::InProgress);
        assert_eq!(board.revealed_count(), 3);
        for x in 0..3 {
            assert_eq!(board.cell(x, 0).unwrap().state, CellState::Revealed);
        }
        for x in 3..7 {
            assert_ne!(board.cell(x, 0).unwrap().state, CellState::Revealed);
        }
        assert_eq!(board.cell(2, 0).unwrap().adj, 1);
    }

    #[test]
    fn flood_fill_does_not_cross_flags() {
        let mut board = Board::with_mines(7, 1, &[(3, 0)]);
        board.toggle_flag(1, 0).unwrap();
        board.reveal(0, 0).unwrap();
        assert_eq!(board.revealed_count(), 1);
        assert_eq!(board.cell(1, 0).unwrap().state, CellState::Flagged);
        assert_eq!(board.cell(2, 0).unwrap().state, CellState::Hidden);
    }

    #[test]
    fn win_triggers_on_last_safe_cell() {
        let mut board = Board::with_mines(2, 2, &[(0, 0)]);
        board.reveal(1, 0).unwrap();
        board.reveal(0, 1).unwrap();
        assert_eq!(board.state(), GameState::InProgress);
        board.reveal(1, 1).unwrap();
        assert_eq!(board.state(), GameState::Won);
        // remaining mine gets auto-flagged on win
        assert_eq!(board.cell(0, 0).unwrap().state, CellState::Flagged);
    }

    #[test]
    fn revealing_a_mine_loses_and_freezes_the_board() {
        let mut board = Board::with_mines(3, 3, &[(2, 2)]);
        board.reveal(2, 2).unwrap();
        assert_eq!(board.state(), GameState::Lost);
        // further moves are rejected
        board.reveal(0, 0).unwrap();
        assert_eq!(board.cell(0, 0).unwrap().state, CellState::Hidden);
        board.toggle_flag(0, 0).unwrap();
        assert_eq!(board.cell(0, 0).unwrap().state, CellState::Hidden);
    }

    #[test]
    fn flag_on_revealed_cell_is_noop() {
        let mut board = Board::with_mines(3, 3, &[(0, 1), (2, 1)]);
        board.reveal(0, 0).unwrap();
        assert_eq!(board.state(), GameState::InProgress);
        board.toggle_flag(0, 0).unwrap();
        assert_eq!(board.cell(0, 0).unwrap().state, CellState::Revealed);
    }

    #[test]
    fn reveal_on_flagged_cell_is_noop() {
        let mut board = Board::with_mines(2, 1, &[(1, 0)]);
        board.toggle_flag(1, 0).unwrap();
        board.reveal(1, 0).unwrap();
        assert_eq!(board.cell(1, 0).unwrap().state, CellState::Flagged);
        assert_eq!(board.state(), GameState::InProgress);
    }

    #[test]
    fn chord_reveals_unflagged_neighbors_when_flags_match() {
        let mut board = Board::with_mines(4, 3, &[(0, 0), (2, 0)]);
        board.reveal(1, 1).unwrap();
        assert_eq!(board.cell(1, 1).unwrap().adj, 2);
        board.toggle_flag(0, 0).unwrap();
        board.toggle_flag(2, 0).unwrap();
        board.chord(1, 1).unwrap();
        assert_eq!(board.state(), GameState::InProgress);
        for &(x, y) in &[(1, 0), (0, 1), (2, 1)] {
            assert_eq!(board.cell(x, y).unwrap().state, CellState::Revealed);
        }
        // flags stay put, cells outside the neighborhood stay hidden
        assert_eq!(board.cell(0, 0).unwrap().state, CellState::Flagged);
        assert_eq!(board.cell(2, 0).unwrap().state, CellState::Flagged);
        assert_eq!(board.cell(3, 0).unwrap().state, CellState::Hidden);
    }

    #[test]
    fn chord_is_noop_when_flag_count_differs() {
        let mut board = Board::with_mines(4, 3, &[(0, 0), (2, 0)]);
        board.reveal(1, 1).unwrap();
        board.toggle_flag(0, 0).unwrap();
        board.chord(1, 1).unwrap();
        assert_eq!(board.revealed_count(), 1);
        assert_eq!(board.cell(1, 0).unwrap().state, CellState::Hidden);
        // chording a hidden cell does nothing either
        board.chord(2, 2).unwrap();
        assert_eq!(board.revealed_count(), 1);
        assert_eq!(board.state(), GameState::InProgress);
    }

    #[test]
    fn chord_with_misplaced_flags_can_lose() {
        let mut board = Board::with_mines(4, 3, &[(0, 0), (2, 0)]);
        board.reveal(1, 1).unwrap();
        board.toggle_flag(1, 0).unwrap();
        board.toggle_flag(0, 1).unwrap();
        board.chord(1, 1).unwrap();
        assert_eq!(board.state(), GameState::Lost);
        assert_eq!(board.cell(1, 0).unwrap().state, CellState::Flagged);
    }

    #[test]
    fn flag_count_tracks_toggles() {
        let mut board = Board::new(3, 3, 2).unwrap();
        assert_eq!(board.flag_count(), 0);
        board.toggle_flag(0, 0).unwrap();
        board.toggle_flag(1, 1).unwrap();
        assert_eq!(board.flag_count(), 2);
        board.toggle_flag(1, 1).unwrap();
        assert_eq!(board.flag_count(), 1);
    }

    #[test]
    fn flag_toggles_back_to_hidden() {
        let mut board = Board::new(2, 2, 1).unwrap();
        board.toggle_flag(0, 0).unwrap();
        assert_eq!(board.cell(0, 0).unwrap().state, CellState::Flagged);
        board.toggle_flag(0, 0).unwrap();
        assert_eq!(board.cell(0, 0).unwrap().state, CellState::Hidden);
    }

    #[test]
    fn out_of_bounds_moves_fail() {
        let mut board = Board::new(3, 3, 1).unwrap();
        assert_eq!(
            board.reveal(3, 0),
            Err(BoardError::InvalidPosition { x: 3, y: 0 })
        );
        assert_eq!(
            board.toggle_flag(0, 7),
            Err(BoardError::InvalidPosition { x: 0, y: 7 })
        );
    }

    #[test]
    fn rejects_bad_construction_parameters() {
        assert!(Board::new(0, 5, 1).is_err());
        assert!(Board::new(5, 0, 1).is_err());
        assert!(Board::new(3, 3, 9).is_err());
        assert!(Board::new(3, 3, 8).is_ok());
        assert!(Board::new(3, 3, 0).is_ok());
    }

    #[test]
    fn remaining_mines_can_go_negative() {
        let mut board = Board::new(3, 3, 1).unwrap();
        board.toggle_flag(0, 0).unwrap();
        board.toggle_flag(1, 0).unwrap();
        assert_eq!(board.remaining_mines(), -1);
    }

    #[test]
    fn render_shows_cell_states() {
        let mut board = Board::with_mines(3, 1, &[(2, 0)]);
        board.toggle_flag(2, 0).unwrap();
        board.reveal(1, 0).unwrap();
        let text = board.render();
        assert!(text.contains('#')); // (0,0) still hidden
        assert!(text.contains('1')); // (1,0) revealed border cell
        assert!(text.contains('F')); // (2,0) flagged
        assert!(!text.contains('*'));
        assert!(board.render_revealed().contains('*'));
    }

    #[test]
    fn difficulty_presets() {
        assert_eq!(Difficulty::Beginner.params(), (9, 9, 10));
        assert_eq!(Difficulty::Expert.params(), (30, 16, 99));
        assert_eq!(Difficulty::TooHard.params(), (30, 24, 180));
        assert_eq!(Difficulty::Custom(4, 5, 6).params(), (4, 5, 6));
        assert_eq!(Difficulty::Intermediate.name(), "Intermediate");
    }

    proptest! {
        #[test]
        fn first_reveal_never_loses(w in 1..14usize, h in 1..14usize,
                                    mines in 0..200usize,
                                    x in 0..14usize, y in 0..14usize) {
            let mines = mines % (w * h);
            let x = x % w;
            let y = y % h;
            let mut board = Board::new(w, h, mines).unwrap();
            board.reveal(x, y).unwrap();
            prop_assert_ne!(board.state(), GameState::Lost);
            prop_assert_eq!(board.cell(x, y).unwrap().state, CellState::Revealed);
            prop_assert!(!board.cell(x, y).unwrap().mine);
        }

        #[test]
        fn adjacency_counts_match_layout(w in 1..12usize, h in 1..12usize,
                                         mines in 0..144usize,
                                         x in 0..12usize, y in 0..12usize) {
            let mines = mines % (w * h);
            let mut board = Board::new(w, h, mines).unwrap();
            board.reveal(x % w, y % h).unwrap();
            for cy in 0..h {
                for cx in 0..w {
                    let cell = board.cell(cx, cy).unwrap();
                    if cell.mine {
                        continue;
                    }
                    let count = board.neighbors(cx, cy).into_iter()
                        .filter(|&(nx, ny)| board.cell(nx, ny).unwrap().mine)
                        .count();
                    prop_assert_eq!(cell.adj as usize, count);
                }
            }
        }

        #[test]
        fn revealed_count_matches_cells(w in 1..12usize, h in 1..12usize,
                                        mines in 0..144usize,
                                        x in 0..12usize, y in 0..12usize) {
            let mines = mines % (w * h);
            let mut board = Board::new(w, h, mines).unwrap();
            board.reveal(x % w, y % h).unwrap();
            let revealed = (0..h).flat_map(|cy| (0..w).map(move |cx| (cx, cy)))
                .filter(|&(cx, cy)| board.cell(cx, cy).unwrap().state == CellState::Revealed)
                .count();
            prop_assert_eq!(revealed, board.revealed_count());
        }

        #[test]
        fn win_exactly_when_all_safe_revealed(w in 2..10usize, h in 2..10usize,
                                              mines in 1..100usize,
                                              x in 0..10usize, y in 0..10usize) {
            let mines = 1 + mines % (w * h - 1);
            let mut board = Board::new(w, h, mines).unwrap();
            board.reveal(x % w, y % h).unwrap();
            // keep revealing hidden safe cells until the game ends
            'outer: while board.state() == GameState::InProgress {
                for cy in 0..h {
                    for cx in 0..w {
                        let cell = board.cell(cx, cy).unwrap();
                        if cell.state == CellState::Hidden && !cell.mine {
                            board.reveal(cx, cy).unwrap();
                            continue 'outer;
                        }
                    }
                }
                break;
            }
            prop_assert_eq!(board.state(), GameState::Won);
            prop_assert_eq!(board.revealed_count(), w * h - mines);
        }
    }
}
