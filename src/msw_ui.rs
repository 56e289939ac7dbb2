// Mouse/keyboard front-end: alternate-screen ratatui UI with mouse capture.
// Left-click reveals, right-click flags; arrows + Space/Enter/'f' do the
// same from the keyboard. All game decisions stay in the board model.

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::error::Error;
use std::io;
use std::time::Duration;

use crate::msw_board::{Board, CellState, Difficulty, GameState};
use crate::msw_color::Palette;

use unicode_width::UnicodeWidthStr;

// Board glyphs
const GLYPH_HIDDEN: &str = "■";
const GLYPH_MINE: &str = "☼";
const GLYPH_FLAG: &str = "⚑";

// Group runtime UI variables into a single structure to simplify passing them around
struct UiState {
    cursor: (usize, usize),
    left_press: Option<(usize, usize)>,
    right_press: Option<(usize, usize)>,
    // set when both buttons go down on the same cell
    chord_press: Option<(usize, usize)>,
    hover_index: Option<usize>,
    showing_help: bool,
    showing_result: bool,
    modal_rect: Option<Rect>,
}

impl UiState {
    fn new() -> Self {
        UiState {
            cursor: (0, 0),
            left_press: None,
            right_press: None,
            chord_press: None,
            hover_index: None,
            showing_help: false,
            showing_result: false,
            modal_rect: None,
        }
    }

    fn reset_after_new_game(&mut self) {
        self.left_press = None;
        self.right_press = None;
        self.chord_press = None;
        self.hover_index = None;
        self.showing_help = false;
        self.showing_result = false;
        self.modal_rect = None;
    }
}

pub fn run(difficulty: Difficulty) -> Result<(), Box<dyn Error>> {
    let palette = Palette::detect();
    // pristine board kept around so each new game starts from an unplaced layout
    let fresh = Board::from_difficulty(difficulty)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &fresh, difficulty, &palette);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    fresh: &Board,
    difficulty: Difficulty,
    palette: &Palette,
) -> Result<(), Box<dyn Error>> {
    let mut board = fresh.clone();
    let mut ui = UiState::new();
    let mut menu_rect: Option<Rect> = None;
    let mut board_rect: Option<Rect> = None;
    let menu_items = [("F1", "Help"), ("F2", "New"), ("Esc", "Exit")];
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| {
            let size = f.size();
            let min_twidth = ((board.width() * 2 + 7) as u16).max(48);
            let min_theight = (board.height() + 8) as u16;
            // If terminal too small, render a centered warning and skip normal UI
            if size.width < min_twidth || size.height < min_theight {
                let warn_lines = vec![
                    Spans::from(Span::raw("Terminal size too small.")),
                    Spans::from(Span::raw(format!(
                        "Minimum required: {} x {}",
                        min_twidth, min_theight
                    ))),
                ];
                let warn = Paragraph::new(Text::from(warn_lines))
                    .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
                    .alignment(Alignment::Center);
                f.render_widget(Clear, size);
                let w = 40u16.min(size.width.saturating_sub(2));
                let h = 5u16.min(size.height.saturating_sub(2));
                f.render_widget(warn, center_rect(w, h, size));
                return;
            }

            // layout: top menu row, center board, bottom status
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(0)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(6),
                    Constraint::Length(3),
                ].as_ref())
                .split(size);

            // menu row (per-item styled so hover mapping aligns with mouse offsets)
            let mut spans_vec: Vec<Span> = vec![Span::raw(" ")];
            for (i, (label_key, label_rest)) in menu_items.iter().enumerate() {
                if i > 0 {
                    spans_vec.push(Span::raw("   "));
                }
                let (key_style, rest_style) = if Some(i) == ui.hover_index {
                    (
                        Style::default()
                            .bg(palette.menu_hover_bg)
                            .fg(palette.menu_hover_fg)
                            .add_modifier(Modifier::BOLD),
                        Style::default()
                            .bg(palette.menu_hover_bg)
                            .fg(palette.menu_hover_fg),
                    )
                } else {
                    (
                        Style::default().fg(palette.menu_key).add_modifier(Modifier::BOLD),
                        Style::default(),
                    )
                };
                spans_vec.push(Span::styled(label_key.to_string(), key_style));
                spans_vec.push(Span::styled(format!(": {}", label_rest), rest_style));
            }
            let menu = Paragraph::new(Spans::from(spans_vec))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Left);
            f.render_widget(menu, chunks[0]);
            menu_rect = Some(chunks[0]);

            // status row: mine counter and game state, difficulty right-aligned
            let state_text = match board.state() {
                GameState::InProgress => "Playing",
                GameState::Won => "You win!",
                GameState::Lost => "Boom! You hit a mine.",
            };
            let safe_total = board.width() * board.height() - board.mine_count();
            let left_text = format!(
                " Mines: {}   Flags: {}   Safe: {}/{}   {} ",
                board.remaining_mines(),
                board.flag_count(),
                board.revealed_count(),
                safe_total,
                state_text
            );
            let right_text = format!("{} ", difficulty.name());
            let inner_w = chunks[2].width.saturating_sub(2) as usize;
            let left_w = left_text.as_str().width();
            let right_w = right_text.as_str().width();
            let mid_spaces = if inner_w > left_w + right_w {
                inner_w - left_w - right_w
            } else {
                1
            };
            let status_spans = vec![
                Span::raw(left_text),
                Span::raw(" ".repeat(mid_spaces)),
                Span::raw(right_text),
            ];
            let status = Paragraph::new(Spans::from(status_spans))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Left);
            f.render_widget(status, chunks[2]);

            // board canvas, 2 columns per cell plus one padding column
            let board_area = center_rect(
                ((board.width() * 2) as u16) + 3,
                (board.height() as u16) + 2,
                chunks[1],
            );
            board_rect = Some(board_area);
            let lost = board.state() == GameState::Lost;
            let mut lines = vec![];
            for y in 0..board.height() {
                let mut spans = vec![];
                for x in 0..board.width() {
                    let Some(cell) = board.cell(x, y) else { continue };
                    let mut s = GLYPH_HIDDEN;
                    let mut digit = None;
                    let mut style = Style::default().fg(palette.hidden).bg(palette.board_bg);
                    match cell.state {
                        CellState::Revealed => {
                            if cell.mine {
                                s = GLYPH_MINE;
                                style = style.fg(palette.mine);
                            } else if cell.adj > 0 {
                                digit = Some(cell.adj);
                                style = style.fg(palette.number[(cell.adj - 1) as usize]);
                            } else {
                                s = " ";
                            }
                        }
                        CellState::Flagged => {
                            s = GLYPH_FLAG;
                            style = style.fg(palette.flag);
                        }
                        CellState::Hidden => {
                            // show the full layout once the game is lost
                            if lost && cell.mine {
                                s = GLYPH_MINE;
                                style = style.fg(palette.mine);
                            }
                        }
                    }
                    if ui.cursor == (x, y) {
                        style = style.bg(palette.cursor_bg);
                    }
                    if ui.left_press == Some((x, y))
                        && cell.state == CellState::Hidden
                        && !board.state().is_over()
                    {
                        style = style.bg(palette.press_bg);
                    }
                    // armed chord presses down the whole neighborhood
                    if let Some((ccx, ccy)) = ui.chord_press {
                        if x.abs_diff(ccx) <= 1
                            && y.abs_diff(ccy) <= 1
                            && cell.state == CellState::Hidden
                            && !board.state().is_over()
                        {
                            style = style.bg(palette.press_bg);
                        }
                    }
                    match digit {
                        Some(n) => spans.push(Span::styled(format!(" {}", n), style)),
                        None => spans.push(Span::styled(format!(" {}", s), style)),
                    }
                }
                spans.push(Span::styled(" ", Style::default().bg(palette.board_bg)));
                lines.push(Spans::from(spans));
            }
            let paragraph = Paragraph::new(Text::from(lines))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("minswpr")
                        .title_alignment(Alignment::Center),
                )
                .alignment(Alignment::Left);
            f.render_widget(paragraph, board_area);

            // modals
            ui.modal_rect = None;
            if ui.showing_help {
                let mrect = center_rect(44, 12, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw("Left click    reveal cell")),
                    Spans::from(Span::raw("Right click   flag/unflag cell")),
                    Spans::from(Span::raw("L+R click     chord (open neighbors)")),
                    Spans::from(Span::raw("Arrow keys    move cursor")),
                    Spans::from(Span::raw("Space         reveal at cursor")),
                    Spans::from(Span::raw("Enter         chord at cursor")),
                    Spans::from(Span::raw("F             flag at cursor")),
                    Spans::from(Span::raw("F2            new game")),
                    Spans::from(Span::raw("")),
                ];
                let help = Paragraph::new(Text::from(lines))
                    .block(Block::default().borders(Borders::ALL).title("Help"))
                    .alignment(Alignment::Center);
                f.render_widget(help, mrect);
            } else if ui.showing_result {
                let mrect = center_rect(40, 7, size);
                ui.modal_rect = Some(mrect);
                f.render_widget(Clear, mrect);
                let headline = if board.state() == GameState::Won {
                    "You win! All safe cells revealed."
                } else {
                    "Boom! You hit a mine."
                };
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::styled(headline, Style::default().add_modifier(Modifier::BOLD))),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw("Press any key for a new game")),
                    Spans::from(Span::raw("")),
                ];
                let result = Paragraph::new(Text::from(lines))
                    .block(Block::default().borders(Borders::ALL).title("Game Over"))
                    .alignment(Alignment::Center);
                f.render_widget(result, mrect);
            }
        })?;

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(KeyEvent { code, kind, .. }) => {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if ui.showing_result {
                    board = fresh.clone();
                    ui.reset_after_new_game();
                } else if ui.showing_help {
                    ui.showing_help = false;
                    ui.modal_rect = None;
                } else {
                    match code {
                        KeyCode::Esc => break,
                        KeyCode::F(1) => ui.showing_help = true,
                        KeyCode::F(2) => {
                            board = fresh.clone();
                            ui.reset_after_new_game();
                        }
                        KeyCode::Left => step_cursor(&mut ui, &board, -1, 0),
                        KeyCode::Right => step_cursor(&mut ui, &board, 1, 0),
                        KeyCode::Up => step_cursor(&mut ui, &board, 0, -1),
                        KeyCode::Down => step_cursor(&mut ui, &board, 0, 1),
                        KeyCode::Char(' ') => {
                            let (cx, cy) = ui.cursor;
                            reveal_at(&mut board, &mut ui, cx, cy);
                        }
                        KeyCode::Enter => {
                            let (cx, cy) = ui.cursor;
                            chord_at(&mut board, &mut ui, cx, cy);
                        }
                        KeyCode::Char('f') | KeyCode::Char('F') => {
                            let (cx, cy) = ui.cursor;
                            let _ = board.toggle_flag(cx, cy);
                        }
                        _ => {}
                    }
                }
            }
            Event::Mouse(me) => {
                if ui.modal_rect.is_some() {
                    // any click dismisses the modal (and starts over after a result)
                    if let MouseEventKind::Down(_) = me.kind {
                        if ui.showing_result {
                            board = fresh.clone();
                            ui.reset_after_new_game();
                        } else {
                            ui.showing_help = false;
                            ui.modal_rect = None;
                        }
                    }
                    continue;
                }
                // menu row first, then the board canvas
                let menu_handled = if let Some(rect) = menu_rect {
                    if me.row == rect.y + 1 {
                        match me.kind {
                            MouseEventKind::Moved => {
                                ui.hover_index = menu_hit(rect, &menu_items, me.column);
                                true
                            }
                            MouseEventKind::Down(MouseButton::Left) => {
                                match menu_hit(rect, &menu_items, me.column) {
                                    Some(0) => ui.showing_help = true,
                                    Some(1) => {
                                        board = fresh.clone();
                                        ui.reset_after_new_game();
                                    }
                                    Some(2) => break,
                                    _ => {}
                                }
                                true
                            }
                            MouseEventKind::Up(_) => true,
                            _ => false,
                        }
                    } else {
                        if let MouseEventKind::Moved = me.kind {
                            ui.hover_index = None;
                        }
                        false
                    }
                } else {
                    false
                };
                if menu_handled {
                    continue;
                }
                if let Some(brect) = board_rect {
                    match me.kind {
                        MouseEventKind::Moved => {
                            if let Some(cell) = cell_at(brect, &board, me.column, me.row) {
                                ui.cursor = cell;
                            }
                        }
                        MouseEventKind::Down(MouseButton::Left) => {
                            let cell = cell_at(brect, &board, me.column, me.row);
                            // second button down on the same cell arms a chord
                            if cell.is_some() && cell == ui.right_press {
                                ui.chord_press = cell;
                            } else {
                                ui.left_press = cell;
                            }
                        }
                        MouseEventKind::Up(MouseButton::Left) => {
                            // act only when press and release land on the same cell
                            if let Some((cx, cy)) = cell_at(brect, &board, me.column, me.row) {
                                if ui.chord_press == Some((cx, cy)) {
                                    chord_at(&mut board, &mut ui, cx, cy);
                                } else if ui.left_press == Some((cx, cy)) {
                                    reveal_at(&mut board, &mut ui, cx, cy);
                                }
                            }
                            ui.left_press = None;
                            ui.chord_press = None;
                        }
                        MouseEventKind::Down(MouseButton::Right) => {
                            let cell = cell_at(brect, &board, me.column, me.row);
                            if cell.is_some() && cell == ui.left_press {
                                ui.chord_press = cell;
                            } else {
                                ui.right_press = cell;
                            }
                        }
                        MouseEventKind::Up(MouseButton::Right) => {
                            if let Some((cx, cy)) = cell_at(brect, &board, me.column, me.row) {
                                if ui.chord_press == Some((cx, cy)) {
                                    chord_at(&mut board, &mut ui, cx, cy);
                                } else if ui.right_press == Some((cx, cy)) {
                                    let _ = board.toggle_flag(cx, cy);
                                }
                            }
                            ui.right_press = None;
                            ui.chord_press = None;
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn reveal_at(board: &mut Board, ui: &mut UiState, x: usize, y: usize) {
    // clicking an already revealed number acts as a chord
    let on_number = matches!(
        board.cell(x, y),
        Some(c) if c.state == CellState::Revealed && c.adj > 0
    );
    let result = if on_number {
        board.chord(x, y)
    } else {
        board.reveal(x, y)
    };
    if result.is_ok() && board.state().is_over() {
        ui.showing_result = true;
    }
}

fn chord_at(board: &mut Board, ui: &mut UiState, x: usize, y: usize) {
    if board.chord(x, y).is_ok() && board.state().is_over() {
        ui.showing_result = true;
    }
}

fn step_cursor(ui: &mut UiState, board: &Board, dx: isize, dy: isize) {
    let nx = (ui.cursor.0 as isize + dx).clamp(0, (board.width() - 1) as isize) as usize;
    let ny = (ui.cursor.1 as isize + dy).clamp(0, (board.height() - 1) as isize) as usize;
    ui.cursor = (nx, ny);
}

// Map a mouse position to the menu item under it, accounting for the
// "key: label" rendering and the 3-space separators.
fn menu_hit(rect: Rect, items: &[(&str, &str)], column: u16) -> Option<usize> {
    let mut offset = rect.x + 2;
    for (i, (k, r)) in items.iter().enumerate() {
        if i > 0 {
            offset += 3;
        }
        let full_len = (k.width() + 2 + r.width()) as u16;
        let end = offset + full_len - 1;
        if column >= offset && column <= end {
            return Some(i);
        }
        offset = end + 1;
    }
    None
}

// Map a mouse position inside the board block to cell coordinates.
// Cells are two columns wide.
fn cell_at(brect: Rect, board: &Board, column: u16, row: u16) -> Option<(usize, usize)> {
    let inner = Rect::new(
        brect.x + 1,
        brect.y + 1,
        brect.width.saturating_sub(2),
        brect.height.saturating_sub(2),
    );
    if column < inner.x || row < inner.y {
        return None;
    }
    if column >= inner.x + inner.width || row >= inner.y + inner.height {
        return None;
    }
    let cx = ((column - inner.x) / 2) as usize;
    let cy = (row - inner.y) as usize;
    if cx < board.width() && cy < board.height() {
        Some((cx, cy))
    } else {
        None
    }
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
