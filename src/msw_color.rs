// Cross-platform color handling for the TUI front-end.
// The palette is resolved once at startup against the terminal's detected
// color capability: truecolor terminals get Windows Terminal "Campbell" RGB
// samples, 256-color terminals a stable indexed equivalent, and basic
// terminals keep the plain ANSI variants.

use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Colors used by the board canvas and the surrounding chrome.
pub struct Palette {
    pub board_bg: Color,
    pub cursor_bg: Color,
    pub press_bg: Color,
    pub hidden: Color,
    pub flag: Color,
    pub mine: Color,
    pub menu_key: Color,
    pub menu_hover_bg: Color,
    pub menu_hover_fg: Color,
    // Number colors for revealed cells 1..8
    pub number: [Color; 8],
}

impl Palette {
    pub fn detect() -> Palette {
        let support = ColorSupport::stdout();
        let resolve = |c: Color| campbell(c, support.has_16m, support.has_256);
        Palette {
            board_bg: resolve(Color::DarkGray),
            cursor_bg: resolve(Color::LightBlue),
            press_bg: resolve(Color::Black),
            hidden: resolve(Color::Gray),
            flag: resolve(Color::Red),
            mine: resolve(Color::Black),
            menu_key: resolve(Color::Yellow),
            menu_hover_bg: resolve(Color::LightBlue),
            menu_hover_fg: resolve(Color::Black),
            number: [
                resolve(Color::Blue),
                resolve(Color::Green),
                resolve(Color::Red),
                resolve(Color::Magenta),
                resolve(Color::Yellow),
                resolve(Color::Cyan),
                resolve(Color::White),
                resolve(Color::LightRed),
            ],
        }
    }
}

// Campbell RGB samples and 256-color fallbacks for the ANSI-16 colors the
// palette draws from. Colors outside the table pass through unchanged.
fn campbell(color: Color, has_16m: bool, has_256: bool) -> Color {
    let (rgb, index256) = match color {
        Color::Black => ((12, 12, 12), 232),
        Color::Red => ((197, 15, 31), 160),
        Color::Green => ((19, 161, 14), 28),
        Color::Yellow => ((193, 156, 0), 178),
        Color::Blue => ((0, 55, 218), 20),
        Color::Magenta => ((136, 23, 152), 90),
        Color::Cyan => ((58, 150, 221), 38),
        Color::Gray => ((204, 204, 204), 250),
        Color::DarkGray => ((118, 118, 118), 243),
        Color::LightRed => ((231, 72, 86), 203),
        Color::LightBlue => ((59, 120, 255), 63),
        Color::White => ((242, 242, 242), 255),
        _ => return color,
    };
    if has_16m {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    } else if has_256 {
        Color::Indexed(index256)
    } else {
        color
    }
}
