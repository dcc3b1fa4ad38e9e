//! Theme configuration - Monochrome grayscale

pub mod icons;

pub use icons::Icons;

use ratatui::style::Color;
use ratatui::symbols::border;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_primary: Color,
    /// Video area of the player panel.
    pub bg_secondary: Color,
    /// HUD background.
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub accent: Color,
    /// Hovered control bar, key names.
    pub accent_alt: Color,
    pub border: Color,
    pub playing: Color,
    pub error: Color,
}

impl Palette {
    pub const MONO: Self = Self {
        bg_primary: Color::Rgb(0, 0, 0),
        bg_secondary: Color::Rgb(18, 18, 18),
        bg_highlight: Color::Rgb(48, 48, 48),
        fg_primary: Color::Rgb(255, 255, 255),
        fg_secondary: Color::Rgb(136, 136, 136),
        accent: Color::Rgb(255, 255, 255),
        accent_alt: Color::Rgb(200, 200, 200),
        border: Color::Rgb(64, 64, 64),
        playing: Color::Rgb(255, 255, 255),
        // Errors stay white; the icon marks them.
        error: Color::Rgb(255, 255, 255),
    };
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
    pub icons: Icons,
}

impl Theme {
    pub fn border_set(&self) -> border::Set<'static> {
        border::ROUNDED
    }
}

/// Get the theme (always Mono)
pub fn get_theme() -> Theme {
    Theme {
        palette: Palette::MONO,
        icons: Icons::nerd(),
    }
}
