//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header, selection and focused borders.
pub const BLUE: Color = Color::Rgb(59, 130, 246);
/// Status bar background.
pub const DARK_BLUE: Color = Color::Rgb(30, 64, 175);
/// Completed tasks and the checkmark banner.
pub const GREEN: Color = Color::Rgb(34, 197, 94);
/// Confirmation dialogs.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
