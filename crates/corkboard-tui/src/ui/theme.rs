// Centralized theme - edit this file to change the look

use ratatui::style::Color;

/// App background
pub const BG_APP: Color = Color::Rgb(0, 0, 0);

/// Message card background - subtle lift from black
pub const BG_CARD: Color = Color::Rgb(18, 18, 18);

/// Selected message background
pub const BG_SELECTED: Color = Color::Rgb(32, 32, 32);

/// Composer background
pub const BG_INPUT: Color = Color::Rgb(18, 18, 18);

/// Primary text - off-white for readability
pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);

/// Secondary/muted text
pub const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);

/// Dimmed text for hints, placeholders
pub const TEXT_DIM: Color = Color::Rgb(90, 90, 90);

/// Primary accent - muted blue
pub const ACCENT_PRIMARY: Color = Color::Rgb(86, 156, 214);

/// Warning - muted amber
pub const ACCENT_WARNING: Color = Color::Rgb(206, 145, 120);

/// Error - muted red
pub const ACCENT_ERROR: Color = Color::Rgb(244, 112, 112);

/// Inactive border/indicator
pub const BORDER_INACTIVE: Color = Color::Rgb(60, 60, 60);

pub const USER_PALETTE: [Color; 8] = [
    Color::Rgb(86, 156, 214),  // Muted blue
    Color::Rgb(106, 153, 85),  // Muted green
    Color::Rgb(169, 154, 203), // Muted purple
    Color::Rgb(206, 145, 120), // Muted orange
    Color::Rgb(78, 154, 154),  // Muted teal
    Color::Rgb(180, 180, 120), // Muted yellow
    Color::Rgb(180, 100, 100), // Muted red
    Color::Rgb(140, 140, 170), // Muted lavender
];

/// Deterministic color for an author based on their uid
pub fn user_color(uid: &str) -> Color {
    let hash: usize = uid.bytes().map(|b| b as usize).sum();
    USER_PALETTE[hash % USER_PALETTE.len()]
}
