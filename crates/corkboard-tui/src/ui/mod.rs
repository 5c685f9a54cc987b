pub mod editor;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod views;

pub use state::{App, InputMode, ThreadPanel, View};
pub use terminal::Tui;
