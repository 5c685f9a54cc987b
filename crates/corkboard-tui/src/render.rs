use ratatui::{style::Style, widgets::Block, Frame};

use crate::ui::views::{board::render_board, login::render_login};
use crate::ui::{theme, App, View};

pub(crate) fn render(f: &mut Frame, app: &mut App) {
    f.render_widget(
        Block::default().style(Style::default().bg(theme::BG_APP)),
        f.area(),
    );
    match app.view {
        View::Login => render_login(f, app),
        View::Board => render_board(f, app),
    }
}
