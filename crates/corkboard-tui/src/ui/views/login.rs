use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::{theme, App};

pub(crate) fn render_login(f: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Length(6),
        Constraint::Min(0),
    ])
    .split(f.area());

    let columns = Layout::horizontal([
        Constraint::Min(2),
        Constraint::Length(48),
        Constraint::Min(2),
    ])
    .split(chunks[1]);
    let box_area = columns[1];

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        "corkboard",
        Style::default()
            .fg(theme::ACCENT_PRIMARY)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Pick a display name (leave blank to stay anonymous)",
        Style::default().fg(theme::TEXT_MUTED),
    )));
    lines.push(Line::from(vec![
        Span::styled("> ", Style::default().fg(theme::ACCENT_PRIMARY)),
        Span::styled(
            app.login_editor.text().to_string(),
            Style::default().fg(theme::TEXT_PRIMARY),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        "Enter to sign in · Esc to quit",
        Style::default().fg(theme::TEXT_DIM),
    )));

    f.render_widget(Paragraph::new(lines), box_area);
    f.set_cursor_position((box_area.x + 2 + app.login_editor.cursor_col(), box_area.y + 3));

    if let Some(ref message) = app.status_message {
        let status = Paragraph::new(message.as_str())
            .style(Style::default().fg(theme::ACCENT_WARNING));
        f.render_widget(status, chunks[2]);
    }
}
