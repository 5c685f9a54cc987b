use chrono::{Local, TimeZone};
use corkboard_core::{Message, QueryState};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::{theme, App, InputMode};

const COMPOSER_HEIGHT: u16 = 3;
const SPINNER: [char; 4] = ['⠋', '⠙', '⠸', '⠴'];

pub(crate) fn render_board(f: &mut Frame, app: &mut App) {
    let status_height = if app.status_message.is_some() { 1 } else { 0 };
    let chunks = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(status_height),
        Constraint::Length(COMPOSER_HEIGHT),
    ])
    .split(f.area());

    render_messages(f, app, chunks[0]);
    if status_height > 0 {
        render_status_line(f, app, chunks[1]);
    }
    render_composer(f, app, chunks[2]);
}

fn render_messages(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 4 || area.height == 0 {
        return;
    }
    let content_width = area.width.saturating_sub(2) as usize;

    match app.board.state() {
        QueryState::Loading => {
            // Never render a stale previous set while loading.
            let spinner = SPINNER[(app.frame / 2) as usize % SPINNER.len()];
            let loading = Paragraph::new(format!("{spinner} Loading messages…"))
                .style(Style::default().fg(theme::TEXT_MUTED));
            f.render_widget(loading, area);
            return;
        }
        QueryState::Errored => {
            // The error text and nothing else.
            let message = app
                .board
                .error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "subscription failed".to_string());
            let error =
                Paragraph::new(message).style(Style::default().fg(theme::ACCENT_ERROR));
            f.render_widget(error, area);
            return;
        }
        QueryState::Loaded => {}
    }

    // Feed order is newest-first; display order is chronological.
    let messages: Vec<Message> = app.display_messages().into_iter().cloned().collect();
    let selected_id = if app.input_mode == InputMode::Normal {
        messages.get(app.selected_index).map(|m| m.id.clone())
    } else {
        None
    };
    let thread_view = app.thread.as_ref().map(|panel| ThreadView {
        parent_id: panel.parent_id.clone(),
        state: panel.query.state(),
        error: panel.query.error().map(|e| e.to_string()),
        replies: panel.query.messages().iter().rev().cloned().collect(),
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut row_offsets: Vec<(String, usize)> = Vec::new();

    for message in &messages {
        row_offsets.push((message.id.clone(), lines.len()));
        let selected = selected_id.as_deref() == Some(message.id.as_str());
        push_message_card(&mut lines, message, selected, content_width, 0);

        if let Some(view) = thread_view.as_ref().filter(|v| v.parent_id == message.id) {
            push_thread_panel(&mut lines, view, content_width);
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        let empty = Paragraph::new("No messages yet. Press 'i' to write the first one.")
            .style(Style::default().fg(theme::TEXT_MUTED));
        f.render_widget(empty, area);
        app.row_offsets.clear();
        app.max_scroll_offset = 0;
        return;
    }

    let visible_height = area.height as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    app.max_scroll_offset = max_scroll;
    app.row_offsets = row_offsets;

    // After a thread push, hold the expanded parent row at its offset
    // instead of letting the grown content shove the view around.
    if let Some(anchor_id) = app.pending_anchor.take() {
        if let Some(offset) = app.row_offset_of(&anchor_id) {
            app.scroll_offset = offset;
        }
    }

    let scroll = app.scroll_offset.min(max_scroll);
    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    f.render_widget(paragraph, area);
}

struct ThreadView {
    parent_id: String,
    state: QueryState,
    error: Option<String>,
    replies: Vec<Message>,
}

/// One message as a card: colored indicator bar, bold author header with
/// a timestamp, wrapped content lines.
fn push_message_card(
    lines: &mut Vec<Line>,
    message: &Message,
    selected: bool,
    width: usize,
    indent: usize,
) {
    let indicator_color = theme::user_color(&message.uid);
    let bg = if selected {
        theme::BG_SELECTED
    } else {
        theme::BG_CARD
    };
    let pad = " ".repeat(indent);

    lines.push(Line::from(vec![
        Span::raw(pad.clone()),
        Span::styled("│ ", Style::default().fg(indicator_color).bg(bg)),
        Span::styled(
            message.author_name.clone(),
            Style::default()
                .fg(indicator_color)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" · {}", format_time(message.time)),
            Style::default().fg(theme::TEXT_MUTED).bg(bg),
        ),
    ]));

    for chunk in wrap_text(&message.text, width.saturating_sub(indent + 2)) {
        lines.push(Line::from(vec![
            Span::raw(pad.clone()),
            Span::styled("│ ", Style::default().fg(indicator_color).bg(bg)),
            Span::styled(chunk, Style::default().fg(theme::TEXT_PRIMARY).bg(bg)),
        ]));
    }
}

fn push_thread_panel(lines: &mut Vec<Line>, view: &ThreadView, width: usize) {
    match view.state {
        QueryState::Loading => {
            lines.push(Line::from(Span::styled(
                "  └ loading replies…",
                Style::default().fg(theme::TEXT_MUTED),
            )));
        }
        QueryState::Errored => {
            let message = view
                .error
                .clone()
                .unwrap_or_else(|| "subscription failed".to_string());
            lines.push(Line::from(Span::styled(
                format!("  └ {message}"),
                Style::default().fg(theme::ACCENT_ERROR),
            )));
        }
        QueryState::Loaded => {
            if view.replies.is_empty() {
                lines.push(Line::from(Span::styled(
                    "  └ no replies yet",
                    Style::default().fg(theme::TEXT_DIM),
                )));
                return;
            }
            lines.push(Line::from(Span::styled(
                format!("  └ {} replies", view.replies.len()),
                Style::default().fg(theme::TEXT_MUTED),
            )));
            for reply in &view.replies {
                push_message_card(lines, reply, false, width, 4);
            }
        }
    }
}

pub(crate) fn render_status_line(f: &mut Frame, app: &App, area: Rect) {
    if let Some(ref message) = app.status_message {
        let line = Line::from(vec![
            Span::styled("⚠ ", Style::default().fg(theme::ACCENT_WARNING)),
            Span::styled(
                message.as_str(),
                Style::default()
                    .fg(theme::ACCENT_WARNING)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }
}

fn render_composer(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.input_mode == InputMode::Editing && app.identity.is_some();
    let user_color = app
        .identity
        .as_ref()
        .map(|i| theme::user_color(&i.uid))
        .unwrap_or(theme::ACCENT_PRIMARY);
    let indicator = if is_active {
        user_color
    } else {
        theme::BORDER_INACTIVE
    };
    let text_color = if is_active {
        theme::TEXT_PRIMARY
    } else {
        theme::TEXT_MUTED
    };
    let bg = theme::BG_INPUT;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(pad_row(indicator, bg, area.width));

    let input_text = app.composer.text();
    if input_text.is_empty() {
        let placeholder = if app.identity.is_none() {
            "Sign in to post"
        } else if is_active {
            "Type your message…"
        } else {
            "Press i to write a message"
        };
        lines.push(Line::from(vec![
            Span::styled("│", Style::default().fg(indicator).bg(bg)),
            Span::styled("  ", Style::default().bg(bg)),
            Span::styled(placeholder, Style::default().fg(theme::TEXT_DIM).bg(bg)),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::styled("│", Style::default().fg(indicator).bg(bg)),
            Span::styled("  ", Style::default().bg(bg)),
            Span::styled(
                input_text.to_string(),
                Style::default().fg(text_color).bg(bg),
            ),
        ]));
    }

    // Context line: who is posting, and where
    let name = app
        .identity
        .as_ref()
        .map(|i| i.name().to_string())
        .unwrap_or_else(|| "signed out".to_string());
    let target = if app.in_thread() { "thread" } else { "board" };
    lines.push(Line::from(vec![
        Span::styled("│", Style::default().fg(indicator).bg(bg)),
        Span::styled("  ", Style::default().bg(bg)),
        Span::styled(
            format!("@{name}"),
            Style::default().fg(theme::ACCENT_PRIMARY).bg(bg),
        ),
        Span::styled(
            format!(" → {target}"),
            Style::default().fg(theme::TEXT_MUTED).bg(bg),
        ),
    ]));

    f.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);

    // +3 for "│  ", +1 for the padding row
    if is_active {
        f.set_cursor_position((area.x + 3 + app.composer.cursor_col(), area.y + 1));
    }
}

fn pad_row(indicator: ratatui::style::Color, bg: ratatui::style::Color, width: u16) -> Line<'static> {
    Line::from(vec![
        Span::styled("│", Style::default().fg(indicator).bg(bg)),
        Span::styled(
            " ".repeat(width.saturating_sub(1) as usize),
            Style::default().bg(bg),
        ),
    ])
}

fn format_time(millis: u64) -> String {
    Local
        .timestamp_millis_opt(millis as i64)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Hard-wrap text into terminal rows of at most `width` characters, so
/// every built `Line` is exactly one row and scroll math stays exact.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = Vec::new();
    for line in text.lines() {
        let mut current = String::new();
        let mut count = 0;
        for c in line.chars() {
            if count == width {
                chunks.push(std::mem::take(&mut current));
                count = 0;
            }
            current.push(c);
            count += 1;
        }
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_exact_rows() {
        assert_eq!(wrap_text("abcdef", 3), vec!["abc", "def"]);
        assert_eq!(wrap_text("abcd", 3), vec!["abc", "d"]);
        assert_eq!(wrap_text("ab", 3), vec!["ab"]);
        assert_eq!(wrap_text("", 3), vec![""]);
    }

    #[test]
    fn test_wrap_text_never_zero_width() {
        assert_eq!(wrap_text("ab", 0), vec!["a", "b"]);
    }
}
