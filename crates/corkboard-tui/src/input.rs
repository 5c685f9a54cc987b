use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::ui::{App, InputMode, View};

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.view {
        View::Login => handle_login_key(app, key),
        View::Board => match app.input_mode {
            InputMode::Normal => handle_normal_key(app, key),
            InputMode::Editing => handle_editing_key(app, key),
        },
    }
    Ok(())
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_login(),
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.login_editor.insert_char(c),
        KeyCode::Backspace => app.login_editor.backspace(),
        KeyCode::Left => app.login_editor.move_left(),
        KeyCode::Right => app.login_editor.move_right(),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('i') => {
            // Composer is gated on a present identity.
            if app.identity.is_some() {
                app.clear_status();
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('t') | KeyCode::Enter => app.toggle_thread(),
        KeyCode::Esc => app.collapse_thread(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        _ => {}
    }
}

fn handle_editing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.submit_message();
        }
        KeyCode::Char(c) => app.composer.insert_char(c),
        KeyCode::Backspace => app.composer.backspace(),
        KeyCode::Left => app.composer.move_left(),
        KeyCode::Right => app.composer.move_right(),
        KeyCode::Home => app.composer.move_home(),
        KeyCode::End => app.composer.move_end(),
        _ => {}
    }
}
