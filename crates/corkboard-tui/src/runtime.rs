use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use futures::StreamExt;

use corkboard_core::runtime::CoreRuntime;

use crate::input::handle_key;
use crate::render::render;
use crate::ui::{App, InputMode, Tui, View};
use crate::upload::{handle_image_file_paste, UploadResult};

pub(crate) async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    core_runtime: &mut CoreRuntime,
) -> Result<()> {
    let mut event_stream = EventStream::new();

    // Tick drives the spinner and drains feed pushes.
    let mut tick_interval = tokio::time::interval(Duration::from_millis(50));

    // Channel for upload results from background tasks
    let (upload_tx, mut upload_rx) = tokio::sync::mpsc::channel::<UploadResult>(10);

    let mut update_rx = core_runtime
        .take_update_rx()
        .ok_or_else(|| anyhow::anyhow!("core runtime already has an active update receiver"))?;

    while app.running {
        terminal.draw(|f| render(f, app))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                if let Some(Ok(event)) = maybe_event {
                    match event {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if key.code == KeyCode::Char('c')
                                && key.modifiers.contains(KeyModifiers::CONTROL)
                            {
                                if app.pending_quit {
                                    app.quit();
                                } else {
                                    app.pending_quit = true;
                                    app.set_status("Ctrl+C again to quit");
                                }
                            } else {
                                app.pending_quit = false;
                                handle_key(app, key)?;
                            }
                        }
                        Event::Mouse(mouse) => {
                            if app.view == View::Board {
                                match mouse.kind {
                                    MouseEventKind::ScrollUp => app.scroll_up(3),
                                    MouseEventKind::ScrollDown => app.scroll_down(3),
                                    _ => {}
                                }
                            }
                        }
                        Event::Paste(text) => {
                            if app.view == View::Board && app.input_mode == InputMode::Editing {
                                if !handle_image_file_paste(app, &text, upload_tx.clone()) {
                                    app.composer.insert_str(&text);
                                }
                            } else if app.view == View::Login {
                                app.login_editor.insert_str(&text);
                            }
                        }
                        _ => {}
                    }
                }
            }

            // Write outcomes from the store worker
            Some(update) = update_rx.recv() => {
                app.handle_store_update(update);
            }

            Some(result) = upload_rx.recv() => {
                match result {
                    UploadResult::Success(url) => {
                        app.composer.insert_str(&url);
                        app.composer.insert_char(' ');
                        app.clear_status();
                    }
                    UploadResult::Error(message) => app.set_status(&message),
                }
            }

            _ = tick_interval.tick() => {
                app.tick();
                app.poll_feeds();
            }
        }
    }

    Ok(())
}
