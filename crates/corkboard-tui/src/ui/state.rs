use corkboard_core::runtime::CoreHandle;
use corkboard_core::store::{StoreCommand, StoreUpdate};
use corkboard_core::{Identity, LiveQuery, Message, MessageStore, NewMessage, Scope, SessionStorage};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// One expanded reply thread. Owns its own live query; collapsing drops
/// it, so re-expanding always starts from a fresh Loading subscription.
pub struct ThreadPanel {
    pub parent_id: String,
    pub query: LiveQuery,
}

pub struct App {
    pub running: bool,
    pub view: View,
    pub input_mode: InputMode,
    pub identity: Option<Identity>,
    pub session: SessionStorage,
    pub store: MessageStore,
    pub handle: CoreHandle,
    /// Top-level message feed; lives as long as the board view.
    pub board: LiveQuery,
    pub thread: Option<ThreadPanel>,
    pub composer: super::editor::Editor,
    pub login_editor: super::editor::Editor,
    /// First visible line of the messages region.
    pub scroll_offset: usize,
    /// Set during render once wrapped line counts are known.
    pub max_scroll_offset: usize,
    /// Selection in display (chronological) order.
    pub selected_index: usize,
    pub status_message: Option<String>,
    /// Parent row to re-anchor the list to on the next render; set when
    /// thread data arrives so the expanded row stays visible.
    pub pending_anchor: Option<String>,
    /// Per-message first-line offsets, recorded while rendering.
    pub row_offsets: Vec<(String, usize)>,
    pub pending_quit: bool,
    pub frame: u64,
    pub blob_server: String,
}

impl App {
    pub fn new(
        store: MessageStore,
        handle: CoreHandle,
        session: SessionStorage,
        blob_server: String,
    ) -> Self {
        let identity = session.current().cloned();
        let view = if identity.is_some() {
            View::Board
        } else {
            View::Login
        };
        let board = LiveQuery::open(&store, Scope::TopLevel);

        Self {
            running: true,
            view,
            input_mode: if view == View::Login {
                InputMode::Editing
            } else {
                InputMode::Normal
            },
            identity,
            session,
            store,
            handle,
            board,
            thread: None,
            composer: Default::default(),
            login_editor: Default::default(),
            scroll_offset: 0,
            max_scroll_offset: 0,
            selected_index: 0,
            status_message: None,
            pending_anchor: None,
            row_offsets: Vec::new(),
            pending_quit: false,
            frame: 0,
            blob_server,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // --- feeds -----------------------------------------------------------

    /// Drain pending pushes from both live queries.
    ///
    /// A board change snaps the list to the bottom so the newest message
    /// is visible - every update, no only-if-already-at-bottom heuristic.
    /// A thread change instead re-anchors the list to the parent row, so
    /// the expanding thread doesn't jump the view away from the row the
    /// user opened.
    pub fn poll_feeds(&mut self) {
        if self.board.poll() && !self.board.is_loading() {
            self.scroll_to_bottom();
            self.clamp_selection();
        }
        if let Some(panel) = self.thread.as_mut() {
            if panel.query.poll() {
                self.pending_anchor = Some(panel.parent_id.clone());
            }
        }
    }

    pub fn handle_store_update(&mut self, update: StoreUpdate) {
        match update {
            StoreUpdate::Appended { .. } => {
                // The feed push renders it; nothing to insert locally.
            }
            StoreUpdate::AppendFailed { error, .. } => {
                warn!(%error, "message send failed");
                self.set_status(&format!("send failed: {error}"));
            }
        }
    }

    // --- message display -------------------------------------------------

    /// Feed order is newest-first; the list renders oldest-first.
    pub fn display_messages(&self) -> Vec<&Message> {
        self.board.messages().iter().rev().collect()
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.display_messages().get(self.selected_index).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.board.messages().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    pub fn select_next(&mut self) {
        let len = self.board.messages().len();
        if len > 0 && self.selected_index + 1 < len {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    // --- scrolling -------------------------------------------------------

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .min(self.max_scroll_offset)
            .saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.max_scroll_offset);
    }

    pub fn scroll_to_bottom(&mut self) {
        // Clamped to the real maximum during render.
        self.scroll_offset = usize::MAX;
    }

    /// Line offset of a message's first row, as recorded by the last
    /// render pass.
    pub fn row_offset_of(&self, message_id: &str) -> Option<usize> {
        self.row_offsets
            .iter()
            .find(|(id, _)| id == message_id)
            .map(|(_, offset)| *offset)
    }

    // --- threads ---------------------------------------------------------

    pub fn in_thread(&self) -> bool {
        self.thread.is_some()
    }

    /// Expand the selected message's thread, or collapse it if it is the
    /// one already open. Each expansion opens a fresh subscription.
    pub fn toggle_thread(&mut self) {
        let Some(parent_id) = self.selected_message().map(|m| m.id.clone()) else {
            return;
        };
        let already_open =
            matches!(&self.thread, Some(panel) if panel.parent_id == parent_id);
        if already_open {
            self.thread = None;
        } else {
            let query = LiveQuery::open(&self.store, Scope::thread(parent_id.clone()));
            self.pending_anchor = Some(parent_id.clone());
            self.thread = Some(ThreadPanel { parent_id, query });
        }
    }

    pub fn collapse_thread(&mut self) {
        self.thread = None;
    }

    /// Where a submitted message goes: the open thread, else the board.
    pub fn compose_scope(&self) -> Scope {
        match &self.thread {
            Some(panel) => Scope::thread(panel.parent_id.clone()),
            None => Scope::TopLevel,
        }
    }

    // --- composing -------------------------------------------------------

    /// Read the composer at submit time and fire the append. Whitespace-only
    /// input is a no-op. The write is not awaited and nothing is inserted
    /// locally; the message appears when the subscription pushes it back.
    /// Returns whether an append was issued.
    pub fn submit_message(&mut self) -> bool {
        let Some(identity) = self.identity.clone() else {
            return false;
        };
        let text = self.composer.text().trim().to_string();
        if text.is_empty() {
            return false;
        }

        let scope = self.compose_scope();
        let message = NewMessage::compose(text, &identity);
        if self
            .handle
            .send(StoreCommand::Append { scope, message })
            .is_err()
        {
            self.set_status("store worker unavailable");
            return false;
        }
        self.composer.clear();
        true
    }

    // --- identity --------------------------------------------------------

    /// Submit the login prompt: persist a fresh identity and enter the
    /// board.
    pub fn submit_login(&mut self) {
        match self.session.sign_in(self.login_editor.text()) {
            Ok(identity) => {
                self.identity = Some(identity);
                self.login_editor.clear();
                self.view = View::Board;
                self.input_mode = InputMode::Normal;
            }
            Err(err) => {
                self.set_status(&format!("sign-in failed: {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corkboard_core::config::CoreConfig;
    use corkboard_core::runtime::CoreRuntime;
    use tempfile::{tempdir, TempDir};

    fn test_app() -> (App, CoreRuntime, TempDir) {
        let dir = tempdir().unwrap();
        let runtime = CoreRuntime::new(CoreConfig::new(dir.path())).unwrap();
        let mut session = SessionStorage::new(dir.path());
        session.sign_in("Ada").unwrap();
        let app = App::new(
            runtime.store(),
            runtime.handle(),
            session,
            "http://localhost:0".to_string(),
        );
        (app, runtime, dir)
    }

    fn append_at(store: &MessageStore, scope: &Scope, time: u64) -> String {
        let message = NewMessage {
            text: format!("t{time}"),
            author_name: "Ada".to_string(),
            uid: "u1".to_string(),
            time,
        };
        store.append(scope, &message).unwrap()
    }

    #[test]
    fn test_display_order_is_chronological() {
        let (mut app, _runtime, _dir) = test_app();
        for time in [100, 300, 200] {
            append_at(&app.store, &Scope::TopLevel, time);
        }
        app.poll_feeds();

        let times: Vec<u64> = app.display_messages().iter().map(|m| m.time).collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn test_limit_two_shows_two_newest_chronologically() {
        let dir = tempdir().unwrap();
        let runtime = CoreRuntime::new(CoreConfig::new(dir.path())).unwrap();
        let store = runtime.store();
        for time in [100, 200, 300] {
            append_at(&store, &Scope::TopLevel, time);
        }

        let mut session = SessionStorage::new(dir.path());
        session.sign_in("Ada").unwrap();
        let mut app = App::new(
            store.clone(),
            runtime.handle(),
            session,
            String::new(),
        );
        app.board = LiveQuery::open_with_limit(&store, Scope::TopLevel, 2);
        app.poll_feeds();

        let feed_times: Vec<u64> = app.board.messages().iter().map(|m| m.time).collect();
        assert_eq!(feed_times, vec![300, 200]);
        let display_times: Vec<u64> = app.display_messages().iter().map(|m| m.time).collect();
        assert_eq!(display_times, vec![200, 300]);
    }

    #[test]
    fn test_board_update_snaps_to_bottom() {
        let (mut app, _runtime, _dir) = test_app();
        app.scroll_offset = 3;
        append_at(&app.store, &Scope::TopLevel, 100);
        app.poll_feeds();
        assert_eq!(app.scroll_offset, usize::MAX);
    }

    #[test]
    fn test_whitespace_submit_is_a_noop() {
        let (mut app, mut runtime, _dir) = test_app();
        app.composer.insert_str("   ");
        assert!(!app.submit_message());
        // Nothing reached the worker; the board stays empty.
        runtime.shutdown();
        app.board.poll();
        assert!(app.board.messages().is_empty());
    }

    #[test]
    fn test_submit_appends_via_worker() {
        let (mut app, mut runtime, _dir) = test_app();
        app.composer.insert_str("  hello board  ");
        assert!(app.submit_message());
        assert!(app.composer.is_empty());

        let mut update_rx = runtime.take_update_rx().unwrap();
        let update = update_rx.blocking_recv().unwrap();
        assert!(matches!(update, StoreUpdate::Appended { .. }));

        app.poll_feeds();
        assert_eq!(app.display_messages().len(), 1);
        assert_eq!(app.display_messages()[0].text, "hello board");
    }

    #[test]
    fn test_submit_targets_open_thread() {
        let (mut app, mut runtime, _dir) = test_app();
        let parent = append_at(&app.store, &Scope::TopLevel, 100);
        app.poll_feeds();

        app.toggle_thread();
        assert_eq!(app.compose_scope(), Scope::thread(parent.clone()));

        app.composer.insert_str("a reply");
        assert!(app.submit_message());

        let mut update_rx = runtime.take_update_rx().unwrap();
        let update = update_rx.blocking_recv().unwrap();
        match update {
            StoreUpdate::Appended { scope, .. } => assert_eq!(scope, Scope::thread(parent)),
            other => panic!("unexpected update: {other:?}"),
        }
        // Scope isolation: the reply never shows up on the board.
        app.poll_feeds();
        assert_eq!(app.display_messages().len(), 1);
    }

    #[test]
    fn test_toggle_thread_collapse_and_fresh_reopen() {
        let (mut app, _runtime, _dir) = test_app();
        let parent = append_at(&app.store, &Scope::TopLevel, 100);
        app.poll_feeds();

        app.toggle_thread();
        append_at(&app.store, &Scope::thread(parent.clone()), 200);
        app.poll_feeds();
        assert_eq!(app.thread.as_ref().unwrap().query.messages().len(), 1);

        // Collapse, then re-expand: a fresh Loading subscription, no stale
        // data visible before the new snapshot lands.
        app.toggle_thread();
        assert!(app.thread.is_none());
        app.toggle_thread();
        let panel = app.thread.as_ref().unwrap();
        assert_eq!(panel.parent_id, parent);
        assert!(panel.query.is_loading());
        assert!(panel.query.messages().is_empty());
    }

    #[test]
    fn test_thread_update_anchors_parent_row() {
        let (mut app, _runtime, _dir) = test_app();
        let parent = append_at(&app.store, &Scope::TopLevel, 100);
        app.poll_feeds();

        app.toggle_thread();
        app.pending_anchor = None; // expansion anchor already consumed
        app.scroll_offset = 5;
        append_at(&app.store, &Scope::thread(parent.clone()), 200);
        app.poll_feeds();
        assert_eq!(app.pending_anchor.as_deref(), Some(parent.as_str()));
        // The board feed saw no change, so no scroll-to-bottom happened.
        assert_eq!(app.scroll_offset, 5);
    }

    #[test]
    fn test_scroll_clamping() {
        let (mut app, _runtime, _dir) = test_app();
        app.max_scroll_offset = 10;
        app.scroll_to_bottom();
        app.scroll_up(2);
        assert_eq!(app.scroll_offset, 8);
        app.scroll_down(5);
        assert_eq!(app.scroll_offset, 10);
        app.scroll_up(100);
        assert_eq!(app.scroll_offset, 0);
    }

    #[test]
    fn test_append_failure_surfaces_in_status() {
        let (mut app, _runtime, _dir) = test_app();
        app.handle_store_update(StoreUpdate::AppendFailed {
            scope: Scope::TopLevel,
            error: corkboard_core::StoreError::Write("unknown parent".to_string()),
        });
        assert!(app.status_message.as_deref().unwrap().contains("send failed"));
    }

    #[test]
    fn test_selection_follows_display_order() {
        let (mut app, _runtime, _dir) = test_app();
        for time in [100, 200, 300] {
            append_at(&app.store, &Scope::TopLevel, time);
        }
        app.poll_feeds();

        assert_eq!(app.selected_message().unwrap().time, 100);
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_message().unwrap().time, 300);
        app.select_next();
        assert_eq!(app.selected_message().unwrap().time, 300);
        app.select_prev();
        assert_eq!(app.selected_message().unwrap().time, 200);
    }
}
