use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::Backend(event) => app.handle_backend(event),
        AppEvent::Speech(event) => app.handle_speech(event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work in any mode
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        app.should_quit = true;
        return;
    }

    if app.show_confirm_clear {
        handle_confirm(app, key);
        return;
    }

    if app.settings.open {
        handle_settings(app, key);
        return;
    }

    if ctrl {
        match key.code {
            KeyCode::Char('s') => app.open_settings(),
            KeyCode::Char('t') => app.toggle_dark_mode(),
            KeyCode::Char('a') => app.toggle_auto_speak(),
            KeyCode::Char('r') => app.toggle_voice_input(),
            KeyCode::Char('l') => app.request_clear_history(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::F(n) if (1..=9).contains(&n) => {
            app.quick_prompt(usize::from(n - 1));
            return;
        }
        KeyCode::PageUp => {
            app.transcript.scroll_up(10);
            return;
        }
        KeyCode::PageDown => {
            app.transcript.scroll_down(10);
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                FocusPane::Input => {
                    app.input_mode = InputMode::Normal;
                    if app.history.state.selected().is_none() && !app.history.entries.is_empty() {
                        app.history.state.select(Some(0));
                    }
                    FocusPane::History
                }
                FocusPane::History => {
                    app.input_mode = InputMode::Editing;
                    FocusPane::Input
                }
            };
            return;
        }
        _ => {}
    }

    match app.input_mode {
        InputMode::Editing => handle_editing(app, key),
        InputMode::Normal => handle_normal(app, key),
    }
}

fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_clear_history(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_clear_history(false),
        _ => {}
    }
}

fn handle_settings(app: &mut App, key: KeyEvent) {
    let action = match key.code {
        KeyCode::Esc => {
            app.close_settings();
            None
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.close_settings();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.settings.field_up();
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.settings.field_down();
            None
        }
        KeyCode::Char('h') | KeyCode::Left => app.settings.adjust(false),
        KeyCode::Char('l') | KeyCode::Right => app.settings.adjust(true),
        KeyCode::Enter | KeyCode::Char(' ') => app.settings.activate(),
        _ => None,
    };

    if let Some(action) = action {
        app.apply_settings_action(action);
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Esc if app.focus == FocusPane::History => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('i') | KeyCode::Enter if app.focus == FocusPane::Input => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::History => app.history.nav_down(),
            FocusPane::Input => app.transcript.scroll_down(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::History => app.history.nav_up(),
            FocusPane::Input => app.transcript.scroll_up(1),
        },
        KeyCode::Enter if app.focus == FocusPane::History => {
            if let Some(i) = app.history.state.selected() {
                app.replay_history(i);
            }
        }
        _ => {}
    }
}

fn handle_editing(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    // The input box is disabled while a reply is pending
    if !app.input_enabled {
        return;
    }

    match key.code {
        KeyCode::Enter => {
            app.send_message();
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Area inside a one-cell border
fn inner_rect(rect: Rect) -> Rect {
    Rect::new(
        rect.x.saturating_add(1),
        rect.y.saturating_add(1),
        rect.width.saturating_sub(2),
        rect.height.saturating_sub(2),
    )
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.settings.open || app.show_confirm_clear {
        return;
    }

    let x = mouse.column;
    let y = mouse.row;

    let in_transcript = app.transcript_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let history_area = app.history_area.filter(|r| point_in_rect(x, y, *r));

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_transcript {
                app.transcript.scroll_down(3);
            } else if history_area.is_some() {
                app.history.nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_transcript {
                app.transcript.scroll_up(3);
            } else if history_area.is_some() {
                app.history.nav_up();
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            // Only rows inside the list border map to entries
            if let Some(area) = history_area {
                let inner = inner_rect(area);
                if point_in_rect(x, y, inner) {
                    let row = (y - inner.y) as usize;
                    if let Some(index) = app.history.index_at_row(row) {
                        app.replay_history(index);
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HistoryEntry;
    use crate::app::BackendEvent;
    use crate::chat::Role;
    use crate::config::Config;
    use crate::error::ApiError;
    use crate::prefs::PreferenceStore;
    use reqwest::StatusCode;
    use crate::speech::SpeechInput;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn make_app(dir: &tempfile::TempDir) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let prefs = PreferenceStore::load(dir.path().join("preferences.json"));
        (App::new(Config::new(), prefs, SpeechInput::Unsupported, tx), rx)
    }

    #[test]
    fn typing_respects_utf8_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        for c in "héllo".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "hélo");
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn enter_on_blank_input_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        app.set_input("   ");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.transcript.is_empty());
        assert!(app.input_enabled);
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some("Please enter a message"));
    }

    #[test]
    fn keys_are_ignored_while_input_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        app.input_enabled = false;
        handle_event(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert!(app.input.is_empty());
    }

    #[test]
    fn tab_moves_focus_between_input_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, FocusPane::History);
        assert_eq!(app.input_mode, InputMode::Normal);
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn confirm_popup_swallows_keys() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        handle_event(&mut app, ctrl('l')).unwrap();
        assert!(app.show_confirm_clear);

        handle_event(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert!(app.input.is_empty());

        handle_event(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert!(!app.show_confirm_clear);
    }

    #[test]
    fn voice_key_without_recognizer_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        handle_event(&mut app, ctrl('r')).unwrap();
        assert!(!app.is_listening());
        assert_eq!(
            app.toast.as_ref().map(|t| t.message.as_str()),
            Some("Voice recognition not supported")
        );
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn load_prompts(app: &mut App, count: usize) {
        let entries = (0..count)
            .map(|i| HistoryEntry { user: format!("prompt {i}"), assistant: None })
            .collect();
        app.handle_backend(BackendEvent::History(Ok(entries)));
    }

    fn user_texts(app: &App) -> Vec<String> {
        app.transcript
            .messages()
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn clicking_history_row_replays_it() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        load_prompts(&mut app, 10);
        app.history_area = Some(Rect::new(60, 2, 30, 5));

        handle_event(&mut app, click(65, 4)).unwrap();
        assert_eq!(user_texts(&app), vec!["prompt 1".to_string()]);
        assert!(!app.input_enabled);
    }

    #[tokio::test]
    async fn clicks_on_history_border_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        load_prompts(&mut app, 10);
        app.history_area = Some(Rect::new(60, 2, 30, 5));

        // top, bottom, left and right edges
        for (x, y) in [(65, 2), (65, 6), (60, 4), (89, 4)] {
            handle_event(&mut app, click(x, y)).unwrap();
        }
        assert!(app.transcript.is_empty());
        assert!(app.input_enabled);
    }

    #[tokio::test]
    async fn click_on_unavailable_history_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        load_prompts(&mut app, 3);
        app.handle_backend(BackendEvent::History(Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR))));
        app.history_area = Some(Rect::new(60, 2, 30, 5));

        handle_event(&mut app, click(65, 3)).unwrap();
        assert!(app.transcript.is_empty());

        // keyboard replay of the stale selection is refused too
        app.history.state.select(Some(0));
        app.focus = FocusPane::History;
        app.input_mode = InputMode::Normal;
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn ctrl_t_flips_and_persists_theme() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        assert!(!app.dark_mode);

        handle_event(&mut app, ctrl('t')).unwrap();
        assert!(app.dark_mode);
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some("🌙 Dark mode"));

        let reloaded = PreferenceStore::load(dir.path().join("preferences.json"));
        assert!(reloaded.get().dark_mode);
    }

    #[test]
    fn ctrl_c_quits_from_popups() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = make_app(&dir);
        app.open_settings();
        handle_event(&mut app, ctrl('c')).unwrap();
        assert!(app.should_quit);
    }
}
