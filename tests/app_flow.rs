//! End-to-end flows against a mocked backend: the app issues real HTTP
//! requests and the resulting events are pumped through the handler.

use std::sync::Arc;
use std::time::Duration;

use assistant_chat::app::{App, BackendEvent};
use assistant_chat::chat::{Role, CLEARED_TEXT};
use assistant_chat::config::Config;
use assistant_chat::handler::handle_event;
use assistant_chat::monitor::{spawn_health_monitor, ConnectionStatus};
use assistant_chat::prefs::PreferenceStore;
use assistant_chat::settings::SettingsAction;
use assistant_chat::error::SpeechError;
use assistant_chat::speech::{Recognizer, SpeechEvent, SpeechInput};
use assistant_chat::api::ApiClient;
use assistant_chat::toast::ToastKind;
use assistant_chat::tui::AppEvent;
use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use futures_util::future::BoxFuture;
use ratatui::layout::Rect;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::timeout;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn make_app(server: &MockServer, dir: &TempDir) -> (App, UnboundedReceiver<AppEvent>) {
    make_app_with_speech(server, dir, SpeechInput::Unsupported)
}

fn make_app_with_speech(
    server: &MockServer,
    dir: &TempDir,
    speech: SpeechInput,
) -> (App, UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let config = Config {
        api_base_url: server.uri(),
        ..Config::new()
    };
    let prefs = PreferenceStore::load(dir.path().join("preferences.json"));
    (App::new(config, prefs, speech, tx), rx)
}

/// Recognizer that returns the same result every session.
struct Fixed(Result<String, SpeechError>);

impl Recognizer for Fixed {
    fn listen(&self) -> BoxFuture<'static, Result<String, SpeechError>> {
        let result = self.0.clone();
        Box::pin(async move { result })
    }
}

/// Recognizer that keeps listening until aborted.
struct Silent;

impl Recognizer for Silent {
    fn listen(&self) -> BoxFuture<'static, Result<String, SpeechError>> {
        Box::pin(futures_util::future::pending())
    }
}

async fn pump_until(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>, done: impl Fn(&App) -> bool) {
    timeout(Duration::from_secs(5), async {
        while !done(app) {
            let event = rx.recv().await.expect("event channel closed");
            handle_event(app, event).unwrap();
        }
    })
    .await
    .expect("timed out waiting for app state");
}

/// Handle exactly one event, which must be a backend result.
async fn pump_one(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed");
    assert!(matches!(event, AppEvent::Backend(_)));
    handle_event(app, event).unwrap();
}

async fn mount_history(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn toast_text(app: &App) -> Option<&str> {
    app.toast.as_ref().map(|t| t.message.as_str())
}

#[tokio::test]
async fn blank_message_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = make_app(&server, &dir);

    app.set_input("  \t ");
    assert!(!app.send_message());
    assert!(app.transcript.is_empty());
    assert!(app.input_enabled);
    assert_eq!(toast_text(&app), Some("Please enter a message"));
}

#[tokio::test]
async fn successful_send_appends_one_reply_and_refreshes_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .and(body_json(json!({"text": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hello there"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .and(query_param("limit", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"history": [{"user": "hi", "assistant": "Hello there"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.set_input("  hi  ");
    assert!(app.send_message());
    assert!(!app.input_enabled);
    assert!(app.input.is_empty());
    assert!(app.transcript.has_loading());

    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;

    assert_eq!(app.transcript.count_role(Role::User), 1);
    assert_eq!(app.transcript.count_role(Role::Assistant), 1);
    assert!(!app.transcript.has_loading());
    assert_eq!(app.transcript.messages()[0].text, "hi");
    assert_eq!(app.transcript.messages()[1].text, "Hello there");
    assert_eq!(toast_text(&app), Some("✓ Response received"));

    pump_until(&mut app, &mut rx, |app| !app.history.entries.is_empty()).await;
    assert_eq!(app.history.labels(), vec!["hi".to_string()]);
}

#[tokio::test]
async fn missing_response_shows_fallback_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    mount_history(&server, json!({"history": []})).await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.set_input("anything");
    app.send_message();
    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;

    assert_eq!(app.transcript.messages()[1].text, "No response received");
}

#[tokio::test]
async fn flagged_reply_is_shown_without_success_toast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": true, "response": "The model is unavailable"})),
        )
        .mount(&server)
        .await;
    mount_history(&server, json!({"history": []})).await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.set_input("hello");
    app.send_message();
    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;

    assert_eq!(app.transcript.messages()[1].text, "The model is unavailable");
    assert_ne!(toast_text(&app), Some("✓ Response received"));
}

#[tokio::test]
async fn failed_send_reports_error_and_reenables_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.set_input("hello");
    app.send_message();
    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;

    let last = app.transcript.messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.text.starts_with("Error: "), "got {:?}", last.text);
    assert!(last.text.contains("500"));
    assert!(!app.transcript.has_loading());
    assert_eq!(app.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
    assert_eq!(toast_text(&app), Some("Error sending message"));
}

#[tokio::test]
async fn second_send_while_waiting_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "ok"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_history(&server, json!({"history": []})).await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.set_input("first");
    assert!(app.send_message());
    app.set_input("second");
    assert!(!app.send_message());
    assert!(!app.quick_prompt(0));

    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;
    assert_eq!(app.transcript.count_role(Role::User), 1);
}

#[tokio::test]
async fn auto_speak_controls_share_one_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/speak_toggle"))
        .and(body_json(json!({"enabled": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auto_speak": false})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/speak_toggle"))
        .and(body_json(json!({"enabled": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auto_speak": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);
    assert!(app.auto_speak_button_active());
    assert!(app.auto_speak_checkbox_checked());

    // Header toggle
    app.toggle_auto_speak();
    assert!(!app.auto_speak_button_active());
    assert!(!app.auto_speak_checkbox_checked());
    pump_one(&mut app, &mut rx).await;

    // Settings checkbox
    app.apply_settings_action(SettingsAction::ToggleAutoSpeak);
    assert!(app.auto_speak_button_active());
    assert!(app.auto_speak_checkbox_checked());
    pump_one(&mut app, &mut rx).await;
    assert_ne!(app.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
}

#[tokio::test]
async fn volume_is_sent_as_fraction() {
    let server = MockServer::start().await;
    for volume in [0.6, 1.0] {
        Mock::given(method("POST"))
            .and(path("/tts/settings"))
            .and(body_json(json!({"volume": volume})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.apply_settings_action(SettingsAction::Volume(60));
    pump_one(&mut app, &mut rx).await;
    assert_eq!(app.prefs().get().speech_volume, 60);

    app.apply_settings_action(SettingsAction::Volume(100));
    pump_one(&mut app, &mut rx).await;
    assert_eq!(app.prefs().get().speech_volume, 100);
}

#[tokio::test]
async fn rate_change_is_pushed_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tts/settings"))
        .and(body_json(json!({"rate": 200})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.apply_settings_action(SettingsAction::Rate(200));
    pump_one(&mut app, &mut rx).await;

    let reloaded = PreferenceStore::load(dir.path().join("preferences.json"));
    assert_eq!(reloaded.get().speech_rate, 200);
}

#[tokio::test]
async fn history_replay_sends_full_prompt() {
    let full = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHI";
    let server = MockServer::start().await;
    mount_history(&server, json!({"history": [{"user": full, "assistant": "sure"}]})).await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .and(body_json(json!({"text": full})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "again"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.load_history();
    pump_one(&mut app, &mut rx).await;
    assert_eq!(app.history.labels()[0], "abcdefghijklmnopqrstuvwxyz0123...");

    assert!(app.replay_history(0));
    assert_eq!(app.transcript.messages()[0].text, full);
    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;
}

#[tokio::test]
async fn history_failure_marks_panel_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.load_history();
    pump_one(&mut app, &mut rx).await;
    assert_eq!(app.history.status, assistant_chat::history::HistoryStatus::Unavailable);
    assert!(app.toast.is_none());
}

#[tokio::test]
async fn clear_history_resets_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clear_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "cleared"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_history(&server, json!({"history": []})).await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);
    app.transcript.push(Role::User, "old");
    app.transcript.push(Role::Assistant, "older");

    app.request_clear_history();
    assert!(app.show_confirm_clear);
    app.confirm_clear_history(true);
    assert!(!app.show_confirm_clear);

    pump_until(&mut app, &mut rx, |app| app.transcript.len() == 1).await;
    let only = &app.transcript.messages()[0];
    assert_eq!(only.role, Role::System);
    assert_eq!(only.text, CLEARED_TEXT);
    assert_eq!(toast_text(&app), Some("History cleared"));
}

#[tokio::test]
async fn declined_clear_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clear_history"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = make_app(&server, &dir);
    app.transcript.push(Role::User, "keep me");

    app.request_clear_history();
    app.confirm_clear_history(false);
    assert_eq!(app.transcript.len(), 1);
}

#[tokio::test]
async fn voice_change_is_persisted_after_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tts/settings"))
        .and(body_json(json!({"voice_index": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Voice updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.apply_settings_action(SettingsAction::Voice(2));
    pump_one(&mut app, &mut rx).await;

    assert_eq!(toast_text(&app), Some("Voice changed"));
    let reloaded = PreferenceStore::load(dir.path().join("preferences.json"));
    assert_eq!(reloaded.get().selected_voice, 2);
}

#[tokio::test]
async fn model_change_shows_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/model/set"))
        .and(body_json(json!({"model": "mixtral-8x7b-32768"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Model changed to mixtral-8x7b-32768"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.apply_settings_action(SettingsAction::Model("mixtral-8x7b-32768".into()));
    pump_one(&mut app, &mut rx).await;
    assert_eq!(toast_text(&app), Some("Model changed to mixtral-8x7b-32768"));
}

#[tokio::test]
async fn models_and_voices_populate_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": ["llama-3.1-8b-instant", "mixtral-8x7b-32768"],
            "current_model": "mixtral-8x7b-32768"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tts/voices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "voices": [{"name": "Alex"}, {"name": ""}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.load_models();
    pump_one(&mut app, &mut rx).await;
    assert_eq!(app.settings.models.current(), Some("mixtral-8x7b-32768"));

    app.load_voices();
    pump_one(&mut app, &mut rx).await;
    assert_eq!(app.settings.voices.items, vec!["Alex".to_string(), "Voice 2".to_string()]);
}

#[tokio::test]
async fn monitor_polls_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "model": "llama-3.1-8b-instant",
            "auto_speak": true
        })))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = spawn_health_monitor(ApiClient::new(&server.uri()), tx, Duration::from_secs(3600));

    let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    let AppEvent::Backend(BackendEvent::Health(result)) = event else {
        panic!("expected a health event");
    };
    assert_eq!(
        ConnectionStatus::from_poll(&result),
        ConnectionStatus::Connected { model: "llama-3.1-8b-instant".into(), auto_speak: true }
    );
    handle.abort();
}

#[tokio::test]
async fn connection_recovers_after_failed_poll() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"model": "llama3", "auto_speak": false})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = make_app(&server, &dir);
    let (tx, mut health_rx) = mpsc::unbounded_channel();
    let handle = spawn_health_monitor(ApiClient::new(&server.uri()), tx, Duration::from_millis(50));

    pump_until(&mut app, &mut health_rx, |app| app.connection == ConnectionStatus::Disconnected).await;
    pump_until(&mut app, &mut health_rx, |app| app.connection.is_connected()).await;
    assert_eq!(
        app.connection,
        ConnectionStatus::Connected { model: "llama3".into(), auto_speak: false }
    );
    // The local flag is not overwritten by the poll
    assert!(app.auto_speak);

    handle.abort();
}

#[tokio::test]
async fn recognized_speech_is_sent_as_a_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .and(body_json(json!({"text": "what time is it"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Noon"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_history(&server, json!({"history": []})).await;

    let dir = tempfile::tempdir().unwrap();
    let speech = SpeechInput::Available(Arc::new(Fixed(Ok("what time is it".into()))));
    let (mut app, mut rx) = make_app_with_speech(&server, &dir, speech);

    app.toggle_voice_input();
    assert!(app.is_listening());
    assert_eq!(app.voice_status, "🎤 Listening...");

    pump_until(&mut app, &mut rx, |app| !app.is_listening()).await;
    assert!(app.voice_status.is_empty());
    assert_eq!(app.transcript.messages()[0].text, "what time is it");
    assert!(!app.input_enabled);

    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;
    assert_eq!(app.transcript.count_role(Role::User), 1);
    assert_eq!(app.transcript.messages()[1].text, "Noon");
}

#[tokio::test]
async fn recognition_error_is_shown_and_nothing_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let speech = SpeechInput::Available(Arc::new(Fixed(Err(SpeechError::NoSpeech))));
    let (mut app, mut rx) = make_app_with_speech(&server, &dir, speech);

    app.toggle_voice_input();
    pump_until(&mut app, &mut rx, |app| !app.is_listening()).await;

    assert_eq!(app.voice_status, "❌ Error: no-speech");
    assert!(app.transcript.is_empty());
    assert!(app.input.is_empty());
}

#[tokio::test]
async fn late_result_from_aborted_session_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let speech = SpeechInput::Available(Arc::new(Silent));
    let (mut app, _rx) = make_app_with_speech(&server, &dir, speech);

    app.toggle_voice_input();
    app.toggle_voice_input();
    assert!(!app.is_listening());
    assert!(app.voice_status.is_empty());

    let late = SpeechEvent::Recognized { session: 1, text: "too late".into() };
    handle_event(&mut app, AppEvent::Speech(late)).unwrap();
    assert!(app.transcript.is_empty());
    assert!(app.input.is_empty());

    // A new session does not adopt the old one's result either
    app.toggle_voice_input();
    let late = SpeechEvent::Failed { session: 1, error: SpeechError::NoSpeech };
    handle_event(&mut app, AppEvent::Speech(late)).unwrap();
    assert!(app.is_listening());
    assert_eq!(app.voice_status, "🎤 Listening...");
}

#[tokio::test]
async fn rejected_voice_change_is_not_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tts/settings"))
        .and(body_json(json!({"voice_index": 3})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);

    app.apply_settings_action(SettingsAction::Voice(3));
    pump_one(&mut app, &mut rx).await;

    assert_eq!(toast_text(&app), Some("Failed to change voice"));
    assert_eq!(app.prefs().get().selected_voice, 0);
    let reloaded = PreferenceStore::load(dir.path().join("preferences.json"));
    assert_eq!(reloaded.get().selected_voice, 0);
}

#[tokio::test]
async fn failed_clear_keeps_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clear_history"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);
    app.transcript.push(Role::User, "old");
    app.transcript.push(Role::Assistant, "older");

    app.request_clear_history();
    app.confirm_clear_history(true);
    pump_one(&mut app, &mut rx).await;

    assert_eq!(toast_text(&app), Some("Error clearing history"));
    let texts: Vec<&str> = app.transcript.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["old", "older"]);
}

#[tokio::test]
async fn clicking_history_row_sends_full_prompt() {
    let long = "Summarize the plot of the first three chapters please";
    let server = MockServer::start().await;
    mount_history(&server, json!({"history": [{"user": "hi"}, {"user": long}]})).await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .and(body_json(json!({"text": long})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Sure"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = make_app(&server, &dir);
    app.load_history();
    pump_one(&mut app, &mut rx).await;

    // Bordered list at (70, 5); second entry is on the second inner row
    app.history_area = Some(Rect::new(70, 5, 30, 8));
    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 75,
        row: 7,
        modifiers: KeyModifiers::NONE,
    };
    handle_event(&mut app, AppEvent::Mouse(click)).unwrap();

    assert_eq!(app.transcript.messages()[0].text, long);
    pump_until(&mut app, &mut rx, |app| app.input_enabled).await;
    assert_eq!(app.transcript.count_role(Role::Assistant), 1);
}
