use std::future::Future;
use std::time::Instant;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::{
    ApiClient, ApiResult, HealthResponse, HistoryEntry, MessageResponse, ModelsResponse,
    ProcessTextResponse, TtsUpdate, Voice,
};
use crate::chat::{MessageId, Role, Transcript, CLEARED_TEXT, NO_RESPONSE_TEXT};
use crate::config::Config;
use crate::history::HistoryPanel;
use crate::monitor::{spawn_health_monitor, ConnectionStatus};
use crate::prefs::PreferenceStore;
use crate::settings::{volume_fraction, SettingsAction, SettingsPanel};
use crate::speech::{SpeechAdapter, SpeechEvent, SpeechInput, Toggle};
use crate::toast::{Toast, ToastKind};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    History,
}

/// Results of background network calls, delivered back to the UI loop.
#[derive(Debug)]
pub enum BackendEvent {
    Reply(ApiResult<ProcessTextResponse>),
    History(ApiResult<Vec<HistoryEntry>>),
    HistoryCleared(ApiResult<()>),
    Health(ApiResult<HealthResponse>),
    Models(ApiResult<ModelsResponse>),
    ModelSet(ApiResult<MessageResponse>),
    Voices(ApiResult<Vec<Voice>>),
    VoiceSet { index: usize, result: ApiResult<MessageResponse> },
    AutoSpeakSet { enabled: bool, result: ApiResult<()> },
    TtsUpdated { update: TtsUpdate, result: ApiResult<MessageResponse> },
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Input box
    pub input: String,
    pub cursor: usize,
    pub input_enabled: bool,

    // Transcript
    pub transcript: Transcript,
    pending_reply: Option<MessageId>,
    pub animation_frame: u8,

    // Side panels and popups
    pub history: HistoryPanel,
    pub settings: SettingsPanel,
    pub show_confirm_clear: bool,
    pub connection: ConnectionStatus,
    pub quick_prompts: Vec<String>,

    // Flags shared by several controls
    pub auto_speak: bool,
    pub dark_mode: bool,

    pub voice_status: String,
    pub toast: Option<Toast>,

    // Panel areas for mouse hit-testing (updated during render)
    pub transcript_area: Option<Rect>,
    pub history_area: Option<Rect>,

    config: Config,
    prefs: PreferenceStore,
    api: ApiClient,
    speech: SpeechAdapter,
    tx: UnboundedSender<AppEvent>,
    monitor: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        config: Config,
        prefs: PreferenceStore,
        speech: SpeechInput,
        tx: UnboundedSender<AppEvent>,
    ) -> Self {
        let api = ApiClient::new(&config.api_base_url);
        let saved = prefs.get().clone();

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            input: String::new(),
            cursor: 0,
            input_enabled: true,

            transcript: Transcript::new(),
            pending_reply: None,
            animation_frame: 0,

            history: HistoryPanel::default(),
            settings: SettingsPanel::new(saved.speech_rate, saved.speech_volume),
            show_confirm_clear: false,
            connection: ConnectionStatus::Unknown,
            quick_prompts: config.quick_prompts.clone(),

            auto_speak: true,
            dark_mode: saved.dark_mode,

            voice_status: String::new(),
            toast: None,

            transcript_area: None,
            history_area: None,

            config,
            prefs,
            api,
            speech: SpeechAdapter::new(speech),
            tx,
            monitor: None,
        }
    }

    /// Kick off the startup loads and the connection monitor.
    pub fn start(&mut self) {
        tracing::info!(base_url = self.api.base_url(), "connecting to assistant backend");
        self.monitor = Some(spawn_health_monitor(
            self.api.clone(),
            self.tx.clone(),
            self.config.health_interval(),
        ));
        self.load_models();
        self.load_voices();
        self.load_history();
    }

    /// Persist slider values and stop background work.
    pub fn shutdown(&mut self) {
        self.prefs.set_speech_rate(self.settings.rate);
        self.prefs.set_speech_volume(self.settings.volume);
        if let Some(monitor) = self.monitor.take() {
            monitor.abort();
        }
        self.speech.abort();
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn is_listening(&self) -> bool {
        self.speech.is_listening()
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast::new(message, kind, self.config.toast_duration()));
    }

    /// Tick: advance the loading animation and expire the toast.
    pub fn tick(&mut self, now: Instant) {
        if self.pending_reply.is_some() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor = self.input.chars().count();
    }

    /// Send the input box contents. Returns whether a request was issued.
    pub fn send_message(&mut self) -> bool {
        if !self.input_enabled {
            tracing::debug!("send ignored while a reply is pending");
            return false;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            self.notify("Please enter a message", ToastKind::Warning);
            return false;
        }

        self.transcript.push(Role::User, text.clone());
        self.input.clear();
        self.cursor = 0;
        self.input_enabled = false;
        self.pending_reply = Some(self.transcript.push_loading());
        self.animation_frame = 0;

        self.spawn_request(
            move |api| async move { api.process_text(&text).await },
            BackendEvent::Reply,
        );
        true
    }

    fn on_reply(&mut self, result: ApiResult<ProcessTextResponse>) {
        if let Some(id) = self.pending_reply.take() {
            self.transcript.remove_loading(id);
        }

        match result {
            Ok(reply) => {
                let flagged = reply.is_error();
                let text = reply
                    .response
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string());
                self.transcript.push(Role::Assistant, text);
                self.load_history();
                if flagged {
                    tracing::warn!("backend flagged the reply as an error");
                } else {
                    self.notify("✓ Response received", ToastKind::Success);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "process_text failed");
                self.transcript.push(Role::Assistant, format!("Error: {e}"));
                self.notify("Error sending message", ToastKind::Error);
            }
        }

        self.input_enabled = true;
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
    }

    /// Put a past prompt back in the input box and send it.
    pub fn replay_history(&mut self, index: usize) -> bool {
        if !self.input_enabled {
            return false;
        }
        let Some(prompt) = self.history.prompt(index).map(str::to_string) else {
            return false;
        };
        self.history.state.select(Some(index));
        self.set_input(prompt);
        self.send_message()
    }

    /// Quick prompt `n` (0-based) from the sidebar.
    pub fn quick_prompt(&mut self, n: usize) -> bool {
        if !self.input_enabled {
            return false;
        }
        let Some(prompt) = self.quick_prompts.get(n).cloned() else {
            return false;
        };
        self.set_input(prompt);
        self.send_message()
    }

    pub fn toggle_voice_input(&mut self) {
        match self.speech.toggle(&self.tx) {
            Toggle::Unsupported => self.notify("Voice recognition not supported", ToastKind::Error),
            Toggle::Started => self.voice_status = "🎤 Listening...".to_string(),
            Toggle::Aborted => self.voice_status.clear(),
        }
    }

    fn on_speech(&mut self, event: SpeechEvent) {
        if !self.speech.finish(&event) {
            tracing::debug!(session = event.session(), "dropping speech result from aborted session");
            return;
        }

        match event {
            SpeechEvent::Recognized { text, .. } => {
                self.voice_status.clear();
                self.set_input(text);
                self.send_message();
            }
            SpeechEvent::Failed { error, .. } => {
                tracing::warn!(error = %error, "speech recognition failed");
                self.voice_status = format!("❌ Error: {}", error.code());
            }
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.prefs.set_dark_mode(self.dark_mode);
        let label = if self.dark_mode { "🌙 Dark mode" } else { "☀️ Light mode" };
        self.notify(label, ToastKind::Info);
    }

    /// Header toggle form of auto-speak.
    pub fn toggle_auto_speak(&mut self) {
        self.set_auto_speak(!self.auto_speak);
        let label = if self.auto_speak { "Auto-speak enabled" } else { "Auto-speak disabled" };
        self.notify(label, ToastKind::Info);
    }

    /// Checkbox form of auto-speak in the settings panel.
    pub fn toggle_auto_speak_checkbox(&mut self) {
        self.set_auto_speak(!self.auto_speak);
    }

    fn set_auto_speak(&mut self, enabled: bool) {
        self.auto_speak = enabled;
        self.spawn_request(
            move |api| async move { api.set_auto_speak(enabled).await },
            move |result| BackendEvent::AutoSpeakSet { enabled, result },
        );
    }

    pub fn auto_speak_button_active(&self) -> bool {
        self.auto_speak
    }

    pub fn auto_speak_checkbox_checked(&self) -> bool {
        self.auto_speak
    }

    pub fn open_settings(&mut self) {
        self.settings.open = true;
    }

    pub fn close_settings(&mut self) {
        self.settings.open = false;
    }

    pub fn apply_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::Rate(rate) => {
                self.settings.rate = rate;
                self.prefs.set_speech_rate(rate);
                self.push_tts(TtsUpdate::Rate(rate));
            }
            SettingsAction::Volume(volume) => {
                self.settings.volume = volume;
                self.prefs.set_speech_volume(volume);
                self.push_tts(TtsUpdate::Volume(volume_fraction(volume)));
            }
            SettingsAction::Voice(index) => {
                self.spawn_request(
                    move |api| async move { api.update_tts(TtsUpdate::VoiceIndex(index)).await },
                    move |result| BackendEvent::VoiceSet { index, result },
                );
            }
            SettingsAction::ToggleAutoSpeak => self.toggle_auto_speak_checkbox(),
            SettingsAction::Model(model) => {
                self.spawn_request(
                    move |api| async move { api.set_model(&model).await },
                    BackendEvent::ModelSet,
                );
            }
        }
    }

    fn push_tts(&self, update: TtsUpdate) {
        self.spawn_request(
            move |api| async move { api.update_tts(update).await },
            move |result| BackendEvent::TtsUpdated { update, result },
        );
    }

    pub fn request_clear_history(&mut self) {
        self.show_confirm_clear = true;
    }

    pub fn confirm_clear_history(&mut self, confirmed: bool) {
        self.show_confirm_clear = false;
        if !confirmed {
            return;
        }
        self.spawn_request(
            |api| async move { api.clear_history().await },
            BackendEvent::HistoryCleared,
        );
    }

    pub fn load_history(&self) {
        let limit = self.config.history_limit;
        self.spawn_request(
            move |api| async move { api.history(limit).await },
            BackendEvent::History,
        );
    }

    pub fn load_models(&self) {
        self.spawn_request(|api| async move { api.list_models().await }, BackendEvent::Models);
    }

    pub fn load_voices(&self) {
        self.spawn_request(|api| async move { api.voices().await }, BackendEvent::Voices);
    }

    pub fn handle_backend(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Reply(result) => self.on_reply(result),
            BackendEvent::History(Ok(entries)) => self.history.replace(entries),
            BackendEvent::History(Err(e)) => {
                tracing::warn!(error = %e, "failed to load history");
                self.history.mark_unavailable();
            }
            BackendEvent::HistoryCleared(Ok(())) => {
                self.transcript.clear();
                self.transcript.push(Role::System, CLEARED_TEXT);
                self.load_history();
                self.notify("History cleared", ToastKind::Success);
            }
            BackendEvent::HistoryCleared(Err(e)) => {
                tracing::error!(error = %e, "failed to clear history");
                self.notify("Error clearing history", ToastKind::Error);
            }
            BackendEvent::Health(result) => {
                self.connection = ConnectionStatus::from_poll(&result);
            }
            BackendEvent::Models(Ok(models)) => {
                let selected = models
                    .current_model
                    .as_ref()
                    .and_then(|current| models.models.iter().position(|m| m == current))
                    .unwrap_or(0);
                self.settings.models.set_items(models.models, selected, "No models available");
            }
            BackendEvent::Models(Err(e)) => {
                tracing::warn!(error = %e, "failed to load models");
                self.settings.models.set_placeholder("Error loading models");
            }
            BackendEvent::ModelSet(Ok(reply)) => {
                let message = reply.message.unwrap_or_else(|| "Model updated".to_string());
                self.notify(message, ToastKind::Success);
            }
            BackendEvent::ModelSet(Err(e)) => {
                tracing::error!(error = %e, "failed to set model");
                self.notify("Failed to change model", ToastKind::Error);
            }
            BackendEvent::Voices(Ok(voices)) => {
                let names = voices
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| v.name.filter(|n| !n.is_empty()).unwrap_or_else(|| format!("Voice {}", i + 1)))
                    .collect();
                let saved = self.prefs.get().selected_voice;
                self.settings.voices.set_items(names, saved, "No voices available");
            }
            BackendEvent::Voices(Err(e)) => {
                tracing::warn!(error = %e, "failed to load voices");
                self.settings.voices.set_placeholder("Error loading voices");
            }
            BackendEvent::VoiceSet { index, result: Ok(_) } => {
                self.prefs.set_selected_voice(index);
                self.notify("Voice changed", ToastKind::Success);
            }
            BackendEvent::VoiceSet { index, result: Err(e) } => {
                tracing::error!(index, error = %e, "failed to change voice");
                self.notify("Failed to change voice", ToastKind::Error);
            }
            BackendEvent::AutoSpeakSet { enabled, result } => match result {
                Ok(()) => tracing::debug!(enabled, "auto-speak updated"),
                Err(e) => {
                    tracing::error!(enabled, error = %e, "failed to update auto-speak");
                    self.notify("Failed to update auto-speak", ToastKind::Error);
                }
            },
            BackendEvent::TtsUpdated { update, result } => match result {
                Ok(_) => tracing::debug!(?update, "tts settings updated"),
                Err(e) => {
                    tracing::error!(?update, error = %e, "failed to update tts settings");
                    self.notify("Failed to update speech settings", ToastKind::Error);
                }
            },
        }
    }

    pub fn handle_speech(&mut self, event: SpeechEvent) {
        self.on_speech(event);
    }

    /// Run one backend call on its own task and post the result back.
    fn spawn_request<T, F, Fut, W>(&self, request: F, wrap: W)
    where
        T: Send + 'static,
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
        W: FnOnce(ApiResult<T>) -> BackendEvent + Send + 'static,
    {
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = request(api).await;
            if tx.send(AppEvent::Backend(wrap(result))).is_err() {
                tracing::debug!("event channel closed, dropping backend result");
            }
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.abort();
        }
    }
}
