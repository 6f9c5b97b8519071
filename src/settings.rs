//! State of the settings popup.
//!
//! The panel only tracks what the controls show. Every user change comes back
//! as a [`SettingsAction`] which the app turns into a backend call.

pub const RATE_MIN: u32 = 50;
pub const RATE_MAX: u32 = 300;
pub const RATE_STEP: u32 = 10;
pub const VOLUME_STEP: u8 = 5;

/// Slider value (0–100) to the fraction the backend expects.
pub fn volume_fraction(volume: u8) -> f64 {
    f64::from(volume.min(100)) / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Rate,
    Volume,
    Voice,
    AutoSpeak,
    Model,
}

impl SettingsField {
    pub const ALL: [SettingsField; 5] = [
        SettingsField::Rate,
        SettingsField::Volume,
        SettingsField::Voice,
        SettingsField::AutoSpeak,
        SettingsField::Model,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::Rate => "Speech rate",
            SettingsField::Volume => "Volume",
            SettingsField::Voice => "Voice",
            SettingsField::AutoSpeak => "Auto-speak",
            SettingsField::Model => "Model",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    Rate(u32),
    Volume(u8),
    Voice(usize),
    ToggleAutoSpeak,
    Model(String),
}

/// A select control: either real options or a single placeholder line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionList {
    pub items: Vec<String>,
    pub selected: usize,
    pub placeholder: Option<String>,
}

impl OptionList {
    pub fn loading() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            placeholder: Some("Loading...".to_string()),
        }
    }

    pub fn set_items(&mut self, items: Vec<String>, selected: usize, empty_text: &str) {
        if items.is_empty() {
            self.set_placeholder(empty_text);
            return;
        }
        self.selected = selected.min(items.len() - 1);
        self.items = items;
        self.placeholder = None;
    }

    pub fn set_placeholder(&mut self, text: &str) {
        self.items.clear();
        self.selected = 0;
        self.placeholder = Some(text.to_string());
    }

    pub fn current(&self) -> Option<&str> {
        if self.placeholder.is_some() {
            return None;
        }
        self.items.get(self.selected).map(String::as_str)
    }

    pub fn display(&self) -> &str {
        self.placeholder
            .as_deref()
            .or_else(|| self.current())
            .unwrap_or("")
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + self.items.len() - 1) % self.items.len();
        }
    }
}

#[derive(Debug)]
pub struct SettingsPanel {
    pub open: bool,
    pub field: SettingsField,
    pub rate: u32,
    pub volume: u8,
    pub voices: OptionList,
    pub models: OptionList,
}

impl SettingsPanel {
    pub fn new(rate: u32, volume: u8) -> Self {
        Self {
            open: false,
            field: SettingsField::Rate,
            rate: rate.clamp(RATE_MIN, RATE_MAX),
            volume: volume.min(100),
            voices: OptionList::loading(),
            models: OptionList::loading(),
        }
    }

    pub fn field_down(&mut self) {
        let i = (self.field.index() + 1) % SettingsField::ALL.len();
        self.field = SettingsField::ALL[i];
    }

    pub fn field_up(&mut self) {
        let len = SettingsField::ALL.len();
        let i = (self.field.index() + len - 1) % len;
        self.field = SettingsField::ALL[i];
    }

    /// Left/Right on the focused control. Sliders fire immediately; selects
    /// only move their highlight until applied.
    pub fn adjust(&mut self, increase: bool) -> Option<SettingsAction> {
        match self.field {
            SettingsField::Rate => {
                let rate = if increase {
                    (self.rate + RATE_STEP).min(RATE_MAX)
                } else {
                    self.rate.saturating_sub(RATE_STEP).max(RATE_MIN)
                };
                if rate == self.rate {
                    return None;
                }
                self.rate = rate;
                Some(SettingsAction::Rate(rate))
            }
            SettingsField::Volume => {
                let volume = if increase {
                    self.volume.saturating_add(VOLUME_STEP).min(100)
                } else {
                    self.volume.saturating_sub(VOLUME_STEP)
                };
                if volume == self.volume {
                    return None;
                }
                self.volume = volume;
                Some(SettingsAction::Volume(volume))
            }
            SettingsField::Voice => {
                if increase { self.voices.next() } else { self.voices.prev() }
                None
            }
            SettingsField::Model => {
                if increase { self.models.next() } else { self.models.prev() }
                None
            }
            SettingsField::AutoSpeak => None,
        }
    }

    /// Enter/Space on the focused control.
    pub fn activate(&mut self) -> Option<SettingsAction> {
        match self.field {
            SettingsField::Voice => self
                .voices
                .current()
                .map(|_| SettingsAction::Voice(self.voices.selected)),
            SettingsField::Model => self
                .models
                .current()
                .map(|model| SettingsAction::Model(model.to_string())),
            SettingsField::AutoSpeak => Some(SettingsAction::ToggleAutoSpeak),
            SettingsField::Rate | SettingsField::Volume => None,
        }
    }
}
