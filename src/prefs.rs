//! Persistent user preferences (theme, speech rate/volume, voice).
//!
//! Stored as a small JSON document next to the config file. Values are
//! written through on every change and once more on shutdown.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::Result;

use crate::config::Config;

pub const DEFAULT_RATE: u32 = 150;
pub const DEFAULT_VOLUME: u8 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,
    #[serde(rename = "rate")]
    pub speech_rate: u32,
    #[serde(rename = "volume")]
    pub speech_volume: u8,
    #[serde(rename = "selectedVoice")]
    pub selected_voice: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            speech_rate: DEFAULT_RATE,
            speech_volume: DEFAULT_VOLUME,
            selected_voice: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Load from `path`. A missing or unreadable file falls back to defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Preferences>(&content) {
                Ok(mut prefs) => {
                    prefs.speech_volume = prefs.speech_volume.min(100);
                    prefs
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable preferences");
                    Preferences::default()
                }
            },
            Err(_) => Preferences::default(),
        };

        Self { path, prefs }
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Config::config_dir()?.join("preferences.json"))
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.prefs)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.prefs.dark_mode = enabled;
        self.persist();
    }

    pub fn set_speech_rate(&mut self, rate: u32) {
        self.prefs.speech_rate = rate;
        self.persist();
    }

    pub fn set_speech_volume(&mut self, volume: u8) {
        self.prefs.speech_volume = volume.min(100);
        self.persist();
    }

    pub fn set_selected_voice(&mut self, index: usize) {
        self.prefs.selected_voice = index;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save preferences");
        }
    }
}
