pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod handler;
pub mod history;
pub mod logging;
pub mod monitor;
pub mod prefs;
pub mod settings;
pub mod speech;
pub mod toast;
pub mod tui;
pub mod ui;
