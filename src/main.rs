use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use assistant_chat::app::App;
use assistant_chat::config::Config;
use assistant_chat::prefs::PreferenceStore;
use assistant_chat::speech::SpeechInput;
use assistant_chat::tui::{self, EventHandler, Tui};
use assistant_chat::{handler, logging, ui};

#[derive(Parser, Debug)]
#[command(name = "assistant-chat", version)]
#[command(about = "Terminal chat client for a voice-enabled AI assistant backend")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:5000/api
    #[arg(short, long)]
    base_url: Option<String>,

    /// Preferences file (defaults to the user config directory)
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Speech recognizer command; prints one transcript on stdout and exits
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "ARGV")]
    speech_command: Option<Vec<String>>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();

    if let Some(url) = &cli.base_url {
        config.api_base_url = url.clone();
    }
    if let Some(argv) = &cli.speech_command {
        config.speech_command = Some(argv.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let log_path = match &cli.log_file {
        Some(path) => path.clone(),
        None => Config::default_log_path()?,
    };
    let _log_guard = logging::init(&log_path, config.log_filter.as_deref())?;

    let prefs_path = match &cli.prefs {
        Some(path) => path.clone(),
        None => PreferenceStore::default_path()?,
    };
    let prefs = PreferenceStore::load(prefs_path);
    let speech = SpeechInput::from_command(config.speech_command.as_deref());
    if !speech.is_supported() {
        tracing::info!("no speech recognizer configured, voice input disabled");
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, config, prefs, speech).await;

    tui::restore()?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "exiting with error");
    }
    result
}

async fn run(terminal: &mut Tui, config: Config, prefs: PreferenceStore, speech: SpeechInput) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(config, prefs, speech, events.sender());
    app.start();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event)?,
            None => break,
        }
    }

    app.shutdown();
    tracing::info!("shutting down");
    Ok(())
}
