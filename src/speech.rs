//! Voice input.
//!
//! Capture is optional: without a configured recognizer the app holds
//! [`SpeechInput::Unsupported`]. A capture session runs as a tokio task and
//! reports back through the app event channel; aborting the session drops
//! the task, which kills the recognizer process.

use std::process::Stdio;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::SpeechError;
use crate::tui::AppEvent;

/// Something that can listen once and return the finalized transcript.
pub trait Recognizer: Send + Sync {
    fn listen(&self) -> BoxFuture<'static, Result<String, SpeechError>>;
}

/// Runs an external program that records from the microphone and prints the
/// recognized text on stdout.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Recognizer for CommandRecognizer {
    fn listen(&self) -> BoxFuture<'static, Result<String, SpeechError>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        Box::pin(async move {
            let output = command
                .output()
                .await
                .map_err(|e| SpeechError::AudioCapture(e.to_string()))?;

            if !output.status.success() {
                return Err(match output.status.code() {
                    Some(code) => SpeechError::Exited(code),
                    None => SpeechError::Killed,
                });
            }

            let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if transcript.is_empty() {
                return Err(SpeechError::NoSpeech);
            }
            Ok(transcript)
        })
    }
}

#[derive(Clone)]
pub enum SpeechInput {
    Unsupported,
    Available(Arc<dyn Recognizer>),
}

impl SpeechInput {
    pub fn from_command(argv: Option<&[String]>) -> Self {
        match argv.and_then(CommandRecognizer::new) {
            Some(recognizer) => SpeechInput::Available(Arc::new(recognizer)),
            None => SpeechInput::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, SpeechInput::Available(_))
    }
}

#[derive(Debug)]
pub enum SpeechEvent {
    Recognized { session: u64, text: String },
    Failed { session: u64, error: SpeechError },
}

impl SpeechEvent {
    pub fn session(&self) -> u64 {
        match self {
            SpeechEvent::Recognized { session, .. } | SpeechEvent::Failed { session, .. } => *session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Unsupported,
    Started,
    Aborted,
}

/// Capture state: idle or listening in one numbered session.
pub struct SpeechAdapter {
    input: SpeechInput,
    session: u64,
    task: Option<JoinHandle<()>>,
}

impl SpeechAdapter {
    pub fn new(input: SpeechInput) -> Self {
        Self { input, session: 0, task: None }
    }

    pub fn is_listening(&self) -> bool {
        self.task.is_some()
    }

    /// Start capture when idle, abort it when listening.
    pub fn toggle(&mut self, tx: &UnboundedSender<AppEvent>) -> Toggle {
        let recognizer = match &self.input {
            SpeechInput::Unsupported => return Toggle::Unsupported,
            SpeechInput::Available(recognizer) => recognizer.clone(),
        };

        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(session = self.session, "speech capture aborted");
            return Toggle::Aborted;
        }

        self.session += 1;
        let session = self.session;
        let tx = tx.clone();
        self.task = Some(tokio::spawn(async move {
            let event = match recognizer.listen().await {
                Ok(text) => SpeechEvent::Recognized { session, text },
                Err(error) => SpeechEvent::Failed { session, error },
            };
            let _ = tx.send(AppEvent::Speech(event));
        }));
        tracing::debug!(session, "speech capture started");
        Toggle::Started
    }

    /// Accept an event from the current session and return to idle.
    /// Events from aborted sessions are dropped.
    pub fn finish(&mut self, event: &SpeechEvent) -> bool {
        if event.session() != self.session || self.task.is_none() {
            return false;
        }
        self.task = None;
        true
    }

    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SpeechAdapter {
    fn drop(&mut self) {
        self.abort();
    }
}
