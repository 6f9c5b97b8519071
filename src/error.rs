use reqwest::StatusCode;

/// Failures talking to the assistant backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset).
    #[error("could not reach backend: {0}")]
    Request(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {}", .0.as_u16())]
    Status(StatusCode),

    /// The body was not the JSON shape we expected.
    #[error("invalid response from backend: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Failures of a speech capture session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("no speech was recognized")]
    NoSpeech,

    #[error("could not start recognizer: {0}")]
    AudioCapture(String),

    #[error("recognizer exited with status {0}")]
    Exited(i32),

    #[error("recognizer terminated by signal")]
    Killed,
}

impl SpeechError {
    /// Short machine-style code shown in the voice status line.
    pub fn code(&self) -> String {
        match self {
            SpeechError::NoSpeech => "no-speech".to_string(),
            SpeechError::AudioCapture(_) => "audio-capture".to_string(),
            SpeechError::Exited(code) => format!("exit-status-{code}"),
            SpeechError::Killed => "aborted".to_string(),
        }
    }
}
