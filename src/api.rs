use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ProcessTextRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SpeakToggleRequest {
    enabled: bool,
}

#[derive(Serialize)]
struct SetModelRequest<'a> {
    model: &'a str,
}

/// One field of the text-to-speech settings. Serializes as a single-key
/// object: `{"rate": 150}`, `{"volume": 0.6}` or `{"voice_index": 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsUpdate {
    Rate(u32),
    Volume(f64),
    VoiceIndex(usize),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessTextResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ProcessTextResponse {
    /// The backend reports `error` as either a bool or a message string.
    pub fn is_error(&self) -> bool {
        match &self.error {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(message)) => !message.is_empty(),
            Some(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub current_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    pub user: String,
    #[serde(default)]
    pub assistant: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub auto_speak: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Voice {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<Voice>,
}

/// Thin JSON client for the assistant backend. No retries, no timeouts.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn process_text(&self, text: &str) -> ApiResult<ProcessTextResponse> {
        tracing::debug!(chars = text.chars().count(), "POST /process_text");
        let response = self
            .client
            .post(self.url("/process_text"))
            .json(&ProcessTextRequest { text })
            .send()
            .await
            .map_err(ApiError::Request)?;

        decode(response).await
    }

    pub async fn update_tts(&self, update: TtsUpdate) -> ApiResult<MessageResponse> {
        tracing::debug!(?update, "POST /tts/settings");
        let response = self
            .client
            .post(self.url("/tts/settings"))
            .json(&update)
            .send()
            .await
            .map_err(ApiError::Request)?;

        decode(response).await
    }

    pub async fn set_auto_speak(&self, enabled: bool) -> ApiResult<()> {
        tracing::debug!(enabled, "POST /speak_toggle");
        let response = self
            .client
            .post(self.url("/speak_toggle"))
            .json(&SpeakToggleRequest { enabled })
            .send()
            .await
            .map_err(ApiError::Request)?;

        check_status(response).map(|_| ())
    }

    pub async fn list_models(&self) -> ApiResult<ModelsResponse> {
        let response = self
            .client
            .get(self.url("/models"))
            .send()
            .await
            .map_err(ApiError::Request)?;

        decode(response).await
    }

    pub async fn set_model(&self, model: &str) -> ApiResult<MessageResponse> {
        tracing::debug!(model, "POST /model/set");
        let response = self
            .client
            .post(self.url("/model/set"))
            .json(&SetModelRequest { model })
            .send()
            .await
            .map_err(ApiError::Request)?;

        decode(response).await
    }

    pub async fn history(&self, limit: usize) -> ApiResult<Vec<HistoryEntry>> {
        let response = self
            .client
            .get(self.url("/history"))
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(ApiError::Request)?;

        let history: HistoryResponse = decode(response).await?;
        Ok(history.history)
    }

    pub async fn clear_history(&self) -> ApiResult<()> {
        tracing::debug!("POST /clear_history");
        let response = self
            .client
            .post(self.url("/clear_history"))
            .send()
            .await
            .map_err(ApiError::Request)?;

        check_status(response).map(|_| ())
    }

    pub async fn health(&self) -> ApiResult<HealthResponse> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(ApiError::Request)?;

        decode(response).await
    }

    pub async fn voices(&self) -> ApiResult<Vec<Voice>> {
        let response = self
            .client
            .get(self.url("/tts/voices"))
            .send()
            .await
            .map_err(ApiError::Request)?;

        let voices: VoicesResponse = decode(response).await?;
        Ok(voices.voices)
    }
}

fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    check_status(response)?
        .json::<T>()
        .await
        .map_err(ApiError::Decode)
}
