//! HTTP client for the inference bridge: model listing, chat/text
//! completion, prompt history CRUD and the client-info endpoint.

use reqwest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when a completion comes back without the expected field.
pub const EMPTY_RESPONSE: &str = "Response was empty";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },
}

/// Which completion endpoint a request goes to, and which response shape
/// comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    #[default]
    Chat,
    Text,
}

impl ApiType {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ApiType::Chat => "/api/chat",
            ApiType::Text => "/api/text",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApiType::Chat => "Chat",
            ApiType::Text => "Text",
        }
    }
}

impl std::fmt::Display for ApiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiType::Chat => write!(f, "chat"),
            ApiType::Text => write!(f, "text"),
        }
    }
}

/// Request body for both completion endpoints, built fresh per submission.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPayload {
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl CompletionResponse {
    /// Generated text of the first choice. Chat responses nest it under
    /// `message.content`, text responses carry it as `text`.
    pub fn text_for(&self, api_type: ApiType) -> Option<&str> {
        let choice = self.choices.first()?;
        match api_type {
            ApiType::Chat => choice.message.as_ref().map(|m| m.content.as_str()),
            ApiType::Text => choice.text.as_deref(),
        }
    }
}

/// One persisted prompt/response exchange, owned by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub prompt: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub api_type: ApiType,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub client_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAck {
    #[serde(default)]
    pub client_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub client_ip: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        ApiClient {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn list_models(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/models", self.base_url))
            .send()
            .await?;
        let list: ModelList = Self::read_json(response).await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    pub async fn complete(
        &self,
        api_type: ApiType,
        payload: &RequestPayload,
    ) -> Result<CompletionResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, api_type.endpoint()))
            .json(payload)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn history(&self) -> Result<HistoryPage, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/prompt-history", self.base_url))
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn delete_history(&self, id: i64) -> Result<DeleteAck, ApiError> {
        let response = self
            .client
            .delete(format!("{}/api/prompt-history/{}", self.base_url, id))
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn clear_history(&self) -> Result<DeleteAck, ApiError> {
        let response = self
            .client
            .delete(format!("{}/api/prompt-history", self.base_url))
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn client_info(&self) -> Result<ClientInfo, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/client-info", self.base_url))
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::server_error(response).await)
        }
    }

    /// Non-2xx responses carry `{error, details?}` when the bridge produced
    /// them itself; anything else becomes a bare status message.
    async fn server_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => {
                let error = body.error.unwrap_or_else(|| "API error".to_string());
                match body.details {
                    Some(details) if !details.is_empty() => format!("{} {}", error, details),
                    _ => error,
                }
            }
            Err(_) => "API error".to_string(),
        };
        ApiError::Server { status, message }
    }
}
