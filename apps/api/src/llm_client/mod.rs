/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the Azure OpenAI API directly.
/// All LLM interactions MUST go through `LlmClient`.
///
/// Candidates are tried once each, in configured order, with no delay between them.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AzureOpenAiConfig;

pub mod prompts;

pub const MAX_TOKENS: u32 = 4000;
pub const TEMPERATURE: f32 = 0.7;
const PROBE_PROMPT: &str = "Hello";
const PROBE_MAX_TOKENS: u32 = 5;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Azure OpenAI credentials not configured")]
    NotConfigured,

    /// Carries every per-candidate failure, joined in attempt order.
    #[error("All models failed: {0}")]
    AllCandidatesFailed(String),
}

/// One chat-completion request. `system` and `temperature` are omitted when `None`.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// The transport seam. `AzureChatBackend` is the production implementation;
/// tests substitute an in-memory double.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn complete(&self, model: &str, request: ChatRequest<'_>) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Azure OpenAI wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AzureError {
    error: AzureErrorBody,
}

#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    message: String,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(request: &ChatRequest<'a>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });

        Self {
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

impl ChatCompletionResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Azure OpenAI deployment-scoped chat completions.
///
/// No client timeout is set at this boundary; the transport's own failure ends a call.
pub struct AzureChatBackend {
    client: Client,
    config: AzureOpenAiConfig,
}

impl AzureChatBackend {
    pub fn new(config: AzureOpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn deployment_url(endpoint: &str, model: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            endpoint.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl ChatBackend for AzureChatBackend {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn complete(&self, model: &str, request: ChatRequest<'_>) -> Result<String, LlmError> {
        let (Some(api_key), Some(endpoint)) = (&self.config.api_key, &self.config.endpoint) else {
            return Err(LlmError::NotConfigured);
        };

        let body = ChatCompletionRequest::from_request(&request);

        let response = self
            .client
            .post(Self::deployment_url(endpoint, model))
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AzureError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Chat completion on {model}: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion.into_text().ok_or(LlmError::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmClient: ordered fallback over candidate models
// ────────────────────────────────────────────────────────────────────────────

/// Availability of one candidate model, as reported by `/health`.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    Available,
    Error(String),
}

impl ModelStatus {
    pub fn label(&self) -> String {
        match self {
            ModelStatus::Available => "available".to_string(),
            ModelStatus::Error(msg) => format!("error: {msg}"),
        }
    }
}

/// The single LLM client shared by all handlers.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn ChatBackend>,
    models: Vec<String>,
}

impl LlmClient {
    pub fn new(config: AzureOpenAiConfig) -> Self {
        let models = config.deployments.clone();
        Self::with_backend(Arc::new(AzureChatBackend::new(config)), models)
    }

    pub fn with_backend(backend: Arc<dyn ChatBackend>, models: Vec<String>) -> Self {
        Self { backend, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    /// Returns the first successful completion across the candidate models.
    ///
    /// Each candidate is attempted exactly once. When all fail, the error carries
    /// every candidate's message as `Model <name>: <reason>`, joined with `"; "`.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        if !self.backend.is_configured() {
            return Err(LlmError::NotConfigured);
        }

        let request = ChatRequest {
            system: Some(system),
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: Some(TEMPERATURE),
        };

        let mut failures = Vec::with_capacity(self.models.len());

        for model in &self.models {
            match self.backend.complete(model, request).await {
                Ok(text) => {
                    info!("Chat completion succeeded on model {model}");
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Model {model} failed: {e}");
                    failures.push(format!("Model {model}: {e}"));
                }
            }
        }

        if failures.is_empty() {
            return Err(LlmError::AllCandidatesFailed(
                "no candidate models configured".to_string(),
            ));
        }

        Err(LlmError::AllCandidatesFailed(failures.join("; ")))
    }

    /// Sends a minimal request to every candidate model, in order.
    pub async fn probe_models(&self) -> Vec<(String, ModelStatus)> {
        let request = ChatRequest {
            system: None,
            prompt: PROBE_PROMPT,
            max_tokens: PROBE_MAX_TOKENS,
            temperature: None,
        };

        let mut results = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let status = match self.backend.complete(model, request).await {
                Ok(_) => ModelStatus::Available,
                Err(e) => ModelStatus::Error(e.to_string()),
            };
            results.push((model.clone(), status));
        }
        results
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeChatBackend;
    use super::*;

    fn client(backend: FakeChatBackend) -> (Arc<FakeChatBackend>, LlmClient) {
        let backend = Arc::new(backend);
        let client = LlmClient::with_backend(
            backend.clone(),
            vec!["gpt-5-chat".to_string(), "gpt-4o".to_string()],
        );
        (backend, client)
    }

    #[tokio::test]
    async fn test_first_successful_candidate_wins() {
        let (backend, client) = client(
            FakeChatBackend::configured()
                .respond("gpt-5-chat", "policy")
                .respond("gpt-4o", "other"),
        );
        let text = client.complete("prompt", "system").await.unwrap();
        assert_eq!(text, "policy");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_candidate() {
        let (backend, client) = client(
            FakeChatBackend::configured()
                .fail("gpt-5-chat", "overloaded")
                .respond("gpt-4o", "fallback policy"),
        );
        let text = client.complete("prompt", "system").await.unwrap();
        assert_eq!(text, "fallback policy");
        assert_eq!(
            *backend.calls.lock().unwrap(),
            vec!["gpt-5-chat".to_string(), "gpt-4o".to_string()]
        );
    }

    #[tokio::test]
    async fn test_all_candidates_failing_reports_every_reason() {
        let (backend, client) = client(
            FakeChatBackend::configured()
                .fail("gpt-5-chat", "quota exceeded")
                .fail("gpt-4o", "content filtered"),
        );
        let err = client.complete("prompt", "system").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Model gpt-5-chat"));
        assert!(message.contains("quota exceeded"));
        assert!(message.contains("Model gpt-4o"));
        assert!(message.contains("content filtered"));
        assert_eq!(backend.call_count(), 2, "each candidate tried exactly once");
    }

    #[tokio::test]
    async fn test_generation_uses_fixed_token_and_temperature_settings() {
        let (backend, client) =
            client(FakeChatBackend::configured().respond("gpt-5-chat", "ok"));
        client.complete("the prompt", "the persona").await.unwrap();
        let requests = backend.requests.lock().unwrap();
        let (system, prompt, max_tokens, temperature) = &requests[0];
        assert_eq!(system.as_deref(), Some("the persona"));
        assert_eq!(prompt, "the prompt");
        assert_eq!(*max_tokens, 4000);
        assert_eq!(*temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_unconfigured_backend_makes_no_calls() {
        let (backend, client) = client(FakeChatBackend::default());
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_candidate_list_fails() {
        let backend = Arc::new(FakeChatBackend::configured());
        let client = LlmClient::with_backend(backend, vec![]);
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::AllCandidatesFailed(_)));
    }

    #[tokio::test]
    async fn test_probe_reports_each_model() {
        let (backend, client) = client(
            FakeChatBackend::configured()
                .respond("gpt-5-chat", "hi")
                .fail("gpt-4o", "unavailable"),
        );
        let results = client.probe_models().await;
        assert_eq!(results[0], ("gpt-5-chat".to_string(), ModelStatus::Available));
        assert_eq!(results[1].0, "gpt-4o");
        assert!(results[1].1.label().starts_with("error: "));
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].2, 5);
        assert!(requests[0].0.is_none());
    }

    #[test]
    fn test_request_body_includes_system_message_first() {
        let request = ChatRequest {
            system: Some("persona"),
            prompt: "write",
            max_tokens: MAX_TOKENS,
            temperature: Some(TEMPERATURE),
        };
        let body = serde_json::to_value(ChatCompletionRequest::from_request(&request)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "write");
        assert_eq!(body["max_tokens"], 4000);
    }

    #[test]
    fn test_probe_body_omits_temperature() {
        let request = ChatRequest {
            system: None,
            prompt: PROBE_PROMPT,
            max_tokens: PROBE_MAX_TOKENS,
            temperature: None,
        };
        let body = serde_json::to_value(ChatCompletionRequest::from_request(&request)).unwrap();
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_text_extracts_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r##"{"choices":[{"message":{"role":"assistant","content":"# Policy"}}],
                "usage":{"prompt_tokens":10,"completion_tokens":2,"total_tokens":12}}"##,
        )
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("# Policy"));
    }

    #[test]
    fn test_response_without_choices_has_no_text() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_deployment_url_tolerates_trailing_slash() {
        assert_eq!(
            AzureChatBackend::deployment_url("https://hub.openai.azure.com/", "gpt-4o"),
            "https://hub.openai.azure.com/openai/deployments/gpt-4o/chat/completions"
        );
    }
}
