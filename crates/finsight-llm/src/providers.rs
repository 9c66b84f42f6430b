//! LLM Provider implementations

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::types::*;

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Whether the provider has what it needs to be called (credentials, URL)
    fn is_configured(&self) -> bool;

    /// Check if the provider is reachable
    async fn is_available(&self) -> bool {
        self.is_configured()
    }

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

/// Map a non-success HTTP response onto a typed error
pub(crate) async fn error_from_response(response: reqwest::Response) -> LLMError {
    let status = response.status();
    let retry_after_seconds = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => LLMError::Authentication {
            message: format!("HTTP {}: {}", status, body),
        },
        429 => LLMError::RateLimited {
            retry_after_seconds,
        },
        code => LLMError::RequestFailed {
            status: Some(code),
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// ============================================================================
// OpenAI Provider
// ============================================================================

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAIConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(&base_url.into());
        self
    }
}

/// OpenAI API provider
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct OpenAIChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIChatMessage,
}

#[derive(Deserialize, Default)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut messages: Vec<OpenAIChatMessage> = vec![];

        if let Some(ref system) = request.system {
            messages.push(OpenAIChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }

        for msg in &request.messages {
            messages.push(OpenAIChatMessage {
                role: msg.role.as_str().to_string(),
                content: Some(msg.content.clone()),
            });
        }

        let chat_request = OpenAIChatRequest {
            model: request.model.unwrap_or_else(|| self.config.model.clone()),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: if request.json_mode {
                Some(serde_json::json!({"type": "json_object"}))
            } else {
                None
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&chat_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let chat_response: OpenAIChatResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidResponse {
                message: "response contained no choices".to_string(),
            })?
            .message
            .content
            .unwrap_or_default();

        let usage = chat_response.usage.unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage: TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
            model: chat_response.model.or_else(|| Some(self.config.model.clone())),
        })
    }
}

// ============================================================================
// Anthropic Provider
// ============================================================================

/// Configuration for Anthropic provider
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl AnthropicConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com/v1";
    pub const DEFAULT_MODEL: &'static str = "claude-3-sonnet-20240229";
    pub const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(&base_url.into());
        self
    }
}

/// Anthropic Claude API provider
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Used when a request carries no token ceiling; the API requires one
    const DEFAULT_MAX_TOKENS: u32 = 1024;

    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type", default)]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "Anthropic"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut system_parts: Vec<String> = request.system.iter().cloned().collect();
        let mut messages: Vec<AnthropicMessage> = vec![];

        for msg in &request.messages {
            match msg.role {
                // The messages API takes system text as a top-level field
                MessageRole::System => system_parts.push(msg.content.clone()),
                MessageRole::User | MessageRole::Assistant => messages.push(AnthropicMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        if request.json_mode {
            system_parts.push("IMPORTANT: Respond with valid JSON only.".to_string());
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        let anthropic_request = AnthropicRequest {
            model: request.model.unwrap_or_else(|| self.config.model.clone()),
            max_tokens: request.max_tokens.unwrap_or(Self::DEFAULT_MAX_TOKENS),
            system,
            messages,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", AnthropicConfig::API_VERSION)
            .header("content-type", "application/json")
            .json(&anthropic_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let anthropic_response: AnthropicResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let texts: Vec<String> = anthropic_response
            .content
            .into_iter()
            .filter(|c| c.content_type.is_empty() || c.content_type == "text")
            .filter_map(|c| c.text)
            .collect();

        if texts.is_empty() {
            return Err(LLMError::InvalidResponse {
                message: "response contained no text blocks".to_string(),
            });
        }

        let usage = anthropic_response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: texts.concat(),
            usage,
            model: anthropic_response
                .model
                .or_else(|| Some(self.config.model.clone())),
        })
    }
}

// ============================================================================
// Ollama Provider (Local)
// ============================================================================

/// Configuration for Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

impl OllamaConfig {
    pub const DEFAULT_MODEL: &'static str = "llama3.1:8b";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(&base_url.into()),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Ollama local LLM provider
pub struct OllamaProvider {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn is_configured(&self) -> bool {
        !self.config.base_url.is_empty()
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        self.client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        // A single user turn is sent verbatim; longer conversations are flattened
        let prompt = match request.messages.as_slice() {
            [only] if only.role == MessageRole::User => only.content.clone(),
            messages => {
                messages
                    .iter()
                    .map(|m| match m.role {
                        MessageRole::User => format!("User: {}", m.content),
                        MessageRole::Assistant => format!("Assistant: {}", m.content),
                        MessageRole::System => format!("System: {}", m.content),
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n")
                    + "\n\nAssistant:"
            }
        };

        let ollama_request = OllamaRequest {
            model: request.model.unwrap_or_else(|| self.config.model.clone()),
            prompt,
            stream: false,
            system: request.system.clone(),
            format: request.json_mode.then_some("json"),
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.base_url);
        let response = self.client.post(&url).json(&ollama_request).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let ollama_response: OllamaResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        Ok(CompletionResponse {
            content: ollama_response.response.trim().to_string(),
            usage: TokenUsage::new(ollama_response.prompt_eval_count, ollama_response.eval_count),
            model: Some(self.config.model.clone()),
        })
    }
}

// ============================================================================
// Scripted Provider (offline and tests)
// ============================================================================

type ReplyFn = dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync;

enum Script {
    Queue(Mutex<VecDeque<Result<String>>>),
    Func(Box<ReplyFn>),
}

/// Provider that answers from a script instead of a model.
///
/// Every request is recorded so callers can inspect what would have been sent.
pub struct ScriptedProvider {
    script: Script,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Replies are consumed in order; once exhausted every call fails
    pub fn sequence(replies: Vec<Result<String>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(replies.into())),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::from_fn(move |_| Ok(reply.clone()))
    }

    pub fn failing(error: LLMError) -> Self {
        Self::from_fn(move |_| Err(error.clone()))
    }

    pub fn from_fn(f: impl Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            script: Script::Func(Box::new(f)),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, for exercising timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Scripted
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = match &self.script {
            Script::Queue(queue) => queue.lock().pop_front().unwrap_or_else(|| {
                Err(LLMError::InvalidResponse {
                    message: "scripted replies exhausted".to_string(),
                })
            }),
            Script::Func(f) => f(&request),
        };

        reply.map(|content| CompletionResponse {
            content,
            usage: TokenUsage::default(),
            model: Some("scripted".to_string()),
        })
    }
}
