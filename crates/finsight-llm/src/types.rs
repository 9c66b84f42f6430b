//! Common types for LLM interactions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LLMError {
    /// No backend is configured, or a backend is missing its credentials
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limited{}", .retry_after_seconds.map(|s| format!(": retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("Request failed: {message}")]
    RequestFailed { status: Option<u16>, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl LLMError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Errors worth retrying against the same backend
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::RequestFailed {
                status: Some(status),
                ..
            } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Authentication { .. } => "authentication",
            Self::RateLimited { .. } => "rate_limited",
            Self::RequestFailed { .. } => "request_failed",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::NetworkError { .. } => "network",
            Self::Timeout { .. } => "timeout",
        }
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout { after_ms: 0 }
        } else if e.is_decode() {
            Self::InvalidResponse {
                message: e.to_string(),
            }
        } else {
            Self::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to complete a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model to use (provider-specific)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// System message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Temperature (0.0-2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Max tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Whether to request JSON output
    #[serde(default)]
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: None,
            system: None,
            messages,
            temperature: None,
            max_tokens: None,
            json_mode: false,
        }
    }

    /// Single user turn
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self::new(vec![Message::user(prompt)])
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Text of the last user message, if any
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated content
    pub content: String,
    /// Token usage
    #[serde(default)]
    pub usage: TokenUsage,
    /// Which model was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            model: None,
        }
    }
}

/// Provider kind for routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI chat completions API
    OpenAI,
    /// Anthropic messages API
    Anthropic,
    /// Ollama local LLM
    Ollama,
    /// Canned replies, used offline and in tests
    Scripted,
}

impl ProviderKind {
    /// Priority used when no explicit order is configured
    pub const DEFAULT_ORDER: [ProviderKind; 4] =
        [Self::OpenAI, Self::Anthropic, Self::Ollama, Self::Scripted];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Some(Self::OpenAI),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "ollama" | "local" => Some(Self::Ollama),
            "scripted" => Some(Self::Scripted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::Scripted => "scripted",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
