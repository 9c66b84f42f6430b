//! Server Configuration
//!
//! Layered configuration: `config/default`, `config/local`, an optional
//! `--config` file, then `FINSIGHT__SECTION__KEY` environment variables.
//! Everything is converted into immutable values once at startup.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use finsight_advisor::{AdvisorConfig, TaskBudgets};
use finsight_api::ApiConfig;
use finsight_llm::{
    AnthropicConfig, GatewayConfig, OllamaConfig, OpenAIConfig, OpenAIEmbedderConfig, ProviderKind,
    RetryPolicy,
};

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    /// Model backends and call policy
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Insight cache
    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown grace period in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {addr}: {e}"))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Model backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default)]
    pub openai_model: Option<String>,

    #[serde(default)]
    pub openai_base_url: Option<String>,

    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    #[serde(default)]
    pub anthropic_model: Option<String>,

    /// Ollama is only used when a URL is set
    #[serde(default)]
    pub ollama_url: Option<String>,

    #[serde(default)]
    pub ollama_model: Option<String>,

    /// Backend priority, e.g. `["openai", "anthropic", "ollama"]`
    #[serde(default = "default_provider_order")]
    pub provider_order: Vec<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Process-wide token ceiling; per-task budgets are capped at this
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Total attempts per call, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_ms: u64,

    /// Try the next backend after a provider error
    #[serde(default)]
    pub failover: bool,

    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: None,
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_model: None,
            ollama_url: None,
            ollama_model: None,
            provider_order: default_provider_order(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
            retry_max_delay_ms: default_retry_max_delay(),
            failover: false,
            system_prompt: None,
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl LlmSettings {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            system_prompt: self.system_prompt.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            retry: RetryPolicy {
                max_attempts: self.max_retries,
                base_delay: Duration::from_millis(self.retry_base_delay_ms),
                max_delay: Duration::from_millis(self.retry_max_delay_ms),
            },
            failover: self.failover,
        }
    }

    /// Priority order with unknown names dropped
    pub fn provider_order(&self) -> Vec<ProviderKind> {
        self.provider_order
            .iter()
            .filter_map(|name| {
                let kind = ProviderKind::parse(name);
                if kind.is_none() {
                    tracing::warn!(provider = %name, "Unknown provider in llm.provider_order, ignoring");
                }
                kind
            })
            .collect()
    }

    pub fn openai(&self) -> Option<OpenAIConfig> {
        let key = non_empty(&self.openai_api_key)?;
        let mut config = OpenAIConfig::new(key);
        if let Some(model) = non_empty(&self.openai_model) {
            config = config.with_model(model);
        }
        if let Some(url) = non_empty(&self.openai_base_url) {
            config = config.with_base_url(url);
        }
        Some(config)
    }

    pub fn anthropic(&self) -> Option<AnthropicConfig> {
        let key = non_empty(&self.anthropic_api_key)?;
        let mut config = AnthropicConfig::new(key);
        if let Some(model) = non_empty(&self.anthropic_model) {
            config = config.with_model(model);
        }
        Some(config)
    }

    pub fn ollama(&self) -> Option<OllamaConfig> {
        let url = non_empty(&self.ollama_url)?;
        let mut config = OllamaConfig::new(url);
        if let Some(model) = non_empty(&self.ollama_model) {
            config = config.with_model(model);
        }
        Some(config)
    }

    /// Embeddings reuse the OpenAI credentials
    pub fn embedder(&self) -> Option<OpenAIEmbedderConfig> {
        let key = non_empty(&self.openai_api_key)?;
        let mut config = OpenAIEmbedderConfig::new(key)
            .with_model(self.embedding_model.clone(), self.embedding_dimension);
        if let Some(url) = non_empty(&self.openai_base_url) {
            config = config.with_base_url(url);
        }
        Some(config)
    }
}

/// Insight cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// How often expired entries are swept
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

/// API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_compression: bool,

    #[serde(default = "default_true")]
    pub enable_tracing: bool,

    #[serde(default = "default_true")]
    pub enable_swagger: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_compression: true,
            enable_tracing: true,
            enable_swagger: true,
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiSettings {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            enable_cors: self.enable_cors,
            cors_origins: self.cors_origins.clone(),
            enable_compression: self.enable_compression,
            enable_tracing: self.enable_tracing,
            enable_swagger: self.enable_swagger,
            max_body_size: self.max_body_size,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus listener port (separate from the API)
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_provider_order() -> Vec<String> {
    vec!["openai".to_string(), "anthropic".to_string(), "ollama".to_string()]
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    500
}

fn default_retry_max_delay() -> u64 {
    8000
}

fn default_embedding_model() -> String {
    OpenAIEmbedderConfig::DEFAULT_MODEL.to_string()
}

fn default_embedding_dimension() -> usize {
    OpenAIEmbedderConfig::DEFAULT_DIMENSION
}

fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_purge_interval() -> u64 {
    300
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024 // 2MB
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from files and the environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FINSIGHT")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("llm.provider_order")
                .with_list_parse_key("api.cors_origins")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn advisor_config(&self) -> AdvisorConfig {
        self.advisor.clone()
    }
}

/// Reject settings that would make every call fail
pub fn validate_config(config: &ServerConfig) -> anyhow::Result<()> {
    let llm = &config.llm;

    if !(0.0..=2.0).contains(&llm.temperature) {
        anyhow::bail!("llm.temperature must be between 0.0 and 2.0, got {}", llm.temperature);
    }
    if llm.max_tokens == 0 {
        anyhow::bail!("llm.max_tokens must be greater than zero");
    }
    if llm.max_retries == 0 {
        anyhow::bail!("llm.max_retries must be at least 1");
    }
    if llm.request_timeout_secs == 0 {
        anyhow::bail!("llm.request_timeout_secs must be greater than zero");
    }
    if llm.retry_base_delay_ms > llm.retry_max_delay_ms {
        anyhow::bail!("llm.retry_base_delay_ms must not exceed llm.retry_max_delay_ms");
    }
    if llm.embedding_dimension == 0 {
        anyhow::bail!("llm.embedding_dimension must be greater than zero");
    }
    if llm.provider_order().is_empty() {
        anyhow::bail!("llm.provider_order names no known provider");
    }

    let TaskBudgets {
        categorize,
        chat,
        analyze,
        recommend,
        optimize,
    } = &config.advisor.budgets;
    if [categorize, chat, analyze, recommend, optimize].contains(&&0) {
        anyhow::bail!("advisor.budgets entries must be greater than zero");
    }
    if config.advisor.categorize_concurrency == 0 {
        anyhow::bail!("advisor.categorize_concurrency must be at least 1");
    }
    if config.cache.ttl_secs == 0 {
        anyhow::bail!("cache.ttl_secs must be greater than zero");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.max_tokens, 2000);
        assert!(!config.llm.failover);
        assert_eq!(config.advisor.budgets.categorize, 100);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.llm.temperature = 3.5;
        assert!(validate_config(&config).is_err());

        let mut config = ServerConfig::default();
        config.llm.max_tokens = 0;
        assert!(validate_config(&config).is_err());

        let mut config = ServerConfig::default();
        config.llm.max_retries = 0;
        assert!(validate_config(&config).is_err());

        let mut config = ServerConfig::default();
        config.llm.provider_order = vec!["bard".to_string()];
        assert!(validate_config(&config).is_err());

        let mut config = ServerConfig::default();
        config.advisor.budgets.chat = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_gateway_config_conversion() {
        let mut settings = LlmSettings::default();
        settings.max_retries = 5;
        settings.retry_base_delay_ms = 100;
        settings.failover = true;

        let gateway = settings.gateway_config();
        assert_eq!(gateway.retry.max_attempts, 5);
        assert_eq!(gateway.retry.base_delay, Duration::from_millis(100));
        assert_eq!(gateway.request_timeout, Duration::from_secs(30));
        assert!(gateway.failover);
    }

    #[test]
    fn test_providers_need_credentials() {
        let mut settings = LlmSettings::default();
        assert!(settings.openai().is_none());
        assert!(settings.ollama().is_none());
        assert!(settings.embedder().is_none());

        settings.openai_api_key = Some("  ".to_string());
        assert!(settings.openai().is_none());

        settings.openai_api_key = Some("sk-test".to_string());
        settings.openai_model = Some("gpt-4o".to_string());
        settings.ollama_url = Some("http://localhost:11434".to_string());
        assert_eq!(settings.openai().map(|c| c.model), Some("gpt-4o".to_string()));
        assert!(settings.ollama().is_some());
        assert_eq!(settings.embedder().map(|c| c.dimension), Some(1536));
    }

    #[test]
    fn test_provider_order_parsing() {
        let mut settings = LlmSettings::default();
        settings.provider_order = vec!["anthropic".into(), "nope".into(), "openai".into()];
        assert_eq!(
            settings.provider_order(),
            vec![ProviderKind::Anthropic, ProviderKind::OpenAI]
        );
    }
}
