//! Model Gateway - one call contract over a prioritized list of providers
//!
//! The gateway picks the first configured provider in priority order, applies
//! the process-wide temperature and token ceiling, bounds every call with a
//! timeout and retries transient failures with backoff. Failover to the next
//! provider only happens when explicitly enabled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::providers::*;
use crate::retry::RetryPolicy;
use crate::types::*;

/// Immutable gateway settings, built once at startup
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// System message attached to requests that carry none
    pub system_prompt: Option<String>,
    /// Temperature applied to requests that carry none
    pub temperature: f32,
    /// Process-wide ceiling on generated tokens
    pub max_tokens: u32,
    /// Upper bound on a single provider call
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    /// Try the next provider when the current one fails
    pub failover: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            temperature: 0.7,
            max_tokens: 2000,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            failover: false,
        }
    }
}

/// Dispatches completion requests to the configured providers
pub struct ModelGateway {
    providers: Vec<Arc<dyn LLMProvider>>,
    config: GatewayConfig,
}

impl ModelGateway {
    /// Create a gateway over providers already in priority order.
    /// Providers that are not configured are dropped.
    pub fn new(providers: Vec<Arc<dyn LLMProvider>>, config: GatewayConfig) -> Self {
        let providers: Vec<_> = providers.into_iter().filter(|p| p.is_configured()).collect();

        if providers.is_empty() {
            tracing::warn!("No LLM provider configured; completions will fail with a configuration error");
        } else {
            tracing::info!(
                providers = ?providers.iter().map(|p| p.kind()).collect::<Vec<_>>(),
                failover = config.failover,
                "Model gateway ready"
            );
        }

        Self { providers, config }
    }

    pub fn builder() -> ModelGatewayBuilder {
        ModelGatewayBuilder::new()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Provider kinds in the order they will be tried
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// The provider that will serve the next request
    pub fn primary(&self) -> Option<ProviderKind> {
        self.providers.first().map(|p| p.kind())
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Fail fast, before any network call, when no backend is configured
    pub fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(LLMError::configuration("No LLM client configured"))
        }
    }

    /// Probe every provider's reachability
    pub async fn availability(&self) -> Vec<(ProviderKind, bool)> {
        let mut out = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            out.push((provider.kind(), provider.is_available().await));
        }
        out
    }

    /// Complete a single prompt and return the raw text
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = CompletionRequest::prompt(prompt).with_max_tokens(max_tokens);
        Ok(self.complete_request(request).await?.content)
    }

    /// Complete a single prompt asking the provider for a JSON object
    pub async fn complete_json(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = CompletionRequest::prompt(prompt)
            .with_max_tokens(max_tokens)
            .with_json_mode();
        Ok(self.complete_request(request).await?.content)
    }

    pub async fn complete_request(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.ensure_configured()?;
        let request = self.normalize(request);

        let mut last_error = None;
        for provider in &self.providers {
            match self.call_with_retry(provider.as_ref(), &request).await {
                Ok(response) => return Ok(response),
                Err(e) if self.config.failover && !e.is_configuration() => {
                    tracing::warn!(provider = %provider.kind(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LLMError::configuration("No LLM client configured")))
    }

    fn normalize(&self, mut request: CompletionRequest) -> CompletionRequest {
        if request.system.is_none() {
            request.system = self.config.system_prompt.clone();
        }
        if request.temperature.is_none() {
            request.temperature = Some(self.config.temperature);
        }
        let ceiling = self.config.max_tokens;
        request.max_tokens = Some(request.max_tokens.map_or(ceiling, |n| n.min(ceiling)));
        request
    }

    async fn call_with_retry(
        &self,
        provider: &dyn LLMProvider,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let mut attempt = 1;
        loop {
            match self.call_once(provider, request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if self.config.retry.should_retry(attempt, &e) => {
                    let delay = self.config.retry.delay_for(attempt, &e);
                    tracing::warn!(
                        provider = %provider.kind(),
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Transient LLM error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once(
        &self,
        provider: &dyn LLMProvider,
        request: CompletionRequest,
    ) -> Result<CompletionResponse> {
        let started = Instant::now();
        let timeout = self.config.request_timeout;

        let result = match tokio::time::timeout(timeout, provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LLMError::Timeout {
                after_ms: timeout.as_millis() as u64,
            }),
        };

        let provider_label = provider.kind().as_str();
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::counter!(
            "finsight_llm_requests_total",
            "provider" => provider_label,
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("finsight_llm_request_duration_seconds", "provider" => provider_label)
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(response) => tracing::debug!(
                provider = %provider.kind(),
                model = ?response.model,
                completion_tokens = response.usage.completion_tokens,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "LLM completion succeeded"
            ),
            Err(e) => tracing::debug!(provider = %provider.kind(), error = %e, "LLM completion failed"),
        }

        result
    }
}

/// Builder for a gateway with explicit provider configuration
pub struct ModelGatewayBuilder {
    config: GatewayConfig,
    order: Vec<ProviderKind>,
    providers: Vec<Arc<dyn LLMProvider>>,
}

impl ModelGatewayBuilder {
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            order: ProviderKind::DEFAULT_ORDER.to_vec(),
            providers: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Priority order; kinds left out are never used
    pub fn with_order(mut self, order: Vec<ProviderKind>) -> Self {
        self.order = order;
        self
    }

    pub fn with_openai(self, config: OpenAIConfig) -> Self {
        self.with_provider(Arc::new(OpenAIProvider::new(config)))
    }

    pub fn with_anthropic(self, config: AnthropicConfig) -> Self {
        self.with_provider(Arc::new(AnthropicProvider::new(config)))
    }

    pub fn with_ollama(self, config: OllamaConfig) -> Self {
        self.with_provider(Arc::new(OllamaProvider::new(config)))
    }

    pub fn with_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> ModelGateway {
        let mut ordered: Vec<(usize, Arc<dyn LLMProvider>)> = self
            .providers
            .into_iter()
            .filter_map(|p| {
                let rank = self.order.iter().position(|k| *k == p.kind());
                if rank.is_none() {
                    tracing::debug!(provider = %p.kind(), "Provider not in priority order, skipping");
                }
                rank.map(|r| (r, p))
            })
            .collect();
        // Stable sort keeps insertion order among providers of the same kind
        ordered.sort_by_key(|(rank, _)| *rank);

        ModelGateway::new(ordered.into_iter().map(|(_, p)| p).collect(), self.config)
    }
}

impl Default for ModelGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
