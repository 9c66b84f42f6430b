//! Application state shared across handlers
//!
//! Holds the orchestrator, the analyzer and the optional embedder. All of it
//! is built once at startup and never mutated.

use std::sync::Arc;
use std::time::Instant;

use finsight_advisor::{AdvisorConfig, FinancialAnalyzer, InsightStore, LlmService, MemoryInsightStore};
use finsight_llm::{Embedder, ModelGateway};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LlmService>,
    pub analyzer: Arc<FinancialAnalyzer>,
    /// Absent when no embedding backend is configured
    pub embedder: Option<Arc<dyn Embedder>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        gateway: Arc<ModelGateway>,
        advisor: AdvisorConfig,
        store: Arc<dyn InsightStore>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Self {
        let service = Arc::new(LlmService::new(gateway, advisor));
        let analyzer = Arc::new(FinancialAnalyzer::new(service.clone(), store));
        Self {
            service,
            analyzer,
            embedder,
            started_at: Instant::now(),
        }
    }

    /// State over a gateway with default settings and an in-memory cache
    pub fn with_gateway(gateway: Arc<ModelGateway>) -> Self {
        Self::new(
            gateway,
            AdvisorConfig::default(),
            Arc::new(MemoryInsightStore::default()),
            None,
        )
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn gateway(&self) -> &Arc<ModelGateway> {
        self.service.gateway()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
