//! finsight Advisor - Orchestration for the financial assistant
//!
//! [`LlmService`] runs the five model-backed tasks (categorize, chat, analyze,
//! recommend, optimize budget) as Build → Dispatch → Interpret pipelines.
//! [`FinancialAnalyzer`] layers a health score and a per-user insight cache
//! on top.
//!
//! # Failure policy
//!
//! Provider and parse failures never escape a task: they become typed
//! fallback values with zero or near-zero confidence. The only error a caller
//! sees is [`AdvisorError::Configuration`] when no backend is configured.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use analyzer::{
    health_score, user_data_from_transactions, AnalysisReport, FinancialAnalyzer, TimePeriod,
    DEFAULT_TIME_PERIOD,
};
pub use config::{AdvisorConfig, TaskBudgets};
pub use error::{AdvisorError, Result};
pub use service::LlmService;
pub use store::{InsightStore, MemoryInsightStore, DEFAULT_INSIGHT_TTL};
