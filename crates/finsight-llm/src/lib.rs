//! finsight LLM - Model gateway over interchangeable LLM backends
//!
//! ## Providers
//! - OpenAI chat completions (system + user roles)
//! - Anthropic messages API (system as a top-level field)
//! - Ollama, when a local URL is configured
//! - Scripted, canned replies for offline runs and tests
//!
//! ## Call contract
//!
//! [`ModelGateway::complete`] takes a prompt and a token ceiling and returns
//! raw text or a typed [`LLMError`]. With no backend configured it fails with
//! [`LLMError::Configuration`] before any network call. Transient failures
//! are retried with backoff; everything else is returned to the caller, which
//! owns the fallback policy.

pub mod embedding;
pub mod gateway;
pub mod providers;
pub mod retry;
pub mod types;

pub use embedding::*;
pub use gateway::*;
pub use providers::*;
pub use retry::*;
pub use types::*;
