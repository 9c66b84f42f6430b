use thiserror::Error;

/// Errors that escape a task entry point. Provider failures never do; they
/// become fallback values inside the orchestrator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdvisorError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Insight store error: {message}")]
    Store { message: String },
}

impl AdvisorError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
