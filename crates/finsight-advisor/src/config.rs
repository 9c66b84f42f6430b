//! Orchestrator settings

use serde::{Deserialize, Serialize};

fn default_categorize() -> u32 {
    100
}
fn default_chat() -> u32 {
    500
}
fn default_analyze() -> u32 {
    1000
}
fn default_recommend() -> u32 {
    800
}
fn default_optimize() -> u32 {
    800
}

/// Per-task token ceilings. The gateway additionally caps them at its own maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBudgets {
    #[serde(default = "default_categorize")]
    pub categorize: u32,
    #[serde(default = "default_chat")]
    pub chat: u32,
    #[serde(default = "default_analyze")]
    pub analyze: u32,
    #[serde(default = "default_recommend")]
    pub recommend: u32,
    #[serde(default = "default_optimize")]
    pub optimize: u32,
}

impl Default for TaskBudgets {
    fn default() -> Self {
        Self {
            categorize: default_categorize(),
            chat: default_chat(),
            analyze: default_analyze(),
            recommend: default_recommend(),
            optimize: default_optimize(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub budgets: TaskBudgets,
    /// Ask for JSON categorization replies instead of labelled lines
    #[serde(default)]
    pub structured_output: bool,
    /// Transactions categorized at once; 1 is strictly sequential
    #[serde(default = "default_concurrency")]
    pub categorize_concurrency: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            budgets: TaskBudgets::default(),
            structured_output: false,
            categorize_concurrency: default_concurrency(),
        }
    }
}
