//! finsight Prompts - Task prompts rendered from typed financial data
//!
//! Every function here is pure: identical input yields a byte-identical
//! prompt. Money is rendered with two decimals and percentages with one.
//! Missing inputs render a literal sentence such as
//! "No recent transactions available." rather than an empty section.
//!
//! The categorization prompt enumerates [`finsight_types::Category::ALL`],
//! the same set the response interpreter validates against.

pub mod format;
pub mod summary;
pub mod templates;

pub use format::{format_currency, format_fraction_percent, format_percent, title_case};
pub use summary::{
    format_budget_data, format_context, format_goals, format_spending_comparison,
    summarize_transactions, top_categories, total_expenses, total_income,
};
pub use templates::{
    analysis_prompt, budget_optimization_prompt, categorization_prompt, chat_prompt,
    recommendation_prompt, structured_categorization_prompt, SYSTEM_PROMPT,
};
