//! Summaries of structured data embedded into prompts
//!
//! Each helper renders a literal sentence instead of an empty section when
//! its input is missing.

use finsight_types::{BudgetData, ChatContext, FinancialGoal, Transaction};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::format::{format_currency, format_decimal_percent, title_case};

pub const NO_TRANSACTIONS: &str = "No recent transactions available.";
pub const NO_GOALS: &str = "No specific financial goals set.";
pub const NO_BUDGET: &str = "No budget data available.";
pub const NO_COMPARISON: &str = "No comparison data available.";
pub const NO_CONTEXT: &str = "No specific context available.";
pub const NO_CATEGORIES: &str = "None recorded";

/// Categories shown in a transaction summary
pub const TOP_CATEGORY_COUNT: usize = 3;

const UNKNOWN_CATEGORY: &str = "unknown";

/// Expense totals per category, largest first.
///
/// Amounts are summed by magnitude; ties are broken by category name so the
/// ordering never depends on input order.
pub fn top_categories(transactions: &[Transaction], limit: usize) -> Vec<(String, Decimal)> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let name = tx
            .category
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
        let total = totals.entry(name).or_default();
        *total = total.saturating_add(tx.magnitude());
    }

    let mut ranked: Vec<(String, Decimal)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Sum of income magnitudes, saturating at `Decimal::MAX`
pub fn total_income(transactions: &[Transaction]) -> Decimal {
    saturating_total(transactions.iter().filter(|tx| tx.is_income()))
}

/// Sum of expense magnitudes, saturating at `Decimal::MAX`
pub fn total_expenses(transactions: &[Transaction]) -> Decimal {
    saturating_total(transactions.iter().filter(|tx| tx.is_expense()))
}

fn saturating_total<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Decimal {
    transactions.fold(Decimal::ZERO, |acc, tx| acc.saturating_add(tx.magnitude()))
}

pub fn summarize_transactions(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return NO_TRANSACTIONS.to_string();
    }

    let top = top_categories(transactions, TOP_CATEGORY_COUNT);
    let top_line = if top.is_empty() {
        NO_CATEGORIES.to_string()
    } else {
        top.iter()
            .map(|(name, amount)| format!("{name}: {}", format_currency(*amount)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "- Total Income: {}\n- Total Expenses: {}\n- Number of Transactions: {}\n- Top Spending Categories: {}",
        format_currency(total_income(transactions)),
        format_currency(total_expenses(transactions)),
        transactions.len(),
        top_line,
    )
}

pub fn format_goals(goals: &[FinancialGoal]) -> String {
    if goals.is_empty() {
        return NO_GOALS.to_string();
    }
    goals
        .iter()
        .map(|goal| {
            format!(
                "- {}: {} / {}",
                goal.title,
                format_currency(goal.current_amount),
                format_currency(goal.target_amount)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_budget_data(budget: &BudgetData) -> String {
    if budget.is_empty() {
        return NO_BUDGET.to_string();
    }
    budget
        .categories
        .iter()
        .map(|(name, category)| {
            format!(
                "- {}: {} allocated, {} spent",
                title_case(name),
                format_currency(category.allocated),
                format_currency(category.spent)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Budget-versus-actual lines; categories with nothing allocated are skipped
pub fn format_spending_comparison(budget: &BudgetData) -> String {
    let lines: Vec<String> = budget
        .categories
        .iter()
        .filter_map(|(name, category)| {
            let percent = category.utilization_percent()?;
            let status = category.status()?;
            Some(format!(
                "- {}: {} ({})",
                title_case(name),
                format_decimal_percent(percent),
                status
            ))
        })
        .collect();

    if lines.is_empty() {
        NO_COMPARISON.to_string()
    } else {
        lines.join("\n")
    }
}

pub fn format_context(context: &ChatContext) -> String {
    let mut lines = Vec::new();

    if let Some(n) = context
        .count("recent_transactions")
        .or_else(|| context.count("transactions"))
    {
        lines.push(format!("Recent Transactions: {n} transactions"));
    }
    if let Some(balance) = context.decimal("current_balance") {
        lines.push(format!("Current Balance: {}", format_currency(balance)));
    }
    if let Some(budget) = context.decimal("monthly_budget") {
        lines.push(format!("Monthly Budget: {}", format_currency(budget)));
    }
    if let Some(n) = context
        .count("financial_goals")
        .or_else(|| context.count("goals"))
    {
        lines.push(format!("Active Goals: {n} goals"));
    }

    if lines.is_empty() {
        NO_CONTEXT.to_string()
    } else {
        lines.join("\n")
    }
}
