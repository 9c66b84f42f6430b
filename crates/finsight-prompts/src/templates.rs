//! The five task prompts

use finsight_types::{BudgetData, Category, ChatContext, Transaction, UserData, UserProfile};
use rust_decimal::Decimal;

use crate::format::{format_currency, format_fraction_percent, single_line};
use crate::summary::{
    format_budget_data, format_context, format_goals, format_spending_comparison,
    summarize_transactions, NO_CATEGORIES,
};

/// System message sent with every completion
pub const SYSTEM_PROMPT: &str = "You are a helpful financial advisor AI.";

const GOALS_NOT_SPECIFIED: &str = "Not specified";

fn category_list(categories: impl Iterator<Item = Category>) -> String {
    categories.map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
}

fn categorization_header(description: &str, amount: Decimal) -> String {
    format!(
        "Analyze this financial transaction and categorize it appropriately.

Transaction Details:
- Description: {}
- Amount: {}

Available Categories:
Income: {}
Expenses: {}
",
        single_line(description),
        format_currency(amount),
        category_list(Category::income()),
        category_list(Category::expenses()),
    )
}

/// Prompt asking for `Category:`, `Confidence:` and `Reasoning:` lines
pub fn categorization_prompt(description: &str, amount: Decimal) -> String {
    format!(
        r#"{}
Instructions:
1. Analyze the transaction description and amount
2. Choose the most appropriate category
3. Provide a confidence score (0.0 to 1.0)
4. Give a brief reasoning

Response Format:
Category: [category_name]
Confidence: [0.0-1.0]
Reasoning: [brief explanation]

Example:
Category: food
Confidence: 0.95
Reasoning: "McDonald's" clearly indicates a food purchase at a restaurant.
"#,
        categorization_header(description, amount)
    )
}

/// Prompt asking for a single JSON object instead of labelled lines
pub fn structured_categorization_prompt(description: &str, amount: Decimal) -> String {
    format!(
        r#"{}
Instructions:
1. Analyze the transaction description and amount
2. Choose the most appropriate category from the list above
3. Provide a confidence score (0.0 to 1.0)
4. Give a brief reasoning

Respond with a single JSON object and nothing else:
{{"category": "<category_name>", "confidence": <0.0-1.0>, "reasoning": "<brief explanation>"}}

Example:
{{"category": "food", "confidence": 0.95, "reasoning": "McDonald's clearly indicates a food purchase at a restaurant."}}
"#,
        categorization_header(description, amount)
    )
}

pub fn analysis_prompt(transactions: &[Transaction], profile: &UserProfile) -> String {
    let goals = profile
        .goals
        .as_ref()
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string())
        .unwrap_or_else(|| GOALS_NOT_SPECIFIED.to_string());

    format!(
        "Analyze the following spending patterns and provide financial insights.

User Profile:
- Monthly Income: {}
- Financial Goals: {}
- Risk Tolerance: {}

Recent Transactions Summary:
{}

Provide insights on:
1. Spending patterns and trends
2. Budget adherence
3. Areas of concern or opportunity
4. Actionable recommendations
5. Financial health assessment

Keep responses practical and actionable. Focus on specific, measurable advice.
",
        format_currency(profile.monthly_income),
        goals,
        profile.risk_tolerance,
        summarize_transactions(transactions),
    )
}

pub fn chat_prompt(message: &str, context: &ChatContext) -> String {
    format!(
        "You are a helpful financial advisor AI. Answer the user's question using their financial data context.

User Question: {}

Available Context:
{}

Guidelines:
- Provide specific, actionable advice
- Reference the user's actual financial data when relevant
- Be encouraging but realistic
- Suggest concrete next steps
- If you don't have enough context, ask clarifying questions

Keep your response concise but helpful.
",
        message.trim(),
        format_context(context),
    )
}

pub fn recommendation_prompt(data: &UserData) -> String {
    let top = if data.top_categories.is_empty() {
        NO_CATEGORIES.to_string()
    } else {
        data.top_categories.join(", ")
    };

    format!(
        "Based on the user's financial data, generate 3-5 personalized recommendations.

Financial Summary:
- Total Balance: {}
- Monthly Income: {}
- Monthly Expenses: {}
- Savings Rate: {}
- Top Spending Categories: {}

Current Goals:
{}

Generate recommendations that are:
1. Specific and actionable
2. Prioritized by impact
3. Realistic for their situation
4. Include target metrics where possible

Format each recommendation with:
- Title: Brief recommendation title
- Description: Detailed explanation
- Impact: Expected benefit
- Timeline: When to implement
",
        format_currency(data.total_balance),
        format_currency(data.monthly_income),
        format_currency(data.monthly_expenses),
        format_fraction_percent(data.savings_rate),
        top,
        format_goals(&data.goals),
    )
}

pub fn budget_optimization_prompt(budget: &BudgetData) -> String {
    format!(
        "Analyze the current budget allocation and suggest optimizations.

Current Budget:
{}

Spending vs Budget:
{}

Provide optimization suggestions for:
1. Categories that are over-budget
2. Categories with room for improvement
3. Better allocation of funds
4. Emergency fund recommendations
5. Savings opportunities

Focus on practical, implementable changes that align with financial best practices.
",
        format_budget_data(budget),
        format_spending_comparison(budget),
    )
}
