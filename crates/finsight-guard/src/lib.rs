//! finsight Guard - Response Interpreter
//!
//! This crate turns raw LLM replies into typed, bounded records. Model output
//! is treated as untrusted and semi-structured:
//!
//! - Categorization: JSON object first, then `Category:` / `Confidence:` /
//!   `Reasoning:` line prefixes
//! - Analysis and budget optimization: one insight per blank-line section
//! - Recommendations: `Title:` blocks, then one per paragraph
//!
//! # Key Principle
//!
//! **Interpreters never fail.** Missing fields, malformed numbers and empty
//! replies degrade to documented defaults. Every confidence is clamped into
//! `[0.0, 1.0]` and every category is a member of the closed set.
//!
//! [`GuardError`] only surfaces from the lower-level JSON helpers.

use thiserror::Error;

pub mod categorization;
mod fields;
pub mod insights;
pub mod json;
pub mod recommendations;

pub use categorization::{parse_categorization, parse_confidence, CategoryVerdict, ParseSource};
pub use fields::split_sections;
pub use insights::{parse_insights, parse_insights_titled};
pub use json::{extract_json_array, extract_json_object};
pub use recommendations::parse_recommendations;

/// Errors from locating structured data in a reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("No JSON found in response")]
    NoJson,

    #[error("Invalid JSON structure: {message}")]
    InvalidJson { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

pub type Result<T> = std::result::Result<T, GuardError>;
