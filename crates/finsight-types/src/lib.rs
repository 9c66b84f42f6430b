//! finsight Types - Canonical domain types for the financial assistant
//!
//! This crate contains the value objects shared by every finsight crate,
//! with zero dependencies on other finsight crates:
//!
//! - Transactions and the closed category set
//! - User profiles, goals and budgets
//! - Task outputs (categorization results, insights, chat replies, recommendations)
//!
//! # Invariants
//!
//! 1. Every confidence value lives in `[0.0, 1.0]`; constructors clamp, never reject
//! 2. A suggested category is always a member of [`Category::ALL`]
//! 3. All values are immutable once built and scoped to a single request

pub mod budget;
pub mod category;
pub mod context;
pub mod error;
pub mod insight;
pub mod profile;
pub mod transaction;

pub use budget::*;
pub use category::*;
pub use context::*;
pub use error::*;
pub use insight::*;
pub use profile::*;
pub use transaction::*;

/// Re-exported so downstream crates agree on one decimal type
pub use rust_decimal::Decimal;
