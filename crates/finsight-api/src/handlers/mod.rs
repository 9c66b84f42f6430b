//! API Handlers

pub mod ai;
pub mod health;
