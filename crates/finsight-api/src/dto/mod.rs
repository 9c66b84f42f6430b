//! Data Transfer Objects
//!
//! Request and response structures for the API. Domain types stay in
//! `finsight-types`; these carry the wire shape and validation rules.

pub mod analysis;
pub mod budget;
pub mod chat;
pub mod common;
pub mod embed;
pub mod transaction;

pub use analysis::*;
pub use budget::*;
pub use chat::*;
pub use common::*;
pub use embed::*;
pub use transaction::*;
