// File: minabot-common/src/lib.rs
//! Shared models and boundary traits for the minabot widget crates.

pub mod error;
pub mod models;
pub mod traits;

pub use error::EngineError;
