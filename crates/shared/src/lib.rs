//! Shared types and configuration for Divvy.
//!
//! This crate provides common types used across all other crates:
//! - Integer-cent money type with overflow-checked arithmetic
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
