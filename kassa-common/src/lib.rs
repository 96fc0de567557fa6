//! Common types and utilities shared across Kassa crates.
//!
//! This crate defines the shared error type and observability helpers used
//! throughout the Kassa workspace. It is intentionally lightweight and
//! dependency-minimal so that all crates can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`KassaError`] and [`Result`]: Shared error handling
pub mod observability;

/// Error types used across the Kassa system.
#[derive(thiserror::Error, Debug)]
pub enum KassaError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document lookup or mutation failed.
    #[error("Document error: {0}")]
    Dom(String),

    /// The suggestion service reported an error.
    #[error("Suggestion error: {0}")]
    Suggest(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`KassaError`].
pub type Result<T> = std::result::Result<T, KassaError>;
