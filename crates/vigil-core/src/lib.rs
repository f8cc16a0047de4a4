//! Core types, configuration, and error handling for the Vigil platform.
//!
//! This crate provides the shared foundation used by all other Vigil crates:
//! - [`VigilError`] — unified error type using `thiserror`
//! - [`VigilConfig`] — configuration loaded from `vigil.toml` with a one-shot
//!   environment overlay
//! - Shared types: [`Severity`], [`Finding`], [`ScanResult`],
//!   [`ReviewContext`], [`ChangedFile`], [`TicketStatus`], [`GateStatus`],
//!   [`AggregatedReport`]

mod config;
mod error;
mod types;

pub use config::{
    GithubConfig, JiraConfig, LlmConfig, ReviewConfig, ServerConfig, VigilConfig,
};
pub use error::VigilError;
pub use types::{
    AggregatedReport, ChangedFile, Finding, GateStatus, ReviewContext, ScanResult, Severity,
    TicketStatus, EVIDENCE_CAP,
};

/// A convenience `Result` type for Vigil operations.
pub type Result<T> = std::result::Result<T, VigilError>;
