//! Core types, configuration, and error handling for Priscope.
//!
//! This crate provides the shared foundation used by the scan crate and the
//! binary:
//! - [`PriscopeError`] — unified error type using `thiserror`
//! - [`PriscopeConfig`] — configuration loaded from `.priscope.toml`
//! - [`TimeWindow`] — relative look-back window parsing (`2d`, `3w`, `1m`)
//! - Shared types: [`RepoRef`], [`PullRequestRecord`], [`AnalysisOutcome`],
//!   [`AnalysisStatus`], [`OutputFormat`]

mod config;
mod error;
mod timewindow;
mod types;

pub use config::{GithubConfig, LlmConfig, PriscopeConfig, ReportConfig};
pub use error::PriscopeError;
pub use timewindow::TimeWindow;
pub use types::{
    AnalysisOutcome, AnalysisStatus, OutputFormat, PullRequestRecord, RepoRef,
};

/// A convenience `Result` type for Priscope operations.
pub type Result<T> = std::result::Result<T, PriscopeError>;
