//! PR retrieval and security analysis for Priscope.
//!
//! Provides the scan pipeline: GitHub search/detail/diff retrieval, the
//! Ollama inference client, prompt construction and response classification,
//! and report building.

pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod report;
