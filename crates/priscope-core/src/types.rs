use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PriscopeError;

/// A GitHub repository reference, derived once from a repository URL.
///
/// # Examples
///
/// ```
/// use priscope_core::RepoRef;
///
/// let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
/// assert_eq!(repo.owner, "acme");
/// assert_eq!(repo.name, "widget");
/// assert_eq!(repo.to_string(), "acme/widget");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Parse a repository URL into owner and name.
    ///
    /// The last two path segments are taken as `owner/name`; a trailing
    /// slash or `.git` suffix is tolerated. No further validation.
    ///
    /// # Errors
    ///
    /// Returns [`PriscopeError::Config`] when fewer than two path segments
    /// are present.
    ///
    /// # Examples
    ///
    /// ```
    /// use priscope_core::RepoRef;
    ///
    /// let repo = RepoRef::from_url("https://github.com/rust-lang/rust.git").unwrap();
    /// assert_eq!(repo.name, "rust");
    /// assert!(RepoRef::from_url("widget").is_err());
    /// ```
    pub fn from_url(url: &str) -> Result<Self, PriscopeError> {
        let trimmed = url.trim_end_matches('/');
        let mut segments = trimmed.rsplit('/');
        let name = segments.next().filter(|s| !s.is_empty()).ok_or_else(|| {
            PriscopeError::Config(format!("invalid repository URL '{url}', expected .../owner/name"))
        })?;
        let owner = segments.next().filter(|s| !s.is_empty()).ok_or_else(|| {
            PriscopeError::Config(format!("invalid repository URL '{url}', expected .../owner/name"))
        })?;
        let name = name.strip_suffix(".git").unwrap_or(name);
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Web URL of a pull request in this repository.
    ///
    /// # Examples
    ///
    /// ```
    /// use priscope_core::RepoRef;
    ///
    /// let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
    /// assert_eq!(repo.pr_url(11), "https://github.com/acme/widget/pull/11");
    /// ```
    pub fn pr_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/pull/{number}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A merged pull request with its metadata and diff, as assembled by the
/// retriever. Read-only once created; lives for one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// PR number, unique within the repository.
    pub number: u64,
    /// PR title.
    pub title: String,
    /// PR body text, absent when the author left it empty.
    pub description: Option<String>,
    /// Authoritative merge timestamp from the PR detail endpoint.
    pub merged_at: DateTime<Utc>,
    /// Unified diff text; `None` when the diff fetch failed.
    pub diff: Option<String>,
}

/// Classification of a single analysis response.
///
/// # Examples
///
/// ```
/// use priscope_core::AnalysisStatus;
///
/// assert_eq!(serde_json::to_string(&AnalysisStatus::Clean).unwrap(), "\"clean\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// The model reported no actionable security risk.
    Clean,
    /// Anything else, including synthetic inference-error strings.
    Suspicious,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStatus::Clean => write!(f, "clean"),
            AnalysisStatus::Suspicious => write!(f, "suspicious"),
        }
    }
}

/// The outcome of analyzing one pull request. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// PR number.
    pub number: u64,
    /// PR title.
    pub title: String,
    /// Merge timestamp carried over from the record.
    pub merge_date: DateTime<Utc>,
    /// Web link to the PR, derived from owner/name/number.
    pub link: String,
    /// The model's analysis text, or a synthetic error string.
    pub analysis: String,
    /// Clean/suspicious classification of the analysis text.
    pub status: AnalysisStatus,
}

/// Output format for command results.
///
/// # Examples
///
/// ```
/// use priscope_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
