use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PriscopeError;

/// Top-level configuration loaded from `.priscope.toml`.
///
/// Resolution is layered: explicit `--config` path > local `.priscope.toml` >
/// built-in defaults. The loaded value is passed into each component's
/// constructor; there is no process-wide configuration state.
///
/// # Examples
///
/// ```
/// use priscope_core::PriscopeConfig;
///
/// let config = PriscopeConfig::default();
/// assert_eq!(config.github.per_page, 30);
/// assert_eq!(config.llm.model, "llama3.1");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriscopeConfig {
    /// GitHub API settings.
    #[serde(default)]
    pub github: GithubConfig,
    /// Local inference endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl PriscopeConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PriscopeError::Io`] if the file cannot be read, or
    /// [`PriscopeError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use priscope_core::PriscopeConfig;
    /// use std::path::Path;
    ///
    /// let config = PriscopeConfig::from_file(Path::new(".priscope.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, PriscopeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PriscopeError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use priscope_core::PriscopeConfig;
    ///
    /// let toml = r#"
    /// [github]
    /// per_page = 50
    /// "#;
    /// let config = PriscopeConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.github.per_page, 50);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, PriscopeError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// GitHub API configuration.
///
/// # Examples
///
/// ```
/// use priscope_core::GithubConfig;
///
/// let config = GithubConfig::default();
/// assert_eq!(config.api_url, "https://api.github.com");
/// assert!(config.token.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Base URL for API requests.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Search results per page (default: 30).
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// Personal access token. Falls back to the `GITHUB_TOKEN` env var;
    /// requests go out unauthenticated when neither is set.
    pub token: Option<String>,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

fn default_per_page() -> usize {
    30
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            per_page: default_per_page(),
            token: None,
        }
    }
}

/// Local inference endpoint configuration (Ollama-compatible).
///
/// # Examples
///
/// ```
/// use priscope_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.base_url, "http://localhost:11434");
/// assert_eq!(config.endpoint, "/api/generate");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the inference service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Generation endpoint path.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_endpoint() -> String {
    "/api/generate".into()
}

fn default_model() -> String {
    "llama3.1".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            model: default_model(),
        }
    }
}

/// Report output configuration.
///
/// # Examples
///
/// ```
/// use priscope_core::ReportConfig;
///
/// let config = ReportConfig::default();
/// assert_eq!(config.output_dir, ".");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory where JSON report files are written (default: current dir).
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String {
    ".".into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}
