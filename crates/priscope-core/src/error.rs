/// Errors that can occur across the Priscope pipeline.
///
/// Each variant wraps a specific failure domain. Library crates use this type
/// directly; the binary crate converts to miette diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use priscope_core::PriscopeError;
///
/// let err = PriscopeError::Config("missing model name".into());
/// assert!(err.to_string().contains("missing model name"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PriscopeError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed relative time-window token.
    #[error("invalid time window: {0}")]
    TimeWindow(String),

    /// GitHub API or transport failure.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// Inference endpoint or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PriscopeError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = PriscopeError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn time_window_error_displays_token() {
        let err = PriscopeError::TimeWindow("use a format like '2d', '3w', or '1m'".into());
        assert!(err.to_string().starts_with("invalid time window"));
    }
}
