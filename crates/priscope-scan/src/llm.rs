use std::time::Duration;

use priscope_core::{LlmConfig, PriscopeError, PullRequestRecord};
use serde::Deserialize;

use crate::prompt;

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
///
/// Requests are non-streaming; one synchronous POST per analysis.
///
/// # Examples
///
/// ```
/// use priscope_core::LlmConfig;
/// use priscope_scan::llm::OllamaClient;
///
/// let client = OllamaClient::new(&LlmConfig::default()).unwrap();
/// assert_eq!(client.model(), "llama3.1");
/// ```
pub struct OllamaClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OllamaClient {
    /// Create a new inference client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PriscopeError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, PriscopeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| PriscopeError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Return the model identifier from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Analyze one pull request and return the model's response text.
    ///
    /// Never fails the run: any non-success status, transport error, or
    /// unparseable body comes back as a synthetic `Error analyzing PR: ...`
    /// string, which the classification rule counts as suspicious.
    pub async fn analyze(&self, record: &PullRequestRecord) -> String {
        let prompt = prompt::build_analysis_prompt(record);
        self.generate(&prompt).await
    }

    async fn generate(&self, prompt: &str) -> String {
        let url = format!("{}{}", self.config.base_url, self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => return format!("Error analyzing PR: request failed: {e}"),
        };

        let status = response.status();
        if !status.is_success() {
            return format!("Error analyzing PR: {status}");
        }

        match response.json::<GenerateResponse>().await {
            Ok(generated) => generated.response.trim().to_string(),
            Err(e) => format!("Error analyzing PR: unexpected response body: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_succeeds() {
        let client = OllamaClient::new(&LlmConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn model_returns_config_model() {
        let config = LlmConfig {
            model: "codellama".into(),
            ..LlmConfig::default()
        };
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.model(), "codellama");
    }

    #[test]
    fn generate_response_deserializes() {
        let json = r#"{"model":"llama3.1","response":"  No issues identified.  ","done":true}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.response.trim(), "No issues identified.");
    }
}
