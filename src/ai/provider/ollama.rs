//! Ollama Local LLM Provider
//!
//! Locally-running models behind a completion-style endpoint. A short
//! reachability probe runs before every generation so a dead daemon fails in
//! seconds instead of waiting out the generation timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CompletionRequest, CompletionResult, LlmProvider, build_http_client, prompt_utils};
use crate::config::ProviderSettings;
use crate::constants::ollama as ollama_constants;
use crate::types::{DocError, ErrorCategory, LlmError, Result};

/// Ollama Local LLM Provider
#[derive(Debug)]
pub struct OllamaProvider {
    enabled: bool,
    api_base: String,
    model: String,
    client: reqwest::Client,
    probe_client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let api_base = Self::validate_endpoint(&settings.api_base)?;
        let probe_timeout = settings
            .probe_timeout_secs
            .unwrap_or(ollama_constants::PROBE_TIMEOUT_SECS);

        Ok(Self {
            enabled: settings.enabled,
            api_base,
            model: settings.model.clone(),
            client: build_http_client(Duration::from_secs(settings.timeout_secs))?,
            probe_client: build_http_client(Duration::from_secs(probe_timeout))?,
        })
    }

    /// Validate endpoint URL (SSRF prevention)
    ///
    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            DocError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DocError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    /// Bounded reachability probe against the model listing endpoint
    pub async fn is_reachable(&self) -> bool {
        let url = format!("{}/api/tags", self.api_base);

        match self.probe_client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                debug!("Ollama probe returned {}", resp.status());
                false
            }
            Err(e) => {
                debug!("Ollama probe failed: {}", e);
                false
            }
        }
    }

    fn unavailable(&self, message: impl Into<String>) -> LlmError {
        LlmError::with_provider(ErrorCategory::Unavailable, message, ollama_constants::NAME)
            .model(&self.model)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionResult, LlmError> {
        if !self.enabled {
            return Err(self.unavailable("Ollama is disabled"));
        }

        if !self.is_reachable().await {
            warn!("Ollama not reachable at {}. Start with: ollama serve", self.api_base);
            return Err(self.unavailable(format!("Ollama not reachable at {}", self.api_base)));
        }

        info!(
            "Generating with Ollama (model: {}, temperature: {})",
            self.model, request.temperature
        );

        let start_time = Instant::now();
        let body = OllamaRequest {
            model: &self.model,
            prompt: prompt_utils::flatten_messages(&request.messages),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: ollama_constants::NUM_PREDICT,
            },
        };
        let url = format!("{}/api/generate", self.api_base);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                LlmError::with_provider(
                    ErrorCategory::Other,
                    format!("Ollama request failed: {}", e),
                    ollama_constants::NAME,
                )
                .model(&self.model)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(
                LlmError::from_http_status(status.as_u16(), &text, ollama_constants::NAME)
                    .model(&self.model),
            );
        }

        let response_body: OllamaResponse = response.json().await.map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::Other,
                format!("Failed to parse Ollama response: {}", e),
                ollama_constants::NAME,
            )
            .model(&self.model)
        })?;

        debug!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Received response from Ollama"
        );

        Ok(CompletionResult {
            content: response_body.response,
            tokens_used: response_body.eval_count.unwrap_or(0),
            model: self.model.clone(),
            provider: ollama_constants::NAME.to_string(),
        })
    }

    fn name(&self) -> &str {
        ollama_constants::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> bool {
        self.enabled && self.is_reachable().await
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(api_base: &str) -> ProviderSettings {
        let mut settings = AiConfig::default().ollama;
        settings.enabled = true;
        settings.api_base = api_base.to_string();
        settings
    }

    async fn mount_tags(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"models": []})))
            .mount(server)
            .await;
    }

    #[test]
    fn test_validate_endpoint() {
        assert_eq!(
            OllamaProvider::validate_endpoint("http://localhost:11434/").unwrap(),
            "http://localhost:11434"
        );
        assert!(OllamaProvider::validate_endpoint("file:///etc/passwd").is_err());
        assert!(OllamaProvider::validate_endpoint("not a url").is_err());
    }

    #[tokio::test]
    async fn test_disabled_fails_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut s = settings(&server.uri());
        s.enabled = false;
        let provider = OllamaProvider::new(&s).unwrap();
        let err = provider
            .complete(&CompletionRequest::system_user("s", "u", 0.7))
            .await
            .unwrap_err();

        assert_eq!(err.category, ErrorCategory::Unavailable);
    }

    #[tokio::test]
    async fn test_unreachable_skips_generation() {
        let server = MockServer::start().await;
        mount_tags(&server, 500).await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&settings(&server.uri())).unwrap();
        let err = provider
            .complete(&CompletionRequest::system_user("s", "u", 0.7))
            .await
            .unwrap_err();

        assert_eq!(err.category, ErrorCategory::Unavailable);
        assert_eq!(err.provider.as_deref(), Some("ollama"));
    }

    #[tokio::test]
    async fn test_generate_sends_flattened_prompt() {
        let server = MockServer::start().await;
        mount_tags(&server, 200).await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "llama3.2:3b",
                "prompt": "System: sys\n\nUser: hello\n\nAssistant:",
                "stream": false,
                "options": {"num_predict": 2000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "generated text",
                "eval_count": 42
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&settings(&server.uri())).unwrap();
        let result = provider
            .complete(&CompletionRequest::system_user("sys", "hello", 0.7))
            .await
            .unwrap();

        assert_eq!(result.content, "generated text");
        assert_eq!(result.tokens_used, 42);
        assert_eq!(result.provider, "ollama");
        assert_eq!(result.model, "llama3.2:3b");
    }

    #[tokio::test]
    async fn test_missing_eval_count_is_zero() {
        let server = MockServer::start().await;
        mount_tags(&server, 200).await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "x"})))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&settings(&server.uri())).unwrap();
        let result = provider
            .complete(&CompletionRequest::system_user("s", "u", 0.1))
            .await
            .unwrap();
        assert_eq!(result.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_health_check_reflects_probe() {
        let server = MockServer::start().await;
        mount_tags(&server, 200).await;
        let provider = OllamaProvider::new(&settings(&server.uri())).unwrap();
        assert!(provider.health_check().await);
    }
}
