//! OpenAI API Provider
//!
//! Direct-vendor provider using the Chat Completions API. One configured model,
//! no internal fallback; every failure goes straight back to the chain.
//!
//! The wire types and `chat_completion` helper are shared with the
//! OpenAI-compatible cloud router.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{ChatMessage, CompletionRequest, CompletionResult, LlmProvider, build_http_client};
use crate::config::ProviderSettings;
use crate::constants::openai as openai_constants;
use crate::types::{DocError, ErrorCategory, LlmError, Result};

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DocError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY or ai.openai.api_key".to_string(),
                )
            })?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            client: build_http_client(Duration::from_secs(settings.timeout_secs))?,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionResult, LlmError> {
        info!(
            "Generating with OpenAI (model: {}, temperature: {})",
            self.model, request.temperature
        );

        chat_completion(ChatCall {
            client: &self.client,
            url: format!("{}/chat/completions", self.api_base),
            api_key: &self.api_key,
            extra_headers: &[],
            provider: openai_constants::NAME,
            model: &self.model,
            request,
        })
        .await
    }

    fn name(&self) -> &str {
        openai_constants::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("OpenAI API is available");
                true
            }
            Ok(resp) => {
                warn!("OpenAI API check failed: {}", resp.status());
                false
            }
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                false
            }
        }
    }
}

// =============================================================================
// Shared Chat Completions call
// =============================================================================

/// Parameters for one OpenAI-compatible chat completion request
pub(super) struct ChatCall<'a> {
    pub client: &'a reqwest::Client,
    pub url: String,
    pub api_key: &'a SecretString,
    pub extra_headers: &'a [(&'static str, &'static str)],
    pub provider: &'a str,
    pub model: &'a str,
    pub request: &'a CompletionRequest,
}

/// Issue one chat completion and classify any failure at the source
pub(super) async fn chat_completion(
    call: ChatCall<'_>,
) -> std::result::Result<CompletionResult, LlmError> {
    let start_time = Instant::now();
    let body = ChatCompletionRequest {
        model: call.model,
        messages: &call.request.messages,
        temperature: call.request.temperature,
    };

    let mut builder = call
        .client
        .post(&call.url)
        .bearer_auth(call.api_key.expose_secret())
        .json(&body);
    for (name, value) in call.extra_headers {
        builder = builder.header(*name, *value);
    }

    debug!(provider = call.provider, model = call.model, "Sending chat completion");

    let response = builder.send().await.map_err(|e| {
        LlmError::with_provider(
            ErrorCategory::Other,
            format!("{} request failed: {}", call.provider, e),
            call.provider,
        )
        .model(call.model)
    })?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(LlmError::from_http_status(status.as_u16(), &text, call.provider).model(call.model));
    }

    let body: ChatCompletionResponse = response.json().await.map_err(|e| {
        LlmError::with_provider(
            ErrorCategory::Other,
            format!("Failed to parse {} response: {}", call.provider, e),
            call.provider,
        )
        .model(call.model)
    })?;

    // Some routers report upstream failures inside a 200 body
    if let Some(api_error) = body.error {
        let category = api_error
            .code
            .as_ref()
            .and_then(vendor_status_code)
            .map(ErrorCategory::from_status)
            .unwrap_or(ErrorCategory::Other);
        return Err(LlmError::with_provider(category, api_error.message, call.provider)
            .model(call.model));
    }

    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            LlmError::with_provider(
                ErrorCategory::Other,
                format!("No content in {} response", call.provider),
                call.provider,
            )
            .model(call.model)
        })?;

    let tokens_used = body.usage.map(|u| u.total_tokens).unwrap_or(0);

    debug!(
        provider = call.provider,
        model = call.model,
        tokens_used,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Chat completion received"
    );

    Ok(CompletionResult {
        content,
        tokens_used,
        model: call.model.to_string(),
        provider: call.provider.to_string(),
    })
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    code: Option<Value>,
}

/// Vendor error codes arrive as numbers or numeric strings (`429`, `"429"`)
fn vendor_status_code(code: &Value) -> Option<u16> {
    match code {
        Value::Number(n) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(api_base: &str) -> ProviderSettings {
        let mut settings = AiConfig::default().openai;
        settings.enabled = true;
        settings.api_base = api_base.to_string();
        settings.api_key = Some("sk-test".to_string());
        settings
    }

    #[test]
    fn test_requires_api_key() {
        let mut s = settings("http://localhost:1");
        s.api_key = None;
        assert!(matches!(OpenAiProvider::new(&s), Err(DocError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = OpenAiProvider::new(&settings("http://localhost:1")).unwrap();
        let debug = format!("{:?}", provider);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test"));
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "hello"}}],
                "usage": {"prompt_tokens": 7, "completion_tokens": 5, "total_tokens": 12}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(&server.uri())).unwrap();
        let request = CompletionRequest::system_user("sys", "user", 0.5);
        let result = provider.complete(&request).await.unwrap();

        assert_eq!(result.content, "hello");
        assert_eq!(result.tokens_used, 12);
        assert_eq!(result.provider, "openai");
        assert_eq!(result.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_auth_failure_is_other() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(&server.uri())).unwrap();
        let err = provider
            .complete(&CompletionRequest::system_user("s", "u", 0.1))
            .await
            .unwrap_err();

        assert_eq!(err.category, ErrorCategory::Other);
        assert_eq!(err.status, Some(401));
        assert_eq!(err.provider.as_deref(), Some("openai"));
    }

    #[tokio::test]
    async fn test_error_in_success_body_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 429, "message": "Rate limit exceeded upstream"}
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(&server.uri())).unwrap();
        let err = provider
            .complete(&CompletionRequest::system_user("s", "u", 0.1))
            .await
            .unwrap_err();

        assert_eq!(err.category, ErrorCategory::RateLimit);
    }

    #[test]
    fn test_vendor_status_code() {
        assert_eq!(vendor_status_code(&json!(429)), Some(429));
        assert_eq!(vendor_status_code(&json!("404")), Some(404));
        assert_eq!(vendor_status_code(&json!(" 429 ")), Some(429));
        assert_eq!(vendor_status_code(&json!("rate_limit_exceeded")), None);
        assert_eq!(vendor_status_code(&json!(70000)), None);
    }

    #[tokio::test]
    async fn test_string_error_code_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": "429", "message": "Rate limit exceeded upstream"}
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(&server.uri())).unwrap();
        let err = provider
            .complete(&CompletionRequest::system_user("s", "u", 0.1))
            .await
            .unwrap_err();

        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert!(err.is_model_retryable());
    }

    #[tokio::test]
    async fn test_missing_usage_defaults_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "x"}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(&server.uri())).unwrap();
        let result = provider
            .complete(&CompletionRequest::system_user("s", "u", 0.1))
            .await
            .unwrap();
        assert_eq!(result.tokens_used, 0);
    }
}
