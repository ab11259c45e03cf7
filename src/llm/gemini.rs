//! Client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use super::{GenerationOptions, Generator, LlmError, LlmResult};
use crate::prompts::Prompt;

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, without the `/models/...` suffix.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-2.5-flash".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Synchronous Gemini client. Each call blocks for the full request.
pub struct GeminiClient {
    config: GeminiConfig,
    agent: ureq::Agent,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { config, agent }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(prompt: &Prompt, options: &GenerationOptions) -> serde_json::Value {
        let mut generation_config = serde_json::json!({
            "maxOutputTokens": options.max_output_tokens,
            "temperature": options.temperature,
            "topP": options.top_p,
        });
        if let Some(top_k) = options.top_k {
            generation_config["topK"] = serde_json::Value::from(top_k);
        }

        serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt.render() }] }],
            "generationConfig": generation_config,
        })
    }

    fn map_transport(&self, transport: ureq::Transport) -> LlmError {
        let message = transport.to_string();
        if message.contains("timed out") {
            LlmError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            LlmError::RequestFailed { message }
        }
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(json: &serde_json::Value) -> LlmResult<String> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| LlmError::ParseError {
            message: "missing 'candidates[0].content.parts'".into(),
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text.to_string())
    }
}

impl Generator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn generate(&self, prompt: &Prompt, options: &GenerationOptions) -> LlmResult<String> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(LlmError::MissingApiKey {
                    provider: "gemini".into(),
                })
            }
        };

        let body = Self::request_body(prompt, options);
        let body_str = serde_json::to_string(&body).map_err(|e| LlmError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        tracing::debug!(
            task = prompt.task.name(),
            model = %self.config.model,
            max_output_tokens = options.max_output_tokens,
            "sending generation request"
        );

        let resp = self
            .agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", api_key)
            .send_string(&body_str)
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => {
                    let body = response.into_string().unwrap_or_default();
                    let message: String = body.chars().take(300).collect();
                    LlmError::Status { status, message }
                }
                ureq::Error::Transport(transport) => self.map_transport(transport),
            })?;

        let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;
        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| LlmError::ParseError {
                message: e.to_string(),
            })?;

        let text = extract_text(&json)?;
        tracing::debug!(
            task = prompt.task.name(),
            chars = text.chars().count(),
            words = text.split_whitespace().count(),
            "generation complete"
        );
        Ok(text)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::Task;

    #[test]
    fn missing_key_fails_without_network() {
        let client = GeminiClient::new(GeminiConfig::default());
        assert!(!client.is_configured());
        let err = client
            .generate(&Prompt::probe(), &GenerationOptions::for_task(Task::Probe))
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey { .. }));
    }

    #[test]
    fn unreachable_host_is_request_failure() {
        let client = GeminiClient::new(GeminiConfig {
            base_url: "http://127.0.0.1:1".into(), // unreachable port
            api_key: Some("test-key".into()),
            timeout_secs: 2,
            ..Default::default()
        });
        let result = client.generate(&Prompt::probe(), &GenerationOptions::for_task(Task::Probe));
        assert!(matches!(
            result,
            Err(LlmError::RequestFailed { .. } | LlmError::Timeout { .. })
        ));
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new(GeminiConfig {
            base_url: "https://example.test/v1beta/".into(),
            ..Default::default()
        });
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn request_body_carries_sampling() {
        let prompt = Prompt::new(Task::MindMap, "text");
        let body = GeminiClient::request_body(&prompt, &GenerationOptions::for_task(Task::MindMap));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2000);
        assert_eq!(body["generationConfig"]["topK"], 40);
        let sent = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(sent.contains("CENTRAL_TOPIC:"));
    }

    #[test]
    fn extracts_and_joins_parts() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "CENTRAL_TOPIC: A\n" }, { "text": "BRANCHES:" }] } }]
        });
        assert_eq!(extract_text(&json).unwrap(), "CENTRAL_TOPIC: A\nBRANCHES:");
    }

    #[test]
    fn blank_or_missing_text_is_error() {
        let blank = serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(matches!(extract_text(&blank), Err(LlmError::EmptyResponse)));

        let blocked = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(extract_text(&blocked), Err(LlmError::ParseError { .. })));
    }
}
