//! Completion Client
//!
//! Capability interface to the external text-generation service. The
//! orchestrator only sees `CompletionClient`, so tests and the `mock`
//! provider can simulate latency and failure without a live endpoint.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("completion response carried no answer text")]
    MalformedResponse,
}

/// One grounded completion request. The client owns prompt layout; callers
/// never concatenate prompt strings themselves.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_instructions: String,
    pub context: String,
    pub query: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Single request/response, no streaming. Must return within the
    /// client's configured timeout or fail with `CompletionError`.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// HTTP client for an OpenAI-style chat completions endpoint.
pub struct OpenRouterClient {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(url: String, api_key: String, model: String, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client for completion service");

        Self {
            http_client,
            url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let user_content = format!(
            "[SECURITY DATA]\n{}\n\n[QUESTION]\n{}",
            request.context, request.query
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": request.system_instructions,
                },
                {
                    "role": "user",
                    "content": user_content,
                }
            ],
            "temperature": 0.2
        });

        debug!(url = %self.url, model = %self.model, "Sending completion request");

        let response = self
            .http_client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let api_response: serde_json::Value = response.json().await?;

        let content = api_response
            .get("choices")
            .and_then(|choices| choices.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .ok_or(CompletionError::MalformedResponse)?;

        Ok(content.to_string())
    }
}

/// Deterministic completion used for local runs (`LLM_PROVIDER=mock`) and
/// tests. Answers by restating the headline of every grounding block, so
/// the response stays faithful to the assembled data.
pub struct MockCompletionClient;

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let mut lines = Vec::new();
        let mut take_next = false;
        for line in request.context.lines() {
            if take_next && !line.trim().is_empty() {
                lines.push(format!("- {}", line.trim()));
                take_next = false;
            }
            if line.starts_with("### ") {
                take_next = true;
            }
        }

        if lines.is_empty() {
            return Ok(format!(
                "I have no security data on hand for \"{}\". Recommend a manual check of the deployment.",
                request.query
            ));
        }

        Ok(format!(
            "Current security picture for \"{}\":\n{}\nRecommended action: review the items above and dispatch a patrol to any zone with open issues.",
            request.query,
            lines.join("\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_answer_restates_block_headlines() {
        let request = CompletionRequest {
            system_instructions: "analyst".to_string(),
            context: "### list_offline_cameras ###\n2 offline cameras:\n- CAM003\n\n### count_cameras_by_status ###\nCameras by status: online=2, offline=2 (total 4). 2 recording.".to_string(),
            query: "How many cameras are offline?".to_string(),
        };
        let answer = MockCompletionClient.complete(request).await.unwrap();
        assert!(answer.contains("2 offline cameras"));
        assert!(answer.contains("How many cameras are offline?"));
    }

    #[tokio::test]
    async fn mock_handles_empty_context() {
        let request = CompletionRequest {
            system_instructions: "analyst".to_string(),
            context: String::new(),
            query: "anything".to_string(),
        };
        let answer = MockCompletionClient.complete(request).await.unwrap();
        assert!(!answer.is_empty());
    }
}
