use serde::Serialize;
use serde_json::Value;
use ureq::Agent;

use crate::foundation::error::{FlowError, FlowResult};
use crate::service::config::ServiceConfig;
use crate::service::{CompletionRequest, CompletionService};

/// Blocking client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiClient {
    agent: Agent,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Build a client with the configured deadlines.
    pub fn new(cfg: &ServiceConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(cfg.timeouts.request))
            .timeout_connect(Some(cfg.timeouts.connect))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl CompletionService for OpenAiClient {
    fn complete(&self, req: &CompletionRequest) -> FlowResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &req.system,
                },
                ChatMessage {
                    role: "user",
                    content: &req.user,
                },
            ],
            temperature: req.temperature,
            response_format: req.json_only.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .agent
            .post(&self.endpoint())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| FlowError::service(format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();
        let text = body
            .read_to_string()
            .map_err(|e| FlowError::service(format!("failed to read response body: {e}")))?;

        if !(200..300).contains(&status) {
            return Err(FlowError::service(format!(
                "HTTP {status}: {}",
                text.trim()
            )));
        }

        parse_chat_content(&text)
    }
}

/// Extract `choices[0].message.content` from a chat completions response body.
pub(crate) fn parse_chat_content(json_text: &str) -> FlowResult<String> {
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| FlowError::service(format!("malformed completion envelope: {e}")))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(FlowError::service("completion response has no choices"));
    };

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if content.trim().is_empty() {
        return Err(FlowError::service("completion service returned empty response"));
    }
    Ok(content.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/service/openai.rs"]
mod tests;
