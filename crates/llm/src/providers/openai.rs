//! OpenAI chat completions provider.
//!
//! Talks to `/chat/completions` with bearer auth. When the request carries a
//! response schema it is forwarded as `response_format: json_schema`.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use clause_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI (or OpenAI-compatible) chat client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_OPENAI_URL, api_key)
    }

    /// Create a client against a compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn build_body(&self, request: &LlmRequest) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(ref schema) = request.response_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "schema": schema.schema,
                },
            });
        }

        body
    }

    fn convert_response(&self, completion: ChatCompletion, requested_model: &str) -> AppResult<LlmResponse> {
        let usage = completion
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("OpenAI response contained no choices".to_string()))?;

        let done = choice.finish_reason.as_deref() != Some("length");
        let model = if completion.model.is_empty() {
            requested_model.to_string()
        } else {
            completion.model
        };

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model,
            usage,
            done,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(url = %url, model = %request.model, "Sending OpenAI completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to OpenAI: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

        let converted = self.convert_response(completion, &request.model)?;
        tracing::debug!(
            prompt_tokens = converted.usage.prompt_tokens,
            completion_tokens = converted.usage.completion_tokens,
            "Received completion from OpenAI"
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_includes_schema_and_system() {
        let client = OpenAiClient::new("sk-test");
        let request = LlmRequest::new("Question: vacation accrual?", "gpt-4o-mini")
            .with_system("Answer from context only.")
            .with_temperature(0.2)
            .with_schema("contract_answer", json!({"type": "object"}));

        let body = client.build_body(&request);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "contract_answer");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_convert_response() {
        let client = OpenAiClient::new("sk-test");
        let completion: ChatCompletion = serde_json::from_value(json!({
            "model": "gpt-4o-mini-2024",
            "choices": [{"message": {"content": "{\"answer\":\"yes\"}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }))
        .unwrap();

        let response = client.convert_response(completion, "gpt-4o-mini").unwrap();
        assert_eq!(response.content, "{\"answer\":\"yes\"}");
        assert_eq!(response.model, "gpt-4o-mini-2024");
        assert_eq!(response.usage.total_tokens, 15);
        assert!(response.done);
    }

    #[test]
    fn test_convert_response_without_choices() {
        let client = OpenAiClient::new("sk-test");
        let completion: ChatCompletion =
            serde_json::from_value(json!({"model": "m", "choices": []})).unwrap();
        assert!(client.convert_response(completion, "m").is_err());
    }
}
