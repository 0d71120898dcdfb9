// Copyright 2025 ContextGauge (https://github.com/contextgauge)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Judgment-call client abstraction.
//!
//! A judgment call is an LLM invocation used to produce a quality score
//! rather than a user-facing answer. The evaluator talks to providers only
//! through [`JudgeClient`] so tests can swap in a canned judge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trait for judgment clients. Object-safe; the evaluator holds
/// `Arc<dyn JudgeClient>`.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Send a prompt and get the raw judgment text back.
    async fn judge(&self, prompt: String) -> Result<JudgeResponse, JudgeError>;

    /// Model identifier, for logging and result metadata.
    fn model_name(&self) -> &str;

    /// Cost per token (input, output) in USD.
    fn cost_per_token(&self) -> (f64, f64);
}

/// Raw reply from a judgment call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Calculate cost based on per-token pricing.
    pub fn calculate_cost(&self, cost_per_input: f64, cost_per_output: f64) -> f64 {
        (self.prompt_tokens as f64 * cost_per_input)
            + (self.completion_tokens as f64 * cost_per_output)
    }
}

/// Errors from judgment clients.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const JUDGE_SYSTEM_PROMPT: &str =
    "You are an expert evaluator of retrieved context. Respond only with valid JSON.";

/// OpenAI chat-completions judge.
pub struct OpenAiJudge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiJudge {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl JudgeClient for OpenAiJudge {
    async fn judge(&self, prompt: String) -> Result<JudgeResponse, JudgeError> {
        let request = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": JUDGE_SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.0,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(JudgeError::RateLimited);
            }
            return Err(JudgeError::Api(error_text));
        }

        let response_data: serde_json::Value = response.json().await?;

        let content = response_data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| JudgeError::InvalidResponse("Missing content".to_string()))?
            .to_string();

        let usage_data = &response_data["usage"];
        let usage = TokenUsage {
            prompt_tokens: usage_data["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: usage_data["completion_tokens"].as_u64().unwrap_or(0) as u32,
            total_tokens: usage_data["total_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(JudgeResponse {
            content,
            usage,
            model: self.model.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_token(&self) -> (f64, f64) {
        match self.model.as_str() {
            "gpt-4o" => (0.0000025, 0.000010),        // $2.50/$10 per 1M
            "gpt-4o-mini" => (0.00000015, 0.0000006), // $0.15/$0.60 per 1M
            "gpt-4-turbo" => (0.000010, 0.000030),    // $10/$30 per 1M
            _ => (0.00000015, 0.0000006),             // Default to mini pricing
        }
    }
}

/// Anthropic messages-API judge.
pub struct AnthropicJudge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicJudge {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: "https://api.anthropic.com/v1".to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl JudgeClient for AnthropicJudge {
    async fn judge(&self, prompt: String) -> Result<JudgeResponse, JudgeError> {
        let request = serde_json::json!({
            "model": self.model,
            "max_tokens": 4096,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "system": JUDGE_SYSTEM_PROMPT,
            "temperature": 0.0
        });

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(JudgeError::RateLimited);
            }
            return Err(JudgeError::Api(error_text));
        }

        let response_data: serde_json::Value = response.json().await?;

        let content = response_data["content"][0]["text"]
            .as_str()
            .ok_or_else(|| JudgeError::InvalidResponse("Missing content".to_string()))?
            .to_string();

        let usage_data = &response_data["usage"];
        let prompt_tokens = usage_data["input_tokens"].as_u64().unwrap_or(0) as u32;
        let completion_tokens = usage_data["output_tokens"].as_u64().unwrap_or(0) as u32;
        let usage = TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        };

        Ok(JudgeResponse {
            content,
            usage,
            model: self.model.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_token(&self) -> (f64, f64) {
        match self.model.as_str() {
            "claude-3-5-haiku-20241022" => (0.0000008, 0.000004), // $0.80/$4 per 1M
            _ => (0.000003, 0.000015),                            // Sonnet pricing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_cost() {
        let usage = TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 50,
            total_tokens: 150,
        };

        // GPT-4o-mini pricing: $0.15/$0.60 per 1M
        let cost = usage.calculate_cost(0.00000015, 0.0000006);
        assert!((cost - 0.000045).abs() < 0.0000001);
    }

    #[test]
    fn test_openai_cost_per_token() {
        let judge = OpenAiJudge::new("test".to_string(), "gpt-4o-mini".to_string());
        let (input, output) = judge.cost_per_token();

        assert_eq!(input, 0.00000015);
        assert_eq!(output, 0.0000006);
    }

    #[tokio::test]
    async fn test_openai_judge_parses_completion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [{"message": {"content": "{\"score\": 0.9}"}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
                }"#,
            )
            .create_async()
            .await;

        let judge = OpenAiJudge::new("test-key".to_string(), "gpt-4o-mini".to_string())
            .with_base_url(server.url());

        let response = judge.judge("rate this".to_string()).await.unwrap();
        assert_eq!(response.content, r#"{"score": 0.9}"#);
        assert_eq!(response.usage.total_tokens, 16);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_openai_judge_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let judge = OpenAiJudge::new("test-key".to_string(), "gpt-4o-mini".to_string())
            .with_base_url(server.url());

        let err = judge.judge("rate this".to_string()).await.unwrap_err();
        assert!(matches!(err, JudgeError::Api(msg) if msg.contains("upstream exploded")));
    }

    #[tokio::test]
    async fn test_openai_judge_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let judge = OpenAiJudge::new("test-key".to_string(), "gpt-4o-mini".to_string())
            .with_base_url(server.url());

        let err = judge.judge("rate this".to_string()).await.unwrap_err();
        assert!(matches!(err, JudgeError::RateLimited));
    }

    #[tokio::test]
    async fn test_openai_judge_missing_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [], "usage": {}}"#)
            .create_async()
            .await;

        let judge = OpenAiJudge::new("test-key".to_string(), "gpt-4o-mini".to_string())
            .with_base_url(server.url());

        let err = judge.judge("rate this".to_string()).await.unwrap_err();
        assert!(matches!(err, JudgeError::InvalidResponse(_)));
    }
}
