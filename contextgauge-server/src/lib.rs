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

//! ContextGauge HTTP server.
//!
//! Wires the chat agent, the context evaluator, and the MCP tool registry
//! behind an axum API.

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod mcp;
pub mod retrieval;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use contextgauge_evals::{AnthropicJudge, ContextEvaluator, JudgeClient, OpenAiJudge};
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::agent::ChatAgent;
use crate::api::AppState;
use crate::config::{LlmConfig, ServerConfig};
use crate::llm::{AnthropicProvider, LlmProvider, OpenAiProvider};
use crate::retrieval::MemoryRetriever;

/// Builds the API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/v1/ask", post(api::ask::ask))
        .route("/api/v1/evaluate", post(api::evaluate::evaluate_quality))
        .route("/api/v1/task-type", post(api::ask::set_task_type))
        .route("/api/v1/mcp-tools", get(api::tools::list_tools))
        .route("/api/v1/mcp-tools/:name", post(api::tools::execute_tool))
        .with_state(state)
}

fn build_chat_provider(llm: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    if let Some(key) = &llm.openai_api_key {
        tracing::info!("Initialized OpenAI chat provider");
        return Ok(Arc::new(OpenAiProvider::new(key.clone())?));
    }
    if let Some(key) = &llm.anthropic_api_key {
        tracing::info!("Initialized Anthropic chat provider");
        return Ok(Arc::new(AnthropicProvider::new(key.clone())?));
    }
    anyhow::bail!(
        "No LLM credentials configured. Set OPENAI_API_KEY or ANTHROPIC_API_KEY, \
         or add a key under [llm] in the config file."
    )
}

fn build_judge(llm: &LlmConfig) -> Result<Arc<dyn JudgeClient>> {
    if let Some(key) = &llm.openai_api_key {
        return Ok(Arc::new(OpenAiJudge::new(
            key.clone(),
            llm.judge_model.clone(),
        )));
    }
    if let Some(key) = &llm.anthropic_api_key {
        return Ok(Arc::new(AnthropicJudge::new(
            key.clone(),
            llm.judge_model.clone(),
        )));
    }
    anyhow::bail!("No LLM credentials configured for the judgment client")
}

/// Assembles the application state from configuration.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let chat_provider = build_chat_provider(&config.llm)?;
    let judge = build_judge(&config.llm)?;
    let evaluator = Arc::new(ContextEvaluator::new(judge));

    let retriever = Arc::new(MemoryRetriever::from_dir(&config.agent.data_dir)?);
    if retriever.is_empty() {
        tracing::warn!(
            dir = %config.agent.data_dir.display(),
            "no documents loaded; retrieval will return nothing"
        );
    }

    let tools = Arc::new(
        mcp::default_registry(config.agent.data_dir.clone())
            .map_err(|err| anyhow::anyhow!("tool registration failed: {err}"))?,
    );

    let agent = Arc::new(ChatAgent::new(
        chat_provider,
        retriever,
        evaluator.clone(),
        config.llm.chat_model.clone(),
        config.agent.top_k,
    ));

    Ok(AppState {
        agent,
        evaluator,
        tools,
        task_type: Arc::new(RwLock::new(contextgauge_core::TaskType::Default)),
    })
}

/// Runs the HTTP server until the process is stopped.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let state = build_state(&config)?;

    let app = build_router(state)
        .layer(if config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_methods(Any)
                .allow_headers(Any)
                .allow_origin(Any);
            if config.server.cors_origins.is_empty() {
                tracing::warn!("CORS: allowing all origins (development mode)");
            } else {
                tracing::info!("CORS: configured origins: {:?}", config.server.cors_origins);
            }
            cors
        } else {
            CorsLayer::new()
        })
        .layer(TraceLayer::new_for_http());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ChatResponse};
    use crate::mcp::CalculatorTool;
    use crate::mcp::ToolRegistry;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use contextgauge_core::{ContextChunk, TaskType};
    use contextgauge_evals::{JudgeError, JudgeResponse, TokenUsage};
    use tower::ServiceExt;

    struct CannedProvider;

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn chat(
            &self,
            _messages: Vec<ChatMessage>,
            model: Option<String>,
        ) -> anyhow::Result<ChatResponse> {
            Ok(ChatResponse {
                content: "A planet has cleared its orbit; a dwarf planet has not.".to_string(),
                provider: "canned".to_string(),
                model: model.unwrap_or_default(),
                input_tokens: None,
                output_tokens: None,
                duration_ms: 1,
            })
        }

        fn list_models(&self) -> Vec<String> {
            Vec::new()
        }

        fn name(&self) -> &str {
            "Canned"
        }
    }

    struct CannedJudge;

    #[async_trait]
    impl contextgauge_evals::JudgeClient for CannedJudge {
        async fn judge(&self, _prompt: String) -> Result<JudgeResponse, JudgeError> {
            Ok(JudgeResponse {
                content: r#"{"score": 0.9, "explanation": "relevant", "key_points": ["IAU"], "missing_aspects": []}"#.to_string(),
                usage: TokenUsage::default(),
                model: "canned-judge".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "canned-judge"
        }

        fn cost_per_token(&self) -> (f64, f64) {
            (0.0, 0.0)
        }
    }

    fn test_state() -> AppState {
        let mut retriever = MemoryRetriever::new();
        retriever.add_document(ContextChunk::with_source(
            "The IAU definition requires a planet to clear its orbital neighbourhood.",
            "iau.txt",
        ));

        let evaluator = Arc::new(ContextEvaluator::new(Arc::new(CannedJudge)));
        let tools = ToolRegistry::new();
        tools
            .register(Arc::new(CalculatorTool::new()))
            .expect("register calculator");

        AppState {
            agent: Arc::new(ChatAgent::new(
                Arc::new(CannedProvider),
                Arc::new(retriever),
                evaluator.clone(),
                "canned-1".to_string(),
                4,
            )),
            evaluator,
            tools: Arc::new(tools),
            task_type: Arc::new(RwLock::new(TaskType::Default)),
        }
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ask_empty_message_rejected() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request("/api/v1/ask", r#"{"message": "   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_with_evaluation() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request(
                "/api/v1/ask",
                r#"{"message": "What is the key distinction between a full planet and a dwarf planet?", "evaluate_context": true}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_evaluate_endpoint_rejects_empty_query() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request(
                "/api/v1/evaluate",
                r#"{"query": "", "contexts": []}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_task_type_switch_and_reject() {
        let state = test_state();
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                "/api/v1/task-type",
                r#"{"task_type": "research"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*state.task_type.read().await, TaskType::Research);

        let response = app
            .oneshot(json_request(
                "/api/v1/task-type",
                r#"{"task_type": "astrology"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tool_listing_and_execution() {
        let app = build_router(test_state());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/mcp-tools")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "/api/v1/mcp-tools/calculate",
                r#"{"expression": "6 * 7"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request("/api/v1/mcp-tools/unknown", r#"{}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
