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

pub mod ask;
pub mod evaluate;
pub mod health;
pub mod tools;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contextgauge_core::TaskType;
use contextgauge_evals::ContextEvaluator;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::agent::ChatAgent;
use crate::mcp::ToolRegistry;

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ChatAgent>,
    pub evaluator: Arc<ContextEvaluator>,
    pub tools: Arc<ToolRegistry>,
    /// Current task type; switched by `POST /api/v1/task-type` and by a
    /// per-request override on `/api/v1/ask`.
    pub task_type: Arc<RwLock<TaskType>>,
}
