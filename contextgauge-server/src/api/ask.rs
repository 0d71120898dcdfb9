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

//! Chat endpoints: ask a question, optionally with context evaluation, and
//! switch the agent's task type.

use axum::{extract::State, Json};
use contextgauge_core::{EvaluationResult, TaskType};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,

    /// Overrides the agent's current task type for this and later requests.
    #[serde(default)]
    pub task_type: Option<TaskType>,

    /// Attach a context quality evaluation to the response.
    #[serde(default)]
    pub evaluate_context: bool,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
    pub status: &'static str,
}

/// POST /api/v1/ask
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let task_type = match req.task_type {
        Some(requested) => {
            let mut current = state.task_type.write().await;
            if *current != requested {
                info!(from = %current, to = %requested, "switching task type");
                *current = requested;
            }
            requested
        }
        None => *state.task_type.read().await,
    };

    if req.evaluate_context {
        let (answer, evaluation) = state
            .agent
            .answer_with_evaluation(&req.message, task_type)
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;

        Ok(Json(AskResponse {
            response: answer.response,
            evaluation: Some(evaluation),
            status: "success",
        }))
    } else {
        let answer = state
            .agent
            .answer(&req.message, task_type)
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;

        Ok(Json(AskResponse {
            response: answer.response,
            evaluation: None,
            status: "success",
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskTypeRequest {
    pub task_type: String,
}

#[derive(Debug, Serialize)]
pub struct TaskTypeResponse {
    pub message: String,
    pub status: &'static str,
}

/// POST /api/v1/task-type
pub async fn set_task_type(
    State(state): State<AppState>,
    Json(req): Json<TaskTypeRequest>,
) -> Result<Json<TaskTypeResponse>, ApiError> {
    let requested: TaskType = req.task_type.parse().map_err(|_| {
        let valid = TaskType::ALL
            .iter()
            .map(TaskType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::BadRequest(format!(
            "Invalid task type '{}'. Must be one of: {valid}",
            req.task_type
        ))
    })?;

    *state.task_type.write().await = requested;

    Ok(Json(TaskTypeResponse {
        message: format!("Task type set to: {requested}"),
        status: "success",
    }))
}
