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

//! MCP tool listing and execution over HTTP.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::{ApiError, AppState};
use crate::mcp::{ToolError, ToolListEntry};

#[derive(Debug, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolListEntry>,
    pub status: &'static str,
}

/// GET /api/v1/mcp-tools
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.tools.list(),
        status: "success",
    })
}

#[derive(Debug, Serialize)]
pub struct ToolExecuteResponse {
    pub result: String,
    pub status: &'static str,
}

/// POST /api/v1/mcp-tools/:name
pub async fn execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> Result<Json<ToolExecuteResponse>, ApiError> {
    let result = state
        .tools
        .execute(&name, params)
        .await
        .map_err(|err| match err {
            ToolError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ToolError::InvalidParams(_) => ApiError::BadRequest(err.to_string()),
            ToolError::Execution(_) => ApiError::Internal(err.to_string()),
        })?;

    Ok(Json(ToolExecuteResponse {
        result: result.content,
        status: "success",
    }))
}
