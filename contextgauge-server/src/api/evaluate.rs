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

//! Direct evaluator access for callers that already hold context chunks.

use axum::{extract::State, Json};
use contextgauge_core::{EvaluationRequest, EvaluationResult};

use super::{ApiError, AppState};

/// POST /api/v1/evaluate
pub async fn evaluate_quality(
    State(state): State<AppState>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResult>, ApiError> {
    req.validate()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let result = state
        .evaluator
        .evaluate_quality(&req.query, &req.contexts)
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    Ok(Json(result))
}
