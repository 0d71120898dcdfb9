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

//! ContextGauge Core
//!
//! Fundamental data structures shared by the evaluator and the server:
//! context chunks, evaluation requests and results, recommendation bands,
//! and task-type prompt selection.

pub mod chunk;
pub mod error;
pub mod eval_result;
pub mod task;

pub use chunk::{ContextChunk, EvaluationRequest};
pub use error::{CoreError, Result};
pub use eval_result::{
    CompletenessResult, EvaluationResult, QualityWeights, Recommendation, RelevanceResult,
    ASPECT_LIMIT,
};
pub use task::TaskType;
