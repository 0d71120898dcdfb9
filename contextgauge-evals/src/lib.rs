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

//! # ContextGauge Evaluation
//!
//! LLM-judged quality scoring for retrieved context.
//!
//! The [`ContextEvaluator`] takes a query and the chunks retrieved for it,
//! asks a judgment model to score relevance and completeness, and combines
//! both into an [`EvaluationResult`](contextgauge_core::EvaluationResult)
//! with a recommendation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use contextgauge_core::ContextChunk;
//! use contextgauge_evals::{ContextEvaluator, OpenAiJudge};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let judge = Arc::new(OpenAiJudge::new(
//!         std::env::var("OPENAI_API_KEY").unwrap(),
//!         "gpt-4o-mini".to_string(),
//!     ));
//!     let evaluator = ContextEvaluator::new(judge);
//!
//!     let chunks = vec![ContextChunk::with_source(
//!         "The IAU defines a planet as a body that has cleared its orbit.",
//!         "iau.txt",
//!     )];
//!     let result = evaluator.evaluate_quality("What makes a planet?", &chunks).await.unwrap();
//!     println!("{}", result.recommendation);
//! }
//! ```
//!
//! Judgment calls go to a generative model, so repeated evaluations of the
//! same input may score differently. Only the deterministic paths (empty
//! contexts, judgment failure) pin exact scores.

use thiserror::Error;

pub mod context_evaluator;
pub mod extract;
pub mod judge;

pub use context_evaluator::ContextEvaluator;
pub use extract::extract_json;
pub use judge::{AnthropicJudge, JudgeClient, JudgeError, JudgeResponse, OpenAiJudge, TokenUsage};

/// Errors surfaced by the evaluation API.
///
/// Judgment failures never appear here — they are recovered into fallback
/// scores inside the evaluator. Only invalid input reaches the caller.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<contextgauge_core::CoreError> for EvalError {
    fn from(err: contextgauge_core::CoreError) -> Self {
        EvalError::InvalidInput(err.to_string())
    }
}
