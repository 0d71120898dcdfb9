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

//! Context quality evaluation.
//!
//! Two judgment calls — relevance and completeness — scored independently
//! over the same immutable input, then combined into an overall verdict.
//! The judge is a generative model: repeated calls may score the same input
//! differently. Every failure mode short of an empty query degrades to a
//! 0.0 sub-score with an explanation naming the failure; the aggregate is
//! always well-formed.

use std::sync::Arc;

use contextgauge_core::{
    eval_result::clamp_score, CompletenessResult, ContextChunk, EvaluationRequest,
    EvaluationResult, QualityWeights, RelevanceResult, ASPECT_LIMIT,
};
use serde_json::Value;
use tracing::warn;

use crate::extract::extract_json;
use crate::judge::JudgeClient;
use crate::EvalError;

const NO_CONTEXT_EXPLANATION: &str = "No context was provided for evaluation";

/// Scores relevance and completeness of retrieved context via a judgment
/// client. Stateless across calls.
pub struct ContextEvaluator {
    judge: Arc<dyn JudgeClient>,
    weights: QualityWeights,
}

impl ContextEvaluator {
    pub fn new(judge: Arc<dyn JudgeClient>) -> Self {
        Self {
            judge,
            weights: QualityWeights::default(),
        }
    }

    /// Override the default equal weighting of the two sub-scores.
    pub fn with_weights(mut self, weights: QualityWeights) -> Self {
        self.weights = weights;
        self
    }

    fn relevance_prompt(request: &EvaluationRequest) -> String {
        format!(
            r#"Evaluate the relevance of the following retrieved context to the query.

QUERY:
{query}

RETRIEVED CONTEXT (in order):
{contexts}

Rate the relevance on a scale of 0.0 to 1.0, where:
- 1.0 = Highly relevant, directly answers the query
- 0.5 = Somewhat relevant, partially addresses the query
- 0.0 = Not relevant, does not address the query

Respond in JSON format:
{{
  "score": <float between 0.0 and 1.0>,
  "explanation": "<brief explanation of the score>",
  "key_points": ["<key points from the context>"]
}}"#,
            query = request.query,
            contexts = request.numbered_contexts()
        )
    }

    fn completeness_prompt(request: &EvaluationRequest) -> String {
        format!(
            r#"Evaluate the completeness of the following retrieved context in answering the query.

QUERY:
{query}

RETRIEVED CONTEXT (in order):
{contexts}

Rate the completeness on a scale of 0.0 to 1.0, where:
- 1.0 = Complete answer, all aspects covered
- 0.5 = Partial answer, some aspects missing
- 0.0 = Incomplete answer, major aspects missing

Respond in JSON format:
{{
  "score": <float between 0.0 and 1.0>,
  "explanation": "<brief explanation>",
  "missing_aspects": ["<aspects the context does not cover>"]
}}"#,
            query = request.query,
            contexts = request.numbered_contexts()
        )
    }

    /// Issues one judgment call and defensively parses the reply into
    /// `(score, explanation, capped list)`. Any failure collapses to the
    /// 0.0 fallback with an explanation naming it.
    async fn judge_metric(&self, prompt: String, list_key: &str) -> (f64, String, Vec<String>) {
        let response = match self.judge.judge(prompt).await {
            Ok(response) => response,
            Err(err) => {
                warn!(model = self.judge.model_name(), error = %err, "judgment call failed");
                return (0.0, format!("Judgment unavailable: {err}"), Vec::new());
            }
        };

        let Some(json) = extract_json(&response.content) else {
            warn!(
                model = self.judge.model_name(),
                "judgment reply contained no parseable JSON"
            );
            return (
                0.0,
                "Malformed judgment: reply contained no parseable JSON object".to_string(),
                Vec::new(),
            );
        };

        let Some(score) = json.get("score").and_then(Value::as_f64) else {
            return (
                0.0,
                "Malformed judgment: missing or non-numeric score".to_string(),
                Vec::new(),
            );
        };

        let explanation = json
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let items = json
            .get(list_key)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .take(ASPECT_LIMIT)
                    .collect()
            })
            .unwrap_or_default();

        (clamp_score(score), explanation, items)
    }

    async fn relevance_inner(&self, request: &EvaluationRequest) -> RelevanceResult {
        if request.contexts.is_empty() {
            return RelevanceResult {
                relevance_score: 0.0,
                explanation: NO_CONTEXT_EXPLANATION.to_string(),
                key_points: Vec::new(),
            };
        }

        let (score, explanation, key_points) = self
            .judge_metric(Self::relevance_prompt(request), "key_points")
            .await;

        RelevanceResult {
            relevance_score: score,
            explanation,
            key_points,
        }
    }

    async fn completeness_inner(&self, request: &EvaluationRequest) -> CompletenessResult {
        if request.contexts.is_empty() {
            return CompletenessResult {
                completeness_score: 0.0,
                explanation: NO_CONTEXT_EXPLANATION.to_string(),
                missing_aspects: Vec::new(),
            };
        }

        let (score, explanation, missing_aspects) = self
            .judge_metric(Self::completeness_prompt(request), "missing_aspects")
            .await;

        CompletenessResult {
            completeness_score: score,
            explanation,
            missing_aspects,
        }
    }

    /// Scores how relevant the context is to the query.
    pub async fn evaluate_relevance(
        &self,
        query: &str,
        contexts: &[ContextChunk],
    ) -> Result<RelevanceResult, EvalError> {
        let request = EvaluationRequest::new(query, contexts.to_vec());
        request.validate()?;
        Ok(self.relevance_inner(&request).await)
    }

    /// Scores whether the context suffices to answer the query.
    pub async fn evaluate_completeness(
        &self,
        query: &str,
        contexts: &[ContextChunk],
    ) -> Result<CompletenessResult, EvalError> {
        let request = EvaluationRequest::new(query, contexts.to_vec());
        request.validate()?;
        Ok(self.completeness_inner(&request).await)
    }

    /// Full quality verdict: both sub-evaluations issued concurrently, then
    /// combined. The only error is an empty query; judgment failures land in
    /// the sub-scores as 0.0 fallbacks.
    pub async fn evaluate_quality(
        &self,
        query: &str,
        contexts: &[ContextChunk],
    ) -> Result<EvaluationResult, EvalError> {
        let request = EvaluationRequest::new(query, contexts.to_vec());
        request.validate()?;

        let (relevance, completeness) = tokio::join!(
            self.relevance_inner(&request),
            self.completeness_inner(&request)
        );

        Ok(EvaluationResult::from_parts(
            relevance,
            completeness,
            self.weights,
        ))
    }
}
