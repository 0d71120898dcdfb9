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

//! Chat agent orchestration.
//!
//! The agent retrieves context for a question, answers it through the chat
//! provider under the task-type system prompt, and can attach a context
//! quality evaluation computed over the same retrieved chunks.

use std::sync::Arc;

use contextgauge_core::{ContextChunk, EvaluationRequest, EvaluationResult, TaskType};
use contextgauge_evals::ContextEvaluator;
use tracing::{info, warn};

use crate::llm::{ChatMessage, LlmProvider};
use crate::retrieval::ContextRetriever;

/// A chat answer plus the chunks it was conditioned on.
#[derive(Debug, Clone)]
pub struct AgentAnswer {
    pub response: String,
    pub contexts: Vec<ContextChunk>,
}

pub struct ChatAgent {
    llm: Arc<dyn LlmProvider>,
    retriever: Arc<dyn ContextRetriever>,
    evaluator: Arc<ContextEvaluator>,
    chat_model: String,
    top_k: usize,
}

impl ChatAgent {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        retriever: Arc<dyn ContextRetriever>,
        evaluator: Arc<ContextEvaluator>,
        chat_model: String,
        top_k: usize,
    ) -> Self {
        Self {
            llm,
            retriever,
            evaluator,
            chat_model,
            top_k,
        }
    }

    fn build_messages(
        task_type: TaskType,
        message: &str,
        contexts: &[ContextChunk],
    ) -> Vec<ChatMessage> {
        let user = if contexts.is_empty() {
            message.to_string()
        } else {
            let rendered = EvaluationRequest::new(message, contexts.to_vec()).numbered_contexts();
            format!(
                "Use the following retrieved context when it is relevant.\n\n\
                 CONTEXT:\n{rendered}\n\nQUESTION:\n{message}"
            )
        };

        vec![
            ChatMessage::system(task_type.system_prompt()),
            ChatMessage::user(user),
        ]
    }

    /// Retrieve context and answer the question under the given task type.
    pub async fn answer(&self, message: &str, task_type: TaskType) -> anyhow::Result<AgentAnswer> {
        let contexts = self.retriever.retrieve(message, self.top_k).await;
        info!(
            task_type = %task_type,
            retrieved = contexts.len(),
            "answering question"
        );

        let messages = Self::build_messages(task_type, message, &contexts);
        let response = self
            .llm
            .chat(messages, Some(self.chat_model.clone()))
            .await?;

        Ok(AgentAnswer {
            response: response.content,
            contexts,
        })
    }

    /// Answer plus a quality verdict over the retrieved chunks.
    ///
    /// An evaluation failure degrades to the evaluator's fallback result and
    /// never fails the answer; the only hard error here is the chat call.
    pub async fn answer_with_evaluation(
        &self,
        message: &str,
        task_type: TaskType,
    ) -> anyhow::Result<(AgentAnswer, EvaluationResult)> {
        let answer = self.answer(message, task_type).await?;

        let evaluation = self
            .evaluator
            .evaluate_quality(message, &answer.contexts)
            .await
            .map_err(|err| {
                warn!(error = %err, "context evaluation rejected input");
                err
            })?;

        Ok((answer, evaluation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatResponse;
    use crate::retrieval::MemoryRetriever;
    use async_trait::async_trait;
    use contextgauge_evals::{JudgeClient, JudgeError, JudgeResponse, TokenUsage};

    pub(crate) struct CannedProvider {
        pub reply: String,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn chat(
            &self,
            messages: Vec<ChatMessage>,
            model: Option<String>,
        ) -> anyhow::Result<ChatResponse> {
            assert_eq!(messages[0].role, "system");
            Ok(ChatResponse {
                content: self.reply.clone(),
                provider: "canned".to_string(),
                model: model.unwrap_or_default(),
                input_tokens: Some(10),
                output_tokens: Some(5),
                duration_ms: 1,
            })
        }

        fn list_models(&self) -> Vec<String> {
            vec!["canned-1".to_string()]
        }

        fn name(&self) -> &str {
            "Canned"
        }
    }

    struct CannedJudge {
        reply: String,
    }

    #[async_trait]
    impl JudgeClient for CannedJudge {
        async fn judge(&self, _prompt: String) -> Result<JudgeResponse, JudgeError> {
            Ok(JudgeResponse {
                content: self.reply.clone(),
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

    fn test_agent(judge_reply: &str) -> ChatAgent {
        let mut retriever = MemoryRetriever::new();
        retriever.add_document(ContextChunk::with_source(
            "The IAU requires a planet to have cleared its orbital neighbourhood.",
            "iau.txt",
        ));

        ChatAgent::new(
            Arc::new(CannedProvider {
                reply: "A planet has cleared its orbit; a dwarf planet has not.".to_string(),
            }),
            Arc::new(retriever),
            Arc::new(ContextEvaluator::new(Arc::new(CannedJudge {
                reply: judge_reply.to_string(),
            }))),
            "canned-1".to_string(),
            4,
        )
    }

    #[tokio::test]
    async fn test_answer_includes_retrieved_context() {
        let agent = test_agent("{}");
        let answer = agent
            .answer("What must a planet do to its orbital neighbourhood?", TaskType::Default)
            .await
            .unwrap();

        assert!(!answer.response.is_empty());
        assert_eq!(answer.contexts.len(), 1);
        assert_eq!(answer.contexts[0].source.as_deref(), Some("iau.txt"));
    }

    #[tokio::test]
    async fn test_answer_with_evaluation_populates_all_fields() {
        let agent = test_agent(
            r#"{"score": 0.9, "explanation": "on point", "key_points": ["orbit clearing"], "missing_aspects": []}"#,
        );

        let (answer, evaluation) = agent
            .answer_with_evaluation(
                "What is the key distinction between a full planet and a dwarf planet?",
                TaskType::Research,
            )
            .await
            .unwrap();

        assert!(!answer.response.is_empty());
        assert!((0.0..=1.0).contains(&evaluation.overall_quality_score));
        assert!(!evaluation.recommendation.is_empty());
        assert!(!evaluation.relevance.explanation.is_empty());
    }

    #[tokio::test]
    async fn test_no_context_still_answers() {
        let agent = test_agent("{}");
        let (answer, evaluation) = agent
            .answer_with_evaluation("zzz qqq xxx", TaskType::Default)
            .await
            .unwrap();

        assert!(answer.contexts.is_empty());
        assert_eq!(evaluation.overall_quality_score, 0.0);
        assert!(evaluation
            .relevance
            .explanation
            .contains("No context was provided"));
    }
}
