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

//! Retrieved context chunks and the evaluation request envelope.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single unit of retrieved text, owned by the retrieval collaborator
/// and passed by value into the evaluator. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub text: String,

    /// Identifier of where the chunk came from (e.g. a filename).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ContextChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: Some(source.into()),
        }
    }
}

/// Query plus the ordered chunks retrieved for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub query: String,

    #[serde(default)]
    pub contexts: Vec<ContextChunk>,
}

impl EvaluationRequest {
    pub fn new(query: impl Into<String>, contexts: Vec<ContextChunk>) -> Self {
        Self {
            query: query.into(),
            contexts,
        }
    }

    /// Rejects an empty or whitespace-only query. An empty context list is
    /// valid input; the evaluator defines its score.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.query.trim().is_empty() {
            return Err(CoreError::EmptyQuery);
        }
        Ok(())
    }

    /// Renders the chunks as numbered blocks for judgment prompts.
    pub fn numbered_contexts(&self) -> String {
        self.contexts
            .iter()
            .enumerate()
            .map(|(i, chunk)| match &chunk.source {
                Some(source) => format!("[Chunk {} ({})]: {}", i, source, chunk.text),
                None => format!("[Chunk {}]: {}", i, chunk.text),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_query() {
        let request = EvaluationRequest::new("", vec![]);
        assert!(matches!(request.validate(), Err(CoreError::EmptyQuery)));

        let request = EvaluationRequest::new("   \n", vec![ContextChunk::new("text")]);
        assert!(matches!(request.validate(), Err(CoreError::EmptyQuery)));
    }

    #[test]
    fn test_validate_accepts_empty_contexts() {
        let request = EvaluationRequest::new("What is the IAU?", vec![]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_numbered_contexts_includes_source() {
        let request = EvaluationRequest::new(
            "q",
            vec![
                ContextChunk::with_source("first", "iau.txt"),
                ContextChunk::new("second"),
            ],
        );

        let rendered = request.numbered_contexts();
        assert!(rendered.contains("[Chunk 0 (iau.txt)]: first"));
        assert!(rendered.contains("[Chunk 1]: second"));
    }

    #[test]
    fn test_chunk_serde_omits_missing_source() {
        let chunk = ContextChunk::new("text");
        let json = serde_json::to_string(&chunk).unwrap();
        assert_eq!(json, r#"{"text":"text"}"#);

        let parsed: ContextChunk = serde_json::from_str(r#"{"text":"t","source":"s"}"#).unwrap();
        assert_eq!(parsed.source.as_deref(), Some("s"));
    }
}
