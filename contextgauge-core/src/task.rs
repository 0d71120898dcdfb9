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

//! Task types and the system prompt each one selects for the chat agent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Default,
    DocumentAnalysis,
    Research,
    Calculation,
    General,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Default,
        TaskType::DocumentAnalysis,
        TaskType::Research,
        TaskType::Calculation,
        TaskType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Default => "default",
            TaskType::DocumentAnalysis => "document_analysis",
            TaskType::Research => "research",
            TaskType::Calculation => "calculation",
            TaskType::General => "general",
        }
    }

    /// System prompt the chat agent runs under for this task type.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            TaskType::Default => {
                "You are a helpful assistant that can perform calculations and search \
                 through uploaded documents to answer questions. Always check your \
                 document knowledge base first if the question is about specific files. \
                 Use available tools when appropriate to enhance your capabilities."
            }
            TaskType::DocumentAnalysis => {
                "You are a specialized document analysis assistant. Your primary role is to:\n\
                 1. Thoroughly analyze uploaded documents\n\
                 2. Extract key information, themes, and insights\n\
                 3. Provide detailed summaries and comparisons\n\
                 4. Answer questions with specific references to document content\n\n\
                 Always prioritize accuracy and cite specific sections when possible."
            }
            TaskType::Research => {
                "You are a research assistant with access to multiple information sources. \
                 Your capabilities include:\n\
                 1. Searching through your document knowledge base\n\
                 2. Using web search tools for current information\n\
                 3. Synthesizing information from multiple sources\n\
                 4. Providing well-structured, cited responses\n\n\
                 Always verify information and indicate your confidence level."
            }
            TaskType::Calculation => {
                "You are a calculation assistant. Your role is to:\n\
                 1. Perform accurate mathematical calculations\n\
                 2. Use the calculator tool for complex expressions\n\
                 3. Explain your calculation steps\n\
                 4. Verify results when appropriate\n\n\
                 Always show your work and double-check calculations."
            }
            TaskType::General => {
                "You are an intelligent assistant with access to a document knowledge \
                 base, file system operations, web search, and mathematical calculation \
                 tools. Use the most appropriate tools for each task. Always provide \
                 clear, accurate, and helpful responses."
            }
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(TaskType::Default),
            "document_analysis" => Ok(TaskType::DocumentAnalysis),
            "research" => Ok(TaskType::Research),
            "calculation" => Ok(TaskType::Calculation),
            "general" => Ok(TaskType::General),
            other => Err(CoreError::UnknownTaskType(other.to_string())),
        }
    }
}
