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

//! Built-in MCP tools: file read, web search, calculator.
//!
//! Tools report domain failures (missing file, empty results) as result
//! text, matching MCP conventions; only parameter and transport problems
//! become `ToolError`s.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::registry::{McpTool, ToolError, ToolResult};

// ---------------------------------------------------------------------------
// read_file
// ---------------------------------------------------------------------------

/// Reads a file from the configured data directory.
pub struct ReadFileTool {
    data_dir: PathBuf,
    schema: Value,
}

impl ReadFileTool {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            schema: json!({
                "type": "object",
                "properties": {
                    "filepath": {
                        "type": "string",
                        "description": "Path to the file relative to the data directory"
                    }
                },
                "required": ["filepath"]
            }),
        }
    }

    /// Joins `filepath` under the data dir, rejecting absolute paths and
    /// any `..` component.
    fn resolve(&self, filepath: &str) -> Result<PathBuf, ToolError> {
        let relative = Path::new(filepath);
        if relative.is_absolute() {
            return Err(ToolError::InvalidParams(
                "filepath must be relative to the data directory".to_string(),
            ));
        }
        for component in relative.components() {
            if matches!(component, Component::ParentDir) {
                return Err(ToolError::InvalidParams(
                    "filepath must not contain '..'".to_string(),
                ));
            }
        }
        Ok(self.data_dir.join(relative))
    }
}

#[async_trait]
impl McpTool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file from the data directory"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value) -> Result<ToolResult, ToolError> {
        let filepath = params["filepath"].as_str().unwrap_or_default();
        let path = self.resolve(filepath)?;

        debug!(path = %path.display(), "read_file");
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(ToolResult {
                content: format!("File contents of {filepath}:\n{content}"),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ToolResult {
                content: format!("Error: File {filepath} not found in data directory"),
            }),
            Err(err) => Err(ToolError::Execution(format!(
                "Error reading file {filepath}: {err}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// web_search
// ---------------------------------------------------------------------------

/// Web search via the DuckDuckGo instant-answer API (no API key required).
pub struct WebSearchTool {
    base_url: String,
    client: reqwest::Client,
    schema: Value,
}

const MAX_SEARCH_RESULTS: usize = 5;

impl WebSearchTool {
    pub fn new() -> Self {
        Self {
            base_url: "https://api.duckduckgo.com".to_string(),
            client: reqwest::Client::new(),
            schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query to look up on the web"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn format_results(query: &str, response: &Value) -> String {
        let mut results: Vec<(String, String, String)> = Vec::new();

        // The abstract, when present, is the best single answer.
        if let (Some(heading), Some(url), Some(text)) = (
            response["Heading"].as_str().filter(|s| !s.is_empty()),
            response["AbstractURL"].as_str().filter(|s| !s.is_empty()),
            response["AbstractText"].as_str().filter(|s| !s.is_empty()),
        ) {
            results.push((heading.to_string(), url.to_string(), text.to_string()));
        }

        if let Some(topics) = response["RelatedTopics"].as_array() {
            for topic in topics {
                if results.len() >= MAX_SEARCH_RESULTS {
                    break;
                }
                if let (Some(url), Some(text)) =
                    (topic["FirstURL"].as_str(), topic["Text"].as_str())
                {
                    let title = text.split(" - ").next().unwrap_or(text);
                    results.push((title.to_string(), url.to_string(), text.to_string()));
                }
            }
        }

        if results.is_empty() {
            return format!("No search results found for '{query}'");
        }

        let mut formatted = format!("Web search results for '{query}':\n\n");
        for (i, (title, url, body)) in results.iter().enumerate() {
            formatted.push_str(&format!("{}. {title}\n   URL: {url}\n   {body}\n\n", i + 1));
        }
        formatted.trim_end().to_string()
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl McpTool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information using DuckDuckGo. Returns up \
         to 5 relevant search results with titles, URLs, and snippets."
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value) -> Result<ToolResult, ToolError> {
        let query = params["query"].as_str().unwrap_or_default();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await
            .map_err(|err| ToolError::Execution(format!("Error searching the web: {err}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|err| ToolError::Execution(format!("Error parsing search results: {err}")))?;

        Ok(ToolResult {
            content: Self::format_results(query, &body),
        })
    }
}

// ---------------------------------------------------------------------------
// calculate
// ---------------------------------------------------------------------------

/// Arithmetic expression evaluator over `+ - * / ( )` and decimal numbers.
pub struct CalculatorTool {
    schema: Value,
}

impl CalculatorTool {
    pub fn new() -> Self {
        Self {
            schema: json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "Mathematical expression to evaluate (e.g., '2 + 2', '10 * 5')"
                    }
                },
                "required": ["expression"]
            }),
        }
    }

    pub fn evaluate(expression: &str) -> Result<f64, String> {
        if let Some(bad) = expression
            .chars()
            .find(|c| !matches!(c, '0'..='9' | '+' | '-' | '*' | '/' | '.' | '(' | ')' | ' '))
        {
            return Err(format!("invalid character '{bad}' in expression"));
        }

        let mut parser = ExprParser::new(expression);
        let value = parser.parse_expr()?;
        parser.expect_end()?;
        Ok(value)
    }

    fn format_value(value: f64) -> String {
        if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        }
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl McpTool for CalculatorTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Perform mathematical calculations"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value) -> Result<ToolResult, ToolError> {
        let expression = params["expression"].as_str().unwrap_or_default();
        match Self::evaluate(expression) {
            Ok(value) => Ok(ToolResult {
                content: format!("Result: {}", Self::format_value(value)),
            }),
            Err(reason) => Ok(ToolResult {
                content: format!("Error calculating '{expression}': {reason}"),
            }),
        }
    }
}

/// Recursive-descent parser with the usual precedence: `* /` bind tighter
/// than `+ -`, parentheses group, unary minus allowed before a factor.
struct ExprParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExprParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.get(self.pos) == Some(&' ') {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut value = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.pos += 1;
                    value += self.parse_term()?;
                }
                '-' => {
                    self.pos += 1;
                    value -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> Result<f64, String> {
        let mut value = self.parse_factor()?;
        while let Some(op) = self.peek() {
            match op {
                '*' => {
                    self.pos += 1;
                    value *= self.parse_factor()?;
                }
                '/' => {
                    self.pos += 1;
                    let divisor = self.parse_factor()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_factor(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.parse_factor()?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.parse_expr()?;
                if self.peek() != Some(')') {
                    return Err("expected ')'".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(c) => Err(format!("unexpected '{c}'")),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn parse_number(&mut self) -> Result<f64, String> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.chars.get(self.pos), Some(c) if c.is_ascii_digit() || *c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| format!("invalid number '{literal}'"))
    }

    fn expect_end(&mut self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(format!("unexpected '{c}' after expression")),
        }
    }
}
