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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// ContextGauge Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:47300")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all, use specific origins in production)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// OpenAI API key (chat and judgment calls)
    pub openai_api_key: Option<String>,

    /// Anthropic API key (judgment calls when OpenAI is absent)
    pub anthropic_api_key: Option<String>,

    /// Model used for chat completions
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for judgment calls
    #[serde(default = "default_judge_model")]
    pub judge_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            chat_model: default_chat_model(),
            judge_model: default_judge_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Directory of plain-text documents loaded into the retriever at
    /// startup; also the root the read_file tool is confined to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            top_k: default_top_k(),
        }
    }
}

fn default_http_addr() -> String {
    "127.0.0.1:47300".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_judge_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_top_k() -> usize {
    4
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - CONTEXTGAUGE_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:47300)
    /// - CONTEXTGAUGE_DATA_DIR: Document directory (default: ./data)
    /// - CONTEXTGAUGE_ENABLE_CORS: Enable CORS (default: true)
    /// - CONTEXTGAUGE_CHAT_MODEL / CONTEXTGAUGE_JUDGE_MODEL: model overrides
    /// - OPENAI_API_KEY / ANTHROPIC_API_KEY: provider credentials
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load from an optional file path, then apply environment overrides.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("CONTEXTGAUGE_HTTP_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Ok(cors) = std::env::var("CONTEXTGAUGE_ENABLE_CORS") {
            self.server.enable_cors = cors.parse().unwrap_or(true);
        }
        if let Ok(data_dir) = std::env::var("CONTEXTGAUGE_DATA_DIR") {
            self.agent.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(model) = std::env::var("CONTEXTGAUGE_CHAT_MODEL") {
            self.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("CONTEXTGAUGE_JUDGE_MODEL") {
            self.llm.judge_model = model;
        }
        if self.llm.openai_api_key.is_none() {
            self.llm.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.llm.anthropic_api_key.is_none() {
            self.llm.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", self.server.listen_addr, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:47300");
        assert!(config.server.enable_cors);
        assert_eq!(config.llm.chat_model, "gpt-4o-mini");
        assert_eq!(config.agent.top_k, 4);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            [server]
            listen_addr = "0.0.0.0:8080"
            enable_cors = false

            [llm]
            chat_model = "gpt-4o"

            [agent]
            data_dir = "/srv/docs"
            top_k = 8
        "#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert!(!config.server.enable_cors);
        assert_eq!(config.llm.chat_model, "gpt-4o");
        assert_eq!(config.llm.judge_model, "gpt-4o-mini");
        assert_eq!(config.agent.data_dir, PathBuf::from("/srv/docs"));
        assert_eq!(config.agent.top_k, 8);
    }

    #[test]
    fn test_socket_addr_rejects_garbage() {
        let mut config = ServerConfig::default();
        config.server.listen_addr = "not-an-addr".to_string();
        assert!(config.socket_addr().is_err());
    }
}
