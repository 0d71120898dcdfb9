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

//! MCP (Model Context Protocol) tools.
//!
//! The registry is constructed at startup and passed through the router
//! state; there is no module-level singleton.

pub mod registry;
pub mod tools;

pub use registry::{McpTool, RegistrationError, ToolError, ToolListEntry, ToolRegistry, ToolResult};
pub use tools::{CalculatorTool, ReadFileTool, WebSearchTool};

use std::path::PathBuf;
use std::sync::Arc;

/// Builds the registry with the built-in tools.
pub fn default_registry(data_dir: PathBuf) -> Result<ToolRegistry, RegistrationError> {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(ReadFileTool::new(data_dir)))?;
    registry.register(Arc::new(WebSearchTool::new()))?;
    registry.register(Arc::new(CalculatorTool::new()))?;
    Ok(registry)
}
