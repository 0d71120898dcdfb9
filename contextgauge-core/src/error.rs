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

use thiserror::Error;

/// Errors in the core data model.
///
/// Only input validation lives here; judgment failures are recovered inside
/// the evaluator and never surface as errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
