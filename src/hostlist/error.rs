// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostlistError {
    /// Port field that is not a number in 0..=65535 (e.g., `10.0.0.5,ops,ssh`)
    #[error("invalid port '{value}' on line {line}")]
    InvalidPort { line: usize, value: String },

    /// Record whose address field is blank (e.g., `,ops,22`)
    #[error("missing host address on line {line}")]
    EmptyAddress { line: usize },

    /// Host list or inventory could not be read
    #[error("failed to read '{path}': {reason}")]
    FileRead { path: String, reason: String },

    /// Inventory could not be written back
    #[error("failed to write '{path}': {reason}")]
    FileWrite { path: String, reason: String },
}
