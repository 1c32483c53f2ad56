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

use super::super::tokio_client::CommandExecutedResult;

/// Output of one remote command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_status: u32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// Whether the remote command exited with status 0.
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }

    pub fn has_output(&self) -> bool {
        !self.stdout.trim().is_empty()
    }
}

impl From<CommandExecutedResult> for CommandResult {
    fn from(result: CommandExecutedResult) -> Self {
        Self {
            exit_status: result.exit_status,
            stdout: result.stdout,
            stderr: result.stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_executed_result() {
        let result: CommandResult = CommandExecutedResult {
            stdout: "EMCY 0x1000 3\n".to_string(),
            stderr: String::new(),
            exit_status: 0,
        }
        .into();

        assert!(result.is_success());
        assert!(result.has_output());
        assert_eq!(result.stdout, "EMCY 0x1000 3\n");
    }

    #[test]
    fn test_nonzero_exit_with_blank_output() {
        let result = CommandResult {
            exit_status: 127,
            stdout: "  \n".to_string(),
            stderr: "sh: foo: not found\n".to_string(),
        };

        assert!(!result.is_success());
        assert!(!result.has_output());
    }
}
