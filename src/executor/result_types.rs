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

use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::node::Node;
use crate::ssh::client::CommandResult;

/// Common surface of per-node results so the dispatcher can handle any of them.
pub trait NodeOutcome: Send + 'static {
    fn node(&self) -> &Node;

    fn is_success(&self) -> bool;

    /// Result recorded when the task for `node` died before producing one.
    fn task_failed(node: Node, reason: String) -> Self;

    /// One line for the live progress output.
    fn status_line(&self) -> String;
}

/// Outcome of running one command on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    #[serde(flatten)]
    pub node: Node,
    /// The command ran to completion, whatever its exit status.
    pub succeeded: bool,
    pub exit_code: Option<u32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub attempts: u32,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_error: Option<String>,
}

impl ExecutionResult {
    pub fn completed(node: Node, output: CommandResult, attempts: u32) -> Self {
        Self {
            node,
            succeeded: true,
            exit_code: Some(output.exit_status),
            stdout: Some(output.stdout),
            stderr: Some(output.stderr),
            attempts,
            error: None,
            downloaded_file: None,
            download_error: None,
        }
    }

    pub fn failed(node: Node, attempts: u32, error: String) -> Self {
        Self {
            node,
            succeeded: false,
            exit_code: None,
            stdout: None,
            stderr: None,
            attempts,
            error: Some(error),
            downloaded_file: None,
            download_error: None,
        }
    }

    /// Trimmed stdout, `None` when the command printed nothing.
    pub fn output_text(&self) -> Option<&str> {
        self.stdout
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

impl NodeOutcome for ExecutionResult {
    fn node(&self) -> &Node {
        &self.node
    }

    fn is_success(&self) -> bool {
        self.succeeded
    }

    fn task_failed(node: Node, reason: String) -> Self {
        Self::failed(node, 0, reason)
    }

    fn status_line(&self) -> String {
        if !self.succeeded {
            return format!(
                "{} {}: {} {}",
                "●".red(),
                self.node.label().bold(),
                "FAIL".red(),
                self.error.as_deref().unwrap_or("unknown error").dimmed()
            );
        }

        let exit_code = self.exit_code.unwrap_or_default();
        let exit = if exit_code == 0 {
            format!("exit={exit_code}").green().to_string()
        } else {
            format!("exit={exit_code}").yellow().to_string()
        };
        let mut line = format!("{} {}: {} {}", "●".green(), self.node.label().bold(), "OK".green(), exit);
        if self.attempts > 1 {
            line.push_str(&format!(" (attempt {})", self.attempts));
        }
        if let Some(path) = &self.downloaded_file {
            line.push_str(&format!(" downloaded {}", path.display()));
        }
        if let Some(error) = &self.download_error {
            line.push_str(&format!(" {}", format!("download failed: {error}").yellow()));
        }
        line
    }
}

/// Outcome of typing one key sequence on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceResult {
    #[serde(flatten)]
    pub node: Node,
    pub action: String,
    pub succeeded: bool,
    pub attempts: u32,
    pub error: Option<String>,
}

impl NodeOutcome for SequenceResult {
    fn node(&self) -> &Node {
        &self.node
    }

    fn is_success(&self) -> bool {
        self.succeeded
    }

    fn task_failed(node: Node, reason: String) -> Self {
        Self {
            node,
            action: String::new(),
            succeeded: false,
            attempts: 0,
            error: Some(reason),
        }
    }

    fn status_line(&self) -> String {
        match &self.error {
            None => format!(
                "{} {}: {} {}",
                "●".green(),
                self.node.label().bold(),
                "OK".green(),
                format!("{} sequence sent", self.action).dimmed()
            ),
            Some(error) => format!(
                "{} {}: {} {}",
                "●".red(),
                self.node.label().bold(),
                "FAIL".red(),
                error.dimmed()
            ),
        }
    }
}
