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

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::request::{ExecutionRequest, SequenceRequest};
use super::result_types::{ExecutionResult, SequenceResult};
use crate::node::Node;
use crate::ssh::client::CommandResult;
use crate::ssh::session::{RemoteSession, SessionConnector, SessionError};
use crate::utils::{download_path, save_host_outputs};

/// What one successful attempt produced before the session was closed.
struct CompletedRun {
    output: CommandResult,
    download: Option<Result<PathBuf, SessionError>>,
}

/// Runs one request against one node, with retries.
///
/// Every attempt opens a fresh session and closes it before the next attempt
/// starts, whatever happened in between.
#[derive(Clone)]
pub struct CommandExecutor {
    connector: Arc<dyn SessionConnector>,
}

impl CommandExecutor {
    pub fn new(connector: Arc<dyn SessionConnector>) -> Self {
        Self { connector }
    }

    /// Never fails: errors end up in the returned result.
    pub async fn execute(&self, node: &Node, request: &ExecutionRequest) -> ExecutionResult {
        let label = node.to_string();
        let attempted = request
            .retry
            .run(&label, |attempt| self.command_attempt(node, request, attempt))
            .await;

        let run = match attempted.outcome {
            Ok(run) => run,
            Err(e) => return ExecutionResult::failed(node.clone(), attempted.attempts, e.to_string()),
        };

        if let Err(e) = save_host_outputs(&request.output_dir, &node.host, &run.output).await {
            tracing::warn!("{}: could not save command output: {:#}", label, e);
        }

        let mut result = ExecutionResult::completed(node.clone(), run.output, attempted.attempts);
        match run.download {
            Some(Ok(path)) => result.downloaded_file = Some(path),
            Some(Err(e)) => {
                tracing::warn!("{}: {}", label, e);
                result.download_error = Some(e.to_string());
            }
            None => {}
        }
        result
    }

    async fn command_attempt(
        &self,
        node: &Node,
        request: &ExecutionRequest,
        attempt: u32,
    ) -> Result<CompletedRun, SessionError> {
        tracing::debug!(
            "{}: attempt {} of {}",
            node,
            attempt,
            request.retry.max_attempts()
        );
        let mut session = self.connector.connect(node, request.connect_timeout).await?;
        let outcome = run_on_session(session.as_mut(), node, request).await;
        session.close().await;
        outcome
    }

    /// Type a key sequence on one node, retrying like commands do.
    pub async fn run_sequence(&self, node: &Node, request: &SequenceRequest) -> SequenceResult {
        let label = format!("{} {}", node, request.sequence.label);
        let attempted = request
            .retry
            .run(&label, |_| self.sequence_attempt(node, request))
            .await;

        SequenceResult {
            node: node.clone(),
            action: request.sequence.label.to_string(),
            succeeded: attempted.outcome.is_ok(),
            attempts: attempted.attempts,
            error: attempted.outcome.err().map(|e| e.to_string()),
        }
    }

    async fn sequence_attempt(
        &self,
        node: &Node,
        request: &SequenceRequest,
    ) -> Result<(), SessionError> {
        let mut session = self.connector.connect(node, request.connect_timeout).await?;
        let outcome = session.interactive_sequence(&request.sequence).await;
        session.close().await;
        outcome
    }
}

async fn run_on_session(
    session: &mut dyn RemoteSession,
    node: &Node,
    request: &ExecutionRequest,
) -> Result<CompletedRun, SessionError> {
    let output = session
        .run_command(&request.command, request.script.as_deref(), request.timeout)
        .await?;

    let download = match &request.download {
        Some(remote_path) => {
            Some(fetch_file(session, &node.host, remote_path, &request.output_dir).await)
        }
        None => None,
    };

    Ok(CompletedRun { output, download })
}

/// Download failures are reported, never retried.
async fn fetch_file(
    session: &mut dyn RemoteSession,
    host: &str,
    remote_path: &str,
    output_dir: &Path,
) -> Result<PathBuf, SessionError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| SessionError::Transfer(format!("cannot create {output_dir:?}: {e}")))?;

    let local_path = download_path(output_dir, host, remote_path);
    let bytes = session.download_file(remote_path, &local_path).await?;
    tracing::debug!("Downloaded {} bytes from {}:{}", bytes, host, remote_path);
    Ok(local_path)
}
