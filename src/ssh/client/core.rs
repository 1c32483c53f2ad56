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

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::result::CommandResult;
use crate::node::Node;
use crate::ssh::credentials::Credentials;
use crate::ssh::sequence::KeySequence;
use crate::ssh::session::{RemoteSession, SessionConnector, SessionError};
use crate::ssh::tokio_client::{self, Client, ServerCheckMethod};

/// Opens `russh` sessions with the run's credentials.
#[derive(Debug, Clone)]
pub struct SshConnector {
    credentials: Arc<Credentials>,
    server_check: ServerCheckMethod,
}

impl SshConnector {
    pub fn new(credentials: Credentials, server_check: ServerCheckMethod) -> Self {
        Self {
            credentials: Arc::new(credentials),
            server_check,
        }
    }
}

#[async_trait]
impl SessionConnector for SshConnector {
    async fn connect(
        &self,
        node: &Node,
        connect_timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, SessionError> {
        let auth_methods = self.credentials.auth_methods();
        tracing::debug!(
            "Connecting to {}:{} as {} ({} auth method(s))",
            node.host,
            node.port,
            node.username,
            auth_methods.len()
        );

        let connect = Client::connect(
            &node.host,
            node.port,
            &node.username,
            &auth_methods,
            self.server_check.clone(),
        );

        match tokio::time::timeout(connect_timeout, connect).await {
            Ok(Ok(client)) => Ok(Box::new(SshSession::new(node.host.clone(), client))),
            Ok(Err(e)) => Err(classify_connect_error(node, e)),
            Err(_) => Err(SessionError::Timeout {
                operation: "connect",
                after: connect_timeout,
            }),
        }
    }
}

fn classify_connect_error(node: &Node, error: tokio_client::Error) -> SessionError {
    if error.is_auth_failure() {
        SessionError::Authentication {
            host: node.host.clone(),
            username: node.username.clone(),
            reason: error.to_string(),
        }
    } else {
        SessionError::Connection {
            host: node.host.clone(),
            reason: error.to_string(),
        }
    }
}

/// A connected and authenticated SSH session to one host.
#[derive(Debug)]
pub struct SshSession {
    host: String,
    client: Client,
    closed: bool,
}

impl SshSession {
    pub fn new(host: String, client: Client) -> Self {
        Self {
            host,
            client,
            closed: false,
        }
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn run_command(
        &mut self,
        command: &str,
        stdin: Option<&str>,
        timeout: Duration,
    ) -> Result<CommandResult, SessionError> {
        tracing::debug!("Executing command on {}: {}", self.host, command);

        let execution = self.client.execute(command, stdin.map(str::as_bytes));
        match tokio::time::timeout(timeout, execution).await {
            Ok(Ok(result)) => {
                tracing::debug!(
                    "Command on {} finished with exit status {}",
                    self.host,
                    result.exit_status
                );
                Ok(result.into())
            }
            Ok(Err(e)) => Err(SessionError::Channel(e.to_string())),
            Err(_) => Err(SessionError::Timeout {
                operation: "command",
                after: timeout,
            }),
        }
    }

    async fn interactive_sequence(&mut self, sequence: &KeySequence) -> Result<(), SessionError> {
        tracing::debug!(
            "Sending {} sequence ({} steps, ~{:?}) to {}",
            sequence.label,
            sequence.steps.len(),
            sequence.delays.total_for(sequence.steps.len()),
            self.host
        );
        self.client
            .send_keystrokes(sequence)
            .await
            .map_err(|e| SessionError::Channel(e.to_string()))
    }

    async fn download_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<u64, SessionError> {
        tracing::debug!(
            "Downloading {}:{} to {:?}",
            self.host,
            remote_path,
            local_path
        );
        self.client
            .download_file(remote_path, local_path)
            .await
            .map_err(|e| SessionError::Transfer(format!("{remote_path}: {e}")))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.client.is_closed() {
            return;
        }
        if let Err(e) = self.client.disconnect().await {
            tracing::debug!("Disconnect from {} reported: {}", self.host, e);
        }
    }
}
