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

//! Seams between the executor and concrete SSH sessions.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::client::CommandResult;
use super::sequence::KeySequence;
use crate::node::Node;

/// Per-host failure of one session operation.
///
/// These are captured into results and never abort a dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    #[error("Authentication failed for {username}@{host}: {reason}")]
    Authentication {
        host: String,
        username: String,
        reason: String,
    },

    #[error("{operation} timed out after {}s", after.as_secs_f64())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("File transfer failed: {0}")]
    Transfer(String),
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}

/// Opens authenticated sessions to nodes.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(
        &self,
        node: &Node,
        connect_timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, SessionError>;
}

/// One live connection to one host.
///
/// Callers must invoke [`RemoteSession::close`] once they are done, whatever
/// the outcome of the operations before it.
#[async_trait]
pub trait RemoteSession: Send {
    async fn run_command(
        &mut self,
        command: &str,
        stdin: Option<&str>,
        timeout: Duration,
    ) -> Result<CommandResult, SessionError>;

    async fn interactive_sequence(&mut self, sequence: &KeySequence) -> Result<(), SessionError>;

    async fn download_file(&mut self, remote_path: &str, local_path: &Path)
        -> Result<u64, SessionError>;

    async fn close(&mut self);
}
