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

use std::path::PathBuf;
use std::time::Duration;

use super::retry::RetryPolicy;
use crate::config::RunSettings;
use crate::ssh::sequence::KeySequence;

/// A command to run on every node of one dispatch.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub command: String,
    /// Text written to the command's stdin, followed by end-of-input.
    pub script: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
    /// Remote path fetched over SFTP after the command completes.
    pub download: Option<String>,
    pub output_dir: PathBuf,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>, settings: &RunSettings) -> Self {
        Self {
            command: command.into(),
            script: None,
            timeout: settings.timeout,
            connect_timeout: settings.connect_timeout,
            retry: settings.retry,
            download: None,
            output_dir: settings.output_dir.clone(),
        }
    }

    pub fn with_script(mut self, script: Option<String>) -> Self {
        self.script = script;
        self
    }

    pub fn with_download(mut self, remote_path: Option<String>) -> Self {
        self.download = remote_path.filter(|path| !path.trim().is_empty());
        self
    }
}

/// A key sequence to type on every node of one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct SequenceRequest {
    pub sequence: KeySequence,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl SequenceRequest {
    pub fn new(sequence: KeySequence, settings: &RunSettings) -> Self {
        Self {
            sequence,
            connect_timeout: settings.connect_timeout,
            retry: settings.retry,
        }
    }
}
