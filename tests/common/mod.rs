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

//! In-memory sessions for exercising the executor without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use psfleet::node::Node;
use psfleet::ssh::{CommandResult, KeySequence, RemoteSession, SessionConnector, SessionError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a fake host behaves.
#[derive(Debug, Clone)]
pub struct HostPlan {
    /// The first N connection attempts are refused.
    pub connect_failures: u32,
    /// The first N commands time out after the session was opened.
    pub command_timeouts: u32,
    pub command_delay: Duration,
    pub exit_status: u32,
    pub stdout: String,
    pub stderr: String,
    /// `Some(reason)` makes every download fail.
    pub download_error: Option<String>,
    pub download_content: Vec<u8>,
    pub panic_on_connect: bool,
}

impl Default for HostPlan {
    fn default() -> Self {
        Self {
            connect_failures: 0,
            command_timeouts: 0,
            command_delay: Duration::ZERO,
            exit_status: 0,
            stdout: "ok\n".to_string(),
            stderr: String::new(),
            download_error: None,
            download_content: b"remote file\n".to_vec(),
            panic_on_connect: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub connects: Mutex<HashMap<String, u32>>,
    pub commands_run: Mutex<HashMap<String, u32>>,
    pub commands: Mutex<Vec<(String, String)>>,
    pub stdin: Mutex<Vec<Option<String>>>,
    pub sequences: Mutex<Vec<(String, &'static str, usize)>>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn connects_to(&self, host: &str) -> u32 {
        self.connects
            .lock()
            .unwrap()
            .get(host)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_connects(&self) -> u32 {
        self.connects.lock().unwrap().values().sum()
    }

    pub fn commands(&self) -> Vec<(String, String)> {
        self.commands.lock().unwrap().clone()
    }

    pub fn sequences(&self) -> Vec<(String, &'static str, usize)> {
        self.sequences.lock().unwrap().clone()
    }
}

#[derive(Debug, Default)]
pub struct FakeConnector {
    plans: HashMap<String, HostPlan>,
    default_plan: HostPlan,
    pub counters: Arc<Counters>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, plan: HostPlan) -> Self {
        self.default_plan = plan;
        self
    }

    pub fn with_plan(mut self, host: &str, plan: HostPlan) -> Self {
        self.plans.insert(host.to_string(), plan);
        self
    }

    fn plan_for(&self, host: &str) -> HostPlan {
        self.plans
            .get(host)
            .cloned()
            .unwrap_or_else(|| self.default_plan.clone())
    }
}

#[async_trait]
impl SessionConnector for FakeConnector {
    async fn connect(
        &self,
        node: &Node,
        _connect_timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, SessionError> {
        let plan = self.plan_for(&node.host);
        if plan.panic_on_connect {
            panic!("simulated crash while connecting to {}", node.host);
        }

        let attempt = {
            let mut connects = self.counters.connects.lock().unwrap();
            let count = connects.entry(node.host.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if attempt <= plan.connect_failures {
            return Err(SessionError::Connection {
                host: node.host.clone(),
                reason: "connection refused".to_string(),
            });
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(FakeSession {
            host: node.host.clone(),
            plan,
            counters: Arc::clone(&self.counters),
            closed: false,
        }))
    }
}

struct FakeSession {
    host: String,
    plan: HostPlan,
    counters: Arc<Counters>,
    closed: bool,
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn run_command(
        &mut self,
        command: &str,
        stdin: Option<&str>,
        timeout: Duration,
    ) -> Result<CommandResult, SessionError> {
        self.counters
            .commands
            .lock()
            .unwrap()
            .push((self.host.clone(), command.to_string()));
        self.counters
            .stdin
            .lock()
            .unwrap()
            .push(stdin.map(str::to_string));

        let run = {
            let mut runs = self.counters.commands_run.lock().unwrap();
            let count = runs.entry(self.host.clone()).or_insert(0);
            *count += 1;
            *count
        };

        tokio::time::sleep(self.plan.command_delay).await;

        if run <= self.plan.command_timeouts {
            return Err(SessionError::Timeout {
                operation: "command",
                after: timeout,
            });
        }

        Ok(CommandResult {
            exit_status: self.plan.exit_status,
            stdout: self.plan.stdout.clone(),
            stderr: self.plan.stderr.clone(),
        })
    }

    async fn interactive_sequence(&mut self, sequence: &KeySequence) -> Result<(), SessionError> {
        tokio::time::sleep(self.plan.command_delay).await;
        self.counters.sequences.lock().unwrap().push((
            self.host.clone(),
            sequence.label,
            sequence.steps.len(),
        ));
        Ok(())
    }

    async fn download_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<u64, SessionError> {
        if let Some(reason) = &self.plan.download_error {
            return Err(SessionError::Transfer(format!("{remote_path}: {reason}")));
        }
        tokio::fs::write(local_path, &self.plan.download_content)
            .await
            .map_err(|e| SessionError::Transfer(e.to_string()))?;
        Ok(self.plan.download_content.len() as u64)
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

pub fn node(host: &str) -> Node {
    Node::new(host.to_string(), 22, "ops".to_string())
}
