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

pub mod exec;
pub mod list;
pub mod logs;
pub mod overnight;

use std::sync::Arc;

use crate::config::{ConfigError, RunSettings};
use crate::device::{profile, DeviceFamily, FamilySelection};
use crate::executor::{
    CommandExecutor, ExecutionRequest, ExecutionResult, FleetDispatcher, SequenceRequest,
    SequenceResult,
};
use crate::hostlist::{Inventory, Machine};
use crate::node::Node;
use crate::report::AggregateReport;
use crate::ssh::{SessionConnector, SshConnector};

/// Resolved settings plus the machinery every fleet command dispatches with.
pub struct FleetContext {
    pub settings: RunSettings,
    pub executor: CommandExecutor,
    pub dispatcher: FleetDispatcher,
}

impl FleetContext {
    pub fn new(settings: RunSettings, connector: Arc<dyn SessionConnector>) -> Self {
        let dispatcher = FleetDispatcher::new(settings.parallel);
        Self {
            settings,
            executor: CommandExecutor::new(connector),
            dispatcher,
        }
    }

    /// Context talking to real hosts over SSH.
    pub fn over_ssh(settings: RunSettings) -> Self {
        let connector = SshConnector::new(settings.credentials.clone(), settings.server_check.clone());
        Self::new(settings, Arc::new(connector))
    }

    pub fn with_dispatcher(mut self, dispatcher: FleetDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub async fn run_commands(
        &self,
        nodes: Vec<Node>,
        request: ExecutionRequest,
    ) -> AggregateReport<ExecutionResult> {
        let request = Arc::new(request);
        let executor = self.executor.clone();
        self.dispatcher
            .dispatch_all(nodes, move |node| {
                let executor = executor.clone();
                let request = Arc::clone(&request);
                async move { executor.execute(&node, &request).await }
            })
            .await
    }

    pub async fn run_sequences(
        &self,
        nodes: Vec<Node>,
        request: SequenceRequest,
    ) -> AggregateReport<SequenceResult> {
        let executor = self.executor.clone();
        self.dispatcher
            .dispatch_all(nodes, move |node| {
                let executor = executor.clone();
                async move { executor.run_sequence(&node, &request).await }
            })
            .await
    }

    pub fn resolve_machine(&self, machine: &Machine) -> Result<Node, ConfigError> {
        Node::resolve(&machine.to_target(), &self.settings.node_defaults)
    }
}

/// Selected inventory machines of one automatable family.
pub(crate) struct FamilyGroup<'a> {
    pub family: DeviceFamily,
    pub machines: Vec<&'a Machine>,
}

pub(crate) fn group_by_family(inventory: &Inventory, selection: FamilySelection) -> Vec<FamilyGroup<'_>> {
    let selected = inventory.select(selection);
    [DeviceFamily::Ps1, DeviceFamily::Ps2]
        .into_iter()
        .filter(|family| selection.includes(*family))
        .map(|family| FamilyGroup {
            family,
            machines: selected
                .iter()
                .copied()
                .filter(|machine| machine.family() == family)
                .collect(),
        })
        .filter(|group| !group.machines.is_empty() && profile(group.family).is_some())
        .collect()
}
