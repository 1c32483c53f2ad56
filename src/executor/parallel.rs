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

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::result_types::NodeOutcome;
use crate::node::Node;
use crate::report::AggregateReport;

const PROGRESS_BAR_TICK_RATE_MS: u64 = 120;

fn create_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:.bold} {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ ").progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Runs one job per node with a bounded number in flight.
#[derive(Debug, Clone, Copy)]
pub struct FleetDispatcher {
    max_parallel: usize,
    show_progress: bool,
}

impl FleetDispatcher {
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
            show_progress: true,
        }
    }

    /// Suppress the progress bar and per-node status lines.
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Spawn a task per node and collect results as they complete.
    ///
    /// All tasks are spawned up front and wait on the semaphore, so at most
    /// `max_parallel` jobs run at once. The report holds exactly one result
    /// per node, in completion order; a task that panics is recorded as a
    /// failed result for its node.
    pub async fn dispatch_all<R, F, Fut>(&self, nodes: Vec<Node>, job: F) -> AggregateReport<R>
    where
        R: NodeOutcome,
        F: Fn(Node) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let progress = self.create_progress_bar(nodes.len());
        tracing::info!(
            "Dispatching to {} node(s), {} at a time",
            nodes.len(),
            self.max_parallel
        );

        let mut pending: FuturesUnordered<_> = nodes
            .into_iter()
            .map(|node| {
                let semaphore = Arc::clone(&semaphore);
                let task_node = node.clone();
                let work = job(node.clone());

                let handle = tokio::spawn(async move {
                    match semaphore.acquire_owned().await {
                        Ok(_permit) => work.await,
                        Err(e) => {
                            R::task_failed(task_node, format!("Semaphore acquisition failed: {e}"))
                        }
                    }
                });

                async move { (node, handle.await) }
            })
            .collect();

        let mut report = AggregateReport::new();
        while let Some((node, joined)) = pending.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Task for {} failed: {}", node, e);
                    R::task_failed(node, format!("Task execution failed: {e}"))
                }
            };

            if self.show_progress {
                let line = result.status_line();
                progress.suspend(|| println!("{line}"));
                progress.set_message(result.node().label());
            }
            progress.inc(1);
            report.push(result);
        }

        progress.finish_and_clear();
        report
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        pb.set_style(create_progress_style());
        pb.set_prefix("psfleet");
        pb.enable_steady_tick(std::time::Duration::from_millis(PROGRESS_BAR_TICK_RATE_MS));
        pb
    }
}
