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

//! Aggregate results of one dispatch and persist them.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;

use crate::executor::NodeOutcome;

/// All results of one dispatch, in the order they completed.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport<R> {
    pub generated_at: DateTime<Local>,
    succeeded: usize,
    failed: usize,
    results: Vec<R>,
}

impl<R: NodeOutcome> AggregateReport<R> {
    pub fn new() -> Self {
        Self {
            generated_at: Local::now(),
            succeeded: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: R) {
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[R] {
        &self.results
    }

    /// Append the results of another dispatch, keeping their order.
    pub fn merge(&mut self, other: Self) {
        for result in other.results {
            self.push(result);
        }
    }

    /// `"<n> succeeded, <m> failed"`.
    pub fn summary_line(&self) -> String {
        format!("{} succeeded, {} failed", self.succeeded, self.failed)
    }
}

impl<R: NodeOutcome> Default for AggregateReport<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: NodeOutcome> FromIterator<R> for AggregateReport<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut report = Self::new();
        for result in iter {
            report.push(result);
        }
        report
    }
}

impl<R: NodeOutcome + Serialize> AggregateReport<R> {
    /// Write the report as pretty JSON, creating parent directories.
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        write_json(self, path).await
    }
}

/// Serialize any report value as pretty JSON at `path`.
pub async fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create report directory: {parent:?}"))?;
    }

    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report: {path:?}"))?;

    tracing::info!("Wrote report to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutionResult;
    use crate::node::Node;
    use crate::ssh::client::CommandResult;
    use tempfile::TempDir;

    fn node(host: &str) -> Node {
        Node::new(host.to_string(), 22, "ops".to_string())
    }

    fn sample() -> AggregateReport<ExecutionResult> {
        let ok = ExecutionResult::completed(
            node("10.0.0.1"),
            CommandResult {
                exit_status: 1,
                stdout: String::new(),
                stderr: "oops".to_string(),
            },
            1,
        );
        let failed = ExecutionResult::failed(node("10.0.0.2"), 2, "Connection refused".to_string());
        vec![ok, failed].into_iter().collect()
    }

    #[test]
    fn test_counts_and_summary() {
        let report = sample();
        assert_eq!(report.len(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.summary_line(), "1 succeeded, 1 failed");
    }

    #[test]
    fn test_merge_keeps_order_and_counts() {
        let mut report = sample();
        let more: AggregateReport<ExecutionResult> =
            vec![ExecutionResult::failed(node("10.0.0.3"), 1, "refused".to_string())]
                .into_iter()
                .collect();
        report.merge(more);
        assert_eq!(report.len(), 3);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.results()[2].node.host, "10.0.0.3");
    }

    #[test]
    fn test_empty_report() {
        let report: AggregateReport<ExecutionResult> = AggregateReport::new();
        assert!(report.is_empty());
        assert_eq!(report.summary_line(), "0 succeeded, 0 failed");
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("aggregate_results.json");
        sample().write_json(&path).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["results"].as_array().unwrap().len(), 2);
        assert_eq!(json["results"][1]["error"], "Connection refused");
        assert!(json["generated_at"].is_string());
    }
}
