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

mod common;

use common::{node, FakeConnector, HostPlan};
use psfleet::executor::{ExecutionRequest, RetryPolicy, SequenceRequest};
use psfleet::ssh::{DelayPolicy, KeySequence, Step};
use psfleet::CommandExecutor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn request(output_dir: &Path, max_attempts: u32) -> ExecutionRequest {
    ExecutionRequest {
        command: "uptime".to_string(),
        script: None,
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        retry: RetryPolicy::new(max_attempts, Duration::ZERO),
        download: None,
        output_dir: output_dir.to_path_buf(),
    }
}

fn executor(connector: FakeConnector) -> (CommandExecutor, Arc<common::Counters>) {
    let counters = Arc::clone(&connector.counters);
    (CommandExecutor::new(Arc::new(connector)), counters)
}

#[tokio::test]
async fn test_successful_run_saves_outputs() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        stdout: "up 3 days\n".to_string(),
        stderr: "warning\n".to_string(),
        ..HostPlan::default()
    }));

    let result = executor
        .execute(&node("10.0.0.5"), &request(dir.path(), 3))
        .await;

    assert!(result.succeeded);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.stdout.as_deref(), Some("up 3 days\n"));
    assert!(result.error.is_none());

    let stdout = std::fs::read_to_string(dir.path().join("10.0.0.5_stdout.txt")).unwrap();
    let stderr = std::fs::read_to_string(dir.path().join("10.0.0.5_stderr.txt")).unwrap();
    assert_eq!(stdout, "up 3 days\n");
    assert_eq!(stderr, "warning\n");

    assert_eq!(counters.opened(), 1);
    assert_eq!(counters.closed(), 1);
}

#[tokio::test]
async fn test_nonzero_exit_still_counts_as_completed() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        exit_status: 3,
        ..HostPlan::default()
    }));

    let result = executor.execute(&node("web1"), &request(dir.path(), 2)).await;

    assert!(result.succeeded);
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.attempts, 1);
    assert_eq!(counters.connects_to("web1"), 1);
}

#[tokio::test]
async fn test_success_on_later_attempt_reports_attempt_count() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        connect_failures: 2,
        ..HostPlan::default()
    }));

    let result = executor.execute(&node("flaky"), &request(dir.path(), 3)).await;

    assert!(result.succeeded);
    assert_eq!(result.attempts, 3);
    assert_eq!(counters.connects_to("flaky"), 3);
    assert_eq!(counters.opened(), 1);
    assert_eq!(counters.closed(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_leave_no_output() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        connect_failures: u32::MAX,
        ..HostPlan::default()
    }));

    let result = executor.execute(&node("down"), &request(dir.path(), 3)).await;

    assert!(!result.succeeded);
    assert_eq!(result.attempts, 3);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.stdout, None);
    assert_eq!(result.stderr, None);
    assert!(result.error.as_deref().unwrap().contains("connection refused"));
    assert_eq!(counters.connects_to("down"), 3);
    assert!(!dir.path().join("down_stdout.txt").exists());
}

#[tokio::test]
async fn test_session_closed_after_each_timed_out_attempt() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        command_timeouts: 1,
        ..HostPlan::default()
    }));

    let result = executor.execute(&node("slow"), &request(dir.path(), 2)).await;

    assert!(result.succeeded);
    assert_eq!(result.attempts, 2);
    assert_eq!(counters.opened(), 2);
    assert_eq!(counters.closed(), 2);
}

#[tokio::test]
async fn test_timeout_on_every_attempt_is_reported() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        command_timeouts: u32::MAX,
        ..HostPlan::default()
    }));

    let result = executor.execute(&node("stuck"), &request(dir.path(), 2)).await;

    assert!(!result.succeeded);
    assert_eq!(result.attempts, 2);
    assert!(result.error.as_deref().unwrap().contains("timed out"));
    assert_eq!(counters.opened(), counters.closed());
}

#[tokio::test]
async fn test_download_lands_next_to_outputs() {
    let dir = TempDir::new().unwrap();
    let (executor, _) = executor(FakeConnector::new().with_default(HostPlan {
        download_content: b"2025-11-20 error\n".to_vec(),
        ..HostPlan::default()
    }));
    let mut req = request(dir.path(), 1);
    req.download = Some("/var/log/console.log".to_string());

    let result = executor.execute(&node("ps-07.lan"), &req).await;

    let expected = dir.path().join("ps-07.lan_console.log");
    assert!(result.succeeded);
    assert_eq!(result.downloaded_file.as_deref(), Some(expected.as_path()));
    assert_eq!(std::fs::read(&expected).unwrap(), b"2025-11-20 error\n");
    assert!(result.download_error.is_none());
}

#[tokio::test]
async fn test_failed_download_is_not_retried_and_keeps_success() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        download_error: Some("no such file".to_string()),
        ..HostPlan::default()
    }));
    let mut req = request(dir.path(), 3);
    req.download = Some("/missing.log".to_string());

    let result = executor.execute(&node("web2"), &req).await;

    assert!(result.succeeded);
    assert_eq!(result.attempts, 1);
    assert!(result.downloaded_file.is_none());
    assert!(result.download_error.as_deref().unwrap().contains("no such file"));
    assert_eq!(counters.connects_to("web2"), 1);
}

#[tokio::test]
async fn test_script_is_piped_to_stdin() {
    let dir = TempDir::new().unwrap();
    let (executor, counters) = executor(FakeConnector::new());
    let mut req = request(dir.path(), 1);
    req.command = "sh -s".to_string();
    req.script = Some("echo hello\n".to_string());

    executor.execute(&node("web3"), &req).await;

    let stdin = counters.stdin.lock().unwrap().clone();
    assert_eq!(stdin, vec![Some("echo hello\n".to_string())]);
    assert_eq!(counters.commands()[0].1, "sh -s");
}

const STEPS: &[Step] = &[Step::Line("screen -x"), Step::Line("16")];
const NO_DELAYS: DelayPolicy = DelayPolicy {
    shell_settle: Duration::ZERO,
    attach: Duration::ZERO,
    per_step: Duration::ZERO,
};
const SEQUENCE: KeySequence = KeySequence::new("start", STEPS, NO_DELAYS);

fn sequence_request(max_attempts: u32) -> SequenceRequest {
    SequenceRequest {
        sequence: SEQUENCE,
        connect_timeout: Duration::from_secs(1),
        retry: RetryPolicy::new(max_attempts, Duration::ZERO),
    }
}

#[tokio::test]
async fn test_sequence_runs_through_same_retry() {
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        connect_failures: 1,
        ..HostPlan::default()
    }));

    let result = executor.run_sequence(&node("PS0001"), &sequence_request(2)).await;

    assert!(result.succeeded);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.action, "start");
    assert_eq!(counters.sequences(), vec![("PS0001".to_string(), "start", 2)]);
    assert_eq!(counters.opened(), counters.closed());
}

#[tokio::test]
async fn test_sequence_failure_after_exhaustion() {
    let (executor, counters) = executor(FakeConnector::new().with_default(HostPlan {
        connect_failures: u32::MAX,
        ..HostPlan::default()
    }));

    let result = executor.run_sequence(&node("PS0002"), &sequence_request(2)).await;

    assert!(!result.succeeded);
    assert_eq!(result.attempts, 2);
    assert!(result.error.is_some());
    assert!(counters.sequences().is_empty());
}
