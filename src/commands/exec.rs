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

use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

use super::FleetContext;
use crate::config::ConfigError;
use crate::executor::{ExecutionRequest, ExecutionResult};
use crate::hostlist::load_targets;
use crate::node::Node;
use crate::report::AggregateReport;
use crate::schedule::{parse_start_time, wait_until};
use crate::ui::OutputFormatter;

/// Command used to run a piped script when no command is given.
pub const DEFAULT_SCRIPT_SHELL: &str = "sh -s";

pub const REPORT_FILE_NAME: &str = "aggregate_results.json";

pub struct ExecuteCommandParams {
    pub command: Vec<String>,
    pub script: Option<PathBuf>,
    pub download: Option<String>,
    pub at: Option<String>,
}

pub async fn execute_command(
    ctx: &FleetContext,
    params: ExecuteCommandParams,
) -> Result<AggregateReport<ExecutionResult>> {
    // Everything that can be wrong locally is checked before any host is contacted.
    let start_at = params.at.as_deref().map(parse_start_time).transpose()?;
    let targets = load_targets(&ctx.settings.hosts_file)
        .await
        .map_err(ConfigError::from)?;
    let nodes = Node::resolve_all(&targets, &ctx.settings.node_defaults)?;
    let script = match &params.script {
        Some(path) => Some(read_script(path).await?),
        None => None,
    };
    let command = match (params.command.is_empty(), &script) {
        (true, Some(_)) => DEFAULT_SCRIPT_SHELL.to_string(),
        _ => params.command.join(" "),
    };

    if nodes.is_empty() {
        tracing::warn!("No hosts found in {:?}", ctx.settings.hosts_file);
        println!("{} No hosts to run on", "⚠".yellow());
        let report: AggregateReport<ExecutionResult> = AggregateReport::new();
        report
            .write_json(&ctx.settings.report_path(REPORT_FILE_NAME))
            .await?;
        return Ok(report);
    }

    if let Some(start) = start_at {
        wait_until(start).await;
    }

    println!(
        "{}",
        OutputFormatter::format_header(&format!("Executing '{}' on {} host(s)", command, nodes.len()))
    );

    let request = ExecutionRequest::new(command, &ctx.settings)
        .with_script(script)
        .with_download(params.download);
    let report = ctx.run_commands(nodes, request).await;

    report
        .write_json(&ctx.settings.report_path(REPORT_FILE_NAME))
        .await?;
    println!("{}", OutputFormatter::format_summary(report.succeeded(), report.failed()));

    Ok(report)
}

async fn read_script(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::ScriptFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
