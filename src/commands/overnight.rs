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

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use super::logs::{collect_logs, resolve_cutoff};
use super::{group_by_family, FleetContext};
use crate::device::{profile, FamilyProfile, FamilySelection};
use crate::executor::{ExecutionResult, SequenceRequest, SequenceResult};
use crate::hostlist::Inventory;
use crate::logs::Cutoff;
use crate::report::{write_json, AggregateReport};
use crate::schedule::{parse_hours, parse_start_time, wait_until};
use crate::ssh::sequence::KeySequence;
use crate::ui::OutputFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestAction {
    Start,
    Stop,
}

impl TestAction {
    pub fn verb(&self) -> &'static str {
        match self {
            TestAction::Start => "start",
            TestAction::Stop => "stop",
        }
    }

    fn sequence(&self, profile: &FamilyProfile) -> Option<KeySequence> {
        match self {
            TestAction::Start => profile.start,
            TestAction::Stop => profile.stop,
        }
    }

    fn report_name(&self) -> &'static str {
        match self {
            TestAction::Start => "start_results.json",
            TestAction::Stop => "stop_results.json",
        }
    }
}

/// Type the start or stop sequence on every selected machine that has one.
///
/// Machines of families without remote automation get a notice instead.
pub async fn run_test_action(
    ctx: &FleetContext,
    inventory: &Inventory,
    selection: FamilySelection,
    action: TestAction,
) -> Result<AggregateReport<SequenceResult>> {
    let mut batches = Vec::new();
    for group in group_by_family(inventory, selection) {
        let sequence = profile(group.family).and_then(|p| action.sequence(p));
        match sequence {
            Some(sequence) => {
                let nodes = group
                    .machines
                    .iter()
                    .map(|machine| ctx.resolve_machine(machine))
                    .collect::<Result<Vec<_>, _>>()?;
                batches.push((group.family, sequence, nodes));
            }
            None => {
                for machine in &group.machines {
                    tracing::warn!("{} {}: no remote {} sequence", group.family, machine.name, action.verb());
                    let notice = OutputFormatter::format_manual_notice(
                        machine,
                        action.verb(),
                        &format!("{} it", action.verb()),
                    );
                    println!("{notice}");
                }
            }
        }
    }

    let mut report = AggregateReport::new();
    for (family, sequence, nodes) in batches {
        println!(
            "{}",
            OutputFormatter::format_header(&format!(
                "{} overnight testing on {} {} machine(s)",
                capitalize(action.verb()),
                nodes.len(),
                family
            ))
        );
        report.merge(ctx.run_sequences(nodes, SequenceRequest::new(sequence, &ctx.settings)).await);
    }

    println!("{}", OutputFormatter::format_summary(report.succeeded(), report.failed()));
    Ok(report)
}

/// Run a start or stop action and write its report.
pub async fn start_or_stop(
    ctx: &FleetContext,
    inventory: &Inventory,
    selection: FamilySelection,
    action: TestAction,
) -> Result<AggregateReport<SequenceResult>> {
    let report = run_test_action(ctx, inventory, selection, action).await?;
    report
        .write_json(&ctx.settings.report_path(action.report_name()))
        .await?;
    Ok(report)
}

#[derive(Debug, Serialize)]
pub struct OvernightReport {
    pub start: AggregateReport<SequenceResult>,
    pub stop: AggregateReport<SequenceResult>,
    pub logs: AggregateReport<ExecutionResult>,
}

pub struct OvernightParams {
    pub selection: FamilySelection,
    pub hours: f64,
    pub since: Option<String>,
    pub at: Option<String>,
}

/// Start testing, let it run, stop it, then collect the logs.
pub async fn run_overnight(
    ctx: &FleetContext,
    inventory: &Inventory,
    params: OvernightParams,
) -> Result<OvernightReport> {
    let test_duration = parse_hours(params.hours)?;
    let cutoff = resolve_cutoff(params.since.as_deref(), inventory)?;
    let start_at = params.at.as_deref().map(parse_start_time).transpose()?;

    if params.since.is_some() {
        record_cutoff(inventory, &cutoff, &ctx.settings.hosts_file).await?;
    }

    if let Some(start) = start_at {
        wait_until(start).await;
    }

    let start = run_test_action(ctx, inventory, params.selection, TestAction::Start).await?;

    wait_for_test(test_duration).await;

    let stop = run_test_action(ctx, inventory, params.selection, TestAction::Stop).await?;
    let logs = collect_logs(ctx, inventory, params.selection, &cutoff).await?;

    let report = OvernightReport { start, stop, logs };
    write_json(&report, &ctx.settings.report_path("overnight_results.json")).await?;
    Ok(report)
}

/// Store an explicit cutoff as the inventory's `SINCE=` header.
async fn record_cutoff(inventory: &Inventory, cutoff: &Cutoff, path: &Path) -> Result<()> {
    if inventory.since.as_deref() == Some(cutoff.as_str()) {
        return Ok(());
    }

    let mut updated = inventory.clone();
    updated.since = Some(cutoff.to_string());
    updated
        .write(path)
        .await
        .with_context(|| format!("Failed to record SINCE in {path:?}"))?;

    tracing::info!("Recorded SINCE={} in {:?}", cutoff, path);
    println!("{} Recorded SINCE={} in {}", "📝".cyan(), cutoff, path.display());
    Ok(())
}

async fn wait_for_test(duration: Duration) {
    let hours = duration.as_secs_f64() / 3600.0;
    println!(
        "\n{} Overnight testing running, waiting {:.2} hour(s) ({} seconds)",
        "⏳".cyan(),
        hours,
        duration.as_secs()
    );
    tracing::info!("Waiting {:?} before stopping tests", duration);
    tokio::time::sleep(duration).await;
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
