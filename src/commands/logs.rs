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

use super::{group_by_family, FleetContext};
use crate::config::ConfigError;
use crate::device::{profile, FamilySelection};
use crate::executor::{ExecutionRequest, ExecutionResult};
use crate::hostlist::{Inventory, Machine};
use crate::logs::{render_log_command, Cutoff};
use crate::report::AggregateReport;
use crate::ui::OutputFormatter;

pub const REPORT_FILE_NAME: &str = "logs_results.json";

/// Cutoff from `--since`, else the inventory's `SINCE=` header, else the
/// beginning of time.
pub fn resolve_cutoff(since: Option<&str>, inventory: &Inventory) -> Result<Cutoff, ConfigError> {
    match since.or(inventory.since.as_deref()) {
        Some(value) => Cutoff::parse(value),
        None => {
            tracing::warn!("No SINCE cutoff given, collecting logs from the beginning");
            Ok(Cutoff::beginning())
        }
    }
}

/// Run the family log filter on every selected machine and print each
/// machine's output in inventory order.
pub async fn collect_logs(
    ctx: &FleetContext,
    inventory: &Inventory,
    selection: FamilySelection,
    cutoff: &Cutoff,
) -> Result<AggregateReport<ExecutionResult>> {
    println!(
        "{}",
        OutputFormatter::format_header(&format!("Log collection since {cutoff} [{selection}]"))
    );

    let mut batches = Vec::new();
    for group in group_by_family(inventory, selection) {
        match profile(group.family).and_then(|p| p.log_command) {
            Some(template) => {
                let nodes = group
                    .machines
                    .iter()
                    .map(|machine| ctx.resolve_machine(machine))
                    .collect::<Result<Vec<_>, _>>()?;
                batches.push((group.machines, template, nodes));
            }
            None => {
                for machine in &group.machines {
                    let notice = OutputFormatter::format_manual_notice(
                        machine,
                        "log collection",
                        "collect its logs",
                    );
                    println!("{notice}");
                }
            }
        }
    }

    let mut report = AggregateReport::new();
    for (machines, template, nodes) in batches {
        let request = ExecutionRequest::new(render_log_command(template, cutoff), &ctx.settings);
        let results = ctx.run_commands(nodes, request).await;

        let paired = pair_results(&machines, results.results());
        for (machine, result) in machines.iter().zip(paired) {
            println!("{}", OutputFormatter::format_machine_banner(machine));
            if let Some(result) = result {
                println!("{}", OutputFormatter::format_log_output(result));
            }
        }
        report.merge(results);
    }

    println!("{}", OutputFormatter::format_summary(report.succeeded(), report.failed()));
    Ok(report)
}

/// Match each machine, in inventory order, with the result produced for it.
///
/// Results arrive in completion order; each one is claimed at most once so
/// duplicate inventory rows each get their own output.
fn pair_results<'a>(
    machines: &[&Machine],
    results: &'a [ExecutionResult],
) -> Vec<Option<&'a ExecutionResult>> {
    let mut claimed = vec![false; results.len()];
    machines
        .iter()
        .map(|machine| {
            let index = results.iter().enumerate().position(|(i, r)| {
                !claimed[i]
                    && r.node.host == machine.address
                    && r.node.name.as_deref() == Some(machine.name.as_str())
            })?;
            claimed[index] = true;
            Some(&results[index])
        })
        .collect()
}

/// Collect logs and write the report.
pub async fn collect_and_report(
    ctx: &FleetContext,
    inventory: &Inventory,
    selection: FamilySelection,
    since: Option<&str>,
) -> Result<AggregateReport<ExecutionResult>> {
    let cutoff = resolve_cutoff(since, inventory)?;
    let report = collect_logs(ctx, inventory, selection, &cutoff).await?;
    report
        .write_json(&ctx.settings.report_path(REPORT_FILE_NAME))
        .await?;
    Ok(report)
}
