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

use owo_colors::OwoColorize;

use crate::executor::ExecutionResult;
use crate::hostlist::Machine;

const DEFAULT_TERMINAL_WIDTH: usize = 80;

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_header(title: &str) -> String {
        let width = terminal_width();
        let border = "─".repeat(width);
        let title_len = title.chars().count() + 2;
        let padding = width.saturating_sub(title_len) / 2;

        format!(
            "{}\n{}{}\n{}",
            border.dimmed(),
            " ".repeat(padding),
            format!(" {title} ").cyan().bold(),
            border.dimmed()
        )
    }

    /// Banner printed before the output of one inventory machine.
    pub fn format_machine_banner(machine: &Machine) -> String {
        let label = format!("{} Machine: {} ({})", machine.family(), machine.name, machine.address);
        format!("\n{}\n{}\n", "=".repeat(30).dimmed(), label.bold())
    }

    /// Notice for machines that have to be handled by hand, e.g.
    /// `capability = "log collection"`, `instruction = "collect its logs"`.
    pub fn format_manual_notice(machine: &Machine, capability: &str, instruction: &str) -> String {
        format!(
            "{} {} ({}): remote {} is not available for {} machines, please {} manually",
            "⚠".yellow(),
            machine.name.bold(),
            machine.address,
            capability,
            machine.family(),
            instruction
        )
    }

    /// Collected log output of one machine, printed verbatim.
    pub fn format_log_output(result: &ExecutionResult) -> String {
        if !result.succeeded {
            return format!(
                "{} {}",
                "✗".red(),
                result.error.as_deref().unwrap_or("log collection failed").red()
            );
        }
        match result.output_text() {
            Some(text) => text.to_string(),
            None => format!("{}", "No output".dimmed()),
        }
    }

    pub fn format_summary(succeeded: usize, failed: usize) -> String {
        let succeeded_text = format!("{succeeded} succeeded");
        let failed_text = format!("{failed} failed");
        if failed == 0 {
            format!("{}: {}, {}", "Summary".bold(), succeeded_text.green(), failed_text)
        } else {
            format!(
                "{}: {}, {}",
                "Summary".bold(),
                succeeded_text.green(),
                failed_text.red()
            )
        }
    }
}
