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

use crate::device::{profile, DeviceFamily, FamilySelection};
use crate::hostlist::{Inventory, Machine};

fn automation_label(family: DeviceFamily) -> &'static str {
    match profile(family) {
        Some(p) if p.is_automated() => "remote",
        Some(_) => "manual",
        None => "ignored",
    }
}

pub fn format_machine_line(machine: &Machine) -> String {
    let family = machine.family();
    format!(
        "  {} {:<10} {:<16} {:<8} {}",
        "●".cyan(),
        machine.name.bold(),
        machine.address,
        family.to_string(),
        automation_label(family).dimmed()
    )
}

/// Print the inventory, filtered by family selection.
pub fn list_machines(inventory: &Inventory, selection: FamilySelection) {
    match &inventory.since {
        Some(since) => println!("{} SINCE={}", "Cutoff:".bold(), since),
        None => println!("{} none (logs from the beginning)", "Cutoff:".bold()),
    }

    let machines = inventory.select(selection);
    println!("{} {} [{}]", "Machines:".bold(), machines.len(), selection);
    for machine in machines {
        println!("{}", format_machine_line(machine));
    }

    let ignored = inventory
        .machines
        .iter()
        .filter(|m| m.family() == DeviceFamily::Unknown)
        .count();
    if ignored > 0 {
        println!(
            "{}",
            format!("{ignored} row(s) with unrecognized names ignored").dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automation_labels() {
        assert_eq!(automation_label(DeviceFamily::Ps1), "remote");
        assert_eq!(automation_label(DeviceFamily::Ps2), "manual");
        assert_eq!(automation_label(DeviceFamily::Unknown), "ignored");
    }

    #[test]
    fn test_machine_line_contains_fields() {
        let line = format_machine_line(&Machine::new("ps1234", "10.0.0.1"));
        assert!(line.contains("PS1234"));
        assert!(line.contains("10.0.0.1"));
        assert!(line.contains("PS1"));
    }
}
