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

//! Machine inventory: an optional `SINCE=<cutoff>` header followed by
//! `name,address` rows.

use std::path::Path;

use super::error::HostlistError;
use super::parser::Target;
use crate::device::{normalize_name, DeviceFamily, FamilySelection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub name: String,
    pub address: String,
}

impl Machine {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: normalize_name(name),
            address: address.trim().to_string(),
        }
    }

    pub fn family(&self) -> DeviceFamily {
        DeviceFamily::classify(&self.name)
    }

    pub fn to_target(&self) -> Target {
        Target {
            name: Some(self.name.clone()),
            ..Target::new(self.address.clone())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Raw cutoff from the header line, if present.
    pub since: Option<String>,
    pub machines: Vec<Machine>,
}

impl Inventory {
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines().map(str::trim).filter(|line| !line.is_empty()).peekable();

        let since = match lines.peek() {
            Some(first)
                if first
                    .get(..6)
                    .is_some_and(|key| key.eq_ignore_ascii_case("SINCE=")) =>
            {
                let value = first[6..].trim().to_string();
                lines.next();
                Some(value)
            }
            _ => None,
        };

        let machines = lines
            .filter_map(|line| line.split_once(','))
            .map(|(name, address)| Machine::new(name, address))
            .collect();

        Self { since, machines }
    }

    pub async fn load(path: &Path) -> Result<Self, HostlistError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HostlistError::FileRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let inventory = Self::parse(&content);
        tracing::debug!(
            "Loaded inventory {:?}: {} machine(s), since={:?}",
            path,
            inventory.machines.len(),
            inventory.since
        );
        Ok(inventory)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(since) = &self.since {
            out.push_str(&format!("SINCE={since}\n"));
        }
        for machine in &self.machines {
            out.push_str(&format!("{},{}\n", machine.name, machine.address));
        }
        out
    }

    /// Write the inventory back, creating the parent directory if needed.
    pub async fn write(&self, path: &Path) -> Result<(), HostlistError> {
        let to_write_error = |e: std::io::Error| HostlistError::FileWrite {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(to_write_error)?;
        }
        tokio::fs::write(path, self.render())
            .await
            .map_err(to_write_error)
    }

    /// Machines of the selected families, in inventory order.
    pub fn select(&self, selection: FamilySelection) -> Vec<&Machine> {
        self.machines
            .iter()
            .filter(|machine| selection.includes(machine.family()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
since=202511201830

ps1234, 192.168.1.20
PS1234567,192.168.1.21
printer,192.168.1.30
garbage line
PS9999,192.168.1.22
";

    #[test]
    fn test_parse_header_and_rows() {
        let inventory = Inventory::parse(SAMPLE);
        assert_eq!(inventory.since.as_deref(), Some("202511201830"));
        assert_eq!(inventory.machines.len(), 4);
        assert_eq!(inventory.machines[0], Machine::new("PS1234", "192.168.1.20"));
        assert_eq!(inventory.machines[0].family(), DeviceFamily::Ps1);
        assert_eq!(inventory.machines[1].family(), DeviceFamily::Ps2);
        assert_eq!(inventory.machines[2].family(), DeviceFamily::Unknown);
    }

    #[test]
    fn test_parse_without_header() {
        let inventory = Inventory::parse("PS1234,10.0.0.1\n");
        assert_eq!(inventory.since, None);
        assert_eq!(inventory.machines.len(), 1);
    }

    #[test]
    fn test_select_by_family() {
        let inventory = Inventory::parse(SAMPLE);
        let names = |selection| {
            inventory
                .select(selection)
                .iter()
                .map(|m| m.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(FamilySelection::Ps1), vec!["PS1234", "PS9999"]);
        assert_eq!(names(FamilySelection::Ps2), vec!["PS1234567"]);
        assert_eq!(
            names(FamilySelection::Both),
            vec!["PS1234", "PS1234567", "PS9999"]
        );
    }

    #[test]
    fn test_machine_target_keeps_name() {
        let target = Machine::new("ps1234", "10.0.0.1").to_target();
        assert_eq!(target.address, "10.0.0.1");
        assert_eq!(target.name.as_deref(), Some("PS1234"));
        assert_eq!(target.username, None);
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lab").join("hosts.txt");
        let inventory = Inventory {
            since: Some("202501010000".to_string()),
            machines: vec![Machine::new("PS0001", "10.1.1.1")],
        };
        inventory.write(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "SINCE=202501010000\nPS0001,10.1.1.1\n");
        assert_eq!(Inventory::load(&path).await.unwrap(), inventory);
    }
}
