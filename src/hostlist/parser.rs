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

//! Host list parsing.
//!
//! One record per line, `address[,username[,port]]`. Blank lines and lines
//! starting with `#` are ignored. Records are kept in file order and are not
//! deduplicated.

use std::path::Path;

use super::error::HostlistError;

/// One host as written in a host list, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub address: String,
    pub username: Option<String>,
    pub port: Option<u16>,
    /// Inventory machine name, when the target came from an inventory.
    pub name: Option<String>,
}

impl Target {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            username: None,
            port: None,
            name: None,
        }
    }
}

/// Parse the whole content of a host list.
pub fn parse_targets(content: &str) -> Result<Vec<Target>, HostlistError> {
    let mut targets = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if let Some(target) = parse_line(line, index + 1)? {
            targets.push(target);
        }
    }
    Ok(targets)
}

/// Parse a single record; `None` for blank and comment lines.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Target>, HostlistError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut fields = trimmed.split(',').map(str::trim);

    let address = fields.next().unwrap_or_default();
    if address.is_empty() {
        return Err(HostlistError::EmptyAddress { line: line_number });
    }

    let username = fields
        .next()
        .filter(|user| !user.is_empty())
        .map(str::to_string);

    let port = match fields.next().filter(|port| !port.is_empty()) {
        Some(value) => Some(value.parse::<u16>().map_err(|_| HostlistError::InvalidPort {
            line: line_number,
            value: value.to_string(),
        })?),
        None => None,
    };

    Ok(Some(Target {
        address: address.to_string(),
        username,
        port,
        name: None,
    }))
}

/// Read and parse a host list file.
pub async fn load_targets(path: &Path) -> Result<Vec<Target>, HostlistError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| HostlistError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let targets = parse_targets(&content)?;
    tracing::debug!("Loaded {} target(s) from {:?}", targets.len(), path);
    Ok(targets)
}
