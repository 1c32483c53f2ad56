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

use serde::Serialize;
use std::fmt;

use crate::config::ConfigError;
use crate::hostlist::Target;

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Values applied to targets that leave a field blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDefaults {
    pub username: Option<String>,
    pub port: u16,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            username: None,
            port: DEFAULT_SSH_PORT,
        }
    }
}

/// A fully resolved connection target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Node {
    pub fn new(host: String, port: u16, username: String) -> Self {
        Self {
            host,
            port,
            username,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fill the gaps of a target from the run defaults.
    pub fn resolve(target: &Target, defaults: &NodeDefaults) -> Result<Self, ConfigError> {
        let username = target
            .username
            .clone()
            .or_else(|| defaults.username.clone())
            .ok_or_else(|| ConfigError::MissingUsername {
                host: target.address.clone(),
            })?;

        Ok(Self {
            host: target.address.clone(),
            port: target.port.unwrap_or(defaults.port),
            username,
            name: target.name.clone(),
        })
    }

    /// Resolve every target, failing on the first that cannot be completed.
    pub fn resolve_all(targets: &[Target], defaults: &NodeDefaults) -> Result<Vec<Self>, ConfigError> {
        targets
            .iter()
            .map(|target| Self::resolve(target, defaults))
            .collect()
    }

    /// Short label for status lines: `NAME (host)` when the machine name is
    /// known, else the host.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.host),
            None => self.host.clone(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({}@{}:{})", name, self.username, self.host, self.port),
            None => write!(f, "{}@{}:{}", self.username, self.host, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(address: &str, username: Option<&str>, port: Option<u16>) -> Target {
        Target {
            address: address.to_string(),
            username: username.map(str::to_string),
            port,
            name: None,
        }
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let defaults = NodeDefaults {
            username: Some("ops".to_string()),
            port: 2222,
        };
        let node = Node::resolve(&target("10.0.0.5", None, None), &defaults).unwrap();
        assert_eq!(node.username, "ops");
        assert_eq!(node.port, 2222);
        assert_eq!(node.host, "10.0.0.5");
    }

    #[test]
    fn test_target_fields_win_over_defaults() {
        let defaults = NodeDefaults {
            username: Some("ops".to_string()),
            port: 22,
        };
        let node = Node::resolve(&target("10.0.0.5", Some("root"), Some(2200)), &defaults).unwrap();
        assert_eq!(node.username, "root");
        assert_eq!(node.port, 2200);
    }

    #[test]
    fn test_missing_username_is_config_error() {
        let err = Node::resolve(&target("10.0.0.9", None, None), &NodeDefaults::default())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingUsername {
                host: "10.0.0.9".to_string()
            }
        );
    }

    #[test]
    fn test_display() {
        let node = Node::new("10.0.0.5".to_string(), 22, "ops".to_string());
        assert_eq!(node.to_string(), "ops@10.0.0.5:22");
        assert_eq!(node.label(), "10.0.0.5");

        let named = node.with_name("PS1234");
        assert_eq!(named.to_string(), "PS1234 (ops@10.0.0.5:22)");
        assert_eq!(named.label(), "PS1234 (10.0.0.5)");
    }
}
