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

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::ConfigError;
use super::types::Config;
use super::utils::expand_tilde;

impl Config {
    /// Load configuration from a file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let expanded_path = expand_tilde(path);

        if !expanded_path.exists() {
            tracing::debug!(
                "Config file not found at {:?}, using defaults",
                expanded_path
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&expanded_path)
            .await
            .map_err(|e| ConfigError::ConfigFile {
                path: expanded_path.display().to_string(),
                reason: e.to_string(),
            })?;

        Self::parse(&content).map_err(|reason| ConfigError::ConfigFile {
            path: expanded_path.display().to_string(),
            reason,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load from `--config` when given, otherwise from the per-user config
    /// directory (`~/.config/psfleet/config.yaml` on Linux).
    pub async fn load_with_priority(cli_config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match cli_config_path {
            Some(path) => {
                tracing::debug!("Using config file: {:?}", path);
                Self::load(path).await
            }
            None => match default_config_path() {
                Some(path) => Self::load(&path).await,
                None => Ok(Self::default()),
            },
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "psfleet").map(|dirs| dirs.config_dir().join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_defaults_section() {
        let yaml = r#"
defaults:
  user: ops
  port: 2222
  parallel: 8
  retries: 3
  output_dir: /var/tmp/psfleet
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.defaults.user.as_deref(), Some("ops"));
        assert_eq!(config.defaults.port, Some(2222));
        assert_eq!(config.defaults.parallel, Some(8));
        assert_eq!(config.defaults.retries, Some(3));
        assert_eq!(config.defaults.timeout, None);
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(Config::parse("\n").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_rejects_bad_yaml() {
        assert!(Config::parse("defaults: [unclosed").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/psfleet.yaml"))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "defaults:\n  port: not-a-port\n").unwrap();

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFile { .. }));
    }
}
