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

use thiserror::Error;

use crate::hostlist::HostlistError;

/// Problems with the run configuration, detected before any host is contacted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no username for host '{host}': set it in the host list, with --user or SSH_USERNAME")]
    MissingUsername { host: String },

    #[error("no credentials: pass --identity, --password (or SSH_PASSWORD) or --ask-password")]
    MissingCredentials,

    #[error("invalid start time '{value}': expected YYYY-MM-DDTHH:MM[:SS]")]
    InvalidSchedule { value: String },

    #[error("invalid cutoff '{value}': expected YYYYMMDDHHMM, YYYYMMDDHH or YYYY-MM-DD HH:MM")]
    InvalidCutoff { value: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("invalid duration for {field}: '{value}'")]
    InvalidDuration { field: &'static str, value: String },

    #[error("failed to load configuration file '{path}': {reason}")]
    ConfigFile { path: String, reason: String },

    #[error("failed to read script '{path}': {reason}")]
    ScriptFile { path: String, reason: String },

    #[error("failed to read password: {reason}")]
    PasswordPrompt { reason: String },

    #[error(transparent)]
    HostList(#[from] HostlistError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ConfigError::NotPositive { field: "--parallel" }.to_string(),
            "--parallel must be greater than zero"
        );
        assert_eq!(
            ConfigError::InvalidSchedule {
                value: "tonight".to_string()
            }
            .to_string(),
            "invalid start time 'tonight': expected YYYY-MM-DDTHH:MM[:SS]"
        );
    }

    #[test]
    fn test_hostlist_error_is_transparent() {
        let err: ConfigError = HostlistError::EmptyAddress { line: 4 }.into();
        assert_eq!(err.to_string(), "missing host address on line 4");
    }
}
