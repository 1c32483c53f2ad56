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

//! Run settings merged from flags, environment and the config file.

use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ConfigError;
use super::types::Config;
use super::utils::expand_tilde;
use crate::cli::ConnectionArgs;
use crate::executor::RetryPolicy;
use crate::node::{NodeDefaults, DEFAULT_SSH_PORT};
use crate::ssh::tokio_client::ServerCheckMethod;
use crate::ssh::Credentials;

pub const DEFAULT_PARALLEL: usize = 16;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ATTEMPTS: u32 = 2;
pub const DEFAULT_OUTPUT_DIR: &str = "./results";
pub const DEFAULT_HOSTS_FILE: &str = "hosts.txt";

/// Everything a command needs to know about how to reach the fleet.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub hosts_file: PathBuf,
    pub node_defaults: NodeDefaults,
    pub credentials: Credentials,
    pub server_check: ServerCheckMethod,
    pub parallel: usize,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
    pub output_dir: PathBuf,
    report: Option<PathBuf>,
}

impl RunSettings {
    /// Merge command line (which already carries environment fallbacks),
    /// config file defaults and built-in defaults, in that order.
    pub fn resolve(
        args: &ConnectionArgs,
        config: &Config,
        password: Option<SecretString>,
    ) -> Result<Self, ConfigError> {
        let defaults = &config.defaults;

        let parallel = args
            .parallel
            .or(defaults.parallel)
            .unwrap_or(DEFAULT_PARALLEL);
        if parallel == 0 {
            return Err(ConfigError::NotPositive {
                field: "--parallel",
            });
        }

        let attempts = args.retries.or(defaults.retries).unwrap_or(DEFAULT_ATTEMPTS);
        if attempts == 0 {
            return Err(ConfigError::NotPositive { field: "--retries" });
        }

        let timeout = args.timeout.or(defaults.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout == 0 {
            return Err(ConfigError::NotPositive { field: "--timeout" });
        }

        let connect_timeout = args
            .connect_timeout
            .or(defaults.connect_timeout)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        if connect_timeout == 0 {
            return Err(ConfigError::NotPositive {
                field: "--connect-timeout",
            });
        }

        let key_path = args
            .identity
            .clone()
            .or_else(|| defaults.ssh_key.as_ref().map(PathBuf::from))
            .map(|path| expand_tilde(&path));
        let credentials = Credentials::new(key_path, password);
        if credentials.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }

        let server_check = match args
            .known_hosts
            .clone()
            .or_else(|| defaults.known_hosts.as_ref().map(PathBuf::from))
        {
            Some(path) => ServerCheckMethod::with_known_hosts_file(expand_tilde(&path)),
            None => ServerCheckMethod::NoCheck,
        };

        let username = args
            .user
            .clone()
            .or_else(|| defaults.user.clone())
            .filter(|user| !user.trim().is_empty());

        Ok(Self {
            hosts_file: Self::hosts_file(args, config),
            node_defaults: NodeDefaults {
                username,
                port: args.port.or(defaults.port).unwrap_or(DEFAULT_SSH_PORT),
            },
            credentials,
            server_check,
            parallel,
            timeout: Duration::from_secs(timeout),
            connect_timeout: Duration::from_secs(connect_timeout),
            retry: RetryPolicy::new(attempts, RetryPolicy::DEFAULT_BACKOFF),
            output_dir: path_setting(&args.output_dir, &defaults.output_dir, DEFAULT_OUTPUT_DIR),
            report: args.report.clone(),
        })
    }

    /// Host list or inventory path; needs no credentials.
    pub fn hosts_file(args: &ConnectionArgs, config: &Config) -> PathBuf {
        path_setting(&args.hosts, &config.defaults.hosts, DEFAULT_HOSTS_FILE)
    }

    /// Where the aggregate report goes: `--report` or `<output_dir>/<default_name>`.
    pub fn report_path(&self, default_name: &str) -> PathBuf {
        self.report
            .clone()
            .unwrap_or_else(|| self.output_dir.join(default_name))
    }
}

fn path_setting(flag: &Option<PathBuf>, configured: &Option<String>, fallback: &str) -> PathBuf {
    let path = flag
        .clone()
        .or_else(|| configured.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(fallback));
    expand_tilde(&path)
}

/// Password from `--password`/`SSH_PASSWORD`, or prompted for when asked to.
pub fn obtain_password(args: &ConnectionArgs) -> Result<Option<SecretString>, ConfigError> {
    if let Some(password) = args.password.as_ref().filter(|p| !p.is_empty()) {
        return Ok(Some(SecretString::new(password.clone().into_boxed_str())));
    }

    if args.ask_password {
        let password = rpassword::prompt_password("SSH password: ").map_err(|e| {
            ConfigError::PasswordPrompt {
                reason: e.to_string(),
            }
        })?;
        return Ok(Some(SecretString::new(password.into_boxed_str())));
    }

    Ok(None)
}

/// Key path for display, without leaking anything else.
pub fn describe_key(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;

    fn password() -> Option<SecretString> {
        Some(SecretString::new("pw".to_string().into_boxed_str()))
    }

    #[test]
    fn test_builtin_defaults() {
        let settings =
            RunSettings::resolve(&ConnectionArgs::default(), &Config::default(), password()).unwrap();
        assert_eq!(settings.parallel, 16);
        assert_eq!(settings.timeout, Duration::from_secs(120));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert_eq!(settings.retry.max_attempts(), 2);
        assert_eq!(settings.node_defaults.port, 22);
        assert_eq!(settings.node_defaults.username, None);
        assert_eq!(settings.output_dir, PathBuf::from("./results"));
        assert_eq!(settings.server_check, ServerCheckMethod::NoCheck);
        assert_eq!(
            settings.report_path("aggregate_results.json"),
            PathBuf::from("./results/aggregate_results.json")
        );
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            defaults: Defaults {
                user: Some("from-config".to_string()),
                parallel: Some(4),
                timeout: Some(30),
                ..Defaults::default()
            },
        };
        let args = ConnectionArgs {
            user: Some("from-flag".to_string()),
            parallel: Some(2),
            report: Some(PathBuf::from("/tmp/report.json")),
            ..ConnectionArgs::default()
        };
        let settings = RunSettings::resolve(&args, &config, password()).unwrap();
        assert_eq!(settings.node_defaults.username.as_deref(), Some("from-flag"));
        assert_eq!(settings.parallel, 2);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.report_path("x.json"), PathBuf::from("/tmp/report.json"));
    }

    #[test]
    fn test_zero_parallel_rejected() {
        let args = ConnectionArgs {
            parallel: Some(0),
            ..ConnectionArgs::default()
        };
        let err = RunSettings::resolve(&args, &Config::default(), password()).unwrap_err();
        assert_eq!(err, ConfigError::NotPositive { field: "--parallel" });
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let args = ConnectionArgs {
            retries: Some(0),
            ..ConnectionArgs::default()
        };
        let err = RunSettings::resolve(&args, &Config::default(), password()).unwrap_err();
        assert_eq!(err, ConfigError::NotPositive { field: "--retries" });
    }

    #[test]
    fn test_credentials_required() {
        let err = RunSettings::resolve(&ConnectionArgs::default(), &Config::default(), None)
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
    }

    #[test]
    fn test_key_from_config_is_enough() {
        let config = Config {
            defaults: Defaults {
                ssh_key: Some("/keys/fleet_ed25519".to_string()),
                known_hosts: Some("/etc/ssh/known_hosts".to_string()),
                ..Defaults::default()
            },
        };
        let settings = RunSettings::resolve(&ConnectionArgs::default(), &config, None).unwrap();
        assert_eq!(
            settings.credentials.key_path(),
            Some(Path::new("/keys/fleet_ed25519"))
        );
        assert_eq!(
            settings.server_check,
            ServerCheckMethod::with_known_hosts_file("/etc/ssh/known_hosts")
        );
    }

    #[test]
    fn test_password_flag() {
        let args = ConnectionArgs {
            password: Some("s3cret".to_string()),
            ..ConnectionArgs::default()
        };
        assert!(obtain_password(&args).unwrap().is_some());
        assert!(obtain_password(&ConnectionArgs::default()).unwrap().is_none());
    }
}
