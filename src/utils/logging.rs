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

use tracing_subscriber::EnvFilter;

pub fn create_env_filter(verbosity: u8) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        // RUST_LOG wins so dependencies such as russh can be traced directly
        EnvFilter::from_default_env()
    } else {
        match verbosity {
            0 => EnvFilter::new("psfleet=warn"),
            1 => EnvFilter::new("psfleet=info"),
            // -vv: include russh debug logs for SSH troubleshooting
            2 => EnvFilter::new("psfleet=debug,russh=debug"),
            _ => EnvFilter::new("psfleet=trace,russh=trace,russh_sftp=debug"),
        }
    }
}

/// Install the console subscriber. Logs go to stderr so stdout stays clean
/// for command output.
pub fn init_logging(verbosity: u8) {
    let filter = create_env_filter(verbosity);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_env_filter() {
        for verbosity in 0..=4 {
            let _ = create_env_filter(verbosity);
        }
    }
}
