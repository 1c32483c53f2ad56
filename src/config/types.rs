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

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Values used when neither a flag nor an environment variable is given.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub ssh_key: Option<String>,
    pub parallel: Option<usize>,
    /// Command timeout in seconds.
    pub timeout: Option<u64>,
    pub connect_timeout: Option<u64>,
    /// Attempts per host, including the first one.
    pub retries: Option<u32>,
    pub output_dir: Option<String>,
    /// Host list or inventory file.
    pub hosts: Option<String>,
    /// Verify host keys against this known_hosts file.
    pub known_hosts: Option<String>,
}
