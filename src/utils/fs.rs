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

use std::path::{Path, PathBuf};

/// File name stem derived from a host address.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_`, so IPv6 literals
/// and odd hostnames still map to a single flat file name.
pub fn safe_file_stem(host: &str) -> String {
    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Local destination of a downloaded file: `<output_dir>/<safe host>_<basename>`.
pub fn download_path(output_dir: &Path, host: &str, remote_path: &str) -> PathBuf {
    let basename = remote_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download");
    output_dir.join(format!("{}_{}", safe_file_stem(host), basename))
}
