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

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::fs::safe_file_stem;
use crate::ssh::client::CommandResult;

/// Persist the output of a completed command as
/// `<output_dir>/<safe host>_stdout.txt` and `_stderr.txt`.
///
/// Both files are always written, even when empty.
pub async fn save_host_outputs(
    output_dir: &Path,
    host: &str,
    output: &CommandResult,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory: {output_dir:?}"))?;

    let stem = safe_file_stem(host);
    let stdout_file = output_dir.join(format!("{stem}_stdout.txt"));
    let stderr_file = output_dir.join(format!("{stem}_stderr.txt"));

    fs::write(&stdout_file, output.stdout.as_bytes())
        .await
        .with_context(|| format!("Failed to write stdout file: {stdout_file:?}"))?;
    fs::write(&stderr_file, output.stderr.as_bytes())
        .await
        .with_context(|| format!("Failed to write stderr file: {stderr_file:?}"))?;

    tracing::debug!("Saved output for {} to {:?}", host, stdout_file);
    Ok((stdout_file, stderr_file))
}
