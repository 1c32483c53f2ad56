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

use russh_sftp::client::SftpSession;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::connection::Client;
use super::Error;

impl Client {
    /// Copy one remote file to `local_path` over an SFTP subsystem channel
    /// opened on this connection. Returns the number of bytes written.
    ///
    /// The remote sshd must enable the `sftp` subsystem.
    pub async fn download_file(&self, remote_path: &str, local_path: &Path) -> Result<u64, Error> {
        let channel = self.get_channel().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;

        let copied = copy_remote_file(&sftp, remote_path, local_path).await;
        if let Err(e) = sftp.close().await {
            tracing::debug!("Closing sftp session after {} failed: {}", remote_path, e);
        }
        copied
    }
}

async fn copy_remote_file(
    sftp: &SftpSession,
    remote_path: &str,
    local_path: &Path,
) -> Result<u64, Error> {
    let mut remote_file = sftp.open(remote_path).await?;
    let mut local_file = tokio::fs::File::create(local_path).await?;
    let copied = tokio::io::copy(&mut remote_file, &mut local_file).await?;
    local_file.flush().await?;
    Ok(copied)
}
