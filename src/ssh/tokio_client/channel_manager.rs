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

use russh::client::Msg;
use russh::Channel;

use super::connection::Client;
use crate::ssh::sequence::KeySequence;

const SSH_CMD_BUFFER_SIZE: usize = 8192;

const SSH_RESPONSE_BUFFER_SIZE: usize = 1024;

const PTY_TERM: &str = "xterm";
const PTY_COLUMNS: u32 = 80;
const PTY_ROWS: u32 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandExecutedResult {
    /// The stdout output of the command.
    pub stdout: String,
    /// The stderr output of the command.
    pub stderr: String,
    /// The unix exit status (`$?` in bash).
    pub exit_status: u32,
}

impl Client {
    /// Get a new SSH channel for communication.
    pub async fn get_channel(&self) -> Result<Channel<Msg>, super::Error> {
        self.connection_handle
            .channel_open_session()
            .await
            .map_err(super::Error::SshError)
    }

    /// Execute a remote command via the ssh connection.
    ///
    /// When `stdin` is given it is written to the remote process followed by
    /// end-of-input, so scripts can be piped to e.g. `bash -s`.
    ///
    /// Every invocation is a new shell context. The call returns once the
    /// remote side closes the channel; callers bound it with a timeout.
    pub async fn execute(
        &self,
        command: &str,
        stdin: Option<&[u8]>,
    ) -> Result<CommandExecutedResult, super::Error> {
        let mut stdout_buffer = Vec::with_capacity(SSH_CMD_BUFFER_SIZE);
        let mut stderr_buffer = Vec::with_capacity(SSH_RESPONSE_BUFFER_SIZE);
        let mut channel = self.get_channel().await?;
        channel.exec(true, command).await?;

        if let Some(input) = stdin {
            channel.data(input).await?;
            channel.eof().await?;
        }

        let mut result: Option<u32> = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                russh::ChannelMsg::Data { ref data } => stdout_buffer.extend_from_slice(data),
                russh::ChannelMsg::ExtendedData { ref data, ext } => {
                    if ext == 1 {
                        stderr_buffer.extend_from_slice(data);
                    }
                }
                // The exit status may arrive before the remaining output, so
                // keep reading until the channel closes.
                russh::ChannelMsg::ExitStatus { exit_status } => {
                    result = Some(exit_status);
                }
                _ => {}
            }
        }

        match result {
            Some(exit_status) => Ok(CommandExecutedResult {
                stdout: String::from_utf8_lossy(&stdout_buffer).to_string(),
                stderr: String::from_utf8_lossy(&stderr_buffer).to_string(),
                exit_status,
            }),
            None => Err(super::Error::CommandDidntExit),
        }
    }

    /// Type a fixed keystroke sequence into an interactive login shell.
    ///
    /// A PTY shell is opened and given time to settle, then every step is
    /// written with the delay the sequence prescribes after it. Nothing is
    /// read back from the shell.
    pub async fn send_keystrokes(&self, sequence: &KeySequence) -> Result<(), super::Error> {
        let channel = self.get_channel().await?;
        channel
            .request_pty(false, PTY_TERM, PTY_COLUMNS, PTY_ROWS, 0, 0, &[])
            .await?;
        channel.request_shell(false).await?;

        tokio::time::sleep(sequence.delays.shell_settle).await;

        for (index, step) in sequence.steps.iter().enumerate() {
            tracing::trace!("Sending {} step {}: {}", sequence.label, index, step);
            let payload = step.payload();
            channel.data(payload.as_slice()).await?;
            tokio::time::sleep(sequence.delays.delay_after(index)).await;
        }

        channel.close().await?;
        Ok(())
    }
}
