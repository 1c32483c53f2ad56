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

/// Low level failures raised by the `russh` wrapper.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Key authentication failed")]
    KeyAuthFailed,
    #[error("Unable to load key, bad format or passphrase: {0}")]
    KeyInvalid(russh::keys::Error),
    #[error("Password authentication failed")]
    PasswordWrong,
    #[error("No authentication method was supplied")]
    NoAuthMethod,
    #[error("Invalid address was provided: {0}")]
    AddressInvalid(std::io::Error),
    #[error("The executed command didn't send an exit code")]
    CommandDidntExit,
    #[error("Server check failed")]
    ServerCheckFailed,
    #[error("Ssh error occurred: {0}")]
    SshError(#[from] russh::Error),
    #[error("Sftp error occurred: {0}")]
    SftpError(#[from] russh_sftp::client::error::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether the server rejected the offered credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::KeyAuthFailed | Error::KeyInvalid(_) | Error::PasswordWrong | Error::NoAuthMethod
        )
    }
}
