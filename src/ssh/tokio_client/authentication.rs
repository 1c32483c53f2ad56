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

use russh::client::Handle;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use zeroize::Zeroizing;

use super::connection::ClientHandler;

/// An authentification token.
///
/// Used when creating a [`Client`](super::Client) for authentification.
#[derive(Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthMethod {
    Password(Zeroizing<String>),
    PrivateKeyFile {
        key_file_path: PathBuf,
        key_pass: Option<Zeroizing<String>>,
    },
}

impl AuthMethod {
    /// Convenience method to create a [`AuthMethod`] from a string literal.
    pub fn with_password(password: &str) -> Self {
        Self::Password(Zeroizing::new(password.to_string()))
    }

    pub fn with_key_file<T: Into<PathBuf>>(key_file_path: T, passphrase: Option<&str>) -> Self {
        Self::PrivateKeyFile {
            key_file_path: key_file_path.into(),
            key_pass: passphrase.map(|p| Zeroizing::new(p.to_string())),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AuthMethod::Password(_) => "password",
            AuthMethod::PrivateKeyFile { .. } => "publickey",
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Password(_) => f.debug_tuple("Password").field(&"[REDACTED]").finish(),
            AuthMethod::PrivateKeyFile { key_file_path, .. } => f
                .debug_struct("PrivateKeyFile")
                .field("key_file_path", key_file_path)
                .field("key_pass", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServerCheckMethod {
    NoCheck,
    KnownHostsFile(PathBuf),
}

impl ServerCheckMethod {
    pub fn with_known_hosts_file(known_hosts_file: impl Into<PathBuf>) -> Self {
        Self::KnownHostsFile(known_hosts_file.into())
    }
}

/// Try every method in order on the same handle until one is accepted.
///
/// The error of the last rejected method is returned when none succeeds.
pub(super) async fn authenticate(
    handle: &mut Handle<ClientHandler>,
    username: &str,
    methods: &[AuthMethod],
) -> Result<(), super::Error> {
    let mut last_error = super::Error::NoAuthMethod;

    for method in methods {
        match try_method(handle, username, method).await {
            Ok(()) => {
                tracing::debug!("Authenticated as {} using {}", username, method.kind());
                return Ok(());
            }
            Err(e) => {
                tracing::debug!("{} authentication rejected for {}: {}", method.kind(), username, e);
                last_error = e;
            }
        }
    }

    Err(last_error)
}

async fn try_method(
    handle: &mut Handle<ClientHandler>,
    username: &str,
    method: &AuthMethod,
) -> Result<(), super::Error> {
    match method {
        AuthMethod::Password(password) => {
            let result = handle
                .authenticate_password(username, password.as_str())
                .await?;
            if !result.success() {
                return Err(super::Error::PasswordWrong);
            }
        }
        AuthMethod::PrivateKeyFile {
            key_file_path,
            key_pass,
        } => {
            let private_key =
                russh::keys::load_secret_key(key_file_path, key_pass.as_ref().map(|p| p.as_str()))
                    .map_err(super::Error::KeyInvalid)?;

            let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
            let result = handle
                .authenticate_publickey(
                    username,
                    russh::keys::PrivateKeyWithHashAlg::new(Arc::new(private_key), hash_alg),
                )
                .await?;
            if !result.success() {
                return Err(super::Error::KeyAuthFailed);
            }
        }
    }
    Ok(())
}
