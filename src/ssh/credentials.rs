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

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};

use super::tokio_client::AuthMethod;

/// Login material shared by every connection of a run.
///
/// The password never leaves this type except as an [`AuthMethod`] handed
/// to the SSH handshake.
#[derive(Clone, Default)]
pub struct Credentials {
    key_path: Option<PathBuf>,
    password: Option<SecretString>,
}

impl Credentials {
    pub fn new(key_path: Option<PathBuf>, password: Option<SecretString>) -> Self {
        Self { key_path, password }
    }

    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.key_path.is_none() && self.password.is_none()
    }

    /// Methods in the order they are offered: key file first, then password.
    pub fn auth_methods(&self) -> Vec<AuthMethod> {
        let mut methods = Vec::with_capacity(2);
        if let Some(path) = &self.key_path {
            methods.push(AuthMethod::with_key_file(path, None));
        }
        if let Some(password) = &self.password {
            methods.push(AuthMethod::with_password(password.expose_secret()));
        }
        methods
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_path", &self.key_path)
            .field(
                "password",
                &self.password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
