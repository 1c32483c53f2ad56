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

use russh::client::{Config, Handle, Handler};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use super::authentication::{authenticate, AuthMethod, ServerCheckMethod};
use super::Error;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
const KEEPALIVE_MAX: usize = 3;

fn session_config() -> Arc<Config> {
    Arc::new(Config {
        keepalive_interval: Some(KEEPALIVE_INTERVAL),
        keepalive_max: KEEPALIVE_MAX,
        ..Config::default()
    })
}

/// An authenticated `russh` connection.
pub struct Client {
    pub(super) connection_handle: Handle<ClientHandler>,
    pub(super) username: String,
    pub(super) address: SocketAddr,
}

impl Client {
    /// Resolve `host`, dial the first address that answers and authenticate
    /// with `auth` in order.
    pub async fn connect(
        host: &str,
        port: u16,
        username: &str,
        auth: &[AuthMethod],
        server_check: ServerCheckMethod,
    ) -> Result<Self, Error> {
        let addresses: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(Error::AddressInvalid)?
            .collect();

        let (address, mut handle) = dial(host, &addresses, &server_check).await?;
        authenticate(&mut handle, username, auth).await?;

        Ok(Self {
            connection_handle: handle,
            username: username.to_string(),
            address,
        })
    }

    pub async fn disconnect(&self) -> Result<(), Error> {
        self.connection_handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
            .map_err(Error::SshError)
    }

    pub fn is_closed(&self) -> bool {
        self.connection_handle.is_closed()
    }
}

/// Try each resolved address in turn; the last failure is returned.
async fn dial(
    host: &str,
    addresses: &[SocketAddr],
    server_check: &ServerCheckMethod,
) -> Result<(SocketAddr, Handle<ClientHandler>), Error> {
    let config = session_config();
    let mut last_error = None;

    for &address in addresses {
        let handler = ClientHandler::new(host.to_string(), address.port(), server_check.clone());
        match russh::client::connect(Arc::clone(&config), address, handler).await {
            Ok(handle) => return Ok((address, handle)),
            Err(e) => {
                tracing::debug!("Dialing {} ({}) failed: {}", host, address, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::AddressInvalid(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no address to dial for {host}"),
        ))
    }))
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("username", &self.username)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Host key policy for one connection.
#[derive(Debug, Clone)]
pub struct ClientHandler {
    hostname: String,
    port: u16,
    server_check: ServerCheckMethod,
}

impl ClientHandler {
    pub fn new(hostname: String, port: u16, server_check: ServerCheckMethod) -> Self {
        Self {
            hostname,
            port,
            server_check,
        }
    }
}

impl Handler for ClientHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match &self.server_check {
            ServerCheckMethod::NoCheck => Ok(true),
            ServerCheckMethod::KnownHostsFile(path) => {
                let known = russh::keys::check_known_hosts_path(
                    &self.hostname,
                    self.port,
                    server_public_key,
                    path,
                )
                .map_err(|e| {
                    tracing::warn!("Host key check for {} failed: {}", self.hostname, e);
                    Error::ServerCheckFailed
                })?;
                if !known {
                    tracing::warn!("{} is not listed in {:?}", self.hostname, path);
                }
                Ok(known)
            }
        }
    }
}
