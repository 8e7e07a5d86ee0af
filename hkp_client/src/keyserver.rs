/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::KeyServerConfig;
use crate::errors::{HkpError, Result};
use crate::index::parse_index;
use crate::query;
use crate::records::Key;
use crate::transport::{HttpTransport, Transport, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_PORT: u16 = 11371;

/// Options of an index search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Ask the server for exact matches only.
    pub exact: bool,
    /// Ask the server not to modify the results (`nm`).
    pub nm: bool,
}

/// Coordinates of a remote keyserver. Every operation is an independent request.
#[derive(Clone, Debug)]
pub struct KeyServer {
    host: String,
    port: u16,
    transport: Arc<dyn Transport>,
}

impl KeyServer {
    pub fn new(host: &str) -> Result<Self> {
        Self::with_port(host, DEFAULT_PORT)
    }

    pub fn with_port(host: &str, port: u16) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS), None)
            .map_err(HkpError::Transport)?;
        Ok(Self::with_transport(host, port, Arc::new(transport)))
    }

    pub fn with_transport(host: &str, port: u16, transport: Arc<dyn Transport>) -> Self {
        Self {
            host: host.to_string(),
            port,
            transport,
        }
    }

    pub fn from_config(config: &KeyServerConfig) -> Result<Self> {
        let transport = HttpTransport::new(
            Duration::from_secs(config.timeout_secs),
            config.user_agent.as_deref(),
        )
        .map_err(HkpError::Transport)?;
        Ok(Self::with_transport(&config.host, config.port, Arc::new(transport)))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Searches the index with default options.
    pub fn search(&self, query: &str) -> Result<Vec<Key>> {
        self.search_with(query, SearchOptions::default())
    }

    /// Searches the index and returns the listed keys with their user ids.
    #[tracing::instrument(skip(self), fields(host = %self.host, port = self.port))]
    pub fn search_with(&self, query: &str, options: SearchOptions) -> Result<Vec<Key>> {
        let url = query::search_url(&self.host, self.port, query, options);
        debug!("Index request: {}", url);
        let response = self.transport.get(&url).map_err(HkpError::Transport)?;
        let keys = parse_index(self, &response)?;
        info!("Search for {:?} returned {} keys", query, keys.len());
        Ok(keys)
    }

    /// Uploads an armored key. Only transport failures are reported; the
    /// server's verdict in the response body is not inspected.
    #[tracing::instrument(skip(self, armored_key), fields(host = %self.host, port = self.port))]
    pub fn add(&self, armored_key: &str) -> Result<()> {
        let url = query::add_url(&self.host, self.port);
        let body = query::add_form_body(armored_key);
        debug!("Uploading {} bytes of key text to {}", armored_key.len(), url);
        self.transport.post_form(&url, &body).map_err(HkpError::Transport)?;
        Ok(())
    }
}
