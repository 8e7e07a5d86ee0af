/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use serde::Deserialize;

use crate::keyserver::DEFAULT_PORT;
use crate::transport::DEFAULT_TIMEOUT_SECS;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct KeyServerConfig {
    /// Base URL including the scheme, e.g. `http://keyserver.ubuntu.com`.
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl KeyServerConfig {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
