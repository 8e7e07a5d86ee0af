/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use std::fmt::Debug;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Request/response exchange used by the client. Implementations own
/// connections, TLS and timeouts.
pub trait Transport: Debug + Send + Sync {
    fn get(&self, url: &str) -> Result<String, anyhow::Error>;
    fn post_form(&self, url: &str, form_body: &str) -> Result<String, anyhow::Error>;
}

/// Blocking HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, anyhow::Error> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, anyhow::Error> {
        let response = self.client.get(url).send()?.error_for_status()?;
        debug!("GET {} -> {}", url, response.status());
        Ok(response.text()?)
    }

    fn post_form(&self, url: &str, form_body: &str) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form_body.to_string())
            .send()?
            .error_for_status()?;
        debug!("POST {} -> {}", url, response.status());
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HttpTransport;

    #[test]
    fn builds_with_user_agent() {
        let transport = HttpTransport::new(Duration::from_secs(5), Some("hkp-client-test"));
        assert!(transport.is_ok());
    }
}
