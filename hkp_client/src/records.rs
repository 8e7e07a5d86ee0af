/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::algorithm::Algorithm;
use crate::armor::extract_armored_key;
use crate::errors::{HkpError, Result};
use crate::flags::Flags;
use crate::keyserver::KeyServer;
use crate::query;
use crate::transport::Transport;

fn parse_number(field: &'static str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| HkpError::invalid_field(field, value, e))
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    let seconds = value
        .trim()
        .parse::<i64>()
        .map_err(|e| HkpError::invalid_field(field, value, e))?;
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| HkpError::invalid_field(field, value, "timestamp out of range"))
}

fn parse_optional_timestamp(field: &'static str, value: &str) -> Result<Option<DateTime<Utc>>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_timestamp(field, value).map(Some)
    }
}

/// A public key as listed by a keyserver index.
///
/// The key remembers the server it was listed by, so its armored text can be
/// fetched later without the [`KeyServer`] that produced it.
pub struct Key {
    host: String,
    port: u16,
    transport: Arc<dyn Transport>,
    keyid: String,
    algorithm: Algorithm,
    key_length: u32,
    creation_date: DateTime<Utc>,
    expiration_date: Option<DateTime<Utc>>,
    flags: Flags,
    identities: Vec<Identity>,
    key_text: Mutex<Option<String>>,
}

impl Key {
    /// Builds a key from index fields in their wire form. Dates are seconds
    /// since the epoch; an empty expiration date means the key does not expire.
    pub fn new(
        server: &KeyServer,
        keyid: &str,
        algo: &str,
        keylen: &str,
        creation_date: &str,
        expiration_date: &str,
        flags: &str,
    ) -> Result<Self> {
        Ok(Self {
            host: server.host().to_string(),
            port: server.port(),
            transport: server.transport(),
            keyid: keyid.to_string(),
            algorithm: Algorithm::from_code(parse_number("algorithm", algo)?),
            key_length: parse_number("key length", keylen)?,
            creation_date: parse_timestamp("creation date", creation_date)?,
            expiration_date: parse_optional_timestamp("expiration date", expiration_date)?,
            flags: Flags::decode(flags),
            identities: Vec::new(),
            key_text: Mutex::new(None),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn keyid(&self) -> &str {
        &self.keyid
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_length(&self) -> u32 {
        self.key_length
    }

    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn revoked(&self) -> bool {
        self.flags.revoked
    }

    pub fn disabled(&self) -> bool {
        self.flags.disabled
    }

    pub fn expired(&self) -> bool {
        self.flags.expired
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub(crate) fn push_identity(&mut self, identity: Identity) {
        self.identities.push(identity);
    }

    /// The armored key text, fetched from the keyserver on first use.
    pub fn key_text(&self) -> Result<String> {
        self.key_text_with(false)
    }

    /// Like [`Key::key_text`], requesting the `nm` option. Options only take
    /// effect on the request that fills the cache.
    #[tracing::instrument(skip(self), fields(keyid = %self.keyid))]
    pub fn key_text_with(&self, nm: bool) -> Result<String> {
        // Held across the fetch so concurrent first calls issue one request.
        let mut slot = self
            .key_text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(text) = slot.as_ref() {
            debug!("Returning cached key text");
            return Ok(text.clone());
        }
        let url = query::get_url(&self.host, self.port, &self.keyid, nm);
        info!("Fetching key text: {}", url);
        let response = self.transport.get(&url).map_err(HkpError::Transport)?;
        let text = extract_armored_key(&response)?;
        *slot = Some(text.clone());
        Ok(text)
    }

    /// The cached key text, without fetching.
    pub fn cached_key_text(&self) -> Option<String> {
        self.key_text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("keyid", &self.keyid)
            .field("algorithm", &self.algorithm)
            .field("key_length", &self.key_length)
            .field("creation_date", &self.creation_date)
            .field("expiration_date", &self.expiration_date)
            .field("flags", &self.flags)
            .field("identities", &self.identities)
            .finish()
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key {} {}", self.keyid, self.algorithm)
    }
}

/// A user id attached to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    uid: String,
    creation_date: Option<DateTime<Utc>>,
    expiration_date: Option<DateTime<Utc>>,
    flags: Flags,
}

impl Identity {
    /// Builds an identity from index fields. The uid is percent-decoded,
    /// bytes that are not UTF-8 become U+FFFD; blank dates are absent.
    pub fn new(uid: &str, creation_date: &str, expiration_date: &str, flags: &str) -> Result<Self> {
        let decoded = urlencoding::decode_binary(uid.as_bytes());
        Ok(Self {
            uid: String::from_utf8_lossy(&decoded).into_owned(),
            creation_date: parse_optional_timestamp("creation date", creation_date)?,
            expiration_date: parse_optional_timestamp("expiration date", expiration_date)?,
            flags: Flags::decode(flags),
        })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        self.creation_date
    }

    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn revoked(&self) -> bool {
        self.flags.revoked
    }

    pub fn disabled(&self) -> bool {
        self.flags.disabled
    }

    pub fn expired(&self) -> bool {
        self.flags.expired
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity {}", self.uid)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::armor::{BEGIN_MARKER, END_MARKER};

    #[derive(Debug, Default)]
    struct CountingTransport {
        calls: AtomicUsize,
        response: Option<String>,
    }

    impl Transport for CountingTransport {
        fn get(&self, _url: &str) -> std::result::Result<String, anyhow::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or_else(|| anyhow!("no route to host"))
        }

        fn post_form(&self, _url: &str, _form_body: &str) -> std::result::Result<String, anyhow::Error> {
            unreachable!("keys never post")
        }
    }

    fn server_with(transport: Arc<CountingTransport>) -> KeyServer {
        KeyServer::with_transport("http://pool.example.net", 11371, transport)
    }

    fn sample_key(server: &KeyServer) -> Key {
        Key::new(server, "0xFBB75451", "17", "1024", "1083082326", "1400000000", "dr").unwrap()
    }

    #[test]
    fn key_fields_are_decoded() {
        let server = server_with(Arc::new(CountingTransport::default()));
        let key = sample_key(&server);
        assert_eq!(key.host(), "http://pool.example.net");
        assert_eq!(key.port(), 11371);
        assert_eq!(key.keyid(), "0xFBB75451");
        assert_eq!(key.algorithm().to_string(), "DSA (Digital Signature Standard)");
        assert_eq!(key.key_length(), 1024);
        assert_eq!(key.creation_date(), Utc.timestamp_opt(1083082326, 0).unwrap());
        assert_eq!(key.expiration_date(), Some(Utc.timestamp_opt(1400000000, 0).unwrap()));
        assert!(key.revoked());
        assert!(key.disabled());
        assert!(!key.expired());
        assert!(key.identities().is_empty());
        assert_eq!(key.to_string(), "Key 0xFBB75451 DSA (Digital Signature Standard)");
    }

    #[test]
    fn key_without_expiration() {
        let server = server_with(Arc::new(CountingTransport::default()));
        let key = Key::new(&server, "ABCD", "99", "4096", "0", "", "").unwrap();
        assert_eq!(key.expiration_date(), None);
        assert_eq!(key.algorithm(), Algorithm::Unknown(99));
        assert_eq!(key.flags(), Flags::default());
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let server = server_with(Arc::new(CountingTransport::default()));
        let error = Key::new(&server, "ABCD", "rsa", "4096", "0", "", "").unwrap_err();
        assert!(error.is_validation());
        assert!(matches!(error, HkpError::InvalidField { field: "algorithm", .. }));

        assert!(Key::new(&server, "ABCD", "1", "big", "0", "", "").is_err());
        assert!(Key::new(&server, "ABCD", "1", "4096", "", "", "").is_err());
        assert!(Key::new(&server, "ABCD", "1", "4096", "0", "soon", "").is_err());
        assert!(Key::new(&server, "ABCD", "-1", "4096", "0", "", "").is_err());
    }

    #[test]
    fn identity_fields_are_decoded() {
        let identity = Identity::new("Test identity%7E", "1083082326", "1400000000", "re").unwrap();
        assert_eq!(identity.uid(), "Test identity~");
        assert_eq!(identity.creation_date(), Some(Utc.timestamp_opt(1083082326, 0).unwrap()));
        assert_eq!(identity.expiration_date(), Some(Utc.timestamp_opt(1400000000, 0).unwrap()));
        assert!(identity.revoked());
        assert!(identity.expired());
        assert!(!identity.disabled());
        assert_eq!(identity.to_string(), "Identity Test identity~");
    }

    #[test]
    fn identity_dates_are_optional() {
        let identity = Identity::new("Alice %3Calice@example.org%3E", "", "", "").unwrap();
        assert_eq!(identity.uid(), "Alice <alice@example.org>");
        assert_eq!(identity.creation_date(), None);
        assert_eq!(identity.expiration_date(), None);
        assert!(Identity::new("Alice", "yesterday", "", "").unwrap_err().is_validation());
    }

    #[test]
    fn blank_dates_are_absent() {
        let identity = Identity::new("Bob", " ", "\t", "").unwrap();
        assert_eq!(identity.creation_date(), None);
        assert_eq!(identity.expiration_date(), None);

        let server = server_with(Arc::new(CountingTransport::default()));
        let key = Key::new(&server, "ABCD", "1", "2048", "1200000000", " ", "").unwrap();
        assert_eq!(key.expiration_date(), None);
    }

    #[test]
    fn latin1_uid_is_decoded_lossily() {
        let identity = Identity::new("J%FCrgen%20M%FCller", "1200000000", "", "").unwrap();
        assert_eq!(identity.uid(), "J\u{FFFD}rgen M\u{FFFD}ller");
    }

    #[test]
    fn key_text_is_fetched_once() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
            response: Some(format!("<pre>{}\n\nABC\n{}</pre>", BEGIN_MARKER, END_MARKER)),
        });
        let server = server_with(transport.clone());
        let key = sample_key(&server);

        assert_eq!(key.cached_key_text(), None);
        let first = key.key_text().unwrap();
        let second = key.key_text().unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with(BEGIN_MARKER));
        assert!(first.ends_with(END_MARKER));
        assert_eq!(key.cached_key_text(), Some(first));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_fetch_leaves_cache_empty() {
        let transport = Arc::new(CountingTransport::default());
        let server = server_with(transport.clone());
        let key = sample_key(&server);

        assert!(key.key_text().unwrap_err().is_transport());
        assert!(key.key_text().unwrap_err().is_transport());
        assert_eq!(key.cached_key_text(), None);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}
