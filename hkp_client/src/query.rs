/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

//! Construction of HKP request URLs and form bodies.
//!
//! Parameters are form encoded, so spaces become `+`. The host is used as
//! given and is expected to carry its scheme, e.g. `http://keys.example.org`.

use url::form_urlencoded::Serializer;

use crate::keyserver::SearchOptions;

/// The `op` parameter of a lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Index,
    Get,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Index => "index",
            Operation::Get => "get",
        }
    }
}

/// Comma separated names of the enabled options. `mr` is always on.
pub fn options(nm: bool) -> String {
    [("mr", true), ("nm", nm)]
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(",")
}

/// Search terms for `op=get` name a key id, which always carries the `0x` prefix.
pub fn keyid_search_term(keyid: &str) -> String {
    if keyid.starts_with("0x") {
        keyid.to_string()
    } else {
        format!("0x{}", keyid)
    }
}

pub fn lookup_base(host: &str, port: u16) -> String {
    format!("{}:{}/pks/lookup", host, port)
}

pub fn search_url(host: &str, port: u16, query: &str, options: SearchOptions) -> String {
    let params = Serializer::new(String::new())
        .append_pair("search", query)
        .append_pair("exact", if options.exact { "on" } else { "off" })
        .append_pair("options", &self::options(options.nm))
        .append_pair("op", Operation::Index.as_str())
        .finish();
    format!("{}?{}", lookup_base(host, port), params)
}

pub fn get_url(host: &str, port: u16, keyid: &str, nm: bool) -> String {
    let params = Serializer::new(String::new())
        .append_pair("search", &keyid_search_term(keyid))
        .append_pair("options", &options(nm))
        .append_pair("op", Operation::Get.as_str())
        .finish();
    format!("{}?{}", lookup_base(host, port), params)
}

pub fn add_url(host: &str, port: u16) -> String {
    format!("{}:{}/pks/add", host, port)
}

pub fn add_form_body(armored_key: &str) -> String {
    Serializer::new(String::new())
        .append_pair("keytext", armored_key)
        .finish()
}
