/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

//! Client for the HTTP Keyserver Protocol (HKP).
//!
//! Searches a keyserver's machine readable index, fetches armored keys and
//! uploads keys. Keys are treated as opaque armored text.

pub mod algorithm;
pub mod armor;
pub mod config;
pub mod errors;
pub mod flags;
pub mod index;
pub mod keyserver;
pub mod query;
pub mod records;
pub mod transport;

pub use algorithm::Algorithm;
pub use config::KeyServerConfig;
pub use errors::{HkpError, Result};
pub use flags::Flags;
pub use keyserver::{KeyServer, SearchOptions, DEFAULT_PORT};
pub use records::{Identity, Key};
pub use transport::{HttpTransport, Transport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
