/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use crate::errors::{HkpError, Result};

pub const BEGIN_MARKER: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----";
pub const END_MARKER: &str = "-----END PGP PUBLIC KEY BLOCK-----";

/// Cuts the armored public key block out of a key response, dropping any
/// HTML or text around the markers. The markers themselves are kept.
pub fn extract_armored_key(response: &str) -> Result<String> {
    let begin = response
        .find(BEGIN_MARKER)
        .ok_or(HkpError::MissingArmorMarker(BEGIN_MARKER))?;
    let body_start = begin + BEGIN_MARKER.len();
    let body_len = response[body_start..]
        .find(END_MARKER)
        .ok_or(HkpError::MissingArmorMarker(END_MARKER))?;
    let body = &response[body_start..body_start + body_len];
    Ok(format!("{}{}{}", BEGIN_MARKER, body, END_MARKER))
}
