/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

/// Status flags of an index record: `r` revoked, `d` disabled, `e` expired.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags {
    pub revoked: bool,
    pub disabled: bool,
    pub expired: bool,
}

impl Flags {
    pub fn decode(flags: &str) -> Self {
        let mut decoded = Flags::default();
        for c in flags.chars() {
            match c {
                'r' => decoded.revoked = true,
                'd' => decoded.disabled = true,
                'e' => decoded.expired = true,
                _ => {}
            }
        }
        decoded
    }
}

impl From<&str> for Flags {
    fn from(flags: &str) -> Self {
        Flags::decode(flags)
    }
}
